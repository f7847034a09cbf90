//! Record store handle shared by all request handlers.
//!
//! Drivers are blocking, so every call is moved onto the blocking pool and
//! the wait is bounded by the configured query timeout.

pub mod drivers;

use std::sync::Arc;
use std::time::Duration;

use log::{error, info};
use rocket::tokio::task;
use rocket::tokio::time;

use crate::config::DatabaseConfig;
use crate::error::{StartupError, StoreError};
use crate::model::{Album, AlbumId};

pub use self::drivers::DbConnector;

#[derive(Clone)]
pub struct Database {
    driver: Arc<dyn DbConnector>,
    timeout: Option<Duration>,
}

impl Database {
    pub fn new(driver: Arc<dyn DbConnector>, timeout: Option<Duration>) -> Database {
        Database { driver, timeout }
    }

    /// Opens the driver named by `url`, checks the backend is reachable and
    /// bootstraps the schema.
    pub fn open(config: &DatabaseConfig, url: &str) -> Result<Database, StartupError> {
        let driver = drivers::get_driver(config, url).map_err(StartupError::Open)?;
        driver.ping().map_err(StartupError::Connect)?;
        driver.ensure_schema().map_err(StartupError::Schema)?;
        info!("album schema ready");
        Ok(Database::new(Arc::from(driver), config.query_timeout()))
    }

    pub async fn find_album(&self, id: AlbumId) -> Result<AlbumId, StoreError> {
        self.run(move |driver| driver.find_album(&id)).await
    }

    pub async fn insert_album(&self, album: Album) -> Result<(), StoreError> {
        self.run(move |driver| driver.insert_album(&album)).await
    }

    async fn run<T, F>(&self, op: F) -> Result<T, StoreError>
        where T: Send + 'static,
              F: FnOnce(&dyn DbConnector) -> Result<T, StoreError> + Send + 'static
    {
        let driver = Arc::clone(&self.driver);
        let handle = task::spawn_blocking(move || op(driver.as_ref()));

        let joined = match self.timeout {
            Some(limit) => time::timeout(limit, handle).await
                .map_err(|_| StoreError::Timeout(limit.as_millis() as u64))?,
            None => handle.await,
        };
        joined.map_err(|e| {
            error!("store task failed: {}", e);
            StoreError::Storage(format!("store task failed: {}", e))
        })?
    }
}
