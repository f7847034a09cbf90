pub mod postgres;
pub mod mock;

use log::info;
use url::Url;

use crate::config::DatabaseConfig;
use crate::error::StoreError;
use crate::model::{Album, AlbumId};

/// Blocking storage backend. Implementations must tolerate concurrent callers.
pub trait DbConnector: Send + Sync {
    /// Round-trips to the backend without touching any table.
    fn ping(&self) -> Result<(), StoreError>;

    /// Creates the album table when missing. Safe to call repeatedly.
    fn ensure_schema(&self) -> Result<(), StoreError>;

    fn find_album(&self, id: &AlbumId) -> Result<AlbumId, StoreError>;

    /// Inserts id, name, artist and price. `image` is never written.
    fn insert_album(&self, album: &Album) -> Result<(), StoreError>;
}

pub fn get_driver(config: &DatabaseConfig, url_raw: &str) -> Result<Box<dyn DbConnector>, StoreError> {
    let url = Url::parse(url_raw)
        .map_err(|e| StoreError::Connection(format!("error parsing url: {}", e)))?;

    info!("getting driver {}", url.scheme());
    match url.scheme() {
        postgres::DRIVER_NAME | postgres::DRIVER_ALIAS => {
            Ok(Box::new(postgres::PostgresConnector::connect(url_raw, config)?))
        }
        mock::DRIVER_NAME => Ok(Box::new(mock::get_conn(&url)?)),
        scheme => Err(unknown_scheme(scheme)),
    }
}

fn unknown_scheme(scheme: &str) -> StoreError {
    StoreError::Connection(format!("unknown scheme: {}", scheme))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_scheme_is_rejected() {
        let err = get_driver(&DatabaseConfig::default(), "mysql://user@host/db").err().unwrap();
        assert!(matches!(err, StoreError::Connection(ref msg) if msg.contains("mysql")));
    }

    #[test]
    fn garbage_url_is_rejected() {
        let err = get_driver(&DatabaseConfig::default(), "not a url").err().unwrap();
        assert!(matches!(err, StoreError::Connection(_)));
    }

    #[test]
    fn mock_scheme_selects_mock_driver() {
        let driver = get_driver(&DatabaseConfig::default(), "mock://").unwrap();
        driver.ensure_schema().unwrap();
        assert!(driver.find_album(&AlbumId::from("nope")).unwrap_err().is_not_found());
    }
}
