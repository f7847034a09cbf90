use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use log::{info, warn};
use parking_lot::{Mutex, MutexGuard};
use postgres::error::SqlState;
use postgres::{Client, Config, NoTls};

use super::DbConnector;
use crate::config::DatabaseConfig;
use crate::error::StoreError;
use crate::model::{Album, AlbumId};

pub const DRIVER_NAME: &str = "postgresql";
pub const DRIVER_ALIAS: &str = "postgres";

const PING_TIMEOUT: Duration = Duration::from_secs(5);

const CREATE_ALBUM_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS album (
        album_id VARCHAR(255) PRIMARY KEY,
        name VARCHAR(255),
        artist VARCHAR(255),
        price DOUBLE PRECISION,
        image BYTEA
    )
";

const SELECT_ALBUM_ID: &str = "SELECT album_id FROM album WHERE album_id = $1";

const INSERT_ALBUM: &str = "
    INSERT INTO album (album_id, name, artist, price)
    VALUES ($1, $2, $3, $4)
";

/// Fixed-size pool of blocking clients. Each slot is reconnected lazily if
/// the server drops it.
pub struct PostgresConnector {
    pgconfig: Config,
    statement_timeout: Option<Duration>,
    pool: Vec<Mutex<Client>>,
    next: AtomicUsize,
}

impl PostgresConnector {
    pub fn connect(dburl: &str, config: &DatabaseConfig) -> Result<PostgresConnector, StoreError> {
        let mut pgconfig: Config = dburl.parse()
            .map_err(adapt_error_tagged("Invalid database url"))?;
        let statement_timeout = config.query_timeout();
        if let Some(timeout) = statement_timeout {
            pgconfig.connect_timeout(timeout);
        }

        let mut pool = Vec::with_capacity(config.pool_size());
        for _ in 0..config.pool_size() {
            pool.push(Mutex::new(open_client(&pgconfig, statement_timeout)?));
        }
        info!("opened {} postgres connections", pool.len());

        Ok(PostgresConnector {
            pgconfig,
            statement_timeout,
            pool,
            next: AtomicUsize::new(0),
        })
    }

    fn checkout(&self) -> Result<MutexGuard<'_, Client>, StoreError> {
        let start = self.next.fetch_add(1, Ordering::Relaxed);
        let slots = self.pool.len();

        let mut guard = (0..slots)
            .find_map(|offset| self.pool[(start + offset) % slots].try_lock())
            .unwrap_or_else(|| self.pool[start % slots].lock());

        if guard.is_closed() {
            warn!("postgres connection closed, reconnecting");
            *guard = open_client(&self.pgconfig, self.statement_timeout)?;
        }
        Ok(guard)
    }
}

fn open_client(pgconfig: &Config, statement_timeout: Option<Duration>) -> Result<Client, StoreError> {
    let mut client = pgconfig.connect(NoTls)
        .map_err(adapt_error_tagged("Failed to connect to database"))?;
    if let Some(timeout) = statement_timeout {
        // SET takes no bind parameters; the value is an integer we produced.
        client.batch_execute(&format!("SET statement_timeout = {}", timeout.as_millis()))
            .map_err(adapt_error_tagged("Failed to set statement timeout"))?;
    }
    Ok(client)
}

impl DbConnector for PostgresConnector {
    fn ping(&self) -> Result<(), StoreError> {
        let mut client = self.checkout()?;
        client.is_valid(PING_TIMEOUT)
            .map_err(adapt_error_tagged("Failed to ping database"))
    }

    fn ensure_schema(&self) -> Result<(), StoreError> {
        let mut client = self.checkout()?;
        match client.batch_execute(CREATE_ALBUM_TABLE) {
            Ok(()) => Ok(()),
            // Two processes racing on IF NOT EXISTS can still trip the catalog.
            Err(ref e) if is_already_exists(e) => {
                info!("album table created concurrently: {}", e);
                Ok(())
            }
            Err(e) => Err(adapt_error_tagged("Failed to create table")(e)),
        }
    }

    fn find_album(&self, id: &AlbumId) -> Result<AlbumId, StoreError> {
        let mut client = self.checkout()?;
        let row = client.query_opt(SELECT_ALBUM_ID, &[&id.as_str()])
            .map_err(adapt_error_tagged("Error fetching album"))?
            .ok_or(StoreError::NotFound)?;
        let album_id: String = row.try_get(0)
            .map_err(adapt_error_tagged("Error decoding album"))?;
        Ok(AlbumId::from(album_id))
    }

    fn insert_album(&self, album: &Album) -> Result<(), StoreError> {
        let mut client = self.checkout()?;
        client.execute(INSERT_ALBUM, &[
            &album.album_id.as_str(),
            &album.name,
            &album.artist,
            &album.price,
        ]).map_err(|e| {
            if e.code() == Some(&SqlState::UNIQUE_VIOLATION) {
                return StoreError::Duplicate(album.album_id.to_string());
            }
            adapt_error_tagged("Failed to insert album")(e)
        })?;
        Ok(())
    }
}

fn is_already_exists(e: &postgres::Error) -> bool {
    match e.code() {
        Some(code) => *code == SqlState::DUPLICATE_TABLE || *code == SqlState::UNIQUE_VIOLATION,
        None => false,
    }
}

fn adapt_error_tagged(tag: &'static str) -> impl Fn(postgres::Error) -> StoreError {
    move |e| {
        if e.is_closed() {
            return StoreError::Connection(format!("{}: {}", tag, e));
        }
        if e.code() == Some(&SqlState::QUERY_CANCELED) {
            return StoreError::Storage(format!("{}: statement timed out: {}", tag, e));
        }
        StoreError::Storage(format!("{}: {}", tag, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_binds_the_id() {
        assert!(SELECT_ALBUM_ID.contains("album_id = $1"));
        assert!(!SELECT_ALBUM_ID.contains("$2"));
    }

    #[test]
    fn insert_binds_four_fields_and_skips_image() {
        for param in ["$1", "$2", "$3", "$4"] {
            assert!(INSERT_ALBUM.contains(param), "missing {}", param);
        }
        assert!(!INSERT_ALBUM.contains("$5"));
        assert!(!INSERT_ALBUM.contains("image"));
        assert!(INSERT_ALBUM.contains("(album_id, name, artist, price)"));
    }

    #[test]
    fn schema_is_create_if_missing() {
        assert!(CREATE_ALBUM_TABLE.contains("CREATE TABLE IF NOT EXISTS album"));
        assert!(CREATE_ALBUM_TABLE.contains("album_id VARCHAR(255) PRIMARY KEY"));
        assert!(CREATE_ALBUM_TABLE.contains("image BYTEA"));
    }
}
