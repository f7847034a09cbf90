use std::io;

use thiserror::Error;

/// Outcome vocabulary of the record store.
///
/// Only `NotFound` is visible to clients as its own status; every other
/// variant collapses to an opaque internal error at the HTTP boundary.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("album not found")]
    NotFound,

    #[error("duplicate album id: {0}")]
    Duplicate(String),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("storage call exceeded {0} ms")]
    Timeout(u64),

    #[error("storage error: {0}")]
    Storage(String),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound)
    }
}

/// Failures that keep the process from serving traffic.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("DB_DSN environment variable not set")]
    MissingDsn,

    #[error("error reading config {path}: {source}")]
    ConfigRead {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("error parsing config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("invalid PORT value {0:?}")]
    InvalidPort(String),

    #[error("failed to start logger: {0}")]
    Logging(#[from] flexi_logger::FlexiLoggerError),

    #[error("failed to open DB: {0}")]
    Open(#[source] StoreError),

    #[error("failed to connect to DB: {0}")]
    Connect(#[source] StoreError),

    #[error("failed to create table: {0}")]
    Schema(#[source] StoreError),

    #[error("server error: {0}")]
    Launch(String),
}
