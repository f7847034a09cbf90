use std::fs;
use std::net::{IpAddr, Ipv4Addr};
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::StartupError;

pub const DSN_ENV: &str = "DB_DSN";
pub const PORT_ENV: &str = "PORT";

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(default)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub web: WebConfig,
    pub logging: LoggingConfig,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub pool_size: usize,
    pub query_timeout_ms: u64,
}

impl Default for DatabaseConfig {
    fn default() -> DatabaseConfig {
        DatabaseConfig {
            url: None,
            pool_size: 4,
            query_timeout_ms: 5000,
        }
    }
}

impl DatabaseConfig {
    pub fn url(&self) -> Result<&str, StartupError> {
        match self.url {
            Some(ref url) if !url.is_empty() => Ok(url),
            _ => Err(StartupError::MissingDsn),
        }
    }

    pub fn pool_size(&self) -> usize {
        self.pool_size.max(1)
    }

    /// `None` when timeouts are disabled (`query_timeout_ms = 0`).
    pub fn query_timeout(&self) -> Option<Duration> {
        match self.query_timeout_ms {
            0 => None,
            ms => Some(Duration::from_millis(ms)),
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct WebConfig {
    pub address: IpAddr,
    pub port: u16,
}

impl Default for WebConfig {
    fn default() -> WebConfig {
        WebConfig {
            address: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 8080,
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> LoggingConfig {
        LoggingConfig { level: "info".into() }
    }
}

impl AppConfig {
    /// Reads the optional TOML file and then layers the process environment on top.
    pub fn load(path: Option<&Path>) -> Result<AppConfig, StartupError> {
        let mut config = match path {
            Some(path) => AppConfig::from_file(path)?,
            None => AppConfig::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<AppConfig, StartupError> {
        let raw = fs::read_to_string(path).map_err(|source| StartupError::ConfigRead {
            path: path.display().to_string(),
            source,
        })?;
        AppConfig::from_toml(&raw)
    }

    pub fn from_toml(raw: &str) -> Result<AppConfig, StartupError> {
        Ok(toml::from_str(raw)?)
    }

    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), StartupError>
        where F: Fn(&str) -> Option<String>
    {
        if let Some(dsn) = lookup(DSN_ENV).filter(|v| !v.is_empty()) {
            self.database.url = Some(dsn);
        }
        if let Some(port) = lookup(PORT_ENV).filter(|v| !v.is_empty()) {
            self.web.port = port.trim().parse()
                .map_err(|_| StartupError::InvalidPort(port.clone()))?;
        }
        Ok(())
    }
}
