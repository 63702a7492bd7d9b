//! Configuration loaded from environment variables.

use std::env;
use std::net::SocketAddr;
use std::str::FromStr;

use provider_core::ProviderId;

/// API server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address.
    pub addr: SocketAddr,
    /// SQLite database URL.
    pub database_url: String,
    /// Publicly reachable base URL for provider callbacks, if any.
    pub public_base_url: Option<String>,
    /// Provider used when a submission names none.
    pub default_provider: ProviderId,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `BIND_ADDR` | Server bind address | `127.0.0.1:8080` |
    /// | `SQLITE_PATH` | SQLite database URL | `sqlite:service.db?mode=rwc` |
    /// | `PUBLIC_BASE_URL` | Base URL for provider callbacks | (none: poll-only) |
    /// | `DEFAULT_PROVIDER` | `pixelle` or `kinetic` | `pixelle` |
    pub fn from_env() -> Result<Self, ConfigError> {
        let addr = env::var("BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8080".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidAddr)?;

        let database_url =
            env::var("SQLITE_PATH").unwrap_or_else(|_| "sqlite:service.db?mode=rwc".to_string());

        let public_base_url = env::var("PUBLIC_BASE_URL")
            .ok()
            .filter(|url| !url.trim().is_empty());

        let default_provider = match env::var("DEFAULT_PROVIDER") {
            Ok(value) => {
                ProviderId::from_str(&value).map_err(|e| ConfigError::InvalidProvider(e.0))?
            }
            Err(_) => ProviderId::Pixelle,
        };

        Ok(Self {
            addr,
            database_url,
            public_base_url,
            default_provider,
        })
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid BIND_ADDR format")]
    InvalidAddr,

    #[error("Invalid DEFAULT_PROVIDER: {0}")]
    InvalidProvider(String),
}
