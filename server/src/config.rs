//! Server configuration read from the environment.
//!
//! - `MONGODB_URI`: connection string (default `mongodb://localhost:27017`)
//! - `MONGODB_DB`: database name (default `mytodos`)
//! - `TODO_STORE`: `mongo` (default) | `memory`
//! - `HOST`: bind host (default `0.0.0.0`)
//! - `PORT`: bind port (default `3000`)

use std::env;
use std::net::SocketAddr;
use std::str::FromStr;

use thiserror::Error;

pub const DEFAULT_MONGODB_URI: &str = "mongodb://localhost:27017";
pub const DEFAULT_MONGODB_DB: &str = "mytodos";
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("PORT={value:?} is not a valid port: {source}")]
    InvalidPort {
        value: String,
        source: std::num::ParseIntError,
    },

    #[error("TODO_STORE={0:?} is not one of `mongo`, `memory`")]
    UnknownStore(String),

    #[error("{address:?} is not a valid listen address: {source}")]
    InvalidAddress {
        address: String,
        source: std::net::AddrParseError,
    },
}

/// Which `TodoStore` backs the handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Mongo,
    Memory,
}

impl FromStr for StoreKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mongo" | "mongodb" => Ok(Self::Mongo),
            "memory" | "in_memory" => Ok(Self::Memory),
            _ => Err(ConfigError::UnknownStore(s.to_string())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub mongodb_uri: String,
    pub mongodb_db: String,
    pub store: StoreKind,
    pub address: SocketAddr,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; unset and blank values fall back to the
    /// defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let store = match get("TODO_STORE") {
            Some(value) => value.parse()?,
            None => StoreKind::Mongo,
        };

        let port = match get("PORT") {
            Some(value) => value
                .trim()
                .parse::<u16>()
                .map_err(|source| ConfigError::InvalidPort { value, source })?,
            None => DEFAULT_PORT,
        };
        let host = get("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        let address = format!("{host}:{port}");
        let address = address
            .parse()
            .map_err(|source| ConfigError::InvalidAddress { address, source })?;

        Ok(Self {
            mongodb_uri: get("MONGODB_URI").unwrap_or_else(|| DEFAULT_MONGODB_URI.to_string()),
            mongodb_db: get("MONGODB_DB").unwrap_or_else(|| DEFAULT_MONGODB_DB.to_string()),
            store,
            address,
        })
    }
}
