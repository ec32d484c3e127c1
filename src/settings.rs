//! Process settings read from the environment (after an optional `.env`).

use crate::error::ConfigError;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

pub const DEFAULT_DATABASE_URL: &str = "postgres://localhost/liftops";
pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:3000";

#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
    pub database_url: String,
    pub listen_addr: SocketAddr,
    pub max_connections: u32,
    /// Statements slower than this are logged at warn.
    pub slow_statement_ms: u64,
    pub body_limit_bytes: usize,
    /// Recorded in `ar_internal_metadata` by the migration.
    pub environment: String,
}

impl Settings {
    /// Read the process environment. Call [`load_env_file`] first to pick up `.env`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build settings from `lookup`; unset names take their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        Ok(Settings {
            database_url: lookup("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            listen_addr: parse(&lookup, "LISTEN_ADDR", DEFAULT_LISTEN_ADDR)?,
            max_connections: parse(&lookup, "DB_MAX_CONNECTIONS", "5")?,
            slow_statement_ms: parse(&lookup, "SLOW_STATEMENT_MS", "500")?,
            body_limit_bytes: parse(&lookup, "BODY_LIMIT_BYTES", "4194304")?,
            environment: lookup("APP_ENV").unwrap_or_else(|| "development".to_string()),
        })
    }
}

/// Load `.env` into the process environment. `Ok(None)` when there is none.
///
/// Runs before logging is installed so `RUST_LOG` from the file applies; the caller reports errors.
pub fn load_env_file() -> Result<Option<PathBuf>, dotenvy::Error> {
    env_file_outcome(dotenvy::dotenv())
}

fn env_file_outcome(result: Result<PathBuf, dotenvy::Error>) -> Result<Option<PathBuf>, dotenvy::Error> {
    match result {
        Ok(path) => Ok(Some(path)),
        Err(e) if e.not_found() => Ok(None),
        Err(e) => Err(e),
    }
}

fn parse<T>(lookup: &impl Fn(&str) -> Option<String>, name: &'static str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = lookup(name).unwrap_or_else(|| default.to_string());
    raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidSetting {
        name,
        message: format!("{:?}: {}", raw, e),
    })
}
