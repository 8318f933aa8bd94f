//! Environment-driven configuration.
//!
//! Environment variables:
//!   DATABASE_URL             - Postgres connection string
//!   DB_MAX_CONNECTIONS       - pool size (default: 10)
//!   DB_CONNECT_TIMEOUT_SECS  - pool acquire timeout (default: 30)
//!   LOG_FORMAT               - "json" or "text" (default: "text")
//!   LOG_FILE                 - path to log file (optional, enables file logging)
//!   LOG_ANSI                 - "true"/"false" override ANSI colors

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use chainnote_db::defaults::{DATABASE_URL, DB_CONNECT_TIMEOUT_SECS, DB_MAX_CONNECTIONS};
use chainnote_db::{Error, PoolConfig, Result};

/// Log output encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "text" | "" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(Error::Config(format!(
                "LOG_FORMAT must be 'text' or 'json', got '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CliConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub connect_timeout: Duration,
    pub log_format: LogFormat,
    pub log_file: Option<PathBuf>,
    pub log_ansi: Option<bool>,
}

impl CliConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`, which returns a variable's value
    /// if set.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let max_connections = match lookup("DB_MAX_CONNECTIONS") {
            Some(raw) => parse_number::<u32>("DB_MAX_CONNECTIONS", &raw)?,
            None => DB_MAX_CONNECTIONS,
        };
        if max_connections == 0 {
            return Err(Error::Config(
                "DB_MAX_CONNECTIONS must be at least 1".to_string(),
            ));
        }

        let connect_timeout_secs = match lookup("DB_CONNECT_TIMEOUT_SECS") {
            Some(raw) => parse_number::<u64>("DB_CONNECT_TIMEOUT_SECS", &raw)?,
            None => DB_CONNECT_TIMEOUT_SECS,
        };

        let log_format = match lookup("LOG_FORMAT") {
            Some(raw) => raw.parse()?,
            None => LogFormat::Text,
        };

        Ok(Self {
            database_url: lookup("DATABASE_URL").unwrap_or_else(|| DATABASE_URL.to_string()),
            max_connections,
            connect_timeout: Duration::from_secs(connect_timeout_secs),
            log_format,
            log_file: lookup("LOG_FILE")
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),
            log_ansi: lookup("LOG_ANSI").map(|v| v == "true" || v == "1"),
        })
    }

    /// Pool settings derived from this configuration.
    pub fn pool_config(&self) -> PoolConfig {
        PoolConfig::new()
            .max_connections(self.max_connections)
            .connect_timeout(self.connect_timeout)
    }
}

fn parse_number<T: FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse()
        .map_err(|_| Error::Config(format!("{} must be a number, got '{}'", key, raw)))
}
