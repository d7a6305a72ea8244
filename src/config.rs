use serde::Deserialize;
use std::{env, fs, path::Path, str::FromStr, time::Duration};
use thiserror::Error;

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set in .env file or environment")]
    Missing(&'static str),

    #[error("{key} has invalid value {value:?}")]
    Invalid { key: &'static str, value: String },

    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },
}

/// Store connection parameters
#[derive(Clone, Debug, Deserialize)]
pub struct DatabaseConfig {
    pub user: String,
    pub password: String,
    pub name: String,
    pub host: String,
    #[serde(default = "default_db_port")]
    pub port: u16,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Application configuration, from a JSON file or environment variables
#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    pub database: DatabaseConfig,

    /// Maximum payload size for all requests (in bytes)
    #[serde(default = "default_max_payload_size")]
    pub max_payload_size: usize,

    /// Pool size; callers beyond this wait for a free connection
    #[serde(default = "default_max_db_connections")]
    pub max_db_connections: u32,

    /// How long a request waits for a pooled connection
    #[serde(default = "default_db_acquire_timeout_secs")]
    pub db_acquire_timeout_secs: u64,

    /// Upper bound on a single store statement
    #[serde(default = "default_statement_timeout_secs")]
    pub statement_timeout_secs: u64,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_db_port() -> u16 {
    5432
}

fn default_max_payload_size() -> usize {
    64 * 1024
}

fn default_max_db_connections() -> u32 {
    150
}

fn default_db_acquire_timeout_secs() -> u64 {
    30
}

fn default_statement_timeout_secs() -> u64 {
    10
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Required environment variables:
    /// - DB_USER, DB_PASSWORD, DB_NAME, DB_HOST
    ///
    /// Optional environment variables:
    /// - SERVER_HOST (default: 127.0.0.1)
    /// - SERVER_PORT (default: 8080)
    /// - DB_PORT (default: 5432)
    /// - MAX_PAYLOAD_SIZE in bytes (default: 65536)
    /// - MAX_DB_CONNECTIONS (default: 150)
    /// - DB_ACQUIRE_TIMEOUT_SECS (default: 30)
    /// - STATEMENT_TIMEOUT_SECS (default: 10)
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if it exists
        dotenv::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from a JSON file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let display = path.display().to_string();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: display.clone(),
            source,
        })?;
        serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: display,
            source,
        })
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        let required = |key: &'static str| lookup(key).ok_or(ConfigError::Missing(key));

        let database = DatabaseConfig {
            user: required("DB_USER")?,
            password: required("DB_PASSWORD")?,
            name: required("DB_NAME")?,
            host: required("DB_HOST")?,
            port: parse_or(&lookup, "DB_PORT", default_db_port())?,
        };

        let server = ServerConfig {
            host: lookup("SERVER_HOST").unwrap_or_else(default_host),
            port: parse_or(&lookup, "SERVER_PORT", default_port())?,
        };

        Ok(Config {
            server,
            database,
            max_payload_size: parse_or(&lookup, "MAX_PAYLOAD_SIZE", default_max_payload_size())?,
            max_db_connections: parse_or(
                &lookup,
                "MAX_DB_CONNECTIONS",
                default_max_db_connections(),
            )?,
            db_acquire_timeout_secs: parse_or(
                &lookup,
                "DB_ACQUIRE_TIMEOUT_SECS",
                default_db_acquire_timeout_secs(),
            )?,
            statement_timeout_secs: parse_or(
                &lookup,
                "STATEMENT_TIMEOUT_SECS",
                default_statement_timeout_secs(),
            )?,
        })
    }

    pub fn db_acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.db_acquire_timeout_secs)
    }

    pub fn statement_timeout(&self) -> Duration {
        Duration::from_secs(self.statement_timeout_secs)
    }
}

/// Parse an optional variable, falling back to `default` when unset.
/// A set but unparsable value is an error rather than a silent default.
fn parse_or<T, F>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    F: Fn(&'static str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(default),
        Some(value) => value
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
    }
}
