//! API server configuration.
//!
//! Configuration is loaded from environment variables with fallback to defaults.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use moto_core::DEFAULT_FALLBACK_MARGIN;

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// HTTP listen port
    pub http_port: u16,

    /// SQLite database file
    pub db_path: PathBuf,

    /// Pool size
    pub db_max_connections: u32,

    /// How long a brand's category lists are served from memory
    pub category_cache_ttl: Duration,

    /// Profit per unit when a product's buy price is unknown
    pub fallback_margin: i64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            http_port: 8080,
            db_path: PathBuf::from("./motopos.db"),
            db_max_connections: 5,
            category_cache_ttl: Duration::from_secs(300),
            fallback_margin: DEFAULT_FALLBACK_MARGIN,
        }
    }
}

/// Reads `key`, falling back to `default` when unset.
fn var_or<T: FromStr>(key: &str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key.to_string())),
        Err(_) => Ok(default),
    }
}

impl ApiConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let defaults = ApiConfig::default();

        let config = ApiConfig {
            http_port: var_or("MOTO_HTTP_PORT", defaults.http_port)?,

            db_path: env::var("MOTO_DB_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.db_path),

            db_max_connections: var_or("MOTO_DB_MAX_CONNECTIONS", defaults.db_max_connections)?,

            category_cache_ttl: Duration::from_secs(var_or(
                "MOTO_CATEGORY_CACHE_TTL_SECS",
                defaults.category_cache_ttl.as_secs(),
            )?),

            fallback_margin: var_or("MOTO_FALLBACK_MARGIN", defaults.fallback_margin)?,
        };

        if config.db_max_connections == 0 {
            return Err(ConfigError::InvalidValue("MOTO_DB_MAX_CONNECTIONS".to_string()));
        }
        if config.fallback_margin < 0 {
            return Err(ConfigError::InvalidValue("MOTO_FALLBACK_MARGIN".to_string()));
        }

        Ok(config)
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}
