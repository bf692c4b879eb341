//! Admin server configuration module.
//!
//! Configuration is layered, later sources overriding earlier ones:
//! ```text
//! built-in defaults  →  admin.toml (optional)  →  STOREFRONT_* env vars
//! ```
//! e.g. `STOREFRONT_PORT=9000 STOREFRONT_DATABASE_PATH=/var/lib/store.db`.

use std::net::SocketAddr;
use std::path::PathBuf;

use std::time::Duration;

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use storefront_db::DbConfig;

/// Default config file, looked up in the working directory.
pub const CONFIG_FILE: &str = "admin.toml";

/// Prefix of the environment overrides.
pub const ENV_PREFIX: &str = "STOREFRONT";

/// Admin server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminConfig {
    /// Interface to bind
    pub bind_address: String,

    /// HTTP port
    pub port: u16,

    /// SQLite database file
    pub database_path: PathBuf,

    /// Connection pool size
    pub max_connections: u32,

    /// Milliseconds a write waits on a locked database
    pub busy_timeout_ms: u64,

    /// Changelist rows per page for admins that don't set their own
    pub list_per_page: u32,

    /// Buffered order-created events per subscriber
    pub signal_capacity: usize,
}

impl Default for AdminConfig {
    fn default() -> Self {
        AdminConfig {
            bind_address: "127.0.0.1".to_string(),
            port: 8000,
            database_path: PathBuf::from("storefront.db"),
            max_connections: 5,
            busy_timeout_ms: 5_000,
            list_per_page: 100,
            signal_capacity: 64,
        }
    }
}

impl AdminConfig {
    /// Loads defaults, then `admin.toml` if present, then the environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(CONFIG_FILE)
    }

    /// Same as [`AdminConfig::load`] with an explicit config file.
    pub fn load_from(path: &str) -> Result<Self, ConfigError> {
        let defaults = AdminConfig::default();

        let config: AdminConfig = Config::builder()
            .set_default("bind_address", defaults.bind_address)?
            .set_default("port", i64::from(defaults.port))?
            .set_default("database_path", defaults.database_path.display().to_string())?
            .set_default("max_connections", i64::from(defaults.max_connections))?
            .set_default("busy_timeout_ms", defaults.busy_timeout_ms as i64)?
            .set_default("list_per_page", i64::from(defaults.list_per_page))?
            .set_default("signal_capacity", defaults.signal_capacity as i64)?
            .add_source(File::with_name(path).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Rejects values the server can't run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::InvalidValue("port".to_string()));
        }
        if self.list_per_page == 0 {
            return Err(ConfigError::InvalidValue("list_per_page".to_string()));
        }
        if self.max_connections == 0 {
            return Err(ConfigError::InvalidValue("max_connections".to_string()));
        }
        if self.signal_capacity == 0 {
            return Err(ConfigError::InvalidValue("signal_capacity".to_string()));
        }
        self.socket_addr()?;
        Ok(())
    }

    /// Pool settings for the configured database file.
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(&self.database_path)
            .max_connections(self.max_connections)
            .busy_timeout(Duration::from_millis(self.busy_timeout_ms))
    }

    /// Address the HTTP listener binds to.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.bind_address, self.port)
            .parse()
            .map_err(|_| ConfigError::InvalidValue("bind_address".to_string()))
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
}
