//! Process configuration.
//!
//! Values come from environment variables (`DB_PATH`, `SERVER_HOST`,
//! `SERVER_PORT`, `DB_MAX_CONNECTIONS`, `LOG_LEVEL`) layered over built-in
//! defaults. Blank variables count as unset.

use crate::error::AppError;
use ::config::{Config, ConfigError, Environment};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;

/// Lowest port the server may bind to.
const MIN_PORT: u16 = 1024;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// SQLite database file.
    pub db_path: PathBuf,

    /// Address the HTTP server binds to.
    pub server_host: String,

    pub server_port: u16,

    /// Upper bound for the SQLite pool.
    pub db_max_connections: u32,

    /// Default `env_logger` filter when `RUST_LOG` is unset.
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("data/pr-reviewer.db"),
            server_host: "0.0.0.0".to_string(),
            server_port: 8080,
            db_max_connections: 5,
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, AppError> {
        Self::load(Environment::default())
    }

    /// Load configuration from an environment source layered over the defaults.
    pub fn load(env: Environment) -> Result<Self, AppError> {
        let defaults = Self::default();

        let config = Config::builder()
            .set_default("db_path", defaults.db_path.to_string_lossy().to_string())
            .map_err(config_err)?
            .set_default("server_host", defaults.server_host)
            .map_err(config_err)?
            .set_default("server_port", i64::from(defaults.server_port))
            .map_err(config_err)?
            .set_default("db_max_connections", i64::from(defaults.db_max_connections))
            .map_err(config_err)?
            .set_default("log_level", defaults.log_level)
            .map_err(config_err)?
            .add_source(env.ignore_empty(true))
            .build()
            .map_err(config_err)?;

        let config: Self = config.try_deserialize().map_err(config_err)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.server_port < MIN_PORT {
            return Err(AppError::invalid_input_field(
                format!("SERVER_PORT must be at least {}", MIN_PORT),
                "SERVER_PORT",
            ));
        }

        if self.db_max_connections == 0 {
            return Err(AppError::invalid_input_field(
                "DB_MAX_CONNECTIONS must be at least 1",
                "DB_MAX_CONNECTIONS",
            ));
        }

        if self.db_path.as_os_str().is_empty() {
            return Err(AppError::invalid_input_field("DB_PATH is empty", "DB_PATH"));
        }

        Ok(())
    }

    /// Socket address built from host and port.
    pub fn bind_addr(&self) -> Result<SocketAddr, AppError> {
        format!("{}:{}", self.server_host, self.server_port)
            .parse()
            .map_err(|_| {
                AppError::invalid_input_field(
                    format!("invalid SERVER_HOST {}", self.server_host),
                    "SERVER_HOST",
                )
            })
    }
}

/// Name the offending variable when a value fails to deserialize.
fn config_err(e: ConfigError) -> AppError {
    match &e {
        ConfigError::Type { key: Some(key), .. } => {
            let var = key.to_uppercase();
            AppError::invalid_input_field(format!("{} has an invalid value: {}", var, e), var)
        }
        _ => AppError::invalid_input(format!("configuration error: {}", e)),
    }
}
