//! Service Configuration Settings
//!
//! Configuration types for the order service, loaded from environment variables.

use std::path::PathBuf;

/// Record store backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreBackend {
    /// On-disk RocksDB directory.
    #[default]
    RocksDb,
    /// Process-local map, lost on exit.
    Memory,
}

impl StoreBackend {
    /// Parse backend from string.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` for anything other than
    /// `rocksdb` or `memory` (case-insensitive).
    pub fn parse(key: &str, value: &str) -> Result<Self, ConfigError> {
        match value.to_lowercase().as_str() {
            "rocksdb" => Ok(Self::RocksDb),
            "memory" => Ok(Self::Memory),
            _ => Err(ConfigError::InvalidValue {
                key: key.to_string(),
                value: value.to_string(),
            }),
        }
    }

    /// Get the backend name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::RocksDb => "rocksdb",
            Self::Memory => "memory",
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone)]
pub struct ServerSettings {
    /// API listen port.
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self { port: 3300 }
    }
}

/// Record store settings.
#[derive(Debug, Clone)]
pub struct StoreSettings {
    /// Which backend to open.
    pub backend: StoreBackend,
    /// RocksDB directory. Ignored by the memory backend.
    pub path: PathBuf,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            path: PathBuf::from("coffeeorders.db"),
        }
    }
}

/// Complete service configuration.
#[derive(Debug, Clone, Default)]
pub struct ServiceConfig {
    /// HTTP server settings.
    pub server: ServerSettings,
    /// Record store settings.
    pub store: StoreSettings,
}

impl ServiceConfig {
    /// Create configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set to an unparseable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set to an unparseable value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let port = match non_empty(&lookup, "COFFEE_ORDERS_PORT") {
            Some(value) => value.parse().map_err(|_| ConfigError::InvalidValue {
                key: "COFFEE_ORDERS_PORT".to_string(),
                value,
            })?,
            None => defaults.server.port,
        };

        let backend = match non_empty(&lookup, "COFFEE_STORE") {
            Some(value) => StoreBackend::parse("COFFEE_STORE", &value)?,
            None => defaults.store.backend,
        };

        let path = non_empty(&lookup, "COFFEE_ORDERS_DB_PATH")
            .map_or(defaults.store.path, PathBuf::from);

        Ok(Self {
            server: ServerSettings { port },
            store: StoreSettings { backend, path },
        })
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Environment variable has a value that cannot be parsed.
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue {
        /// Variable name.
        key: String,
        /// Offending value.
        value: String,
    },
}

fn non_empty(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    lookup(key).filter(|v| !v.trim().is_empty())
}
