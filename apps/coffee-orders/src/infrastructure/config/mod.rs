//! Configuration Module
//!
//! Configuration loading for the order service.

mod settings;

pub use settings::{ConfigError, ServerSettings, ServiceConfig, StoreBackend, StoreSettings};
