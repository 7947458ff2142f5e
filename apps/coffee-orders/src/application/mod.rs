//! Application Layer - Use cases and port definitions.
//!
//! This layer contains the order repository and the port interface it
//! drives to reach the underlying key-value store.

/// Port interfaces for external systems (record store).
pub mod ports;

/// Application services for order persistence.
pub mod services;
