//! Infrastructure Layer - Adapters and external integrations.
//!
//! This layer contains the concrete implementations of the port interfaces
//! defined in the application layer, plus the HTTP surface and background
//! tasks.

/// Record store adapters (RocksDB, in-memory).
pub mod store;

/// Order API router and server.
pub mod http;

/// Monthly sweep background task.
pub mod sweep;

/// Configuration loading.
pub mod config;

/// Health check and metrics endpoints.
pub mod health;

/// Prometheus metrics instrumentation.
pub mod metrics;

/// OpenTelemetry tracing integration.
pub mod telemetry;
