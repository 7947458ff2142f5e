#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::significant_drop_tightening,
        clippy::too_many_lines,
        clippy::needless_pass_by_value,
        clippy::items_after_statements
    )
)]

//! Coffee Orders - CRUD Service with Monthly Sweep
//!
//! An HTTP service that stores coffee orders in an embedded ordered
//! key-value store, looks them up by email address, and clears every order
//! during the first hour of each month.
//!
//! # Layers (inside → outside)
//!
//! - **Domain**: Core types and calendar rules
//!   - `order`: Coffee orders, drafts and time-ordered ids
//!   - `schedule`: Clock abstraction, sweep window, Go-style durations
//!
//! - **Application**: Use cases and port definitions
//!   - `ports`: The `RecordStore` interface
//!   - `services`: `OrderRepository` key scheme and queries
//!
//! - **Infrastructure**: Adapters and external integrations
//!   - `store`: RocksDB and in-memory record stores
//!   - `http`: axum router and server
//!   - `sweep`: Monthly sweep task
//!   - `config`: Environment configuration
//!   - `health`: Health and metrics endpoints
//!
//! # Data Flow
//!
//! ```text
//!               ┌─────────────┐     ┌─────────────────┐     ┌─────────────┐
//! Client ──────►│  axum API   │────►│ OrderRepository │────►│ RecordStore │
//!               └─────────────┘     └─────────────────┘     └─────────────┘
//!                                          ▲
//!               ┌─────────────┐            │
//! Clock ───────►│  SweepTask  │────────────┘
//!               └─────────────┘
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

// =============================================================================
// Module Declarations
// =============================================================================

/// Domain layer - Order types and schedule rules with no I/O.
pub mod domain;

/// Application layer - Use cases and port definitions.
pub mod application;

/// Infrastructure layer - Adapters and external integrations.
pub mod infrastructure;

// =============================================================================
// Re-exports
// =============================================================================

// Domain types
pub use domain::order::{CoffeeOrder, OrderDraft, OrderId, OrderIdError, OrderIdGenerator};
pub use domain::schedule::{
    Clock, FixedClock, SystemClock, format_duration, in_sweep_window, time_until_next_month,
};

// Ports and services
pub use application::ports::{RecordStore, StoreError};
pub use application::services::{
    ORDER_KEY_PREFIX, OrderRepository, Replacement, RepositoryError, SweepOutcome, order_key,
};

// Store adapters
pub use infrastructure::store::{InMemoryStore, RocksDbStore};

// Infrastructure config
pub use infrastructure::config::{
    ConfigError, ServerSettings, ServiceConfig, StoreBackend, StoreSettings,
};

// HTTP API
pub use infrastructure::http::{ApiError, ApiServer, ApiServerError, AppState, create_router};

// Health
pub use infrastructure::health::{HealthResponse, HealthStatus};

// Sweep
pub use infrastructure::sweep::{SweepConfig, SweepState, SweepStatus, SweepTask};

// Metrics
pub use infrastructure::metrics::{DeleteReason, init_metrics};

// Telemetry
pub use infrastructure::telemetry::{TelemetryConfig, TelemetryGuard, init as init_telemetry};
