//! Prometheus Metrics Module
//!
//! Exposes application metrics via Prometheus format for monitoring.
//!
//! # Metrics Categories
//!
//! - **Orders**: Orders created and deleted, by delete reason
//! - **Sweeps**: Monthly sweep runs and per-record failures
//! - **Latency**: Request duration by matched route
//!
//! # Integration
//!
//! Metrics are exposed at `/metrics` on the API port.

use std::sync::OnceLock;
use std::time::Duration;

use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

// =============================================================================
// Global Metrics Handle
// =============================================================================

static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Initialize the Prometheus metrics recorder.
///
/// Later calls return the handle installed by the first.
///
/// # Errors
///
/// Returns `BuildError` if the global recorder cannot be installed.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    if let Some(handle) = PROMETHEUS_HANDLE.get() {
        return Ok(handle.clone());
    }

    let handle = PrometheusBuilder::new().install_recorder()?;
    register_metrics();

    Ok(PROMETHEUS_HANDLE.get_or_init(|| handle).clone())
}

/// Get the Prometheus handle for rendering metrics.
///
/// Returns `None` if metrics have not been initialized.
#[must_use]
pub fn get_metrics_handle() -> Option<PrometheusHandle> {
    PROMETHEUS_HANDLE.get().cloned()
}

// =============================================================================
// Metric Registration
// =============================================================================

fn register_metrics() {
    describe_counter!(
        "coffee_orders_created_total",
        "Total orders created, including replacements"
    );
    describe_counter!(
        "coffee_orders_deleted_total",
        "Total orders deleted by reason"
    );

    describe_counter!(
        "coffee_orders_sweeps_total",
        "Total monthly sweeps executed"
    );
    describe_counter!(
        "coffee_orders_sweep_failures_total",
        "Total records a sweep failed to delete"
    );

    describe_histogram!(
        "coffee_orders_request_duration_seconds",
        "HTTP request duration by matched route"
    );
}

// =============================================================================
// Metric Recording Functions
// =============================================================================

/// Why an order was deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteReason {
    /// `DELETE /coffeeorders/{email}`.
    Newest,
    /// Removed as part of a `PUT`.
    Replace,
    /// `DELETE /coffeeorders`.
    Bulk,
    /// Monthly sweep.
    Sweep,
}

impl DeleteReason {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Newest => "newest",
            Self::Replace => "replace",
            Self::Bulk => "bulk",
            Self::Sweep => "sweep",
        }
    }
}

/// Record a newly stored order.
pub fn record_order_created() {
    counter!("coffee_orders_created_total").increment(1);
}

/// Record deleted orders.
pub fn record_orders_deleted(reason: DeleteReason, count: u64) {
    counter!(
        "coffee_orders_deleted_total",
        "reason" => reason.as_str()
    )
    .increment(count);
}

/// Record a completed sweep and the records it failed to delete.
pub fn record_sweep(failed: u64) {
    counter!("coffee_orders_sweeps_total").increment(1);
    if failed > 0 {
        counter!("coffee_orders_sweep_failures_total").increment(failed);
    }
}

/// Record an HTTP request duration.
pub fn record_request_duration(route: &str, duration: Duration) {
    histogram!(
        "coffee_orders_request_duration_seconds",
        "route" => route.to_string()
    )
    .record(duration.as_secs_f64());
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delete_reason_as_str() {
        assert_eq!(DeleteReason::Newest.as_str(), "newest");
        assert_eq!(DeleteReason::Replace.as_str(), "replace");
        assert_eq!(DeleteReason::Bulk.as_str(), "bulk");
        assert_eq!(DeleteReason::Sweep.as_str(), "sweep");
    }

    #[test]
    fn recording_without_recorder_is_noop() {
        record_order_created();
        record_orders_deleted(DeleteReason::Bulk, 3);
        record_sweep(1);
        record_request_duration("/coffeeorders", Duration::from_millis(5));
    }
}
