//! Health Check and Metrics Endpoints
//!
//! Health checks, sweep status reporting, and Prometheus metrics.
//! Used by container orchestrators, load balancers, and monitoring systems.
//!
//! # Endpoints
//!
//! - `GET /health` - Returns JSON health status
//! - `GET /healthz` - Kubernetes liveness probe (simple OK)
//! - `GET /metrics` - Prometheus metrics in text format

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use chrono::{DateTime, Local};
use serde::Serialize;

use crate::application::ports::RecordStore;
use crate::infrastructure::http::AppState;
use crate::infrastructure::metrics::get_metrics_handle;
use crate::infrastructure::sweep::SweepStatus;

// =============================================================================
// Health Response Types
// =============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Overall status: "healthy", "degraded", or "unhealthy".
    pub status: HealthStatus,
    /// Service version.
    pub version: String,
    /// Server uptime in seconds.
    pub uptime_secs: u64,
    /// Current time from the service clock.
    pub current_time: DateTime<Local>,
    /// Monthly sweep history.
    pub sweep: SweepStatus,
    /// Go-style duration until the next sweep window.
    pub time_until_deletion: String,
}

/// Overall health status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// Store readable and the last sweep completed cleanly.
    Healthy,
    /// Store readable but the last sweep left records behind.
    Degraded,
    /// Store unreadable.
    Unhealthy,
}

// =============================================================================
// HTTP Handlers
// =============================================================================

/// `GET /health`
pub async fn health_handler<S: RecordStore>(
    State(state): State<AppState<S>>,
) -> impl IntoResponse {
    let response = build_health_response(&state);
    let status_code = match response.status {
        HealthStatus::Healthy | HealthStatus::Degraded => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };
    (status_code, Json(response))
}

/// `GET /healthz`
pub async fn liveness_handler() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// `GET /metrics`
pub async fn metrics_handler() -> impl IntoResponse {
    get_metrics_handle().map_or_else(
        || {
            (
                StatusCode::SERVICE_UNAVAILABLE,
                [("content-type", "text/plain")],
                "Metrics not initialized".to_string(),
            )
        },
        |handle| {
            let body = handle.render();
            (
                StatusCode::OK,
                [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
                body,
            )
        },
    )
}

fn build_health_response<S: RecordStore>(state: &AppState<S>) -> HealthResponse {
    let store_ok = match state.orders.probe() {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Store probe failed");
            false
        }
    };
    let sweep = state.sweep.snapshot();

    HealthResponse {
        status: determine_health_status(store_ok, &sweep),
        version: state.version.to_string(),
        uptime_secs: state.started_at.elapsed().as_secs(),
        current_time: state.clock.now(),
        sweep,
        time_until_deletion: state.time_until_deletion(),
    }
}

fn determine_health_status(store_ok: bool, sweep: &SweepStatus) -> HealthStatus {
    if !store_ok {
        return HealthStatus::Unhealthy;
    }

    match sweep.last_failed {
        Some(failed) if failed > 0 => HealthStatus::Degraded,
        _ => HealthStatus::Healthy,
    }
}

// =============================================================================
// Tests
// =============================================================================
