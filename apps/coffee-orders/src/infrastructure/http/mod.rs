//! HTTP API
//!
//! axum router and server for the order endpoints, plus the health and
//! metrics endpoints on the same port.
//!
//! # Endpoints
//!
//! - `GET /` - Static hint
//! - `GET /coffeeorders` - All orders with time until the next sweep
//! - `GET /coffeeorders/{email}` - Orders for one email
//! - `POST /coffeeorders` - Create an order, returns all orders
//! - `PUT /coffeeorders/{email}` - Replace the email's newest order
//! - `DELETE /coffeeorders/{email}` - Delete the email's newest order
//! - `DELETE /coffeeorders` - Delete every order
//! - `GET /health`, `GET /healthz`, `GET /metrics` - Operational endpoints

mod error;
mod handlers;
mod response;

pub use error::ApiError;
pub use handlers::ROOT_HINT;
pub use response::{ErrorBody, OrderListResponse};

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use axum::extract::{MatchedPath, Request};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{MethodRouter, get};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use crate::application::ports::RecordStore;
use crate::application::services::OrderRepository;
use crate::domain::schedule::{Clock, format_duration, time_until_next_month};
use crate::infrastructure::health::{health_handler, liveness_handler, metrics_handler};
use crate::infrastructure::metrics;
use crate::infrastructure::sweep::SweepState;

// =============================================================================
// Application State
// =============================================================================

/// State shared by every handler.
pub struct AppState<S> {
    /// Order persistence.
    pub orders: Arc<OrderRepository<S>>,
    /// Time source for `timeUntilDeletion` and health reports.
    pub clock: Arc<dyn Clock>,
    /// Sweep history.
    pub sweep: Arc<SweepState>,
    /// Service version.
    pub version: Arc<str>,
    /// Process start.
    pub started_at: Instant,
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            orders: Arc::clone(&self.orders),
            clock: Arc::clone(&self.clock),
            sweep: Arc::clone(&self.sweep),
            version: Arc::clone(&self.version),
            started_at: self.started_at,
        }
    }
}

impl<S: RecordStore> AppState<S> {
    /// Create state reporting this crate's version.
    #[must_use]
    pub fn new(
        orders: Arc<OrderRepository<S>>,
        clock: Arc<dyn Clock>,
        sweep: Arc<SweepState>,
    ) -> Self {
        Self {
            orders,
            clock,
            sweep,
            version: Arc::from(env!("CARGO_PKG_VERSION")),
            started_at: Instant::now(),
        }
    }

    /// Go-style duration until the start of next month.
    #[must_use]
    pub fn time_until_deletion(&self) -> String {
        format_duration(time_until_next_month(&self.clock.now()))
    }
}

// =============================================================================
// Router
// =============================================================================

/// Build the service router.
pub fn create_router<S: RecordStore + 'static>(state: AppState<S>) -> Router {
    Router::new()
        .route("/", get(handlers::root_handler))
        .route("/coffeeorders", collection_routes::<S>())
        .route("/coffeeorders/", collection_routes::<S>())
        .route(
            "/coffeeorders/{email}",
            get(handlers::list_orders_by_email::<S>)
                .put(handlers::replace_order::<S>)
                .delete(handlers::delete_newest_order::<S>),
        )
        .route("/health", get(health_handler::<S>))
        .route("/healthz", get(liveness_handler))
        .route("/metrics", get(metrics_handler))
        .route_layer(middleware::from_fn(track_request_metrics))
        .with_state(state)
}

/// `/coffeeorders` handlers, also served with a trailing slash.
fn collection_routes<S: RecordStore + 'static>() -> MethodRouter<AppState<S>> {
    get(handlers::list_orders::<S>)
        .post(handlers::create_order::<S>)
        .delete(handlers::delete_all_orders::<S>)
}

async fn track_request_metrics(request: Request, next: Next) -> Response {
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path().to_string(), |p| p.as_str().to_string());

    let start = Instant::now();
    let response = next.run(request).await;
    metrics::record_request_duration(&route, start.elapsed());

    response
}

// =============================================================================
// Server
// =============================================================================

/// Order API HTTP server.
pub struct ApiServer<S> {
    port: u16,
    state: AppState<S>,
    cancel: CancellationToken,
}

impl<S: RecordStore + 'static> ApiServer<S> {
    /// Create a new API server.
    #[must_use]
    pub const fn new(port: u16, state: AppState<S>, cancel: CancellationToken) -> Self {
        Self {
            port,
            state,
            cancel,
        }
    }

    /// Run the server until cancelled, draining in-flight requests.
    ///
    /// # Errors
    ///
    /// Returns `ApiServerError` if binding fails or the HTTP server
    /// encounters a fatal error while running.
    pub async fn run(self) -> Result<(), ApiServerError> {
        let app = create_router(self.state);

        let addr = SocketAddr::from(([0, 0, 0, 0], self.port));
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ApiServerError::BindFailed(self.port, e.to_string()))?;

        tracing::info!(port = self.port, "Order API listening");

        axum::serve(listener, app)
            .with_graceful_shutdown(self.cancel.cancelled_owned())
            .await
            .map_err(|e| ApiServerError::ServerFailed(e.to_string()))?;

        tracing::info!("Order API stopped");
        Ok(())
    }
}

// =============================================================================
// Errors
// =============================================================================

/// API server errors.
#[derive(Debug, thiserror::Error)]
pub enum ApiServerError {
    /// Failed to bind to port.
    #[error("failed to bind to port {0}: {1}")]
    BindFailed(u16, String),

    /// Server error.
    #[error("server error: {0}")]
    ServerFailed(String),
}
