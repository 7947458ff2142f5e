//! Coffee Orders Binary
//!
//! Starts the order API and the monthly sweep.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin coffee-orders
//! ```
//!
//! # Environment Variables
//!
//! - `COFFEE_ORDERS_PORT`: HTTP port (default: 3300)
//! - `COFFEE_ORDERS_DB_PATH`: RocksDB directory (default: coffeeorders.db)
//! - `COFFEE_STORE`: rocksdb | memory (default: rocksdb)
//! - `OTEL_ENABLED`: Enable OpenTelemetry (default: false)
//! - `OTEL_EXPORTER_OTLP_ENDPOINT`: OTLP endpoint (default: <http://localhost:4318>)
//! - `OTEL_SERVICE_NAME`: Service name (default: coffee-orders)
//! - `RUST_LOG`: Log level (default: info)

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use coffee_orders::infrastructure::telemetry;
use coffee_orders::{
    ApiServer, AppState, Clock, InMemoryStore, OrderRepository, RecordStore, RocksDbStore,
    ServiceConfig, StoreBackend, SweepConfig, SweepState, SweepTask, SystemClock, init_metrics,
};
use tokio::signal;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Graceful shutdown timeout.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv();

    // Initialize telemetry (OpenTelemetry + tracing)
    let _telemetry_guard = telemetry::init();

    tracing::info!("Starting coffee orders service");

    if let Err(e) = init_metrics() {
        tracing::warn!(error = %e, "Prometheus recorder not installed");
    }

    let config = ServiceConfig::from_env().context("invalid configuration")?;
    log_config(&config);

    match config.store.backend {
        StoreBackend::RocksDb => {
            let store = RocksDbStore::open(&config.store.path).inspect_err(|e| {
                tracing::error!(error = %e, "Failed to open order store");
            })?;
            run_service(Arc::new(store), config.server.port).await
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory order store, orders are lost on exit");
            run_service(Arc::new(InMemoryStore::new()), config.server.port).await
        }
    }
}

/// Wait for the sweep task to stop, logging a panic if it had one.
async fn join_sweep(handle: JoinHandle<()>) {
    if let Err(e) = handle.await {
        tracing::error!(error = %e, "Monthly sweep task failed");
    }
}

/// Wire the repository, sweep and API server over `store` and run until shutdown.
async fn run_service<S: RecordStore + 'static>(store: Arc<S>, port: u16) -> anyhow::Result<()> {
    let shutdown_token = CancellationToken::new();
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let orders = Arc::new(OrderRepository::new(store));
    let sweep_state = Arc::new(SweepState::new());

    let sweep = SweepTask::new(
        SweepConfig::default(),
        Arc::clone(&orders),
        Arc::clone(&clock),
        Arc::clone(&sweep_state),
        shutdown_token.clone(),
    );
    let sweep_handle = tokio::spawn(sweep.run());

    let state = AppState::new(orders, clock, sweep_state);
    let server = ApiServer::new(port, state, shutdown_token.clone());
    let mut server_handle = tokio::spawn(server.run());

    tracing::info!(port, "Coffee orders service ready");

    tokio::select! {
        () = await_shutdown(shutdown_token.clone()) => {}
        result = &mut server_handle => {
            // Server exited on its own, e.g. the port was taken
            shutdown_token.cancel();
            join_sweep(sweep_handle).await;
            result.context("API server task panicked")??;
            return Ok(());
        }
    }

    let drain = async {
        let server_result = server_handle.await;
        join_sweep(sweep_handle).await;
        server_result
    };

    match tokio::time::timeout(SHUTDOWN_TIMEOUT, drain).await {
        Ok(result) => result.context("API server task panicked")??,
        Err(_) => tracing::warn!(
            timeout_secs = SHUTDOWN_TIMEOUT.as_secs(),
            "Graceful shutdown timed out"
        ),
    }

    tracing::info!("Coffee orders service stopped");
    Ok(())
}

/// Load .env file from current or ancestor directories.
fn load_dotenv() {
    if dotenvy::dotenv().is_err() {
        load_dotenv_from_ancestors();
    }
}

/// Log the parsed configuration.
fn log_config(config: &ServiceConfig) {
    tracing::info!(
        port = config.server.port,
        store = config.store.backend.as_str(),
        db_path = %config.store.path.display(),
        "Configuration loaded"
    );
}

/// Load .env file from any ancestor directory.
fn load_dotenv_from_ancestors() {
    if let Ok(cwd) = std::env::current_dir() {
        let mut dir = cwd.as_path();
        while let Some(parent) = dir.parent() {
            let env_path = parent.join(".env");
            if env_path.exists() {
                let _ = dotenvy::from_path(&env_path);
                return;
            }
            dir = parent;
        }
    }
}

/// Wait for shutdown signal (SIGTERM or SIGINT).
async fn await_shutdown(shutdown_token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Ctrl+C handler unavailable");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "SIGTERM handler unavailable");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, initiating shutdown");
        }
    }

    shutdown_token.cancel();

    tracing::info!(
        timeout_secs = SHUTDOWN_TIMEOUT.as_secs(),
        "Graceful shutdown started"
    );
}
