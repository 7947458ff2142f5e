//! Monthly Sweep
//!
//! Background task that clears every order during the first hour of each
//! month.
//!
//! # Schedule
//!
//! The task checks the clock immediately and then once per check interval.
//! When the local time is inside the sweep window (day 1, hour 0) it deletes
//! all orders and sleeps a cool-down so the same window is not swept twice.
//! Missed windows are not caught up.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Local};
use parking_lot::RwLock;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::application::ports::RecordStore;
use crate::application::services::{OrderRepository, SweepOutcome};
use crate::domain::schedule::{Clock, in_sweep_window};
use crate::infrastructure::metrics::{self, DeleteReason};

/// Timing for the sweep loop.
#[derive(Debug, Clone)]
pub struct SweepConfig {
    /// How often the clock is checked.
    pub check_interval: Duration,
    /// Pause after a sweep, long enough to leave the window.
    pub cooldown: Duration,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            check_interval: Duration::from_secs(60),
            cooldown: Duration::from_secs(60 * 60),
        }
    }
}

impl SweepConfig {
    /// Create a configuration with custom timings.
    #[must_use]
    pub const fn new(check_interval: Duration, cooldown: Duration) -> Self {
        Self {
            check_interval,
            cooldown,
        }
    }
}

/// Sweep history shared with the health endpoint.
#[derive(Debug, Default)]
pub struct SweepState {
    runs: AtomicU64,
    last: RwLock<Option<(DateTime<Local>, SweepOutcome)>>,
}

/// Point-in-time view of [`SweepState`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SweepStatus {
    /// Completed sweeps since startup.
    pub runs: u64,
    /// When the last sweep ran.
    pub last_run: Option<DateTime<Local>>,
    /// Orders removed by the last sweep.
    pub last_deleted: Option<usize>,
    /// Orders the last sweep failed to remove.
    pub last_failed: Option<usize>,
}

impl SweepState {
    /// Create empty sweep state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a completed sweep.
    pub fn record(&self, at: DateTime<Local>, outcome: SweepOutcome) {
        self.runs.fetch_add(1, Ordering::Relaxed);
        *self.last.write() = Some((at, outcome));
    }

    /// Number of completed sweeps.
    #[must_use]
    pub fn runs(&self) -> u64 {
        self.runs.load(Ordering::Relaxed)
    }

    /// Snapshot for reporting.
    #[must_use]
    pub fn snapshot(&self) -> SweepStatus {
        let last = *self.last.read();
        SweepStatus {
            runs: self.runs(),
            last_run: last.map(|(at, _)| at),
            last_deleted: last.map(|(_, outcome)| outcome.deleted),
            last_failed: last.map(|(_, outcome)| outcome.failed),
        }
    }
}

/// Periodic task that empties the order store once a month.
pub struct SweepTask<S> {
    config: SweepConfig,
    orders: Arc<OrderRepository<S>>,
    clock: Arc<dyn Clock>,
    state: Arc<SweepState>,
    cancel: CancellationToken,
}

impl<S: RecordStore> SweepTask<S> {
    /// Create a new sweep task.
    #[must_use]
    pub fn new(
        config: SweepConfig,
        orders: Arc<OrderRepository<S>>,
        clock: Arc<dyn Clock>,
        state: Arc<SweepState>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            config,
            orders,
            clock,
            state,
            cancel,
        }
    }

    /// Run the sweep loop until cancelled.
    pub async fn run(self) {
        tracing::info!(
            check_interval_secs = self.config.check_interval.as_secs(),
            cooldown_secs = self.config.cooldown.as_secs(),
            "Monthly sweep started"
        );

        loop {
            if self.check_and_sweep() && !self.pause(self.config.cooldown).await {
                break;
            }
            if !self.pause(self.config.check_interval).await {
                break;
            }
        }

        tracing::info!("Monthly sweep stopped");
    }

    /// Sweep if the clock is inside the window.
    ///
    /// Returns `true` if the window was open and a sweep was attempted.
    pub fn check_and_sweep(&self) -> bool {
        let now = self.clock.now();
        if !in_sweep_window(&now) {
            return false;
        }

        tracing::info!(now = %now, "Monthly cleanup: deleting all coffee orders");

        match self.orders.delete_all() {
            Ok(outcome) => {
                self.state.record(now, outcome);
                metrics::record_orders_deleted(DeleteReason::Sweep, outcome.deleted as u64);
                metrics::record_sweep(outcome.failed as u64);
                tracing::info!(
                    deleted = outcome.deleted,
                    failed = outcome.failed,
                    "Monthly cleanup finished"
                );
            }
            Err(e) => {
                tracing::error!(error = %e, "Monthly cleanup failed");
            }
        }

        true
    }

    /// Sleep for `duration`. Returns `false` if cancelled first.
    async fn pause(&self, duration: Duration) -> bool {
        tokio::select! {
            () = self.cancel.cancelled() => {
                tracing::debug!("Monthly sweep cancelled");
                false
            }
            () = tokio::time::sleep(duration) => true,
        }
    }
}
