//! Monthly Sweep Integration Tests
//!
//! Runs the sweep loop against a RocksDB store and checks what the API
//! reports before and after the window opens.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use chrono::{DateTime, Local, TimeZone};
use serde_json::Value;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

use coffee_orders::{
    AppState, Clock, FixedClock, OrderDraft, OrderRepository, RecordStore, RocksDbStore,
    SweepConfig, SweepState, SweepTask, create_router,
};

fn local(month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Local> {
    Local
        .with_ymd_and_hms(2025, month, day, hour, minute, 0)
        .earliest()
        .unwrap()
}

async fn get_json(router: &Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn draft(email: &str) -> OrderDraft {
    OrderDraft {
        coffee: "latte".to_string(),
        email_address: email.to_string(),
        ..OrderDraft::default()
    }
}

async fn wait_for_runs(state: &SweepState, runs: u64) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while state.runs() < runs && tokio::time::Instant::now() < deadline {
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

#[tokio::test]
async fn sweep_clears_orders_when_month_turns() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(RocksDbStore::open(dir.path()).unwrap());
    store.put(b"settings:theme", b"dark").unwrap();

    let orders = Arc::new(OrderRepository::new(Arc::clone(&store)));
    orders.insert(draft("a@x.com")).unwrap();
    orders.insert(draft("b@x.com")).unwrap();

    let fixed = Arc::new(FixedClock::new(local(1, 31, 23, 58)));
    let clock: Arc<dyn Clock> = fixed.clone();
    let sweep_state = Arc::new(SweepState::new());
    let cancel = CancellationToken::new();

    let task = SweepTask::new(
        SweepConfig::new(Duration::from_millis(10), Duration::from_secs(60)),
        Arc::clone(&orders),
        Arc::clone(&clock),
        Arc::clone(&sweep_state),
        cancel.clone(),
    );
    let handle = tokio::spawn(task.run());

    let router = create_router(AppState::new(
        Arc::clone(&orders),
        clock,
        Arc::clone(&sweep_state),
    ));

    // Before the window
    let (_, body) = get_json(&router, "/coffeeorders").await;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
    assert_eq!(body["timeUntilDeletion"], "2m0s");

    // Month turns
    fixed.set(local(2, 1, 0, 0));
    wait_for_runs(&sweep_state, 1).await;

    let (_, body) = get_json(&router, "/coffeeorders").await;
    assert_eq!(body["data"], serde_json::json!([]));

    let (status, health) = get_json(&router, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(health["sweep"]["runs"], 1);
    assert_eq!(health["sweep"]["last_deleted"], 2);
    assert_eq!(health["sweep"]["last_failed"], 0);

    // Records outside the order prefix are untouched
    assert_eq!(store.get(b"settings:theme").unwrap(), Some(b"dark".to_vec()));

    // Cool-down keeps a second sweep from running in the same window
    orders.insert(draft("c@x.com")).unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(sweep_state.runs(), 1);
    assert_eq!(orders.list_all().unwrap().len(), 1);

    cancel.cancel();
    timeout(Duration::from_millis(500), handle)
        .await
        .expect("sweep should stop on cancellation")
        .unwrap();
}

#[tokio::test]
async fn starting_inside_window_sweeps_immediately() {
    let dir = tempfile::tempdir().unwrap();
    let orders = Arc::new(OrderRepository::new(Arc::new(
        RocksDbStore::open(dir.path()).unwrap(),
    )));
    orders.insert(draft("a@x.com")).unwrap();

    let sweep_state = Arc::new(SweepState::new());
    let cancel = CancellationToken::new();
    let task = SweepTask::new(
        SweepConfig::default(),
        Arc::clone(&orders),
        Arc::new(FixedClock::new(local(3, 1, 0, 45))),
        Arc::clone(&sweep_state),
        cancel.clone(),
    );
    let handle = tokio::spawn(task.run());

    wait_for_runs(&sweep_state, 1).await;
    assert!(orders.list_all().unwrap().is_empty());

    cancel.cancel();
    timeout(Duration::from_millis(500), handle)
        .await
        .expect("sweep should stop during cool-down")
        .unwrap();
}

#[tokio::test]
async fn no_sweep_outside_window() {
    let dir = tempfile::tempdir().unwrap();
    let orders = Arc::new(OrderRepository::new(Arc::new(
        RocksDbStore::open(dir.path()).unwrap(),
    )));
    orders.insert(draft("a@x.com")).unwrap();

    let sweep_state = Arc::new(SweepState::new());
    let cancel = CancellationToken::new();
    let task = SweepTask::new(
        SweepConfig::new(Duration::from_millis(10), Duration::from_secs(60)),
        Arc::clone(&orders),
        Arc::new(FixedClock::new(local(3, 1, 1, 0))),
        Arc::clone(&sweep_state),
        cancel.clone(),
    );
    let handle = tokio::spawn(task.run());

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(sweep_state.runs(), 0);
    assert_eq!(orders.list_all().unwrap().len(), 1);

    cancel.cancel();
    handle.await.unwrap();
}
