#![allow(clippy::unwrap_used)]
// Integration tests for `SyncEngine` against a wiremock hub.
//
// Timing-sensitive tests use short poll intervals and generous waits;
// state transitions are observed through the watch channel rather than
// by sleeping for exact tick boundaries.

use std::time::Duration;

use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::json;
use tokio::sync::watch;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use hearth_api::HubClient;
use hearth_core::{EngineConfig, EntityRepository, SyncEngine, SyncState};

// ── Helpers ─────────────────────────────────────────────────────────

fn engine_with(server: &MockServer, poll_interval: Duration) -> SyncEngine {
    let client = HubClient::new(&server.uri(), &SecretString::from("test-token".to_string())).unwrap();
    SyncEngine::new(
        EntityRepository::new(client),
        EngineConfig { poll_interval },
    )
}

/// One-shot engine: no background loop.
fn oneshot_engine(server: &MockServer) -> SyncEngine {
    engine_with(server, Duration::ZERO)
}

fn switch_payload(state: &str) -> serde_json::Value {
    json!([{"entity_id": "switch.outdoor_light", "state": state, "attributes": {}}])
}

/// Await state snapshots until `pred` holds or the timeout elapses.
async fn wait_for(
    rx: &mut watch::Receiver<SyncState>,
    pred: impl Fn(&SyncState) -> bool,
) -> SyncState {
    let deadline = Duration::from_secs(5);
    tokio::time::timeout(deadline, async {
        loop {
            if pred(&rx.borrow()) {
                return rx.borrow().clone();
            }
            rx.changed().await.expect("engine dropped");
        }
    })
    .await
    .expect("condition not reached before timeout")
}

// ── Initial state ───────────────────────────────────────────────────

#[tokio::test]
async fn test_engine_starts_idle() {
    let server = MockServer::start().await;
    let engine = oneshot_engine(&server);

    let state = engine.state();
    assert!(!state.is_loading);
    assert!(state.entities.is_empty());
    assert!(state.error.is_none());
    assert!(!state.is_connected);
}

// ── Refresh ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_refresh_populates_state() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/states"))
        .respond_with(ResponseTemplate::new(200).set_body_json(switch_payload("off")))
        .mount(&server)
        .await;

    let engine = oneshot_engine(&server);
    engine.refresh(true).await;

    let state = engine.state();
    assert!(!state.is_loading);
    assert!(state.is_connected);
    assert!(state.error.is_none());
    assert_eq!(state.entities.len(), 1);
    assert_eq!(state.entities[0].name(), "Outdoor light");
    assert_eq!(state.entities[0].is_on(), Some(false));
}

#[tokio::test]
async fn test_refresh_is_idempotent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/states"))
        .respond_with(ResponseTemplate::new(200).set_body_json(switch_payload("on")))
        .mount(&server)
        .await;

    let engine = oneshot_engine(&server);
    engine.refresh(true).await;
    let first = engine.state();
    engine.refresh(true).await;
    let second = engine.state();

    assert_eq!(first, second);
    assert!(second.is_connected);
}

#[tokio::test]
async fn test_user_refresh_raises_loading_flag() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/states"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(switch_payload("on"))
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&server)
        .await;

    let engine = oneshot_engine(&server);
    let bg = {
        let engine = engine.clone();
        tokio::spawn(async move { engine.refresh(true).await })
    };

    // Mid-flight: spinner visible, no stale error.
    tokio::time::sleep(Duration::from_millis(100)).await;
    let mid = engine.state();
    assert!(mid.is_loading);
    assert!(mid.error.is_none());

    bg.await.unwrap();
    assert!(!engine.state().is_loading);
}

#[tokio::test]
async fn test_failed_refresh_keeps_stale_entities() {
    let server = MockServer::start().await;
    // First fetch succeeds, everything after fails.
    Mock::given(method("GET"))
        .and(path("/api/states"))
        .respond_with(ResponseTemplate::new(200).set_body_json(switch_payload("on")))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/states"))
        .respond_with(ResponseTemplate::new(500).set_body_string("db locked"))
        .mount(&server)
        .await;

    let engine = oneshot_engine(&server);
    engine.refresh(true).await;
    let before = engine.state();
    assert!(before.is_connected);

    engine.refresh(false).await;
    let after = engine.state();

    assert_eq!(after.entities, before.entities, "entities must stay stale-but-present");
    assert!(!after.is_connected);
    assert!(after.error.as_deref().unwrap().contains("500"));
    assert!(!after.is_loading);
}

// ── Command dispatch & reconciliation ───────────────────────────────

#[tokio::test]
async fn test_toggle_reconciles_to_server_truth() {
    let server = MockServer::start().await;
    // Initial refresh sees "off"; after the toggle the hub reports "on".
    Mock::given(method("GET"))
        .and(path("/api/states"))
        .respond_with(ResponseTemplate::new(200).set_body_json(switch_payload("off")))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/states"))
        .respond_with(ResponseTemplate::new(200).set_body_json(switch_payload("on")))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/services/switch/toggle"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let engine = oneshot_engine(&server);
    engine.refresh(true).await;
    assert_eq!(engine.state().entities[0].is_on(), Some(false));

    let bg = {
        let engine = engine.clone();
        tokio::spawn(async move { engine.toggle_entity("switch.outdoor_light").await })
    };

    // During the settle delay there is no optimistic local flip.
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(engine.state().entities[0].is_on(), Some(false));

    bg.await.unwrap();
    let state = engine.state();
    assert_eq!(state.entities[0].is_on(), Some(true));
    assert!(state.is_connected);
    assert!(state.error.is_none());
}

#[tokio::test]
async fn test_failed_toggle_keeps_entities_and_connectivity() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/states"))
        .respond_with(ResponseTemplate::new(200).set_body_json(switch_payload("off")))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/services/switch/toggle"))
        .respond_with(ResponseTemplate::new(500).set_body_string("relay jammed"))
        .mount(&server)
        .await;

    let engine = oneshot_engine(&server);
    engine.refresh(true).await;
    let before = engine.state();

    engine.toggle_entity("switch.outdoor_light").await;
    let after = engine.state();

    assert_eq!(after.entities, before.entities);
    // A failed write is reported distinctly from a failed read.
    assert!(after.is_connected);
    let error = after.error.unwrap();
    assert!(error.contains("toggle"), "got: {error}");
    assert!(error.contains("switch.outdoor_light"), "got: {error}");
}

// ── Periodic loop ───────────────────────────────────────────────────

#[tokio::test]
async fn test_periodic_tick_refreshes_through_failures() {
    let server = MockServer::start().await;
    // Initial load ok, first tick fails, later ticks see a new state.
    Mock::given(method("GET"))
        .and(path("/api/states"))
        .respond_with(ResponseTemplate::new(200).set_body_json(switch_payload("off")))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/states"))
        .respond_with(ResponseTemplate::new(502))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/states"))
        .respond_with(ResponseTemplate::new(200).set_body_json(switch_payload("on")))
        .mount(&server)
        .await;

    let engine = engine_with(&server, Duration::from_millis(200));
    let mut rx = engine.subscribe();
    engine.start().await;
    assert!(engine.state().is_connected);

    // The failing tick flips connectivity without clearing entities...
    let disconnected = wait_for(&mut rx, |s| !s.is_connected && !s.entities.is_empty()).await;
    assert_eq!(disconnected.entities[0].is_on(), Some(false));
    assert!(disconnected.error.is_some());

    // ...and the loop keeps ticking: the next success reconnects.
    let reconnected = wait_for(&mut rx, |s| s.is_connected).await;
    assert_eq!(reconnected.entities[0].is_on(), Some(true));
    assert!(reconnected.error.is_none());

    engine.shutdown().await;
}

#[tokio::test]
async fn test_shutdown_stops_ticks() {
    let server = MockServer::start().await;
    // Any tick after the initial load would observe a changed payload
    // and publish — so silence proves the loop stopped.
    Mock::given(method("GET"))
        .and(path("/api/states"))
        .respond_with(ResponseTemplate::new(200).set_body_json(switch_payload("on")))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/states"))
        .respond_with(ResponseTemplate::new(200).set_body_json(switch_payload("off")))
        .mount(&server)
        .await;

    let engine = engine_with(&server, Duration::from_millis(200));
    engine.start().await;
    engine.shutdown().await;

    let mut rx = engine.subscribe();
    rx.mark_unchanged();

    // Several would-be tick periods pass with no published mutation.
    tokio::time::sleep(Duration::from_millis(500)).await;
    assert!(!rx.has_changed().unwrap());
    assert_eq!(engine.state().entities[0].is_on(), Some(true));
}

#[tokio::test]
async fn test_refresh_in_flight_at_shutdown_is_discarded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/states"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(switch_payload("on"))
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&server)
        .await;

    let engine = oneshot_engine(&server);
    let bg = {
        let engine = engine.clone();
        tokio::spawn(async move { engine.refresh(false).await })
    };

    tokio::time::sleep(Duration::from_millis(50)).await;
    engine.shutdown().await;

    // The in-flight refresh completes without crashing and without
    // mutating the disposed engine's state.
    bg.await.unwrap();
    let state = engine.state();
    assert!(state.entities.is_empty());
    assert!(!state.is_connected);
}
