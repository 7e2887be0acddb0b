//! End-to-end tests for the presence endpoints.

use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::Value;
use uuid::Uuid;

use integration_tests::fixtures::{aged_session, cutoff_ms, heartbeat_body};
use integration_tests::setup::{FlakyContext, TestContext};

fn server(router: axum::Router) -> TestServer {
    TestServer::new(router).expect("Failed to create test server")
}

/// Heartbeat for evt-42 shows up in both counts, event <= total.
#[tokio::test]
async fn test_heartbeat_then_counts() {
    let ctx = TestContext::new();
    let server = server(ctx.router.clone());

    let session_id = Uuid::new_v4();
    let response = server
        .post("/presence/heartbeat")
        .json(&heartbeat_body(session_id, Some("evt-42")))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["success"], true);
    assert!(body["timestamp"].as_i64().is_some());

    let response = server
        .get("/presence/active")
        .add_query_param("event_id", "evt-42")
        .add_query_param("stale_before_ms", cutoff_ms(45))
        .await;
    response.assert_status_ok();

    let counts: Value = response.json();
    assert_eq!(counts["event_active"], 1);
    assert!(counts["total_active"].as_u64().unwrap() >= counts["event_active"].as_u64().unwrap());
}

/// A session off any event page counts toward the total only.
#[tokio::test]
async fn test_heartbeat_without_event() {
    let ctx = TestContext::new();
    let server = server(ctx.router.clone());

    server
        .post("/presence/heartbeat")
        .json(&heartbeat_body(Uuid::new_v4(), None))
        .await
        .assert_status_ok();

    let response = server
        .get("/presence/active")
        .add_query_param("event_id", "evt-42")
        .add_query_param("stale_before_ms", cutoff_ms(45))
        .await;
    let counts: Value = response.json();
    assert_eq!(counts["total_active"], 1);
    assert_eq!(counts["event_active"], 0);
}

/// Re-sending the same session id re-stamps instead of duplicating.
#[tokio::test]
async fn test_heartbeat_is_idempotent_per_session() {
    let ctx = TestContext::new();
    let server = server(ctx.router.clone());

    let session_id = Uuid::new_v4();
    for _ in 0..3 {
        server
            .post("/presence/heartbeat")
            .json(&heartbeat_body(session_id, Some("evt-42")))
            .await
            .assert_status_ok();
    }

    let response = server
        .get("/presence/active")
        .add_query_param("stale_before_ms", cutoff_ms(45))
        .await;
    let counts: Value = response.json();
    assert_eq!(counts["total_active"], 1);
}

/// Clean deregistration removes the session from both counts.
#[tokio::test]
async fn test_delete_session_decrements_counts() {
    let ctx = TestContext::new();
    let server = server(ctx.router.clone());

    let session_id = Uuid::new_v4();
    server
        .post("/presence/heartbeat")
        .json(&heartbeat_body(session_id, Some("evt-42")))
        .await
        .assert_status_ok();
    server
        .post("/presence/heartbeat")
        .json(&heartbeat_body(Uuid::new_v4(), Some("evt-42")))
        .await
        .assert_status_ok();

    let response = server
        .delete(&format!("/presence/sessions/{}", session_id))
        .await;
    response.assert_status(StatusCode::NO_CONTENT);

    let response = server
        .get("/presence/active")
        .add_query_param("event_id", "evt-42")
        .add_query_param("stale_before_ms", cutoff_ms(45))
        .await;
    let counts: Value = response.json();
    assert_eq!(counts["total_active"], 1);
    assert_eq!(counts["event_active"], 1);
}

/// Deleting an unknown session is a no-op, not an error.
#[tokio::test]
async fn test_delete_unknown_session_is_noop() {
    let ctx = TestContext::new();
    let server = server(ctx.router.clone());

    server
        .delete(&format!("/presence/sessions/{}", Uuid::new_v4()))
        .await
        .assert_status(StatusCode::NO_CONTENT);
}

/// Sessions older than the cutoff are invisible to counts and removed
/// by purge.
#[tokio::test]
async fn test_stale_sessions_excluded_and_purged() {
    let ctx = TestContext::new();
    let server = server(ctx.router.clone());

    use presence_store::PresenceStore;
    ctx.store
        .upsert_session(aged_session(Some("evt-42"), 300))
        .await
        .unwrap();
    server
        .post("/presence/heartbeat")
        .json(&heartbeat_body(Uuid::new_v4(), Some("evt-42")))
        .await
        .assert_status_ok();

    let response = server
        .get("/presence/active")
        .add_query_param("event_id", "evt-42")
        .add_query_param("stale_before_ms", cutoff_ms(45))
        .await;
    let counts: Value = response.json();
    assert_eq!(counts["total_active"], 1);
    assert_eq!(counts["event_active"], 1);

    let response = server
        .post("/presence/purge")
        .add_query_param("stale_before_ms", cutoff_ms(45))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["purged"], 1);
    assert_eq!(ctx.store.len(), 1);
}

/// The invariant holds for whatever mix of sessions exists.
#[tokio::test]
async fn test_event_count_never_exceeds_total() {
    let ctx = TestContext::new();
    let server = server(ctx.router.clone());

    for event in [Some("evt-1"), Some("evt-1"), Some("evt-2"), None] {
        server
            .post("/presence/heartbeat")
            .json(&heartbeat_body(Uuid::new_v4(), event))
            .await
            .assert_status_ok();
    }

    for event in ["evt-1", "evt-2", "evt-3"] {
        let response = server
            .get("/presence/active")
            .add_query_param("event_id", event)
            .add_query_param("stale_before_ms", cutoff_ms(45))
            .await;
        let counts: Value = response.json();
        let total = counts["total_active"].as_u64().unwrap();
        let scoped = counts["event_active"].as_u64().unwrap();
        assert_eq!(total, 4);
        assert!(scoped <= total);
    }
}

/// Default-cutoff reads are served from the count cache.
#[tokio::test]
async fn test_default_counts_are_cached() {
    let ctx = TestContext::new();
    let server = server(ctx.router.clone());

    server
        .post("/presence/heartbeat")
        .json(&heartbeat_body(Uuid::new_v4(), Some("evt-42")))
        .await
        .assert_status_ok();

    let first: Value = server
        .get("/presence/active")
        .add_query_param("event_id", "evt-42")
        .await
        .json();
    assert_eq!(first["event_active"], 1);

    // New heartbeat within the cache TTL is not visible yet
    server
        .post("/presence/heartbeat")
        .json(&heartbeat_body(Uuid::new_v4(), Some("evt-42")))
        .await
        .assert_status_ok();

    let second: Value = server
        .get("/presence/active")
        .add_query_param("event_id", "evt-42")
        .await
        .json();
    assert_eq!(second["event_active"], 1);

    // An explicit cutoff bypasses the cache
    let precise: Value = server
        .get("/presence/active")
        .add_query_param("event_id", "evt-42")
        .add_query_param("stale_before_ms", cutoff_ms(45))
        .await
        .json();
    assert_eq!(precise["event_active"], 2);
}

/// Validation failures are 400s with the engine's error codes.
#[tokio::test]
async fn test_validation_errors() {
    let ctx = TestContext::new();
    let server = server(ctx.router.clone());

    // Empty event id
    let response = server
        .post("/presence/heartbeat")
        .json(&heartbeat_body(Uuid::new_v4(), Some("")))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["code"], "VALID_002");

    // Oversized event id
    let long_id = "e".repeat(200);
    let response = server
        .get("/presence/active")
        .add_query_param("event_id", &long_id)
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    // Unparseable cutoff
    let response = server
        .get("/presence/active")
        .add_query_param("stale_before_ms", i64::MAX)
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    // Malformed session id
    let response = server
        .post("/presence/heartbeat")
        .json(&serde_json::json!({ "session_id": "not-a-uuid" }))
        .await;
    assert!(response.status_code().is_client_error());
}

/// Store failures surface as 500s with the store error code.
#[tokio::test]
async fn test_store_failures_are_coded_500s() {
    let ctx = FlakyContext::new();
    let server = server(ctx.router.clone());

    ctx.store.fail_upserts(true);
    let response = server
        .post("/presence/heartbeat")
        .json(&heartbeat_body(Uuid::new_v4(), Some("evt-42")))
        .await;
    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body["code"], "STORE_001");

    ctx.store.fail_upserts(false);
    ctx.store.fail_counts(true);
    let response = server
        .get("/presence/active")
        .add_query_param("stale_before_ms", cutoff_ms(45))
        .await;
    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);

    ctx.store.fail_counts(false);
    ctx.store.fail_deletes(true);
    let response = server
        .delete(&format!("/presence/sessions/{}", Uuid::new_v4()))
        .await;
    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
}
