//! Tests for health check endpoints.

use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::Value;

use integration_tests::setup::TestContext;

/// Test /health endpoint returns proper structure
#[tokio::test]
async fn test_health_endpoint_structure() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let response = server.get("/health").await;
    response.assert_status_ok();

    let body: Value = response.json();

    assert!(
        body.get("status").is_some(),
        "Response should have 'status' field"
    );
    assert!(
        body.get("store_connected").is_some(),
        "Response should have 'store_connected' field"
    );
    assert!(
        body.get("total_active").is_some(),
        "Response should have 'total_active' field"
    );

    // The memory store is always reachable
    assert_eq!(body["store_connected"], true);

    let status = body["status"].as_str().unwrap_or("");
    assert!(
        status == "healthy" || status == "unhealthy",
        "Status should be 'healthy' or 'unhealthy', got '{}'",
        status
    );
}

/// Test /health/ready endpoint
#[tokio::test]
async fn test_ready_endpoint() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let response = server.get("/health/ready").await;

    // Ready endpoint returns 200 if ready, 503 if the global registry has
    // not been marked healthy yet
    let status = response.status_code();
    assert!(
        status == StatusCode::OK || status == StatusCode::SERVICE_UNAVAILABLE,
        "Ready endpoint should return 200 or 503, got {}",
        status
    );
}

/// Test /health/live endpoint always returns 200 when service is running
#[tokio::test]
async fn test_live_endpoint() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let response = server.get("/health/live").await;
    response.assert_status_ok();
}

/// Test total_active field is a valid number
#[tokio::test]
async fn test_health_total_active_is_number() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let response = server.get("/health").await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert!(
        body["total_active"].as_u64().is_some(),
        "total_active should be a valid u64 number"
    );
}
