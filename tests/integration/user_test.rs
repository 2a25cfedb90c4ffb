//! Integration tests for account and health endpoints.

use axum::http::StatusCode;
use serde_json::json;

use crate::helpers::TestApp;

#[tokio::test]
async fn test_health() {
    let app = TestApp::new().await;

    let response = app.request("GET", "/api/health", None, None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "ok");
    assert_eq!(response.body["database"], "memory");
    assert_eq!(response.body["storage"], "available");
}

#[tokio::test]
async fn test_profile_reports_quota() {
    let app = TestApp::new().await;
    let user = app.create_user("alice", 200).await;
    app.upload_one("a.bin", &[0u8; 50], user).await;

    let response = app.request("GET", "/api/users/me", None, Some(user)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["username"], "alice");
    assert_eq!(response.body["storage_quota"], 200);
    assert_eq!(response.body["storage_used"], 50);
    assert_eq!(response.body["storage_available"], 150);
    assert_eq!(response.body["usage_percent"], 25.0);
}

#[tokio::test]
async fn test_stats_counts_caller_content() {
    let app = TestApp::new().await;
    let alice = app.create_user("alice", 1_000).await;
    let bob = app.create_user("bob", 1_000).await;
    app.upload_one("a.txt", b"a", alice).await;
    app.upload_one("b.txt", b"b", alice).await;
    app.upload_one("c.txt", b"c", bob).await;
    app.request("POST", "/api/folders", Some(json!({ "name": "Docs" })), Some(alice))
        .await;

    let response = app.request("GET", "/api/stats", None, Some(alice)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["total_users"], 2);
    assert_eq!(response.body["total_files"], 2);
    assert_eq!(response.body["total_folders"], 1);
}
