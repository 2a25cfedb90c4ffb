//! Integration tests for file operations.

use axum::http::{StatusCode, header};
use serde_json::json;

use crate::helpers::TestApp;

#[tokio::test]
async fn test_missing_identity_is_unauthorized() {
    let app = TestApp::new().await;

    let response = app.request("GET", "/api/files", None, None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    let response = app.request("GET", "/api/files", None, Some(404)).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["error"], "AUTHENTICATION");
}

#[tokio::test]
async fn test_upload_then_duplicate() {
    let app = TestApp::new().await;
    let user = app.create_user("alice", 1_000).await;

    let first = app
        .upload("/api/files/upload", "file", &[("notes.txt", b"hello")], None, user)
        .await;
    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(first.body["filename"], "notes.txt");
    assert_eq!(first.body["file_size"], 5);
    assert_eq!(first.body["message"], "File uploaded successfully");

    let second = app
        .upload("/api/files/upload", "file", &[("copy.txt", b"hello")], None, user)
        .await;
    assert_eq!(second.status, StatusCode::OK);
    assert_eq!(second.body["file_id"], first.body["file_id"]);
    assert_eq!(second.body["message"], "File already exists (duplicate detected)");

    assert_eq!(app.storage_used(user).await, 5);
}

#[tokio::test]
async fn test_upload_limits() {
    let app = TestApp::with_max_file_size(8).await;
    let user = app.create_user("alice", 10).await;

    let too_big = app
        .upload("/api/files/upload", "file", &[("big.bin", b"123456789")], None, user)
        .await;
    assert_eq!(too_big.status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(
        too_big.body["detail"],
        "File size exceeds maximum allowed size of 8 bytes"
    );

    app.upload_one("a.bin", b"1234567", user).await;
    let over_quota = app
        .upload("/api/files/upload", "file", &[("b.bin", b"abcdefgh")], None, user)
        .await;
    assert_eq!(over_quota.status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(over_quota.body["error"], "QUOTA_EXCEEDED");
    assert_eq!(app.storage_used(user).await, 7);
}

#[tokio::test]
async fn test_upload_into_unknown_folder() {
    let app = TestApp::new().await;
    let user = app.create_user("alice", 1_000).await;

    let response = app
        .upload("/api/files/upload", "file", &[("a.txt", b"x")], Some(77), user)
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["detail"], "Folder not found");
}

#[tokio::test]
async fn test_upload_without_file_part() {
    let app = TestApp::new().await;
    let user = app.create_user("alice", 1_000).await;

    let response = app
        .upload("/api/files/upload", "file", &[], Some(1), user)
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_bulk_upload_report() {
    let app = TestApp::with_max_file_size(4).await;
    let user = app.create_user("alice", 100).await;
    app.upload_one("existing.txt", b"dup", user).await;

    let response = app
        .upload(
            "/api/files/upload/multiple",
            "files",
            &[
                ("one.txt", b"1111"),
                ("again.txt", b"dup"),
                ("huge.txt", b"12345"),
                ("two.txt", b"22"),
            ],
            None,
            user,
        )
        .await;

    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    assert_eq!(response.body["total_files"], 4);
    assert_eq!(response.body["total_size"], 6);
    assert_eq!(response.body["successful_uploads"].as_array().unwrap().len(), 3);

    let failed = response.body["failed_uploads"].as_array().unwrap();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0]["filename"], "huge.txt");
    assert!(failed[0]["error"].as_str().unwrap().contains("maximum allowed size"));

    assert_eq!(app.storage_used(user).await, 9);
}

#[tokio::test]
async fn test_bulk_upload_aggregate_quota() {
    let app = TestApp::new().await;
    let user = app.create_user("alice", 5).await;

    let response = app
        .upload(
            "/api/files/upload/multiple",
            "files",
            &[("a.txt", b"123"), ("b.txt", b"456")],
            None,
            user,
        )
        .await;

    assert_eq!(response.status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(response.body["detail"], "Storage quota would be exceeded");
    assert_eq!(app.storage_used(user).await, 0);
}

#[tokio::test]
async fn test_bulk_upload_reports_item_beyond_request_limit() {
    let app = TestApp::with_max_file_size(1024).await;
    let user = app.create_user("alice", 10 * 1024 * 1024).await;
    let big = vec![b'x'; 2 * 1024 * 1024];

    let response = app
        .upload(
            "/api/files/upload/multiple",
            "files",
            &[("small.txt", b"ok"), ("big.bin", &big)],
            None,
            user,
        )
        .await;

    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    assert_eq!(response.body["successful_uploads"].as_array().unwrap().len(), 1);
    let failed = response.body["failed_uploads"].as_array().unwrap();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0]["filename"], "big.bin");
    assert_eq!(app.storage_used(user).await, 2);
}

#[tokio::test]
async fn test_bulk_upload_total_may_exceed_single_file_limit() {
    let app = TestApp::with_max_file_size(1024 * 1024).await;
    let user = app.create_user("alice", 10 * 1024 * 1024).await;
    let item = 800 * 1024;
    let (a, b, c) = (vec![b'a'; item], vec![b'b'; item], vec![b'c'; item]);

    let response = app
        .upload(
            "/api/files/upload/multiple",
            "files",
            &[("a.bin", &a), ("b.bin", &b), ("c.bin", &c)],
            None,
            user,
        )
        .await;

    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    assert_eq!(response.body["successful_uploads"].as_array().unwrap().len(), 3);
    assert_eq!(response.body["total_size"], 3 * item as i64);
    assert_eq!(app.storage_used(user).await, 3 * item as i64);
}

#[tokio::test]
async fn test_single_upload_body_stays_capped() {
    let app = TestApp::with_max_file_size(1024).await;
    let user = app.create_user("alice", 10 * 1024 * 1024).await;
    let big = vec![b'x'; 2 * 1024 * 1024];

    let response = app
        .upload("/api/files/upload", "file", &[("big.bin", &big)], None, user)
        .await;

    assert_eq!(response.status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(app.storage_used(user).await, 0);
}

#[tokio::test]
async fn test_download_streams_bytes_with_headers() {
    let app = TestApp::new().await;
    let user = app.create_user("alice", 1_000).await;
    let id = app.upload_one("report.pdf", b"%PDF-1.7 body", user).await;

    let (status, headers, bytes) = app
        .get_raw(&format!("/api/files/{id}/download"), user)
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(bytes, b"%PDF-1.7 body");
    assert_eq!(
        headers[header::CONTENT_DISPOSITION],
        "attachment; filename=\"report.pdf\""
    );
    assert_eq!(headers[header::CONTENT_LENGTH], "13");
    assert!(headers.contains_key(header::CONTENT_TYPE));
}

#[tokio::test]
async fn test_files_are_private_to_owner() {
    let app = TestApp::new().await;
    let alice = app.create_user("alice", 1_000).await;
    let bob = app.create_user("bob", 1_000).await;
    let id = app.upload_one("secret.txt", b"s3cr3t", alice).await;

    for path in [format!("/api/files/{id}"), format!("/api/files/{id}/download")] {
        let response = app.request("GET", &path, None, Some(bob)).await;
        assert_eq!(response.status, StatusCode::NOT_FOUND);
    }
    let response = app
        .request("DELETE", &format!("/api/files/{id}"), None, Some(bob))
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_get_sets_last_accessed() {
    let app = TestApp::new().await;
    let user = app.create_user("alice", 1_000).await;
    let id = app.upload_one("a.txt", b"abc", user).await;

    let response = app
        .request("GET", &format!("/api/files/{id}"), None, Some(user))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(!response.body["last_accessed"].is_null());
}

#[tokio::test]
async fn test_update_and_delete_flow() {
    let app = TestApp::new().await;
    let user = app.create_user("alice", 1_000).await;
    let id = app.upload_one("draft.txt", b"abcdef", user).await;
    let folder = app
        .request("POST", "/api/folders", Some(json!({ "name": "Docs" })), Some(user))
        .await;
    let folder_id = folder.body["id"].as_i64().unwrap();

    let updated = app
        .request(
            "PUT",
            &format!("/api/files/{id}"),
            Some(json!({
                "filename": "final.txt",
                "folder_id": folder_id,
                "is_public": true,
                "description": "quarterly numbers",
                "tags": ["finance"]
            })),
            Some(user),
        )
        .await;
    assert_eq!(updated.status, StatusCode::OK, "{:?}", updated.body);
    assert_eq!(updated.body["original_filename"], "final.txt");
    assert_eq!(updated.body["folder_id"], folder_id);
    assert_eq!(updated.body["is_public"], true);

    let listed = app
        .request("GET", &format!("/api/files?folder_id={folder_id}"), None, Some(user))
        .await;
    assert_eq!(listed.body.as_array().unwrap().len(), 1);

    let moved = app
        .request("PUT", &format!("/api/files/{id}"), Some(json!({ "folder_id": 0 })), Some(user))
        .await;
    assert!(moved.body["folder_id"].is_null());

    let deleted = app
        .request("DELETE", &format!("/api/files/{id}"), None, Some(user))
        .await;
    assert_eq!(deleted.status, StatusCode::OK);
    assert_eq!(deleted.body["message"], "File deleted successfully");
    assert_eq!(app.storage_used(user).await, 0);

    let again = app
        .request("GET", &format!("/api/files/{id}"), None, Some(user))
        .await;
    assert_eq!(again.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_search_endpoint() {
    let app = TestApp::new().await;
    let user = app.create_user("alice", 1_000).await;
    app.upload_one("budget-2024.xlsx", b"1", user).await;
    app.upload_one("budget-2025.xlsx", b"22", user).await;
    app.upload_one("holiday.jpg", b"333", user).await;
    app.request("POST", "/api/folders", Some(json!({ "name": "Budgets" })), Some(user))
        .await;

    let response = app
        .request(
            "GET",
            "/api/files/search?query=BUDGET&sort_by=file_size&sort_order=asc&limit=1",
            None,
            Some(user),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    assert_eq!(response.body["query"], "BUDGET");
    assert_eq!(response.body["total_files"], 2);
    assert_eq!(response.body["total_folders"], 1);
    assert_eq!(response.body["files"][0]["original_filename"], "budget-2024.xlsx");
    assert_eq!(response.body["files"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_search_rejects_bad_input() {
    let app = TestApp::new().await;
    let user = app.create_user("alice", 1_000).await;

    let bad_sort = app
        .request("GET", "/api/files/search?query=a&sort_by=owner_id", None, Some(user))
        .await;
    assert_eq!(bad_sort.status, StatusCode::BAD_REQUEST);

    let empty = app
        .request("GET", "/api/files/search?query=", None, Some(user))
        .await;
    assert_eq!(empty.status, StatusCode::BAD_REQUEST);
}
