//! Integration tests for the folder hierarchy.

use axum::http::StatusCode;
use serde_json::json;

use crate::helpers::TestApp;

async fn create(app: &TestApp, user: i64, name: &str, parent: Option<i64>) -> i64 {
    let response = app
        .request(
            "POST",
            "/api/folders",
            Some(json!({ "name": name, "parent_id": parent })),
            Some(user),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
    response.body["id"].as_i64().expect("No folder id")
}

#[tokio::test]
async fn test_create_nested_and_breadcrumb() {
    let app = TestApp::new().await;
    let user = app.create_user("alice", 1_000).await;
    let docs = create(&app, user, "Documents", None).await;
    let photos = create(&app, user, "Photos", Some(docs)).await;
    let year = create(&app, user, "2024", Some(photos)).await;

    let folder = app
        .request("GET", &format!("/api/folders/{photos}"), None, Some(user))
        .await;
    assert_eq!(folder.body["path"], "Documents/Photos");

    let crumbs = app
        .request("GET", &format!("/api/folders/{year}/breadcrumb"), None, Some(user))
        .await;
    assert_eq!(crumbs.status, StatusCode::OK);
    let names: Vec<_> = crumbs
        .body
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["Documents", "Photos", "2024"]);
}

#[tokio::test]
async fn test_duplicate_sibling_is_conflict() {
    let app = TestApp::new().await;
    let user = app.create_user("alice", 1_000).await;
    create(&app, user, "Music", None).await;

    let response = app
        .request("POST", "/api/folders", Some(json!({ "name": "Music" })), Some(user))
        .await;
    assert_eq!(response.status, StatusCode::CONFLICT);
    assert_eq!(
        response.body["detail"],
        "A folder with this name already exists in this location"
    );
}

#[tokio::test]
async fn test_unknown_parent_is_not_found() {
    let app = TestApp::new().await;
    let user = app.create_user("alice", 1_000).await;

    let response = app
        .request(
            "POST",
            "/api/folders",
            Some(json!({ "name": "Orphan", "parent_id": 999 })),
            Some(user),
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["detail"], "Parent folder not found");
}

#[tokio::test]
async fn test_list_root_and_children() {
    let app = TestApp::new().await;
    let user = app.create_user("alice", 1_000).await;
    let a = create(&app, user, "A", None).await;
    create(&app, user, "B", None).await;
    create(&app, user, "A1", Some(a)).await;

    let roots = app.request("GET", "/api/folders", None, Some(user)).await;
    assert_eq!(roots.body.as_array().unwrap().len(), 2);

    let children = app
        .request("GET", &format!("/api/folders?parent_id={a}"), None, Some(user))
        .await;
    assert_eq!(children.body.as_array().unwrap().len(), 1);
    assert_eq!(children.body[0]["path"], "A/A1");
}

#[tokio::test]
async fn test_rename_and_move_cascade_paths() {
    let app = TestApp::new().await;
    let user = app.create_user("alice", 1_000).await;
    let a = create(&app, user, "A", None).await;
    let b = create(&app, user, "B", Some(a)).await;
    let c = create(&app, user, "C", Some(b)).await;
    let other = create(&app, user, "Other", None).await;

    let renamed = app
        .request("PUT", &format!("/api/folders/{a}"), Some(json!({ "name": "Alpha" })), Some(user))
        .await;
    assert_eq!(renamed.status, StatusCode::OK);
    let leaf = app
        .request("GET", &format!("/api/folders/{c}"), None, Some(user))
        .await;
    assert_eq!(leaf.body["path"], "Alpha/B/C");

    let moved = app
        .request(
            "PUT",
            &format!("/api/folders/{b}"),
            Some(json!({ "parent_id": other })),
            Some(user),
        )
        .await;
    assert_eq!(moved.body["path"], "Other/B");
    let leaf = app
        .request("GET", &format!("/api/folders/{c}"), None, Some(user))
        .await;
    assert_eq!(leaf.body["path"], "Other/B/C");
}

#[tokio::test]
async fn test_move_under_own_descendant_is_rejected() {
    let app = TestApp::new().await;
    let user = app.create_user("alice", 1_000).await;
    let a = create(&app, user, "A", None).await;
    let b = create(&app, user, "B", Some(a)).await;

    let response = app
        .request("PUT", &format!("/api/folders/{a}"), Some(json!({ "parent_id": b })), Some(user))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_requires_force_for_contents() {
    let app = TestApp::new().await;
    let user = app.create_user("alice", 1_000).await;
    let a = create(&app, user, "A", None).await;
    create(&app, user, "B", Some(a)).await;
    let response = app
        .upload("/api/files/upload", "file", &[("x.txt", b"12345")], Some(a), user)
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(app.storage_used(user).await, 5);

    let refused = app
        .request("DELETE", &format!("/api/folders/{a}"), None, Some(user))
        .await;
    assert_eq!(refused.status, StatusCode::CONFLICT);
    assert_eq!(
        refused.body["detail"],
        "Folder contains subfolders. Use force=true to delete recursively."
    );

    let forced = app
        .request("DELETE", &format!("/api/folders/{a}?force=true"), None, Some(user))
        .await;
    assert_eq!(forced.status, StatusCode::OK);
    assert_eq!(forced.body["message"], "Folder deleted successfully");
    assert_eq!(forced.body["folders_deleted"], 2);
    assert_eq!(forced.body["files_deleted"], 1);
    assert_eq!(app.storage_used(user).await, 0);

    let gone = app
        .request("GET", &format!("/api/folders/{a}"), None, Some(user))
        .await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_folders_are_private_to_owner() {
    let app = TestApp::new().await;
    let alice = app.create_user("alice", 1_000).await;
    let bob = app.create_user("bob", 1_000).await;
    let a = create(&app, alice, "A", None).await;

    let response = app
        .request("GET", &format!("/api/folders/{a}"), None, Some(bob))
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    // Same name is free for another owner
    create(&app, bob, "A", None).await;
}
