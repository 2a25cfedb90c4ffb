//! Shared test helpers for integration tests.

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use cloudvault_api::{AppState, build_app};
use cloudvault_core::config::AppConfig;
use cloudvault_database::Database;
use cloudvault_entity::user::CreateUser;
use cloudvault_storage::StorageManager;

const BOUNDARY: &str = "cloudvault-test-boundary";

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Shared state, for setting up fixtures directly
    pub state: AppState,
    /// Upload directory, removed on drop
    pub upload_dir: TempDir,
}

impl TestApp {
    /// Create a new test application with a 1 MiB file size limit
    pub async fn new() -> Self {
        Self::with_max_file_size(1024 * 1024).await
    }

    pub async fn with_max_file_size(max_file_size: u64) -> Self {
        let upload_dir = tempfile::tempdir().expect("Failed to create upload dir");

        let mut config = AppConfig::default();
        config.database.provider = "memory".to_string();
        config.storage.upload_dir = upload_dir.path().to_string_lossy().into_owned();
        config.storage.max_file_size_bytes = max_file_size;

        let database = Database::connect(&config.database)
            .await
            .expect("Failed to open memory database");
        let storage = StorageManager::from_config(&config.storage)
            .await
            .expect("Failed to init storage");

        let state = AppState::new(config, database, storage);
        let router = build_app(state.clone());

        Self {
            router,
            state,
            upload_dir,
        }
    }

    /// Create a user and return their ID
    pub async fn create_user(&self, username: &str, quota: i64) -> i64 {
        self.state
            .user_service
            .ensure_user(CreateUser {
                username: username.to_string(),
                email: format!("{username}@test.com"),
                full_name: None,
                storage_quota: quota,
            })
            .await
            .expect("Failed to create test user")
            .id
    }

    /// Make a JSON request to the test app
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        user_id: Option<i64>,
    ) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json");
        if let Some(id) = user_id {
            req = req.header("X-User-Id", id.to_string());
        }

        self.send(req.body(Body::from(body_str)).expect("Failed to build request"))
            .await
    }

    /// POST a multipart form with the given files under `field`
    pub async fn upload(
        &self,
        path: &str,
        field: &str,
        files: &[(&str, &[u8])],
        folder_id: Option<i64>,
        user_id: i64,
    ) -> TestResponse {
        let body = multipart_body(field, files, folder_id);
        let req = Request::builder()
            .method("POST")
            .uri(path)
            .header(
                "Content-Type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .header("X-User-Id", user_id.to_string())
            .body(Body::from(body))
            .expect("Failed to build request");

        self.send(req).await
    }

    /// Upload one file to `/api/files/upload` and return its id
    pub async fn upload_one(&self, name: &str, data: &[u8], user_id: i64) -> i64 {
        let response = self
            .upload("/api/files/upload", "file", &[(name, data)], None, user_id)
            .await;
        assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
        response.body["file_id"].as_i64().expect("No file_id")
    }

    /// GET raw bytes, e.g. a download
    pub async fn get_raw(&self, path: &str, user_id: i64) -> (StatusCode, HeaderMap, Vec<u8>) {
        let req = Request::builder()
            .uri(path)
            .header("X-User-Id", user_id.to_string())
            .body(Body::empty())
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), 16 * 1024 * 1024)
            .await
            .expect("Failed to read body");

        (status, headers, bytes.to_vec())
    }

    /// Current storage counter of a user
    pub async fn storage_used(&self, user_id: i64) -> i64 {
        self.state
            .database
            .users()
            .find_by_id(user_id)
            .await
            .expect("Failed to load user")
            .expect("User missing")
            .storage_used
    }

    async fn send(&self, req: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), 16 * 1024 * 1024)
            .await
            .expect("Failed to read body");
        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }
}

fn multipart_body(field: &str, files: &[(&str, &[u8])], folder_id: Option<i64>) -> Vec<u8> {
    let mut body = Vec::new();

    if let Some(id) = folder_id {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"folder_id\"\r\n\r\n{id}\r\n"
            )
            .as_bytes(),
        );
    }

    for (name, data) in files {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }

    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Parsed JSON body
    pub body: Value,
}
