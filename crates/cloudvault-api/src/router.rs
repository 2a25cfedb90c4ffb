//! Route definitions for the CloudVault HTTP API.
//!
//! All routes are organized by domain and mounted under `/api`.

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};

use crate::handlers;
use crate::state::AppState;

/// Room left in the body limit for multipart boundaries and form fields.
pub const MULTIPART_OVERHEAD_BYTES: usize = 1024 * 1024;

/// Build the API router with every route.
///
/// Bodies larger than the configured file size limit plus
/// [`MULTIPART_OVERHEAD_BYTES`] are refused before reaching a handler. The
/// bulk upload route has its own, larger cap and enforces the per-file limit
/// item by item.
pub fn build_router(state: AppState) -> Router {
    let storage = &state.config.storage;
    let max_body = body_limit(storage.max_file_size_bytes);
    let max_batch_body = body_limit(storage.max_batch_request_bytes).max(max_body);

    let api_routes = Router::new()
        .merge(health_routes())
        .merge(user_routes())
        .merge(file_routes(max_batch_body))
        .merge(folder_routes());

    Router::new()
        .nest("/api", api_routes)
        .layer(DefaultBodyLimit::max(max_body))
        .with_state(state)
}

fn body_limit(bytes: u64) -> usize {
    usize::try_from(bytes)
        .unwrap_or(usize::MAX)
        .saturating_add(MULTIPART_OVERHEAD_BYTES)
}

/// Liveness and readiness
fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}

/// Caller profile and counts
fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users/me", get(handlers::user::get_profile))
        .route("/stats", get(handlers::user::get_stats))
}

/// Upload, list, search, metadata, download
fn file_routes(max_batch_body: usize) -> Router<AppState> {
    Router::new()
        .route("/files", get(handlers::file::list_files))
        .route("/files/upload", post(handlers::file::upload_file))
        .route(
            "/files/upload/multiple",
            post(handlers::file::upload_multiple).layer(DefaultBodyLimit::max(max_batch_body)),
        )
        .route("/files/search", get(handlers::file::search_files))
        .route(
            "/files/{id}",
            get(handlers::file::get_file)
                .put(handlers::file::update_file)
                .delete(handlers::file::delete_file),
        )
        .route("/files/{id}/download", get(handlers::file::download_file))
}

/// Folder CRUD and breadcrumbs
fn folder_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/folders",
            get(handlers::folder::list_folders).post(handlers::folder::create_folder),
        )
        .route(
            "/folders/{id}",
            get(handlers::folder::get_folder)
                .put(handlers::folder::update_folder)
                .delete(handlers::folder::delete_folder),
        )
        .route(
            "/folders/{id}/breadcrumb",
            get(handlers::folder::get_breadcrumb),
        )
}
