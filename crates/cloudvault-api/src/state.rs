//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use cloudvault_core::config::AppConfig;
use cloudvault_database::Database;
use cloudvault_service::file::{FileService, SearchService, UploadService};
use cloudvault_service::folder::FolderService;
use cloudvault_service::user::UserService;
use cloudvault_storage::StorageManager;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
#[derive(Debug, Clone)]
pub struct AppState {
    // ── Configuration ────────────────────────────────────────
    /// Application configuration
    pub config: Arc<AppConfig>,

    // ── Infrastructure ───────────────────────────────────────
    /// Persistence backend
    pub database: Database,
    /// Object storage
    pub storage: StorageManager,

    // ── Services ─────────────────────────────────────────────
    /// Single and bulk uploads
    pub upload_service: Arc<UploadService>,
    /// File metadata lifecycle and downloads
    pub file_service: Arc<FileService>,
    /// Listing and search
    pub search_service: Arc<SearchService>,
    /// Folder hierarchy
    pub folder_service: Arc<FolderService>,
    /// Caller lookup and account reporting
    pub user_service: Arc<UserService>,
}

impl AppState {
    /// Wires every service onto the given backends.
    pub fn new(config: AppConfig, database: Database, storage: StorageManager) -> Self {
        let upload_service = Arc::new(UploadService::new(
            database.users(),
            database.folders(),
            database.files(),
            storage.clone(),
            config.storage.max_file_size_bytes,
        ));
        let file_service = Arc::new(FileService::new(
            database.folders(),
            database.files(),
            storage.clone(),
        ));
        let search_service = Arc::new(SearchService::new(database.folders(), database.files()));
        let folder_service = Arc::new(FolderService::new(database.folders(), database.files()));
        let user_service = Arc::new(UserService::new(
            database.users(),
            database.folders(),
            database.files(),
        ));

        Self {
            config: Arc::new(config),
            database,
            storage,
            upload_service,
            file_service,
            search_service,
            folder_service,
            user_service,
        }
    }
}
