//! Shared fixtures for service tests.

use std::path::Path;
use std::sync::Arc;

use futures::StreamExt;
use tempfile::TempDir;

use cloudvault_core::traits::storage::ByteStream;
use cloudvault_database::Database;
use cloudvault_entity::user::CreateUser;
use cloudvault_storage::StorageManager;
use cloudvault_storage::providers::local::LocalStorageProvider;

use crate::context::RequestContext;
use crate::file::{FileService, SearchService, UploadService};
use crate::folder::FolderService;
use crate::user::UserService;

pub const DEFAULT_MAX_FILE_SIZE: u64 = 1024 * 1024;

/// In-memory database plus a temporary upload directory, with user "alice".
pub struct Harness {
    pub db: Database,
    pub ctx: RequestContext,
    pub uploads: UploadService,
    pub files: FileService,
    pub search: SearchService,
    pub folders: FolderService,
    pub users: UserService,
    dir: TempDir,
}

impl Harness {
    pub async fn new(quota: i64) -> Self {
        Self::with_max_file_size(quota, DEFAULT_MAX_FILE_SIZE).await
    }

    pub async fn with_max_file_size(quota: i64, max_file_size: u64) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let provider = LocalStorageProvider::new(dir.path()).await.unwrap();
        let storage = StorageManager::from_provider(Arc::new(provider));
        let db = Database::in_memory();

        let users = UserService::new(db.users(), db.folders(), db.files());
        let alice = users.ensure_user(user("alice", quota)).await.unwrap();

        Self {
            ctx: RequestContext::new(alice.id, alice.username),
            uploads: UploadService::new(
                db.users(),
                db.folders(),
                db.files(),
                storage.clone(),
                max_file_size,
            ),
            files: FileService::new(db.folders(), db.files(), storage),
            search: SearchService::new(db.folders(), db.files()),
            folders: FolderService::new(db.folders(), db.files()),
            users,
            db,
            dir,
        }
    }

    /// Alice's current storage counter.
    pub async fn used(&self) -> i64 {
        self.db
            .users()
            .find_by_id(self.ctx.user_id)
            .await
            .unwrap()
            .unwrap()
            .storage_used
    }

    /// Creates "bob" on first use and returns his context.
    pub async fn other_user(&self) -> RequestContext {
        let bob = self.users.ensure_user(user("bob", 1_000)).await.unwrap();
        RequestContext::new(bob.id, bob.username)
    }

    pub fn storage_root(&self) -> &Path {
        self.dir.path()
    }

    /// Number of objects written below the storage root.
    pub fn stored_objects(&self) -> usize {
        fn walk(dir: &Path) -> usize {
            std::fs::read_dir(dir)
                .unwrap()
                .map(|entry| {
                    let path = entry.unwrap().path();
                    if path.is_dir() { walk(&path) } else { 1 }
                })
                .sum()
        }
        walk(self.dir.path())
    }
}

fn user(username: &str, quota: i64) -> CreateUser {
    CreateUser {
        username: username.into(),
        email: format!("{username}@example.com"),
        full_name: None,
        storage_quota: quota,
    }
}

pub async fn collect_stream(mut stream: ByteStream) -> Vec<u8> {
    let mut out = Vec::new();
    while let Some(chunk) = stream.next().await {
        out.extend_from_slice(&chunk.unwrap());
    }
    out
}
