//! Persistence traits implemented by every backend.
//!
//! Services depend on these traits only, so the PostgreSQL repositories and
//! the in-memory backend are interchangeable. Operations that must not race
//! (quota reservation, soft delete with release, subtree purge) are single
//! trait methods so each backend can make them atomic.

use async_trait::async_trait;

use cloudvault_core::result::AppResult;
use cloudvault_core::types::{PageRequest, PageResponse};
use cloudvault_entity::file::{CreateFile, File, FileSearch};
use cloudvault_entity::folder::{CreateFolder, Folder, PurgeOutcome};
use cloudvault_entity::user::{CreateUser, User};

/// User rows and the storage counter.
#[async_trait]
pub trait UserStore: Send + Sync + std::fmt::Debug + 'static {
    /// Find a user by ID.
    async fn find_by_id(&self, id: i64) -> AppResult<Option<User>>;

    /// Find a user by login name.
    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>>;

    /// Create a user with `storage_used = 0`.
    async fn create(&self, data: &CreateUser) -> AppResult<User>;

    /// Add `bytes` to `storage_used` only if the result stays within the quota.
    ///
    /// Returns the updated user, or `None` when the reservation was refused
    /// (or the user does not exist). The check and the increment are one
    /// atomic step.
    async fn try_reserve_storage(&self, user_id: i64, bytes: i64) -> AppResult<Option<User>>;

    /// Subtract `bytes` from `storage_used`, clamped at zero.
    async fn release_storage(&self, user_id: i64, bytes: i64) -> AppResult<Option<User>>;

    /// Count all users.
    async fn count(&self) -> AppResult<u64>;
}

/// Folder rows.
#[async_trait]
pub trait FolderStore: Send + Sync + std::fmt::Debug + 'static {
    /// Find a folder by ID regardless of owner.
    async fn find_by_id(&self, id: i64) -> AppResult<Option<Folder>>;

    /// Find a folder by ID owned by `owner_id`.
    async fn find_owned(&self, owner_id: i64, id: i64) -> AppResult<Option<Folder>>;

    /// Find the folder named `name` directly under `parent_id` (root when `None`).
    async fn find_sibling(
        &self,
        owner_id: i64,
        parent_id: Option<i64>,
        name: &str,
    ) -> AppResult<Option<Folder>>;

    /// List folders directly under `parent_id` (root when `None`), by ID.
    async fn list_children(
        &self,
        owner_id: i64,
        parent_id: Option<i64>,
        page: &PageRequest,
    ) -> AppResult<Vec<Folder>>;

    /// IDs of the direct children of a folder.
    async fn child_ids(&self, owner_id: i64, folder_id: i64) -> AppResult<Vec<i64>>;

    /// Count direct child folders.
    async fn count_children(&self, folder_id: i64) -> AppResult<u64>;

    /// Insert a folder. A sibling with the same name yields a conflict.
    async fn create(&self, data: &CreateFolder) -> AppResult<Folder>;

    /// Set the name, parent, and path of a folder and recompute the path of
    /// every descendant from its ancestors' names, as one atomic change.
    ///
    /// A sibling with the same name at the destination yields a conflict.
    async fn move_folder(
        &self,
        folder_id: i64,
        name: &str,
        parent_id: Option<i64>,
        path: &str,
    ) -> AppResult<Folder>;

    /// Case-insensitive substring search over folder names.
    ///
    /// `parent_id` restricts hits to direct children of that folder; `None`
    /// searches the whole hierarchy.
    async fn search(
        &self,
        owner_id: i64,
        query: &str,
        parent_id: Option<i64>,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Folder>>;

    /// Remove a set of folders together with every descendant present when
    /// the removal runs.
    ///
    /// Every non-deleted file inside them is soft-deleted and its size
    /// released from the owner's counter. All of it happens atomically.
    async fn purge(&self, owner_id: i64, folder_ids: &[i64]) -> AppResult<PurgeOutcome>;

    /// Count folders owned by a user.
    async fn count_by_owner(&self, owner_id: i64) -> AppResult<u64>;
}

/// File rows. Soft-deleted rows are invisible to every read.
#[async_trait]
pub trait FileStore: Send + Sync + std::fmt::Debug + 'static {
    /// Find a non-deleted file owned by `owner_id`.
    async fn find_owned(&self, owner_id: i64, id: i64) -> AppResult<Option<File>>;

    /// Find the owner's non-deleted file with this content hash.
    async fn find_by_hash(&self, owner_id: i64, file_hash: &str) -> AppResult<Option<File>>;

    /// Insert a completed upload. An existing live row with the same hash
    /// yields a conflict.
    async fn create(&self, data: &CreateFile) -> AppResult<File>;

    /// Files directly in `folder_id` (root when `None`), in insertion order.
    async fn list(
        &self,
        owner_id: i64,
        folder_id: Option<i64>,
        page: &PageRequest,
    ) -> AppResult<Vec<File>>;

    /// Keyword search with sorting; the total is counted before paging.
    async fn search(
        &self,
        owner_id: i64,
        criteria: &FileSearch,
        page: &PageRequest,
    ) -> AppResult<PageResponse<File>>;

    /// Persist the mutable metadata of a file.
    async fn update(&self, file: &File) -> AppResult<File>;

    /// Stamp `last_accessed` and return the refreshed row.
    async fn mark_accessed(&self, owner_id: i64, id: i64) -> AppResult<Option<File>>;

    /// Flag a file deleted and release its size from the owner's counter.
    ///
    /// Returns `None` when no live file matched, so a repeated call never
    /// releases twice.
    async fn soft_delete(&self, owner_id: i64, id: i64) -> AppResult<Option<File>>;

    /// Count live files directly in a folder.
    async fn count_in_folder(&self, folder_id: i64) -> AppResult<u64>;

    /// Count live files owned by a user.
    async fn count_by_owner(&self, owner_id: i64) -> AppResult<u64>;
}
