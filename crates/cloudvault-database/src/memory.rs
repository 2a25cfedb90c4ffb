//! In-memory persistence backend.
//!
//! All three stores share one lock so that multi-table operations (soft
//! delete with release, subtree purge) are as atomic as their PostgreSQL
//! counterparts. Used for tests and single-process deployments.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use cloudvault_core::error::AppError;
use cloudvault_core::result::AppResult;
use cloudvault_core::types::{PageRequest, PageResponse};
use cloudvault_entity::file::{CreateFile, File, FileSearch};
use cloudvault_entity::folder::{CreateFolder, Folder, PATH_SEPARATOR, PurgeOutcome};
use cloudvault_entity::user::{CreateUser, User};

use crate::store::{FileStore, FolderStore, UserStore};

#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<i64, User>,
    folders: BTreeMap<i64, Folder>,
    files: BTreeMap<i64, File>,
    next_user_id: i64,
    next_folder_id: i64,
    next_file_id: i64,
}

impl Tables {
    fn next_id(counter: &mut i64) -> i64 {
        *counter += 1;
        *counter
    }

    fn sibling_taken(&self, owner_id: i64, parent_id: Option<i64>, name: &str, skip: i64) -> bool {
        self.folders.values().any(|f| {
            f.id != skip && f.owner_id == owner_id && f.parent_id == parent_id && f.name == name
        })
    }

    /// Owned folders among `roots` plus all of their descendants.
    fn subtree_of(&self, owner_id: i64, roots: &[i64]) -> HashSet<i64> {
        let mut found = HashSet::new();
        let mut stack: Vec<i64> = roots
            .iter()
            .copied()
            .filter(|id| self.folders.get(id).is_some_and(|f| f.owner_id == owner_id))
            .collect();
        while let Some(id) = stack.pop() {
            if !found.insert(id) {
                continue;
            }
            stack.extend(
                self.folders
                    .values()
                    .filter(|f| f.parent_id == Some(id))
                    .map(|f| f.id),
            );
        }
        found
    }

    fn release(&mut self, user_id: i64, bytes: i64) -> Option<User> {
        let user = self.users.get_mut(&user_id)?;
        user.storage_used = (user.storage_used - bytes).max(0);
        user.updated_at = Utc::now();
        Some(user.clone())
    }
}

/// Process-local implementation of every store trait.
#[derive(Debug, Clone, Default)]
pub struct MemoryDatabase {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryDatabase {
    /// Create an empty database.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryDatabase {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<User>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|u| u.username.eq_ignore_ascii_case(username))
            .cloned())
    }

    async fn create(&self, data: &CreateUser) -> AppResult<User> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.username == data.username) {
            return Err(AppError::conflict(format!(
                "Username '{}' already exists",
                data.username
            )));
        }
        if tables.users.values().any(|u| u.email == data.email) {
            return Err(AppError::conflict("Email already in use"));
        }

        let now = Utc::now();
        let user = User {
            id: Tables::next_id(&mut tables.next_user_id),
            username: data.username.clone(),
            email: data.email.clone(),
            full_name: data.full_name.clone(),
            is_active: true,
            storage_quota: data.storage_quota,
            storage_used: 0,
            created_at: now,
            updated_at: now,
        };
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn try_reserve_storage(&self, user_id: i64, bytes: i64) -> AppResult<Option<User>> {
        let mut tables = self.tables.write().await;
        let Some(user) = tables.users.get_mut(&user_id) else {
            return Ok(None);
        };
        if user.would_exceed(bytes) {
            return Ok(None);
        }
        user.storage_used += bytes;
        user.updated_at = Utc::now();
        Ok(Some(user.clone()))
    }

    async fn release_storage(&self, user_id: i64, bytes: i64) -> AppResult<Option<User>> {
        Ok(self.tables.write().await.release(user_id, bytes))
    }

    async fn count(&self) -> AppResult<u64> {
        Ok(self.tables.read().await.users.len() as u64)
    }
}

#[async_trait]
impl FolderStore for MemoryDatabase {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<Folder>> {
        Ok(self.tables.read().await.folders.get(&id).cloned())
    }

    async fn find_owned(&self, owner_id: i64, id: i64) -> AppResult<Option<Folder>> {
        let tables = self.tables.read().await;
        Ok(tables
            .folders
            .get(&id)
            .filter(|f| f.owner_id == owner_id)
            .cloned())
    }

    async fn find_sibling(
        &self,
        owner_id: i64,
        parent_id: Option<i64>,
        name: &str,
    ) -> AppResult<Option<Folder>> {
        let tables = self.tables.read().await;
        Ok(tables
            .folders
            .values()
            .find(|f| f.owner_id == owner_id && f.parent_id == parent_id && f.name == name)
            .cloned())
    }

    async fn list_children(
        &self,
        owner_id: i64,
        parent_id: Option<i64>,
        page: &PageRequest,
    ) -> AppResult<Vec<Folder>> {
        let tables = self.tables.read().await;
        Ok(page.slice(
            tables
                .folders
                .values()
                .filter(|f| f.owner_id == owner_id && f.parent_id == parent_id)
                .cloned(),
        ))
    }

    async fn child_ids(&self, owner_id: i64, folder_id: i64) -> AppResult<Vec<i64>> {
        let tables = self.tables.read().await;
        Ok(tables
            .folders
            .values()
            .filter(|f| f.owner_id == owner_id && f.parent_id == Some(folder_id))
            .map(|f| f.id)
            .collect())
    }

    async fn count_children(&self, folder_id: i64) -> AppResult<u64> {
        let tables = self.tables.read().await;
        Ok(tables
            .folders
            .values()
            .filter(|f| f.parent_id == Some(folder_id))
            .count() as u64)
    }

    async fn create(&self, data: &CreateFolder) -> AppResult<Folder> {
        let mut tables = self.tables.write().await;
        if tables.sibling_taken(data.owner_id, data.parent_id, &data.name, 0) {
            return Err(AppError::conflict(
                "A folder with this name already exists in this location",
            ));
        }

        let now = Utc::now();
        let folder = Folder {
            id: Tables::next_id(&mut tables.next_folder_id),
            name: data.name.clone(),
            path: data.path.clone(),
            parent_id: data.parent_id,
            owner_id: data.owner_id,
            created_at: now,
            updated_at: now,
        };
        tables.folders.insert(folder.id, folder.clone());
        Ok(folder)
    }

    async fn move_folder(
        &self,
        folder_id: i64,
        name: &str,
        parent_id: Option<i64>,
        path: &str,
    ) -> AppResult<Folder> {
        let mut tables = self.tables.write().await;
        let owner_id = tables
            .folders
            .get(&folder_id)
            .map(|f| f.owner_id)
            .ok_or_else(|| AppError::not_found(format!("Folder {folder_id} not found")))?;
        if tables.sibling_taken(owner_id, parent_id, name, folder_id) {
            return Err(AppError::conflict(
                "A folder with this name already exists in this location",
            ));
        }

        let now = Utc::now();
        let folder = tables
            .folders
            .get_mut(&folder_id)
            .ok_or_else(|| AppError::not_found(format!("Folder {folder_id} not found")))?;
        folder.name = name.to_string();
        folder.parent_id = parent_id;
        folder.path = path.to_string();
        folder.updated_at = now;
        let moved = folder.clone();

        // Parents are rewritten before their children
        let mut frontier = vec![(moved.id, moved.path.clone())];
        while let Some((parent, parent_path)) = frontier.pop() {
            for child in tables
                .folders
                .values_mut()
                .filter(|f| f.parent_id == Some(parent))
            {
                child.path = format!("{parent_path}{PATH_SEPARATOR}{}", child.name);
                child.updated_at = now;
                frontier.push((child.id, child.path.clone()));
            }
        }
        Ok(moved)
    }

    async fn search(
        &self,
        owner_id: i64,
        query: &str,
        parent_id: Option<i64>,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Folder>> {
        let needle = query.to_lowercase();
        let tables = self.tables.read().await;
        let hits: Vec<Folder> = tables
            .folders
            .values()
            .filter(|f| f.owner_id == owner_id)
            .filter(|f| parent_id.is_none() || f.parent_id == parent_id)
            .filter(|f| f.name.to_lowercase().contains(&needle))
            .cloned()
            .collect();
        let total = hits.len() as u64;
        Ok(PageResponse::new(page.slice(hits), total))
    }

    async fn purge(&self, owner_id: i64, folder_ids: &[i64]) -> AppResult<PurgeOutcome> {
        let mut tables = self.tables.write().await;
        let doomed = tables.subtree_of(owner_id, folder_ids);
        let now = Utc::now();

        let mut outcome = PurgeOutcome::default();
        for file in tables.files.values_mut() {
            let inside = file.folder_id.is_some_and(|id| doomed.contains(&id));
            if file.owner_id != owner_id || !inside {
                continue;
            }
            if !file.is_deleted {
                file.is_deleted = true;
                file.updated_at = now;
                outcome.files_deleted += 1;
                outcome.bytes_released += file.file_size;
            }
            // Rows outlive their folder with no parent, like ON DELETE SET NULL.
            file.folder_id = None;
        }
        tables.release(owner_id, outcome.bytes_released);

        for id in &doomed {
            if tables.folders.remove(id).is_some() {
                outcome.folders_deleted += 1;
            }
        }
        Ok(outcome)
    }

    async fn count_by_owner(&self, owner_id: i64) -> AppResult<u64> {
        let tables = self.tables.read().await;
        Ok(tables
            .folders
            .values()
            .filter(|f| f.owner_id == owner_id)
            .count() as u64)
    }
}

#[async_trait]
impl FileStore for MemoryDatabase {
    async fn find_owned(&self, owner_id: i64, id: i64) -> AppResult<Option<File>> {
        let tables = self.tables.read().await;
        Ok(tables
            .files
            .get(&id)
            .filter(|f| f.owner_id == owner_id && !f.is_deleted)
            .cloned())
    }

    async fn find_by_hash(&self, owner_id: i64, file_hash: &str) -> AppResult<Option<File>> {
        let tables = self.tables.read().await;
        Ok(tables
            .files
            .values()
            .find(|f| f.owner_id == owner_id && !f.is_deleted && f.file_hash == file_hash)
            .cloned())
    }

    async fn create(&self, data: &CreateFile) -> AppResult<File> {
        let mut tables = self.tables.write().await;
        let duplicate = tables.files.values().any(|f| {
            f.owner_id == data.owner_id && !f.is_deleted && f.file_hash == data.file_hash
        });
        if duplicate {
            return Err(AppError::conflict("File already exists"));
        }

        let now = Utc::now();
        let file = File {
            id: Tables::next_id(&mut tables.next_file_id),
            filename: data.filename.clone(),
            original_filename: data.original_filename.clone(),
            file_path: data.file_path.clone(),
            file_size: data.file_size,
            content_type: data.content_type.clone(),
            file_hash: data.file_hash.clone(),
            folder_id: data.folder_id,
            owner_id: data.owner_id,
            description: None,
            tags: Vec::new(),
            is_public: false,
            is_deleted: false,
            upload_completed: true,
            created_at: now,
            updated_at: now,
            last_accessed: None,
        };
        tables.files.insert(file.id, file.clone());
        Ok(file)
    }

    async fn list(
        &self,
        owner_id: i64,
        folder_id: Option<i64>,
        page: &PageRequest,
    ) -> AppResult<Vec<File>> {
        let tables = self.tables.read().await;
        Ok(page.slice(
            tables
                .files
                .values()
                .filter(|f| f.owner_id == owner_id && !f.is_deleted && f.folder_id == folder_id)
                .cloned(),
        ))
    }

    async fn search(
        &self,
        owner_id: i64,
        criteria: &FileSearch,
        page: &PageRequest,
    ) -> AppResult<PageResponse<File>> {
        let tables = self.tables.read().await;
        let mut hits: Vec<File> = tables
            .files
            .values()
            .filter(|f| f.owner_id == owner_id && !f.is_deleted && criteria.matches(f))
            .cloned()
            .collect();
        hits.sort_by(|a, b| {
            criteria
                .sort_order
                .apply(criteria.sort_by.compare(a, b))
                .then_with(|| a.id.cmp(&b.id))
        });
        let total = hits.len() as u64;
        Ok(PageResponse::new(page.slice(hits), total))
    }

    async fn update(&self, file: &File) -> AppResult<File> {
        let mut tables = self.tables.write().await;
        let stored = tables
            .files
            .get_mut(&file.id)
            .filter(|f| f.owner_id == file.owner_id && !f.is_deleted)
            .ok_or_else(|| AppError::not_found("File not found"))?;
        stored.original_filename = file.original_filename.clone();
        stored.folder_id = file.folder_id;
        stored.is_public = file.is_public;
        stored.description = file.description.clone();
        stored.tags = file.tags.clone();
        stored.updated_at = Utc::now();
        Ok(stored.clone())
    }

    async fn mark_accessed(&self, owner_id: i64, id: i64) -> AppResult<Option<File>> {
        let mut tables = self.tables.write().await;
        Ok(tables
            .files
            .get_mut(&id)
            .filter(|f| f.owner_id == owner_id && !f.is_deleted)
            .map(|f| {
                f.last_accessed = Some(Utc::now());
                f.clone()
            }))
    }

    async fn soft_delete(&self, owner_id: i64, id: i64) -> AppResult<Option<File>> {
        let mut tables = self.tables.write().await;
        let Some(file) = tables
            .files
            .get_mut(&id)
            .filter(|f| f.owner_id == owner_id && !f.is_deleted)
        else {
            return Ok(None);
        };
        file.is_deleted = true;
        file.updated_at = Utc::now();
        let file = file.clone();
        tables.release(owner_id, file.file_size);
        Ok(Some(file))
    }

    async fn count_in_folder(&self, folder_id: i64) -> AppResult<u64> {
        let tables = self.tables.read().await;
        Ok(tables
            .files
            .values()
            .filter(|f| f.folder_id == Some(folder_id) && !f.is_deleted)
            .count() as u64)
    }

    async fn count_by_owner(&self, owner_id: i64) -> AppResult<u64> {
        let tables = self.tables.read().await;
        Ok(tables
            .files
            .values()
            .filter(|f| f.owner_id == owner_id && !f.is_deleted)
            .count() as u64)
    }
}
