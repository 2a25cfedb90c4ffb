//! File metadata operations: get, update, delete, download.

use std::sync::Arc;

use tracing::info;

use cloudvault_core::error::{AppError, ErrorKind};
use cloudvault_core::result::AppResult;
use cloudvault_core::traits::storage::ByteStream;
use cloudvault_database::{FileStore, FolderStore};
use cloudvault_entity::file::{File, FileChanges};
use cloudvault_storage::StorageManager;

use crate::context::RequestContext;

/// Requested metadata changes as received from the client.
#[derive(Debug, Clone, Default)]
pub struct FileUpdate {
    /// New display name.
    pub filename: Option<String>,
    /// Destination folder; `0` means the root.
    pub folder_id: Option<i64>,
    /// New visibility flag.
    pub is_public: Option<bool>,
    /// New description.
    pub description: Option<String>,
    /// Replacement tags.
    pub tags: Option<Vec<String>>,
}

/// A file ready to be streamed to the client.
pub struct Download {
    /// The file record.
    pub file: File,
    /// Stored size in bytes.
    pub size: u64,
    /// Content stream.
    pub stream: ByteStream,
}

impl std::fmt::Debug for Download {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Download")
            .field("file_id", &self.file.id)
            .field("size", &self.size)
            .finish()
    }
}

/// Manages the lifecycle of stored files.
#[derive(Debug, Clone)]
pub struct FileService {
    folders: Arc<dyn FolderStore>,
    files: Arc<dyn FileStore>,
    storage: StorageManager,
}

impl FileService {
    /// Creates a new file service.
    pub fn new(
        folders: Arc<dyn FolderStore>,
        files: Arc<dyn FileStore>,
        storage: StorageManager,
    ) -> Self {
        Self {
            folders,
            files,
            storage,
        }
    }

    /// Gets an owned file and stamps its last access time.
    pub async fn get(&self, ctx: &RequestContext, file_id: i64) -> AppResult<File> {
        self.files
            .mark_accessed(ctx.user_id, file_id)
            .await?
            .ok_or_else(|| AppError::not_found("File not found"))
    }

    /// Applies metadata changes to an owned file.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        file_id: i64,
        update: FileUpdate,
    ) -> AppResult<File> {
        let mut file = self
            .files
            .find_owned(ctx.user_id, file_id)
            .await?
            .ok_or_else(|| AppError::not_found("File not found"))?;

        let original_filename = match update.filename {
            Some(name) if name.trim().is_empty() => {
                return Err(AppError::validation("Filename cannot be empty"));
            }
            Some(name) => Some(name.trim().to_string()),
            None => None,
        };

        let folder_id = match update.folder_id {
            None => None,
            Some(0) => Some(None),
            Some(id) => {
                self.folders
                    .find_owned(ctx.user_id, id)
                    .await?
                    .ok_or_else(|| AppError::not_found("Folder not found"))?;
                Some(Some(id))
            }
        };

        let changes = FileChanges {
            original_filename,
            folder_id,
            is_public: update.is_public,
            description: update.description,
            tags: update.tags,
        };
        if changes.is_empty() {
            return Ok(file);
        }

        changes.apply(&mut file);
        let file = self.files.update(&file).await?;
        info!(user_id = ctx.user_id, file_id, "File metadata updated");
        Ok(file)
    }

    /// Soft-deletes an owned file and releases its size from the quota.
    ///
    /// The stored bytes are kept.
    pub async fn delete(&self, ctx: &RequestContext, file_id: i64) -> AppResult<File> {
        let file = self
            .files
            .soft_delete(ctx.user_id, file_id)
            .await?
            .ok_or_else(|| AppError::not_found("File not found"))?;

        info!(
            user_id = ctx.user_id,
            file_id,
            size = file.file_size,
            "File deleted"
        );
        Ok(file)
    }

    /// Opens an owned file for streaming.
    pub async fn download(&self, ctx: &RequestContext, file_id: i64) -> AppResult<Download> {
        let file = self.get(ctx, file_id).await?;

        let missing = |e: AppError| {
            if e.kind == ErrorKind::NotFound {
                AppError::not_found("File not found on disk")
            } else {
                e
            }
        };
        let size = self.storage.size(&file.file_path).await.map_err(missing)?;
        let stream = self.storage.open(&file.file_path).await.map_err(missing)?;

        info!(user_id = ctx.user_id, file_id, size, "File download started");
        Ok(Download { file, size, stream })
    }
}
