//! File upload service: single and bulk ingestion with quota accounting
//! and content-hash deduplication.

use std::sync::Arc;

use bytes::Bytes;
use serde::Serialize;
use tracing::{info, warn};

use cloudvault_core::error::{AppError, ErrorKind};
use cloudvault_core::result::AppResult;
use cloudvault_database::{FileStore, FolderStore, UserStore};
use cloudvault_entity::file::{CreateFile, File};
use cloudvault_entity::user::User;
use cloudvault_storage::{StorageManager, digest_hex, guess_content_type};

use crate::context::RequestContext;

/// Message reported for a freshly stored upload.
pub const UPLOADED_MESSAGE: &str = "File uploaded successfully";
/// Message reported when the bytes were already stored for this owner.
pub const DUPLICATE_MESSAGE: &str = "File already exists (duplicate detected)";

/// One file received from the client.
#[derive(Debug, Clone)]
pub struct UploadInput {
    /// Name supplied by the client.
    pub filename: String,
    /// MIME type supplied by the client.
    pub content_type: Option<String>,
    /// Raw content.
    pub data: Bytes,
}

impl UploadInput {
    /// Size of the content in bytes.
    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }
}

/// Result of storing one upload.
#[derive(Debug, Clone)]
pub enum UploadOutcome {
    /// New bytes were written and accounted.
    Stored(File),
    /// An identical live file already existed; nothing changed.
    Duplicate(File),
}

impl UploadOutcome {
    /// The file record, new or existing.
    pub fn file(&self) -> &File {
        match self {
            Self::Stored(file) | Self::Duplicate(file) => file,
        }
    }

    /// Whether the upload matched an existing file.
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::Duplicate(_))
    }

    /// Client-facing message for this outcome.
    pub fn message(&self) -> &'static str {
        match self {
            Self::Stored(_) => UPLOADED_MESSAGE,
            Self::Duplicate(_) => DUPLICATE_MESSAGE,
        }
    }
}

/// An item of a bulk upload that could not be stored.
#[derive(Debug, Clone, Serialize)]
pub struct UploadFailure {
    /// Name supplied by the client.
    pub filename: String,
    /// Why the item was rejected.
    pub error: String,
}

/// Partitioned result of a bulk upload.
#[derive(Debug, Clone, Default)]
pub struct BulkUploadReport {
    /// Stored and duplicate items, in request order.
    pub successful: Vec<UploadOutcome>,
    /// Rejected items, in request order.
    pub failed: Vec<UploadFailure>,
    /// Number of items received.
    pub total_files: usize,
    /// Bytes newly stored by this request.
    pub total_size: i64,
}

/// Ingests files into a user's storage.
#[derive(Debug, Clone)]
pub struct UploadService {
    users: Arc<dyn UserStore>,
    folders: Arc<dyn FolderStore>,
    files: Arc<dyn FileStore>,
    storage: StorageManager,
    max_file_size: u64,
}

impl UploadService {
    /// Creates a new upload service.
    pub fn new(
        users: Arc<dyn UserStore>,
        folders: Arc<dyn FolderStore>,
        files: Arc<dyn FileStore>,
        storage: StorageManager,
        max_file_size: u64,
    ) -> Self {
        Self {
            users,
            folders,
            files,
            storage,
            max_file_size,
        }
    }

    /// Upload one file into `folder_id` (root when `None`).
    ///
    /// Validation runs before any byte is written: size, quota, folder
    /// ownership, then the dedup lookup. The quota is reserved atomically
    /// before the write and released again if the write or insert fails.
    pub async fn upload(
        &self,
        ctx: &RequestContext,
        folder_id: Option<i64>,
        input: UploadInput,
    ) -> AppResult<UploadOutcome> {
        self.check_size(&input)?;
        check_name(&input.filename)?;

        let user = self.load_user(ctx).await?;
        if user.would_exceed(input.size() as i64) {
            return Err(AppError::quota_exceeded("Storage quota exceeded"));
        }
        self.require_folder(ctx, folder_id).await?;

        self.store(ctx, folder_id, input).await
    }

    /// Upload several files into one folder.
    ///
    /// The quota is checked once against the combined size; if it would be
    /// exceeded nothing is stored. Per-item failures are collected instead
    /// of aborting the batch.
    pub async fn upload_many(
        &self,
        ctx: &RequestContext,
        folder_id: Option<i64>,
        inputs: Vec<UploadInput>,
    ) -> AppResult<BulkUploadReport> {
        let user = self.load_user(ctx).await?;
        let requested: u64 = inputs.iter().map(UploadInput::size).sum();
        if user.would_exceed(i64::try_from(requested).unwrap_or(i64::MAX)) {
            return Err(AppError::quota_exceeded("Storage quota would be exceeded"));
        }
        self.require_folder(ctx, folder_id).await?;

        let mut report = BulkUploadReport {
            total_files: inputs.len(),
            ..Default::default()
        };

        for input in inputs {
            let filename = input.filename.clone();
            let size = input.size() as i64;
            let result = match self.check_size(&input).and_then(|_| check_name(&filename)) {
                Ok(()) => self.store(ctx, folder_id, input).await,
                Err(e) => Err(e),
            };

            match result {
                Ok(outcome) => {
                    if !outcome.is_duplicate() {
                        report.total_size += size;
                    }
                    report.successful.push(outcome);
                }
                Err(e) => {
                    warn!(
                        user_id = ctx.user_id,
                        filename = %filename,
                        error = %e,
                        "Bulk upload item rejected"
                    );
                    report.failed.push(UploadFailure {
                        filename,
                        error: e.message,
                    });
                }
            }
        }

        info!(
            user_id = ctx.user_id,
            stored = report.successful.len(),
            failed = report.failed.len(),
            size = report.total_size,
            "Bulk upload completed"
        );
        Ok(report)
    }

    /// Dedup, reserve, write, insert. Callers have already validated.
    async fn store(
        &self,
        ctx: &RequestContext,
        folder_id: Option<i64>,
        input: UploadInput,
    ) -> AppResult<UploadOutcome> {
        let size = input.size() as i64;
        let file_hash = digest_hex(&input.data);

        if let Some(existing) = self.files.find_by_hash(ctx.user_id, &file_hash).await? {
            info!(user_id = ctx.user_id, file_id = existing.id, "Duplicate upload detected");
            return Ok(UploadOutcome::Duplicate(existing));
        }

        if self
            .users
            .try_reserve_storage(ctx.user_id, size)
            .await?
            .is_none()
        {
            return Err(AppError::quota_exceeded("Storage quota exceeded"));
        }

        let stored_name = StorageManager::generate_stored_name(&input.filename);
        let key = StorageManager::object_key(ctx.user_id, &stored_name);

        if let Err(e) = self.storage.put(&key, input.data).await {
            self.compensate(ctx, size, None).await;
            return Err(AppError::with_source(
                ErrorKind::Storage,
                format!("File upload failed: {}", e.message),
                e,
            ));
        }

        let content_type = input
            .content_type
            .filter(|ct| !ct.trim().is_empty())
            .or_else(|| guess_content_type(&input.filename));

        let record = CreateFile {
            filename: stored_name,
            original_filename: input.filename,
            file_path: key.clone(),
            file_size: size,
            content_type,
            file_hash,
            folder_id,
            owner_id: ctx.user_id,
        };

        match self.files.create(&record).await {
            Ok(file) => {
                info!(
                    user_id = ctx.user_id,
                    file_id = file.id,
                    size = file.file_size,
                    "File uploaded"
                );
                Ok(UploadOutcome::Stored(file))
            }
            Err(e) => {
                self.compensate(ctx, size, Some(&key)).await;
                if e.kind == ErrorKind::Conflict {
                    let winner = self.files.find_by_hash(ctx.user_id, &record.file_hash).await?;
                    if let Some(winner) = winner {
                        info!(
                            user_id = ctx.user_id,
                            file_id = winner.id,
                            "Concurrent duplicate upload"
                        );
                        return Ok(UploadOutcome::Duplicate(winner));
                    }
                }
                Err(e)
            }
        }
    }

    /// Undo a reservation and, when given, the stored object.
    async fn compensate(&self, ctx: &RequestContext, size: i64, key: Option<&str>) {
        if let Err(e) = self.users.release_storage(ctx.user_id, size).await {
            warn!(user_id = ctx.user_id, size, error = %e, "Failed to release storage reservation");
        }
        if let Some(key) = key {
            if let Err(e) = self.storage.remove(key).await {
                warn!(user_id = ctx.user_id, key, error = %e, "Failed to remove orphaned object");
            }
        }
    }

    fn check_size(&self, input: &UploadInput) -> AppResult<()> {
        if input.size() > self.max_file_size {
            return Err(AppError::payload_too_large(format!(
                "File size exceeds maximum allowed size of {} bytes",
                self.max_file_size
            )));
        }
        Ok(())
    }

    async fn load_user(&self, ctx: &RequestContext) -> AppResult<User> {
        self.users
            .find_by_id(ctx.user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))
    }

    async fn require_folder(&self, ctx: &RequestContext, folder_id: Option<i64>) -> AppResult<()> {
        if let Some(folder_id) = folder_id {
            self.folders
                .find_owned(ctx.user_id, folder_id)
                .await?
                .ok_or_else(|| AppError::not_found("Folder not found"))?;
        }
        Ok(())
    }
}

fn check_name(filename: &str) -> AppResult<()> {
    if filename.trim().is_empty() {
        return Err(AppError::validation("Filename cannot be empty"));
    }
    Ok(())
}
