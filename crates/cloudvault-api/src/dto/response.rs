//! Response DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use cloudvault_entity::file::File;
use cloudvault_entity::folder::{Folder, PurgeOutcome};
use cloudvault_entity::storage::StorageQuota;
use cloudvault_entity::user::User;
use cloudvault_service::file::{BulkUploadReport, SearchResults, UploadFailure, UploadOutcome};

/// Plain message body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    /// What happened.
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Result of one upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    /// Stored (or pre-existing) file id.
    pub file_id: i64,
    /// Name the client knows the file by.
    pub filename: String,
    /// Size in bytes.
    pub file_size: i64,
    /// Fresh upload or duplicate.
    pub message: String,
}

impl From<&UploadOutcome> for UploadResponse {
    fn from(outcome: &UploadOutcome) -> Self {
        let file = outcome.file();
        Self {
            file_id: file.id,
            filename: file.original_filename.clone(),
            file_size: file.file_size,
            message: outcome.message().to_string(),
        }
    }
}

/// Result of a bulk upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkUploadResponse {
    pub successful_uploads: Vec<UploadResponse>,
    pub failed_uploads: Vec<FailedUpload>,
    pub total_files: usize,
    /// Bytes newly stored by this request.
    pub total_size: i64,
}

/// One rejected bulk item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailedUpload {
    pub filename: String,
    pub error: String,
}

impl From<UploadFailure> for FailedUpload {
    fn from(failure: UploadFailure) -> Self {
        Self {
            filename: failure.filename,
            error: failure.error,
        }
    }
}

impl From<BulkUploadReport> for BulkUploadResponse {
    fn from(report: BulkUploadReport) -> Self {
        Self {
            successful_uploads: report.successful.iter().map(UploadResponse::from).collect(),
            failed_uploads: report.failed.into_iter().map(FailedUpload::from).collect(),
            total_files: report.total_files,
            total_size: report.total_size,
        }
    }
}

/// Combined search hits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub files: Vec<File>,
    pub folders: Vec<Folder>,
    /// Matching files before paging.
    pub total_files: u64,
    /// Matching folders before paging.
    pub total_folders: u64,
    pub query: String,
}

impl From<SearchResults> for SearchResponse {
    fn from(results: SearchResults) -> Self {
        Self {
            total_files: results.files.total,
            total_folders: results.folders.total,
            files: results.files.items,
            folders: results.folders.items,
            query: results.query,
        }
    }
}

/// Outcome of a folder deletion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteFolderResponse {
    pub message: String,
    pub folders_deleted: u64,
    pub files_deleted: u64,
    /// Bytes returned to the owner's quota.
    pub bytes_released: i64,
}

impl From<PurgeOutcome> for DeleteFolderResponse {
    fn from(outcome: PurgeOutcome) -> Self {
        Self {
            message: "Folder deleted successfully".to_string(),
            folders_deleted: outcome.folders_deleted,
            files_deleted: outcome.files_deleted,
            bytes_released: outcome.bytes_released,
        }
    }
}

/// The caller's profile with quota usage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub full_name: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub quota: StorageQuota,
}

impl From<User> for ProfileResponse {
    fn from(user: User) -> Self {
        Self {
            quota: StorageQuota::from(&user),
            id: user.id,
            username: user.username,
            email: user.email,
            full_name: user.full_name,
            is_active: user.is_active,
            created_at: user.created_at,
        }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `ok` or `degraded`.
    pub status: String,
    pub version: String,
    /// Persistence backend name.
    pub database: String,
    /// `available` or `unavailable`.
    pub storage: String,
}
