//! Request DTOs with validation.

use serde::{Deserialize, Serialize};
use validator::Validate;

use cloudvault_core::error::AppError;
use cloudvault_core::result::AppResult;
use cloudvault_service::file::FileUpdate;
use cloudvault_service::folder::FolderUpdate;

/// Runs `validator` rules and maps failures to a validation error.
pub fn validated<T: Validate>(request: T) -> AppResult<T> {
    request
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;
    Ok(request)
}

/// Query for `GET /files`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListFilesQuery {
    /// Folder to list; root when absent.
    pub folder_id: Option<i64>,
}

/// Query for `GET /files/search`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Substring to look for.
    #[serde(default)]
    pub query: String,
    /// Comma-separated content type fragments.
    pub file_types: Option<String>,
    /// Restrict to one folder.
    pub folder_id: Option<i64>,
    /// Sort column.
    pub sort_by: Option<String>,
    /// `asc` or `desc`.
    pub sort_order: Option<String>,
}

/// Body of `PUT /files/{id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateFileRequest {
    /// New display name.
    #[validate(length(min = 1, max = 255, message = "Filename must be 1-255 characters"))]
    pub filename: Option<String>,
    /// Destination folder; `0` moves the file to the root.
    pub folder_id: Option<i64>,
    /// Visibility flag.
    pub is_public: Option<bool>,
    /// Free-text description.
    #[validate(length(max = 4096))]
    pub description: Option<String>,
    /// Replacement tags.
    pub tags: Option<Vec<String>>,
}

impl From<UpdateFileRequest> for FileUpdate {
    fn from(req: UpdateFileRequest) -> Self {
        Self {
            filename: req.filename,
            folder_id: req.folder_id,
            is_public: req.is_public,
            description: req.description,
            tags: req.tags,
        }
    }
}

/// Body of `POST /folders`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateFolderRequest {
    /// Folder name.
    #[validate(length(min = 1, max = 255, message = "Folder name must be 1-255 characters"))]
    pub name: String,
    /// Parent folder; root when absent or `0`.
    pub parent_id: Option<i64>,
}

/// Body of `PUT /folders/{id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateFolderRequest {
    /// New name.
    #[validate(length(min = 1, max = 255, message = "Folder name must be 1-255 characters"))]
    pub name: Option<String>,
    /// New parent; `0` moves the folder to the root.
    pub parent_id: Option<i64>,
}

impl From<UpdateFolderRequest> for FolderUpdate {
    fn from(req: UpdateFolderRequest) -> Self {
        Self {
            name: req.name,
            parent_id: req.parent_id,
        }
    }
}

/// Query for `GET /folders`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListFoldersQuery {
    /// Parent to list; root when absent.
    pub parent_id: Option<i64>,
}

/// Query for `DELETE /folders/{id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeleteFolderQuery {
    /// Remove non-empty folders with everything below them.
    #[serde(default)]
    pub force: bool,
}
