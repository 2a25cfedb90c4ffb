//! Sortable file columns.

use std::cmp::Ordering;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use cloudvault_core::error::AppError;

use super::model::File;

/// A file column search results may be ordered by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileSortKey {
    /// Insertion order.
    Id,
    /// Storage name.
    Filename,
    /// Uploaded name.
    OriginalFilename,
    /// Size in bytes.
    FileSize,
    /// MIME type.
    ContentType,
    /// Creation time.
    #[default]
    CreatedAt,
    /// Last modification time.
    UpdatedAt,
    /// Last read time.
    LastAccessed,
}

impl FileSortKey {
    /// All accepted keys, in the spelling clients use.
    pub const ALL: [&'static str; 8] = [
        "id",
        "filename",
        "original_filename",
        "file_size",
        "content_type",
        "created_at",
        "updated_at",
        "last_accessed",
    ];

    /// The SQL column backing this key.
    pub fn column(&self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Filename => "filename",
            Self::OriginalFilename => "original_filename",
            Self::FileSize => "file_size",
            Self::ContentType => "content_type",
            Self::CreatedAt => "created_at",
            Self::UpdatedAt => "updated_at",
            Self::LastAccessed => "last_accessed",
        }
    }

    /// Ascending comparison of two files on this key. Missing values sort first.
    pub fn compare(&self, a: &File, b: &File) -> Ordering {
        match self {
            Self::Id => a.id.cmp(&b.id),
            Self::Filename => a.filename.cmp(&b.filename),
            Self::OriginalFilename => a.original_filename.cmp(&b.original_filename),
            Self::FileSize => a.file_size.cmp(&b.file_size),
            Self::ContentType => a.content_type.cmp(&b.content_type),
            Self::CreatedAt => a.created_at.cmp(&b.created_at),
            Self::UpdatedAt => a.updated_at.cmp(&b.updated_at),
            Self::LastAccessed => a.last_accessed.cmp(&b.last_accessed),
        }
    }
}

impl FromStr for FileSortKey {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "id" => Ok(Self::Id),
            "filename" => Ok(Self::Filename),
            "original_filename" => Ok(Self::OriginalFilename),
            "file_size" => Ok(Self::FileSize),
            "content_type" => Ok(Self::ContentType),
            "created_at" => Ok(Self::CreatedAt),
            "updated_at" => Ok(Self::UpdatedAt),
            "last_accessed" => Ok(Self::LastAccessed),
            other => Err(AppError::validation(format!(
                "Invalid sort_by '{other}'. Expected one of: {}",
                Self::ALL.join(", ")
            ))),
        }
    }
}
