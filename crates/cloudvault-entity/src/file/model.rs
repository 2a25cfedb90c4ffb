//! File entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A file owned by a user.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct File {
    /// Unique file identifier.
    pub id: i64,
    /// System-generated storage name (`<uuid><ext>`).
    pub filename: String,
    /// Name supplied by the uploader.
    pub original_filename: String,
    /// Object key within the storage provider.
    #[serde(skip_serializing, default)]
    pub file_path: String,
    /// File size in bytes.
    pub file_size: i64,
    /// MIME type of the file.
    pub content_type: Option<String>,
    /// SHA-256 hex digest of the content.
    pub file_hash: String,
    /// Containing folder (None for root).
    pub folder_id: Option<i64>,
    /// The file owner.
    pub owner_id: i64,
    /// User supplied description.
    pub description: Option<String>,
    /// User supplied tags.
    pub tags: Vec<String>,
    /// Whether the file is marked public.
    pub is_public: bool,
    /// Soft-delete flag.
    pub is_deleted: bool,
    /// Whether the bytes were fully persisted.
    pub upload_completed: bool,
    /// When the file was created.
    pub created_at: DateTime<Utc>,
    /// When the file was last updated.
    pub updated_at: DateTime<Utc>,
    /// When the file metadata or content was last read.
    pub last_accessed: Option<DateTime<Utc>>,
}

impl File {
    /// Get the extension of the original name (lowercase), if any.
    pub fn extension(&self) -> Option<String> {
        extension_of(&self.original_filename)
    }

    /// Content type to serve, falling back to `application/octet-stream`.
    pub fn effective_content_type(&self) -> &str {
        self.content_type
            .as_deref()
            .filter(|ct| !ct.is_empty())
            .unwrap_or("application/octet-stream")
    }
}

/// Extension of `name` including the leading dot, lowercased.
pub fn extension_of(name: &str) -> Option<String> {
    let (stem, ext) = name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() || ext.contains(|c: char| c == '/' || c == '\\') {
        return None;
    }
    Some(format!(".{}", ext.to_lowercase()))
}

/// Data required to create a new file record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFile {
    /// Storage name.
    pub filename: String,
    /// Name supplied by the uploader.
    pub original_filename: String,
    /// Object key within the storage provider.
    pub file_path: String,
    /// File size in bytes.
    pub file_size: i64,
    /// MIME type.
    pub content_type: Option<String>,
    /// SHA-256 hex digest.
    pub file_hash: String,
    /// Containing folder.
    pub folder_id: Option<i64>,
    /// The file owner.
    pub owner_id: i64,
}

/// Metadata changes requested by the owner. `None` leaves a field as is.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileChanges {
    /// New display name.
    pub original_filename: Option<String>,
    /// New folder; `Some(None)` moves the file to the root.
    pub folder_id: Option<Option<i64>>,
    /// New visibility.
    pub is_public: Option<bool>,
    /// New description.
    pub description: Option<String>,
    /// Replacement tag list.
    pub tags: Option<Vec<String>>,
}

impl FileChanges {
    /// Whether any field would change.
    pub fn is_empty(&self) -> bool {
        self.original_filename.is_none()
            && self.folder_id.is_none()
            && self.is_public.is_none()
            && self.description.is_none()
            && self.tags.is_none()
    }

    /// Apply the changes to a file row and stamp `updated_at`.
    pub fn apply(self, file: &mut File) {
        if let Some(name) = self.original_filename {
            file.original_filename = name;
        }
        if let Some(folder_id) = self.folder_id {
            file.folder_id = folder_id;
        }
        if let Some(is_public) = self.is_public {
            file.is_public = is_public;
        }
        if let Some(description) = self.description {
            file.description = Some(description);
        }
        if let Some(tags) = self.tags {
            file.tags = tags;
        }
        file.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of("report.PDF").as_deref(), Some(".pdf"));
        assert_eq!(extension_of("archive.tar.gz").as_deref(), Some(".gz"));
        assert_eq!(extension_of("README"), None);
        assert_eq!(extension_of(".bashrc"), None);
        assert_eq!(extension_of("trailing."), None);
    }

    #[test]
    fn test_changes_move_to_root() {
        let now = Utc::now();
        let mut file = File {
            id: 1,
            filename: "a.txt".into(),
            original_filename: "a.txt".into(),
            file_path: "user_1/a.txt".into(),
            file_size: 3,
            content_type: None,
            file_hash: "abc".into(),
            folder_id: Some(9),
            owner_id: 1,
            description: None,
            tags: Vec::new(),
            is_public: false,
            is_deleted: false,
            upload_completed: true,
            created_at: now,
            updated_at: now,
            last_accessed: None,
        };

        FileChanges {
            folder_id: Some(None),
            is_public: Some(true),
            ..Default::default()
        }
        .apply(&mut file);

        assert_eq!(file.folder_id, None);
        assert!(file.is_public);
        assert_eq!(file.original_filename, "a.txt");
        assert_eq!(file.effective_content_type(), "application/octet-stream");
    }
}
