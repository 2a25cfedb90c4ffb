//! Folder entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Separator between ancestor names in a materialized path.
pub const PATH_SEPARATOR: char = '/';

/// A folder in an owner's hierarchy.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Folder {
    /// Unique folder identifier.
    pub id: i64,
    /// Folder name, unique among siblings.
    pub name: String,
    /// Materialized path (e.g., `Documents/Photos`).
    pub path: String,
    /// Parent folder ID (null for root folders).
    pub parent_id: Option<i64>,
    /// The folder owner.
    pub owner_id: i64,
    /// When the folder was created.
    pub created_at: DateTime<Utc>,
    /// When the folder was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Folder {
    /// Check if this is a root folder (no parent).
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Path of a child folder called `name`.
    pub fn child_path(&self, name: &str) -> String {
        format!("{}{PATH_SEPARATOR}{name}", self.path)
    }

    /// Path of a folder called `name` placed under `parent` (or at the root).
    pub fn path_under(parent: Option<&Folder>, name: &str) -> String {
        match parent {
            Some(parent) => parent.child_path(name),
            None => name.to_string(),
        }
    }
}

/// Data required to create a new folder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFolder {
    /// Folder name.
    pub name: String,
    /// Full materialized path.
    pub path: String,
    /// Parent folder (None for root).
    pub parent_id: Option<i64>,
    /// The folder owner.
    pub owner_id: i64,
}

/// Result of removing a folder subtree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurgeOutcome {
    /// Folders removed.
    pub folders_deleted: u64,
    /// Files flagged as deleted.
    pub files_deleted: u64,
    /// Bytes released from the owner's quota.
    pub bytes_released: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn folder(name: &str, path: &str) -> Folder {
        Folder {
            id: 1,
            name: name.to_string(),
            path: path.to_string(),
            parent_id: None,
            owner_id: 1,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_root_path_is_name() {
        assert_eq!(Folder::path_under(None, "Photos"), "Photos");
    }

    #[test]
    fn test_child_path_joins_parent() {
        let docs = folder("Documents", "Documents");
        assert_eq!(Folder::path_under(Some(&docs), "Photos"), "Documents/Photos");
    }
}
