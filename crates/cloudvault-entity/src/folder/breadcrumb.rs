//! Breadcrumb trail entries.

use serde::{Deserialize, Serialize};

use super::model::Folder;

/// One step of the root-first trail leading to a folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreadcrumbEntry {
    /// Folder ID.
    pub id: i64,
    /// Folder name.
    pub name: String,
    /// Full path.
    pub path: String,
}

impl From<&Folder> for BreadcrumbEntry {
    fn from(folder: &Folder) -> Self {
        Self {
            id: folder.id,
            name: folder.name.clone(),
            path: folder.path.clone(),
        }
    }
}
