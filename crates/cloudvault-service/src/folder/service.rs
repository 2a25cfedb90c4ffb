//! Folder hierarchy: creation, rename/move, breadcrumbs, and deletion.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{info, warn};

use cloudvault_core::error::AppError;
use cloudvault_core::result::AppResult;
use cloudvault_core::types::PageRequest;
use cloudvault_database::{FileStore, FolderStore};
use cloudvault_entity::folder::{
    BreadcrumbEntry, CreateFolder, Folder, PATH_SEPARATOR, PurgeOutcome,
};

use crate::context::RequestContext;

/// Requested folder changes.
#[derive(Debug, Clone, Default)]
pub struct FolderUpdate {
    /// New name.
    pub name: Option<String>,
    /// New parent; `0` means the root.
    pub parent_id: Option<i64>,
}

/// Manages an owner's folder forest.
#[derive(Debug, Clone)]
pub struct FolderService {
    folders: Arc<dyn FolderStore>,
    files: Arc<dyn FileStore>,
}

impl FolderService {
    /// Creates a new folder service.
    pub fn new(folders: Arc<dyn FolderStore>, files: Arc<dyn FileStore>) -> Self {
        Self { folders, files }
    }

    /// Creates a folder under `parent_id` (root when `None` or `0`).
    pub async fn create(
        &self,
        ctx: &RequestContext,
        name: &str,
        parent_id: Option<i64>,
    ) -> AppResult<Folder> {
        let name = normalize_name(name)?;
        let parent = match parent_id.filter(|&id| id != 0) {
            Some(id) => Some(self.owned_parent(ctx, id).await?),
            None => None,
        };
        let parent_id = parent.as_ref().map(|p| p.id);

        if self
            .folders
            .find_sibling(ctx.user_id, parent_id, &name)
            .await?
            .is_some()
        {
            return Err(sibling_conflict());
        }

        let folder = self
            .folders
            .create(&CreateFolder {
                path: Folder::path_under(parent.as_ref(), &name),
                name,
                parent_id,
                owner_id: ctx.user_id,
            })
            .await?;

        info!(
            user_id = ctx.user_id,
            folder_id = folder.id,
            path = %folder.path,
            "Folder created"
        );
        Ok(folder)
    }

    /// Gets an owned folder.
    pub async fn get(&self, ctx: &RequestContext, folder_id: i64) -> AppResult<Folder> {
        self.folders
            .find_owned(ctx.user_id, folder_id)
            .await?
            .ok_or_else(|| AppError::not_found("Folder not found"))
    }

    /// Folders directly under `parent_id` (root when `None` or `0`), by id.
    pub async fn list(
        &self,
        ctx: &RequestContext,
        parent_id: Option<i64>,
        page: PageRequest,
    ) -> AppResult<Vec<Folder>> {
        let parent_id = parent_id.filter(|&id| id != 0);
        self.folders
            .list_children(ctx.user_id, parent_id, &page)
            .await
    }

    /// Renames and/or moves a folder, cascading the new path to descendants.
    ///
    /// A folder can never be moved below itself.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        folder_id: i64,
        update: FolderUpdate,
    ) -> AppResult<Folder> {
        let folder = self.get(ctx, folder_id).await?;

        let name = match update.name {
            Some(name) => normalize_name(&name)?,
            None => folder.name.clone(),
        };

        let parent = match update.parent_id {
            None => match folder.parent_id {
                Some(id) => self.folders.find_by_id(id).await?,
                None => None,
            },
            Some(0) => None,
            Some(id) => {
                let parent = self.owned_parent(ctx, id).await?;
                self.ensure_not_below(&folder, &parent).await?;
                Some(parent)
            }
        };
        let parent_id = parent.as_ref().map(|p| p.id);

        if name == folder.name && parent_id == folder.parent_id {
            return Ok(folder);
        }

        let clash = self
            .folders
            .find_sibling(ctx.user_id, parent_id, &name)
            .await?
            .is_some_and(|sibling| sibling.id != folder.id);
        if clash {
            return Err(sibling_conflict());
        }

        let path = Folder::path_under(parent.as_ref(), &name);
        let updated = self
            .folders
            .move_folder(folder.id, &name, parent_id, &path)
            .await?;

        info!(
            user_id = ctx.user_id,
            folder_id,
            old_path = %folder.path,
            path = %updated.path,
            "Folder updated"
        );
        Ok(updated)
    }

    /// Ancestors of a folder followed by the folder itself, root first.
    pub async fn breadcrumb(
        &self,
        ctx: &RequestContext,
        folder_id: i64,
    ) -> AppResult<Vec<BreadcrumbEntry>> {
        let folder = self.get(ctx, folder_id).await?;

        let mut visited = HashSet::from([folder.id]);
        let mut trail = vec![BreadcrumbEntry::from(&folder)];
        let mut next = folder.parent_id;

        while let Some(parent_id) = next {
            if !visited.insert(parent_id) {
                warn!(user_id = ctx.user_id, folder_id, parent_id, "Cycle in folder parents");
                return Err(AppError::internal("Folder hierarchy contains a cycle"));
            }
            let parent = self
                .folders
                .find_owned(ctx.user_id, parent_id)
                .await?
                .ok_or_else(|| AppError::internal("Folder hierarchy is broken"))?;
            trail.push(BreadcrumbEntry::from(&parent));
            next = parent.parent_id;
        }

        trail.reverse();
        Ok(trail)
    }

    /// Deletes a folder.
    ///
    /// Without `force` the folder must be empty. With `force` every
    /// descendant folder is removed and every contained file soft-deleted,
    /// releasing its bytes from the quota.
    pub async fn delete(
        &self,
        ctx: &RequestContext,
        folder_id: i64,
        force: bool,
    ) -> AppResult<PurgeOutcome> {
        let folder = self.get(ctx, folder_id).await?;

        if !force {
            if self.folders.count_children(folder.id).await? > 0 {
                return Err(AppError::conflict(
                    "Folder contains subfolders. Use force=true to delete recursively.",
                ));
            }
            if self.files.count_in_folder(folder.id).await? > 0 {
                return Err(AppError::conflict(
                    "Folder contains files. Use force=true to delete all contents.",
                ));
            }
        }

        let mut doomed = self.subtree(ctx, folder.id).await?;
        doomed.reverse();
        let outcome = self.folders.purge(ctx.user_id, &doomed).await?;

        info!(
            user_id = ctx.user_id,
            folder_id,
            folders = outcome.folders_deleted,
            files = outcome.files_deleted,
            released = outcome.bytes_released,
            "Folder deleted"
        );
        Ok(outcome)
    }

    /// Pre-order ids of a folder and all its descendants, without recursion.
    async fn subtree(&self, ctx: &RequestContext, root_id: i64) -> AppResult<Vec<i64>> {
        let mut order = Vec::new();
        let mut seen = HashSet::new();
        let mut stack = vec![root_id];

        while let Some(id) = stack.pop() {
            if !seen.insert(id) {
                continue;
            }
            order.push(id);
            let mut children = self.folders.child_ids(ctx.user_id, id).await?;
            children.reverse();
            stack.extend(children);
        }
        Ok(order)
    }

    /// Fails if `candidate_parent` is `folder` or one of its descendants.
    async fn ensure_not_below(&self, folder: &Folder, candidate_parent: &Folder) -> AppResult<()> {
        let mut visited = HashSet::new();
        let mut cursor = Some(candidate_parent.id);

        while let Some(id) = cursor {
            if id == folder.id {
                return Err(AppError::validation(
                    "Cannot move a folder into itself or one of its subfolders",
                ));
            }
            if !visited.insert(id) {
                return Err(AppError::internal("Folder hierarchy contains a cycle"));
            }
            cursor = match self.folders.find_by_id(id).await? {
                Some(ancestor) => ancestor.parent_id,
                None => None,
            };
        }
        Ok(())
    }

    async fn owned_parent(&self, ctx: &RequestContext, parent_id: i64) -> AppResult<Folder> {
        self.folders
            .find_owned(ctx.user_id, parent_id)
            .await?
            .ok_or_else(|| AppError::not_found("Parent folder not found"))
    }
}

fn normalize_name(name: &str) -> AppResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::validation("Folder name cannot be empty"));
    }
    if name.contains(PATH_SEPARATOR) {
        return Err(AppError::validation(format!(
            "Folder name cannot contain '{PATH_SEPARATOR}'"
        )));
    }
    Ok(name.to_string())
}

fn sibling_conflict() -> AppError {
    AppError::conflict("A folder with this name already exists in this location")
}
