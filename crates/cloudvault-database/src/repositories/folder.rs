//! Folder repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;

use cloudvault_core::error::{AppError, ErrorKind};
use cloudvault_core::result::AppResult;
use cloudvault_core::types::{PageRequest, PageResponse};
use cloudvault_entity::file::search::ilike_contains;
use cloudvault_entity::folder::{CreateFolder, Folder, PATH_SEPARATOR, PurgeOutcome};

use super::violated_constraint;
use crate::store::FolderStore;

/// Unique index over `(owner_id, COALESCE(parent_id, 0), name)`.
const SIBLING_NAME_INDEX: &str = "folders_owner_parent_name_key";

/// Repository for folder CRUD and tree queries.
#[derive(Debug, Clone)]
pub struct FolderRepository {
    pool: PgPool,
}

impl FolderRepository {
    /// Create a new folder repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn db_error(action: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
    move |e| AppError::with_source(ErrorKind::Database, action, e)
}

fn map_write_error(e: sqlx::Error, action: &'static str) -> AppError {
    match violated_constraint(&e) {
        Some(SIBLING_NAME_INDEX) => {
            AppError::conflict("A folder with this name already exists in this location")
        }
        _ => AppError::with_source(ErrorKind::Database, action, e),
    }
}

#[async_trait]
impl FolderStore for FolderRepository {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<Folder>> {
        sqlx::query_as::<_, Folder>("SELECT * FROM folders WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find folder", e))
    }

    async fn find_owned(&self, owner_id: i64, id: i64) -> AppResult<Option<Folder>> {
        sqlx::query_as::<_, Folder>("SELECT * FROM folders WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find folder", e))
    }

    async fn find_sibling(
        &self,
        owner_id: i64,
        parent_id: Option<i64>,
        name: &str,
    ) -> AppResult<Option<Folder>> {
        sqlx::query_as::<_, Folder>(
            "SELECT * FROM folders \
             WHERE owner_id = $1 AND parent_id IS NOT DISTINCT FROM $2 AND name = $3",
        )
        .bind(owner_id)
        .bind(parent_id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find sibling folder", e))
    }

    async fn list_children(
        &self,
        owner_id: i64,
        parent_id: Option<i64>,
        page: &PageRequest,
    ) -> AppResult<Vec<Folder>> {
        sqlx::query_as::<_, Folder>(
            "SELECT * FROM folders \
             WHERE owner_id = $1 AND parent_id IS NOT DISTINCT FROM $2 \
             ORDER BY id ASC LIMIT $3 OFFSET $4",
        )
        .bind(owner_id)
        .bind(parent_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list folders", e))
    }

    async fn child_ids(&self, owner_id: i64, folder_id: i64) -> AppResult<Vec<i64>> {
        sqlx::query_scalar::<_, i64>(
            "SELECT id FROM folders WHERE owner_id = $1 AND parent_id = $2 ORDER BY id ASC",
        )
        .bind(owner_id)
        .bind(folder_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list child folders", e))
    }

    async fn count_children(&self, folder_id: i64) -> AppResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM folders WHERE parent_id = $1")
            .bind(folder_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to count children", e)
            })?;
        Ok(count as u64)
    }

    async fn create(&self, data: &CreateFolder) -> AppResult<Folder> {
        sqlx::query_as::<_, Folder>(
            "INSERT INTO folders (name, path, parent_id, owner_id) \
             VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(&data.name)
        .bind(&data.path)
        .bind(data.parent_id)
        .bind(data.owner_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "Failed to create folder"))
    }

    async fn move_folder(
        &self,
        folder_id: i64,
        name: &str,
        parent_id: Option<i64>,
        path: &str,
    ) -> AppResult<Folder> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin folder move"))?;

        // Blocks children from being attached until the new paths are committed
        sqlx::query("SELECT id FROM folders WHERE id = $1 FOR UPDATE")
            .bind(folder_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(db_error("Failed to lock folder"))?
            .ok_or_else(|| AppError::not_found(format!("Folder {folder_id} not found")))?;

        let folder = sqlx::query_as::<_, Folder>(
            "UPDATE folders SET name = $2, parent_id = $3, path = $4, updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(folder_id)
        .bind(name)
        .bind(parent_id)
        .bind(path)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_write_error(e, "Failed to update folder"))?;

        let rewritten = sqlx::query(
            "WITH RECURSIVE tree (id, path) AS ( \
                SELECT id, $2::TEXT || $3::TEXT || name FROM folders WHERE parent_id = $1 \
                UNION ALL \
                SELECT f.id, t.path || $3::TEXT || f.name \
                FROM folders f INNER JOIN tree t ON f.parent_id = t.id \
             ) \
             UPDATE folders SET path = tree.path, updated_at = NOW() \
             FROM tree WHERE folders.id = tree.id",
        )
        .bind(folder_id)
        .bind(&folder.path)
        .bind(PATH_SEPARATOR.to_string())
        .execute(&mut *tx)
        .await
        .map_err(db_error("Failed to rewrite descendant paths"))?
        .rows_affected();

        tx.commit()
            .await
            .map_err(db_error("Failed to commit folder move"))?;

        debug!(folder_id, descendants = rewritten, "Folder paths rewritten");
        Ok(folder)
    }

    async fn search(
        &self,
        owner_id: i64,
        query: &str,
        parent_id: Option<i64>,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Folder>> {
        let pattern = ilike_contains(query);

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM folders \
             WHERE owner_id = $1 AND name ILIKE $2 AND ($3::BIGINT IS NULL OR parent_id = $3)",
        )
        .bind(owner_id)
        .bind(&pattern)
        .bind(parent_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to count folder matches", e)
        })?;

        let folders = sqlx::query_as::<_, Folder>(
            "SELECT * FROM folders \
             WHERE owner_id = $1 AND name ILIKE $2 AND ($3::BIGINT IS NULL OR parent_id = $3) \
             ORDER BY id ASC LIMIT $4 OFFSET $5",
        )
        .bind(owner_id)
        .bind(&pattern)
        .bind(parent_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to search folders", e))?;

        Ok(PageResponse::new(folders, total as u64))
    }

    async fn purge(&self, owner_id: i64, folder_ids: &[i64]) -> AppResult<PurgeOutcome> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin folder purge"))?;

        // Lock the known folders first so no new child can attach to them,
        // then pick up any descendant created since the caller listed them.
        sqlx::query("SELECT id FROM folders WHERE owner_id = $1 AND id = ANY($2) FOR UPDATE")
            .bind(owner_id)
            .bind(folder_ids)
            .fetch_all(&mut *tx)
            .await
            .map_err(db_error("Failed to lock folders"))?;

        let subtree: Vec<i64> = sqlx::query_scalar(
            "WITH RECURSIVE tree AS ( \
                SELECT id FROM folders WHERE owner_id = $1 AND id = ANY($2) \
                UNION \
                SELECT f.id FROM folders f INNER JOIN tree t ON f.parent_id = t.id \
             ) \
             SELECT id FROM folders WHERE id IN (SELECT id FROM tree) FOR UPDATE",
        )
        .bind(owner_id)
        .bind(folder_ids)
        .fetch_all(&mut *tx)
        .await
        .map_err(db_error("Failed to collect folder subtree"))?;

        let (files_deleted, bytes_released): (i64, i64) = sqlx::query_as(
            "WITH deleted AS ( \
                UPDATE files SET is_deleted = TRUE, updated_at = NOW() \
                WHERE owner_id = $1 AND folder_id = ANY($2) AND NOT is_deleted \
                RETURNING file_size \
             ) SELECT COUNT(*), COALESCE(SUM(file_size), 0)::BIGINT FROM deleted",
        )
        .bind(owner_id)
        .bind(&subtree)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_error("Failed to delete folder contents"))?;

        sqlx::query(
            "UPDATE users SET storage_used = GREATEST(storage_used - $2, 0), updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(owner_id)
        .bind(bytes_released)
        .execute(&mut *tx)
        .await
        .map_err(db_error("Failed to release storage"))?;

        // One statement, so the parent_id reference is checked once all rows are gone
        let folders_deleted =
            sqlx::query("DELETE FROM folders WHERE owner_id = $1 AND id = ANY($2)")
                .bind(owner_id)
                .bind(&subtree)
                .execute(&mut *tx)
                .await
                .map_err(db_error("Failed to delete folders"))?
                .rows_affected();

        tx.commit()
            .await
            .map_err(db_error("Failed to commit folder purge"))?;

        Ok(PurgeOutcome {
            folders_deleted,
            files_deleted: files_deleted as u64,
            bytes_released,
        })
    }

    async fn count_by_owner(&self, owner_id: i64) -> AppResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM folders WHERE owner_id = $1")
            .bind(owner_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count folders", e))?;
        Ok(count as u64)
    }
}
