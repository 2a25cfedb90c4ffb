//! File repository implementation.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};

use cloudvault_core::error::{AppError, ErrorKind};
use cloudvault_core::result::AppResult;
use cloudvault_core::types::{PageRequest, PageResponse, SortDirection};
use cloudvault_entity::file::{CreateFile, File, FileSearch};

use super::violated_constraint;
use crate::store::FileStore;

/// Partial unique index over `(owner_id, file_hash)` for live rows.
const LIVE_HASH_INDEX: &str = "files_owner_hash_live_key";

/// Repository for file CRUD and query operations.
#[derive(Debug, Clone)]
pub struct FileRepository {
    pool: PgPool,
}

impl FileRepository {
    /// Create a new file repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Append the shared `WHERE` clause of a file search.
fn push_search_filters(
    builder: &mut QueryBuilder<'_, Postgres>,
    owner_id: i64,
    criteria: &FileSearch,
) {
    let pattern = criteria.query_pattern();

    builder.push(" WHERE owner_id = ");
    builder.push_bind(owner_id);
    builder.push(" AND NOT is_deleted AND (original_filename ILIKE ");
    builder.push_bind(pattern.clone());
    builder.push(" OR description ILIKE ");
    builder.push_bind(pattern.clone());
    builder.push(" OR array_to_string(tags, ' ') ILIKE ");
    builder.push_bind(pattern);
    builder.push(")");

    let type_patterns = criteria.type_patterns();
    if !type_patterns.is_empty() {
        builder.push(" AND (");
        for (i, type_pattern) in type_patterns.into_iter().enumerate() {
            if i > 0 {
                builder.push(" OR ");
            }
            builder.push("content_type ILIKE ");
            builder.push_bind(type_pattern);
        }
        builder.push(")");
    }

    if let Some(folder_id) = criteria.folder_id {
        builder.push(" AND folder_id = ");
        builder.push_bind(folder_id);
    }
}

#[async_trait]
impl FileStore for FileRepository {
    async fn find_owned(&self, owner_id: i64, id: i64) -> AppResult<Option<File>> {
        sqlx::query_as::<_, File>(
            "SELECT * FROM files WHERE id = $1 AND owner_id = $2 AND NOT is_deleted",
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find file", e))
    }

    async fn find_by_hash(&self, owner_id: i64, file_hash: &str) -> AppResult<Option<File>> {
        sqlx::query_as::<_, File>(
            "SELECT * FROM files WHERE owner_id = $1 AND file_hash = $2 AND NOT is_deleted",
        )
        .bind(owner_id)
        .bind(file_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find file by hash", e))
    }

    async fn create(&self, data: &CreateFile) -> AppResult<File> {
        sqlx::query_as::<_, File>(
            "INSERT INTO files (filename, original_filename, file_path, file_size, content_type, \
                                file_hash, folder_id, owner_id, upload_completed) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, TRUE) \
             RETURNING *",
        )
        .bind(&data.filename)
        .bind(&data.original_filename)
        .bind(&data.file_path)
        .bind(data.file_size)
        .bind(&data.content_type)
        .bind(&data.file_hash)
        .bind(data.folder_id)
        .bind(data.owner_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match violated_constraint(&e) {
            Some(LIVE_HASH_INDEX) => AppError::conflict("File already exists"),
            _ => AppError::with_source(ErrorKind::Database, "Failed to create file", e),
        })
    }

    async fn list(
        &self,
        owner_id: i64,
        folder_id: Option<i64>,
        page: &PageRequest,
    ) -> AppResult<Vec<File>> {
        sqlx::query_as::<_, File>(
            "SELECT * FROM files \
             WHERE owner_id = $1 AND folder_id IS NOT DISTINCT FROM $2 AND NOT is_deleted \
             ORDER BY id ASC LIMIT $3 OFFSET $4",
        )
        .bind(owner_id)
        .bind(folder_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list files", e))
    }

    async fn search(
        &self,
        owner_id: i64,
        criteria: &FileSearch,
        page: &PageRequest,
    ) -> AppResult<PageResponse<File>> {
        let mut count_query = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM files");
        push_search_filters(&mut count_query, owner_id, criteria);
        let total = count_query
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to count file matches", e)
            })?;

        let nulls = match criteria.sort_order {
            SortDirection::Asc => "NULLS FIRST",
            SortDirection::Desc => "NULLS LAST",
        };

        let mut query = QueryBuilder::<Postgres>::new("SELECT * FROM files");
        push_search_filters(&mut query, owner_id, criteria);
        query.push(format!(
            " ORDER BY {} {} {nulls}, id ASC LIMIT ",
            criteria.sort_by.column(),
            criteria.sort_order.as_sql()
        ));
        query.push_bind(page.limit());
        query.push(" OFFSET ");
        query.push_bind(page.offset());

        let files = query
            .build_query_as::<File>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to search files", e))?;

        Ok(PageResponse::new(files, total as u64))
    }

    async fn update(&self, file: &File) -> AppResult<File> {
        sqlx::query_as::<_, File>(
            "UPDATE files SET original_filename = $3, folder_id = $4, is_public = $5, \
                              description = $6, tags = $7, updated_at = NOW() \
             WHERE id = $1 AND owner_id = $2 AND NOT is_deleted \
             RETURNING *",
        )
        .bind(file.id)
        .bind(file.owner_id)
        .bind(&file.original_filename)
        .bind(file.folder_id)
        .bind(file.is_public)
        .bind(&file.description)
        .bind(&file.tags)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update file", e))?
        .ok_or_else(|| AppError::not_found("File not found"))
    }

    async fn mark_accessed(&self, owner_id: i64, id: i64) -> AppResult<Option<File>> {
        sqlx::query_as::<_, File>(
            "UPDATE files SET last_accessed = NOW() \
             WHERE id = $1 AND owner_id = $2 AND NOT is_deleted \
             RETURNING *",
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to mark file accessed", e))
    }

    async fn soft_delete(&self, owner_id: i64, id: i64) -> AppResult<Option<File>> {
        sqlx::query_as::<_, File>(
            "WITH deleted AS ( \
                UPDATE files SET is_deleted = TRUE, updated_at = NOW() \
                WHERE id = $1 AND owner_id = $2 AND NOT is_deleted \
                RETURNING * \
             ), released AS ( \
                UPDATE users \
                SET storage_used = GREATEST(storage_used - (SELECT file_size FROM deleted), 0), \
                    updated_at = NOW() \
                WHERE id = $2 AND EXISTS (SELECT 1 FROM deleted) \
             ) \
             SELECT * FROM deleted",
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete file", e))
    }

    async fn count_in_folder(&self, folder_id: i64) -> AppResult<u64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM files WHERE folder_id = $1 AND NOT is_deleted",
        )
        .bind(folder_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count files", e))?;
        Ok(count as u64)
    }

    async fn count_by_owner(&self, owner_id: i64) -> AppResult<u64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM files WHERE owner_id = $1 AND NOT is_deleted",
        )
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count files", e))?;
        Ok(count as u64)
    }
}
