//! Folder hierarchy handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;

use cloudvault_entity::folder::{BreadcrumbEntry, Folder};

use crate::dto::request::{
    CreateFolderRequest, DeleteFolderQuery, ListFoldersQuery, UpdateFolderRequest, validated,
};
use crate::dto::response::DeleteFolderResponse;
use crate::error::ApiResult;
use crate::extractors::{AuthUser, PaginationParams};
use crate::state::AppState;

/// POST /api/folders
pub async fn create_folder(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<CreateFolderRequest>,
) -> ApiResult<(StatusCode, Json<Folder>)> {
    let req = validated(req)?;
    let folder = state
        .folder_service
        .create(&auth, &req.name, req.parent_id)
        .await?;
    Ok((StatusCode::CREATED, Json(folder)))
}

/// GET /api/folders?parent_id=&skip=&limit=
pub async fn list_folders(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(filter): Query<ListFoldersQuery>,
    Query(page): Query<PaginationParams>,
) -> ApiResult<Json<Vec<Folder>>> {
    let page = page.into_page_request(&state.config.storage);
    let folders = state
        .folder_service
        .list(&auth, filter.parent_id, page)
        .await?;
    Ok(Json(folders))
}

/// GET /api/folders/{id}
pub async fn get_folder(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<Folder>> {
    Ok(Json(state.folder_service.get(&auth, id).await?))
}

/// GET /api/folders/{id}/breadcrumb
pub async fn get_breadcrumb(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<Vec<BreadcrumbEntry>>> {
    Ok(Json(state.folder_service.breadcrumb(&auth, id).await?))
}

/// PUT /api/folders/{id}
pub async fn update_folder(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i64>,
    Json(req): Json<UpdateFolderRequest>,
) -> ApiResult<Json<Folder>> {
    let req = validated(req)?;
    let folder = state.folder_service.update(&auth, id, req.into()).await?;
    Ok(Json(folder))
}

/// DELETE /api/folders/{id}?force=
pub async fn delete_folder(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i64>,
    Query(query): Query<DeleteFolderQuery>,
) -> ApiResult<Json<DeleteFolderResponse>> {
    let outcome = state
        .folder_service
        .delete(&auth, id, query.force)
        .await?;
    Ok(Json(DeleteFolderResponse::from(outcome)))
}
