//! File upload, listing, search, metadata, and download handlers.

use axum::Json;
use axum::body::Body;
use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::Response;

use cloudvault_core::error::AppError;
use cloudvault_core::result::AppResult;
use cloudvault_entity::file::{File, FileSearch};
use cloudvault_service::file::UploadInput;

use crate::dto::request::{ListFilesQuery, SearchQuery, UpdateFileRequest, validated};
use crate::dto::response::{
    BulkUploadResponse, MessageResponse, SearchResponse, UploadResponse,
};
use crate::error::ApiResult;
use crate::extractors::{AuthUser, PaginationParams};
use crate::state::AppState;

/// Fallback when no content type was stored.
const OCTET_STREAM: &str = "application/octet-stream";

/// Parts of an upload form.
#[derive(Debug, Default)]
struct UploadForm {
    folder_id: Option<i64>,
    files: Vec<UploadInput>,
}

async fn read_upload_form(mut multipart: Multipart) -> AppResult<UploadForm> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "folder_id" => {
                let text = field.text().await.map_err(multipart_error)?;
                form.folder_id = parse_folder_id(&text)?;
            }
            "file" | "files" => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().map(str::to_string);
                let data = field.bytes().await.map_err(multipart_error)?;
                form.files.push(UploadInput {
                    filename,
                    content_type,
                    data,
                });
            }
            _ => {}
        }
    }

    Ok(form)
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::payload_too_large(e.body_text())
    } else {
        AppError::validation(format!("Invalid multipart body: {}", e.body_text()))
    }
}

fn parse_folder_id(text: &str) -> AppResult<Option<i64>> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }
    text.parse::<i64>()
        .map(Some)
        .map_err(|_| AppError::validation("Invalid folder_id"))
}

/// `attachment` disposition with characters that would break the quoting removed.
fn attachment_disposition(filename: &str) -> String {
    let safe: String = filename
        .chars()
        .map(|c| if c == '"' || c == '\\' || c.is_control() { '_' } else { c })
        .collect();
    format!("attachment; filename=\"{safe}\"")
}

/// POST /api/files/upload
pub async fn upload_file(
    State(state): State<AppState>,
    auth: AuthUser,
    multipart: Multipart,
) -> ApiResult<Json<UploadResponse>> {
    let mut form = read_upload_form(multipart).await?;
    let input = form
        .files
        .pop()
        .ok_or_else(|| AppError::validation("file is required"))?;

    let outcome = state
        .upload_service
        .upload(&auth, form.folder_id, input)
        .await?;

    Ok(Json(UploadResponse::from(&outcome)))
}

/// POST /api/files/upload/multiple
pub async fn upload_multiple(
    State(state): State<AppState>,
    auth: AuthUser,
    multipart: Multipart,
) -> ApiResult<Json<BulkUploadResponse>> {
    let form = read_upload_form(multipart).await?;
    if form.files.is_empty() {
        return Err(AppError::validation("files are required").into());
    }

    let report = state
        .upload_service
        .upload_many(&auth, form.folder_id, form.files)
        .await?;

    Ok(Json(BulkUploadResponse::from(report)))
}

/// GET /api/files?folder_id=&skip=&limit=
pub async fn list_files(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(filter): Query<ListFilesQuery>,
    Query(page): Query<PaginationParams>,
) -> ApiResult<Json<Vec<File>>> {
    let page = page.into_page_request(&state.config.storage);
    let files = state
        .search_service
        .list(&auth, filter.folder_id, page)
        .await?;
    Ok(Json(files))
}

/// GET /api/files/search?query=...
pub async fn search_files(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<SearchQuery>,
    Query(page): Query<PaginationParams>,
) -> ApiResult<Json<SearchResponse>> {
    let criteria = FileSearch::parse(
        &query.query,
        query.file_types.as_deref(),
        query.folder_id,
        query.sort_by.as_deref(),
        query.sort_order.as_deref(),
    )?;
    let page = page.into_page_request(&state.config.storage);

    let results = state.search_service.search(&auth, criteria, page).await?;
    Ok(Json(SearchResponse::from(results)))
}

/// GET /api/files/{id}
pub async fn get_file(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<File>> {
    let file = state.file_service.get(&auth, id).await?;
    Ok(Json(file))
}

/// GET /api/files/{id}/download
pub async fn download_file(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<Response> {
    let download = state.file_service.download(&auth, id).await?;
    let content_type = download
        .file
        .content_type
        .clone()
        .filter(|ct| !ct.is_empty())
        .unwrap_or_else(|| OCTET_STREAM.to_string());

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(
            header::CONTENT_DISPOSITION,
            attachment_disposition(&download.file.original_filename),
        )
        .header(header::CONTENT_LENGTH, download.size)
        .body(Body::from_stream(download.stream))
        .map_err(|e| AppError::internal(format!("Response build failed: {e}")).into())
}

/// PUT /api/files/{id}
pub async fn update_file(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i64>,
    Json(req): Json<UpdateFileRequest>,
) -> ApiResult<Json<File>> {
    let req = validated(req)?;
    let file = state.file_service.update(&auth, id, req.into()).await?;
    Ok(Json(file))
}

/// DELETE /api/files/{id}
pub async fn delete_file(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<MessageResponse>> {
    state.file_service.delete(&auth, id).await?;
    Ok(Json(MessageResponse::new("File deleted successfully")))
}
