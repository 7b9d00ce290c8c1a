//! HTTP handlers for folder management and the legacy-folder cleanup.

use crate::{
    errors::AppError,
    models::cleanup::{CleanupOutcome, CleanupReport},
    models::folder::FolderDescriptor,
    services::AppState,
};
use axum::{
    Json,
    extract::{Query, State},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct FolderPathQuery {
    pub path: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFolderRequest {
    pub folder_name: String,
    pub parent_path: Option<String>,
}

#[derive(Serialize)]
pub struct ListFoldersResponse {
    pub success: bool,
    pub folders: Vec<FolderDescriptor>,
}

#[derive(Serialize)]
pub struct CreateFolderResponse {
    pub success: bool,
    pub folder: FolderDescriptor,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Serialize)]
pub struct CleanupReportResponse {
    pub success: bool,
    pub results: Vec<CleanupReport>,
}

#[derive(Serialize)]
pub struct CleanupOutcomeResponse {
    pub success: bool,
    pub results: Vec<CleanupOutcome>,
}

/// GET `/api/upload/folders?path=<parentPath>` — list folders, optionally
/// scoped to a parent.
pub async fn list_folders(
    State(state): State<AppState>,
    Query(query): Query<FolderPathQuery>,
) -> Result<Json<ListFoldersResponse>, AppError> {
    let folders = state.folders.list_folders(query.path.as_deref()).await?;
    Ok(Json(ListFoldersResponse {
        success: true,
        folders,
    }))
}

/// POST `/api/upload/folders` — create a folder (nested when `parentPath`
/// is given).
pub async fn create_folder(
    State(state): State<AppState>,
    Json(request): Json<CreateFolderRequest>,
) -> Result<Json<CreateFolderResponse>, AppError> {
    let folder = state
        .folders
        .create_folder(&request.folder_name, request.parent_path.as_deref())
        .await?;
    Ok(Json(CreateFolderResponse {
        success: true,
        folder,
    }))
}

/// DELETE `/api/upload/folders?path=<folderPath>` — recursive delete.
pub async fn delete_folder(
    State(state): State<AppState>,
    Query(query): Query<FolderPathQuery>,
) -> Result<Json<MessageResponse>, AppError> {
    let path = query
        .path
        .ok_or_else(|| AppError::bad_request("Folder path is required"))?;
    state.folders.delete_folder(&path).await?;
    Ok(Json(MessageResponse {
        success: true,
        message: format!("Folder {path} deleted"),
    }))
}

/// GET `/api/upload/cleanup` — inspect the legacy bucket-root folders.
pub async fn cleanup_report(
    State(state): State<AppState>,
) -> Result<Json<CleanupReportResponse>, AppError> {
    let results = state.folders.cleanup_report().await;
    Ok(Json(CleanupReportResponse {
        success: true,
        results,
    }))
}

/// DELETE `/api/upload/cleanup` — remove the legacy bucket-root folders.
pub async fn cleanup_remove(
    State(state): State<AppState>,
) -> Result<Json<CleanupOutcomeResponse>, AppError> {
    let results = state.folders.cleanup_remove().await;
    Ok(Json(CleanupOutcomeResponse {
        success: true,
        results,
    }))
}
