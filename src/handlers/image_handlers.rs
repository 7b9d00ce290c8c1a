//! HTTP handlers for image upload, listing, and deletion.
//! Thin request/response shells; all storage concerns live in `ImageService`.

use crate::{
    errors::AppError,
    models::image::{ImageEntry, UploadResult},
    services::{AppState, image_service::UploadedFile},
};
use axum::{
    Json,
    extract::{Multipart, Query, State},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct ListImagesQuery {
    pub folder: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DeleteUploadQuery {
    pub filename: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteImageRequest {
    pub image_url: String,
}

#[derive(Serialize)]
pub struct UploadResponse {
    pub success: bool,
    #[serde(flatten)]
    pub result: UploadResult,
}

#[derive(Serialize)]
pub struct ListImagesResponse {
    pub success: bool,
    pub images: Vec<ImageEntry>,
    pub count: usize,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

/// POST `/api/upload` — multipart form with `file` and optional `folder`.
pub async fn upload_image(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let mut folder: Option<String> = None;
    let mut file: Option<UploadedFile> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| AppError::bad_request(format!("Multipart error: {err}")))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "folder" => {
                folder = Some(
                    field
                        .text()
                        .await
                        .map_err(|err| AppError::bad_request(format!("Read error: {err}")))?,
                );
            }
            "file" => {
                let file_name = field.file_name().unwrap_or("file").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|err| AppError::bad_request(format!("Read error: {err}")))?;
                file = Some(UploadedFile {
                    name: file_name,
                    content_type,
                    bytes,
                });
            }
            _ => {}
        }
    }

    let file = file.ok_or_else(|| AppError::bad_request("No file uploaded"))?;
    let result = state.images.upload_image(file, folder.as_deref()).await?;

    Ok(Json(UploadResponse {
        success: true,
        result,
    }))
}

/// GET `/api/upload/list?folder=<name|root>` — merged listing of one folder.
pub async fn list_images(
    State(state): State<AppState>,
    Query(query): Query<ListImagesQuery>,
) -> Result<Json<ListImagesResponse>, AppError> {
    let images = state.images.list_images(query.folder.as_deref()).await?;
    Ok(Json(ListImagesResponse {
        success: true,
        count: images.len(),
        images,
    }))
}

/// DELETE `/api/upload?filename=<name>` — delete a top-level upload.
pub async fn delete_upload(
    State(state): State<AppState>,
    Query(query): Query<DeleteUploadQuery>,
) -> Result<Json<MessageResponse>, AppError> {
    let filename = query
        .filename
        .ok_or_else(|| AppError::bad_request("Filename is required"))?;
    state.images.delete_by_filename(&filename).await?;
    Ok(Json(MessageResponse {
        success: true,
        message: format!("Deleted {filename}"),
    }))
}

/// DELETE `/api/upload/delete` — delete one image by its public URL.
pub async fn delete_image(
    State(state): State<AppState>,
    Json(request): Json<DeleteImageRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    state.images.delete_image(&request.image_url).await?;
    Ok(Json(MessageResponse {
        success: true,
        message: "Image deleted successfully".into(),
    }))
}
