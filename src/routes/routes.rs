//! Defines routes for the media upload and folder-management API.
//!
//! ## Structure
//! - **Image endpoints**
//!   - `POST   /api/upload` — multipart upload (`file` + optional `folder`)
//!   - `DELETE /api/upload?filename=` — delete a top-level upload
//!   - `GET    /api/upload/list?folder=` — merged listing of one folder
//!   - `DELETE /api/upload/delete` — delete by public URL (`{imageUrl}`)
//!
//! - **Folder endpoints**
//!   - `GET    /api/upload/folders?path=` — list folders under a parent
//!   - `POST   /api/upload/folders` — create (`{folderName, parentPath?}`)
//!   - `DELETE /api/upload/folders?path=` — recursive delete
//!   - `GET/DELETE /api/upload/cleanup` — inspect/remove legacy folders
//!
//! The router carries shared state (`AppState`) to all handlers.

use crate::{
    handlers::{
        folder_handlers::{
            cleanup_remove, cleanup_report, create_folder, delete_folder, list_folders,
        },
        health_handlers::{healthz, readyz},
        image_handlers::{delete_image, delete_upload, list_images, upload_image},
    },
    services::AppState,
};
use axum::{
    Router,
    routing::{delete, get, post},
};

/// Build and return the router for all media endpoints.
pub fn routes() -> Router<AppState> {
    Router::new()
        // health endpoints (mounted at root)
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // image endpoints
        .route("/api/upload", post(upload_image).delete(delete_upload))
        .route("/api/upload/list", get(list_images))
        .route("/api/upload/delete", delete(delete_image))
        // folder endpoints
        .route(
            "/api/upload/folders",
            get(list_folders).post(create_folder).delete(delete_folder),
        )
        .route(
            "/api/upload/cleanup",
            get(cleanup_report).delete(cleanup_remove),
        )
}
