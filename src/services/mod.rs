//! Core services: the folder and image operations over the two backends.
//!
//! Both services consult the blob store first and fall back to (or merge
//! with) the local filesystem mirror. They are stateless; every call is a
//! fresh request/response against the backends.

pub mod folder_service;
pub mod image_service;
pub mod paths;

use crate::storage::{LocalStore, ObjectStore};
use folder_service::FolderService;
use image_service::ImageService;
use std::sync::Arc;

/// Shared handler state: both services over the same pair of backends.
#[derive(Clone)]
pub struct AppState {
    pub folders: FolderService,
    pub images: ImageService,
    /// Kept for the readiness probe, which checks both backends directly.
    pub blob: Arc<dyn ObjectStore>,
    pub local: LocalStore,
}

impl AppState {
    pub fn new(blob: Arc<dyn ObjectStore>, local: LocalStore) -> Self {
        Self {
            folders: FolderService::new(blob.clone(), local.clone()),
            images: ImageService::new(blob.clone(), local.clone()),
            blob,
            local,
        }
    }
}
