//! Folder operations over the virtual namespace.
//!
//! Folders are pure projections of key prefixes. Listing merges both
//! backends (blob wins on name collisions), creation writes the empty-folder
//! placeholder, and deletion walks the prefix depth-first, batching deletes
//! per level.

use crate::errors::{MediaError, MediaResult};
use crate::models::cleanup::{CleanupOutcome, CleanupReport};
use crate::models::folder::{FolderDescriptor, Source};
use crate::services::paths;
use crate::storage::{LocalStore, ObjectStore};
use bytes::Bytes;
use futures::FutureExt;
use futures::future::BoxFuture;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Clone)]
pub struct FolderService {
    blob: Arc<dyn ObjectStore>,
    local: LocalStore,
}

impl FolderService {
    pub fn new(blob: Arc<dyn ObjectStore>, local: LocalStore) -> Self {
        Self { blob, local }
    }

    /// List folders under `parent` (top level when absent), merged from both
    /// backends and sorted by name. An empty result is a valid answer, never
    /// padded with defaults.
    pub async fn list_folders(
        &self,
        parent: Option<&str>,
    ) -> MediaResult<Vec<FolderDescriptor>> {
        let parent = paths::normalize_folder(parent);
        if let Some(p) = parent.as_deref() {
            if !paths::is_safe_folder_path(p) {
                return Err(MediaError::Validation("Invalid folder path".into()));
            }
        }
        let prefix = paths::prefix_for(parent.as_deref());

        // Name -> descriptor; BTreeMap keeps the merged set sorted. Blob
        // entries are inserted first and win on collisions.
        let mut merged: BTreeMap<String, FolderDescriptor> = BTreeMap::new();

        match self.blob.list(&prefix).await {
            Ok(entries) => {
                for entry in entries {
                    if entry.is_placeholder() || entry.is_file() {
                        continue;
                    }
                    // A deeper relative path contributes only its first
                    // segment as the folder name.
                    let name = entry
                        .filename
                        .split('/')
                        .next()
                        .unwrap_or(&entry.filename)
                        .to_string();
                    merged
                        .entry(name.clone())
                        .or_insert_with(|| descriptor(&name, parent.as_deref(), Source::Blob));
                }
            }
            Err(err) => warn!("blob folder listing degraded to empty: {}", err),
        }

        match self.local.list(&prefix).await {
            Ok(entries) => {
                for entry in entries {
                    if entry.is_placeholder() || entry.is_file() {
                        continue;
                    }
                    let name = entry.filename.clone();
                    merged
                        .entry(name.clone())
                        .or_insert_with(|| descriptor(&name, parent.as_deref(), Source::Local));
                }
            }
            Err(err) => warn!("local folder listing degraded to empty: {}", err),
        }

        Ok(merged.into_values().collect())
    }

    /// Create a folder by writing its placeholder object; fall back to a
    /// local directory when the blob store rejects the write.
    pub async fn create_folder(
        &self,
        name: &str,
        parent: Option<&str>,
    ) -> MediaResult<FolderDescriptor> {
        let sanitized = paths::sanitize_folder_name(name)
            .ok_or_else(|| MediaError::Validation("Invalid folder name".into()))?;
        let parent = paths::normalize_folder(parent);
        if let Some(p) = parent.as_deref() {
            if !paths::is_safe_folder_path(p) {
                return Err(MediaError::Validation("Invalid folder path".into()));
            }
        }

        let desc = descriptor(&sanitized, parent.as_deref(), Source::Blob);
        let placeholder_key = paths::join_key(&desc.path, paths::FOLDER_PLACEHOLDER);

        match self
            .blob
            .put(&placeholder_key, Bytes::new(), "text/plain")
            .await
        {
            Ok(()) => {
                info!(folder = %desc.full_path, "created folder");
                Ok(desc)
            }
            Err(err) => {
                warn!("blob folder create failed, using local fallback: {}", err);
                self.local.create_dir(&desc.path).await?;
                info!(folder = %desc.full_path, "created local folder");
                Ok(FolderDescriptor {
                    source: Source::Local,
                    ..desc
                })
            }
        }
    }

    /// Recursively delete a folder and everything under it.
    ///
    /// Walks the blob store depth-first, batch-deleting the file entries at
    /// each level before recursing into subfolders. On any blob failure the
    /// whole operation falls back to one native recursive removal of the
    /// mirrored local directory.
    pub async fn delete_folder(&self, path: &str) -> MediaResult<()> {
        if !paths::is_safe_folder_path(path) {
            return Err(MediaError::Validation("Invalid folder path".into()));
        }

        match self.delete_tree(path.to_string(), 0).await {
            Ok(()) => {
                info!(folder = path, "deleted folder");
                // The mirror may hold a copy of the same folder; keep both
                // sides consistent, best-effort.
                let prefix = paths::prefix_for(Some(path));
                if let Err(err) = self.local.remove_dir_all(&prefix).await {
                    warn!("local mirror cleanup failed: {}", err);
                }
                Ok(())
            }
            Err(err @ MediaError::Validation(_)) => Err(err),
            Err(err) => {
                warn!("blob folder delete failed, using local fallback: {}", err);
                let prefix = paths::prefix_for(Some(path));
                if !self.local.dir_exists(&prefix).await {
                    return Err(MediaError::NotFound("Folder not found".into()));
                }
                self.local.remove_dir_all(&prefix).await?;
                info!(folder = path, "deleted local folder");
                Ok(())
            }
        }
    }

    fn delete_tree(&self, rel: String, depth: usize) -> BoxFuture<'_, MediaResult<()>> {
        async move {
            if depth >= paths::MAX_FOLDER_DEPTH {
                return Err(MediaError::Validation(
                    "Folder nesting exceeds the supported depth".into(),
                ));
            }

            let prefix = paths::prefix_for(Some(&rel));
            let entries = self.blob.list(&prefix).await?;

            let mut file_keys = Vec::new();
            let mut subfolders = BTreeSet::new();
            for entry in entries {
                if entry.is_file() {
                    file_keys.push(entry.key);
                } else {
                    let name = entry
                        .filename
                        .split('/')
                        .next()
                        .unwrap_or(&entry.filename)
                        .to_string();
                    subfolders.insert(name);
                }
            }

            if !file_keys.is_empty() {
                debug!(folder = %rel, count = file_keys.len(), "removing files");
                self.blob.remove(&file_keys).await?;
            }

            for sub in subfolders {
                self.delete_tree(format!("{rel}/{sub}"), depth + 1).await?;
            }

            // The placeholder was part of the batch when it was listed; this
            // sweep covers a placeholder the listing missed. Absence is fine.
            let placeholder = paths::join_key(&prefix, paths::FOLDER_PLACEHOLDER);
            let _ = self.blob.remove(std::slice::from_ref(&placeholder)).await;

            Ok(())
        }
        .boxed()
    }

    /// Inspect the hardcoded legacy folders at the bucket root.
    pub async fn cleanup_report(&self) -> Vec<CleanupReport> {
        let mut reports = Vec::with_capacity(paths::LEGACY_FOLDERS.len());
        for folder in paths::LEGACY_FOLDERS {
            let prefix = paths::prefix_for(Some(folder));
            let count = match self.blob.list(&prefix).await {
                Ok(entries) => entries.len(),
                Err(err) => {
                    warn!(folder, "legacy folder inspection degraded: {}", err);
                    0
                }
            };
            reports.push(CleanupReport {
                folder: folder.to_string(),
                exists: count > 0,
                object_count: count,
            });
        }
        reports
    }

    /// Remove the hardcoded legacy folders, reporting per-folder outcomes.
    pub async fn cleanup_remove(&self) -> Vec<CleanupOutcome> {
        let mut outcomes = Vec::with_capacity(paths::LEGACY_FOLDERS.len());
        for folder in paths::LEGACY_FOLDERS {
            let outcome = match self.delete_folder(folder).await {
                Ok(()) => CleanupOutcome {
                    folder: folder.to_string(),
                    removed: true,
                    error: None,
                },
                Err(MediaError::NotFound(_)) => CleanupOutcome {
                    folder: folder.to_string(),
                    removed: false,
                    error: None,
                },
                Err(err) => CleanupOutcome {
                    folder: folder.to_string(),
                    removed: false,
                    error: Some(err.to_string()),
                },
            };
            outcomes.push(outcome);
        }
        outcomes
    }
}

fn descriptor(name: &str, parent: Option<&str>, source: Source) -> FolderDescriptor {
    let full_path = match parent {
        Some(p) => format!("{p}/{name}"),
        None => name.to_string(),
    };
    FolderDescriptor {
        name: name.to_string(),
        path: format!("{}/{}", paths::ROOT_PREFIX, full_path),
        parent_path: parent.unwrap_or("").to_string(),
        is_nested: parent.is_some(),
        full_path,
        source,
    }
}
