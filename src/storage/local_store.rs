//! Local filesystem fallback backend.
//!
//! Mirrors the managed namespace under the served static-assets root, so a
//! key `uploads/gallery/x.jpg` lands at `<static_root>/uploads/gallery/x.jpg`
//! and is reachable at the site-relative URL `/uploads/gallery/x.jpg`.

use crate::errors::{MediaError, MediaResult};
use crate::models::object::StorageObject;
use crate::services::paths;
use crate::storage::ObjectStore;
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};
use tokio::fs;
use tracing::debug;

#[derive(Clone, Debug)]
pub struct LocalStore {
    /// Static-assets root the managed tree lives under.
    root: PathBuf,
}

impl LocalStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve a bucket key to an absolute path under the root.
    fn resolve(&self, path: &str) -> PathBuf {
        self.root.join(path.trim_start_matches('/'))
    }

    async fn ensure_parent(&self, path: &Path) -> MediaResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    /// Create the directory for a folder prefix. Fails with a
    /// `ValidationError` when the directory is already present, which is how
    /// the folder-create fallback detects duplicates.
    pub async fn create_dir(&self, prefix: &str) -> MediaResult<()> {
        let dir = self.resolve(prefix);
        if dir.exists() {
            return Err(MediaError::Validation("Folder already exists".into()));
        }
        fs::create_dir_all(&dir).await?;
        Ok(())
    }

    pub async fn dir_exists(&self, prefix: &str) -> bool {
        let dir = self.resolve(prefix);
        dir.is_dir()
    }

    pub async fn file_exists(&self, path: &str) -> bool {
        let file = self.resolve(path);
        file.is_file()
    }

    /// Native recursive removal of a folder prefix. Missing directories are
    /// tolerated; the caller decides whether absence is an error.
    pub async fn remove_dir_all(&self, prefix: &str) -> MediaResult<()> {
        let dir = self.resolve(prefix);
        match fs::remove_dir_all(&dir).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    /// Remove now-empty directories from `start` up to (excluding) the store
    /// root. Keeps the mirror flat-store-like: a directory exists exactly
    /// while it has content.
    async fn prune_empty_dirs(&self, start: &Path) {
        let mut current = start.to_path_buf();
        while current.starts_with(&self.root) && current != self.root {
            match fs::remove_dir(&current).await {
                Ok(_) => {
                    if let Some(parent) = current.parent() {
                        current = parent.to_path_buf();
                    } else {
                        break;
                    }
                }
                Err(err) if err.kind() == ErrorKind::NotFound => break,
                Err(err) if err.kind() == ErrorKind::DirectoryNotEmpty => break,
                Err(err) => {
                    debug!("failed to prune directory {}: {}", current.display(), err);
                    break;
                }
            }
        }
    }
}

/// Minimal content-type guess for the image extensions the store recognizes.
fn mime_for(name: &str) -> Option<String> {
    let (_, ext) = name.rsplit_once('.')?;
    let mime = match ext.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "avif" => "image/avif",
        "bmp" => "image/bmp",
        "ico" => "image/x-icon",
        _ => return None,
    };
    Some(mime.to_string())
}

#[async_trait]
impl ObjectStore for LocalStore {
    async fn put(&self, path: &str, bytes: Bytes, _content_type: &str) -> MediaResult<()> {
        let full = self.resolve(path);
        self.ensure_parent(&full).await?;
        fs::write(&full, &bytes).await?;
        debug!(path, bytes = bytes.len(), "wrote local file");
        Ok(())
    }

    async fn list(&self, prefix: &str) -> MediaResult<Vec<StorageObject>> {
        let dir = self.resolve(prefix);
        let mut read_dir = match fs::read_dir(&dir).await {
            Ok(rd) => rd,
            // Missing directory is "no entries", not an error.
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };

        let mut entries = Vec::new();
        while let Some(entry) = read_dir.next_entry().await? {
            let meta = entry.metadata().await?;
            let name = entry.file_name().to_string_lossy().to_string();
            let created_at = meta
                .modified()
                .ok()
                .map(|t| DateTime::<Utc>::from(t));

            if meta.is_dir() {
                entries.push(StorageObject {
                    key: paths::join_key(prefix, &name),
                    filename: name,
                    size_bytes: None,
                    content_type: None,
                    created_at,
                });
            } else if paths::has_image_extension(&name) || name == paths::FOLDER_PLACEHOLDER {
                entries.push(StorageObject {
                    key: paths::join_key(prefix, &name),
                    content_type: mime_for(&name),
                    size_bytes: Some(meta.len() as i64),
                    filename: name,
                    created_at,
                });
            }
        }

        entries.sort_by(|a, b| a.filename.cmp(&b.filename));
        Ok(entries)
    }

    async fn remove(&self, paths: &[String]) -> MediaResult<usize> {
        let mut removed = 0usize;
        for path in paths {
            let full = self.resolve(path);
            fs::remove_file(&full).await?;
            removed += 1;
            if let Some(parent) = full.parent() {
                self.prune_empty_dirs(parent).await;
            }
        }
        Ok(removed)
    }

    fn public_url(&self, path: &str) -> String {
        format!("/{}", path.trim_start_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, LocalStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path());
        (dir, store)
    }

    #[tokio::test]
    async fn put_list_remove_round_trip() {
        let (_dir, store) = store();
        store
            .put("uploads/a.png", Bytes::from_static(b"png"), "image/png")
            .await
            .unwrap();

        let entries = store.list("uploads").await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].filename, "a.png");
        assert_eq!(entries[0].size_bytes, Some(3));
        assert!(entries[0].is_file());

        let removed = store.remove(&["uploads/a.png".into()]).await.unwrap();
        assert_eq!(removed, 1);
        assert!(store.list("uploads").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn listing_missing_directory_is_empty() {
        let (_dir, store) = store();
        assert!(store.list("uploads/nope").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn listing_skips_non_image_files_and_keeps_dirs() {
        let (_dir, store) = store();
        store
            .put("uploads/g/a.jpg", Bytes::from_static(b"j"), "image/jpeg")
            .await
            .unwrap();
        store
            .put("uploads/notes.txt", Bytes::from_static(b"t"), "text/plain")
            .await
            .unwrap();

        let entries = store.list("uploads").await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].filename, "g");
        assert!(!entries[0].is_file());
    }

    #[tokio::test]
    async fn removing_last_file_prunes_empty_directories() {
        let (_dir, store) = store();
        store
            .put("uploads/a/b/x.png", Bytes::from_static(b"p"), "image/png")
            .await
            .unwrap();
        store.remove(&["uploads/a/b/x.png".into()]).await.unwrap();

        // The whole now-empty chain disappears, so the folder is gone from
        // listings too.
        assert!(store.list("uploads").await.unwrap().is_empty());
        assert!(!store.dir_exists("uploads/a").await);
    }

    #[tokio::test]
    async fn remove_fails_on_missing_file() {
        let (_dir, store) = store();
        assert!(store.remove(&["uploads/ghost.png".into()]).await.is_err());
    }

    #[tokio::test]
    async fn create_dir_rejects_duplicates() {
        let (_dir, store) = store();
        store.create_dir("uploads/gallery").await.unwrap();
        let err = store.create_dir("uploads/gallery").await.unwrap_err();
        assert!(matches!(err, MediaError::Validation(_)));
    }

    #[test]
    fn public_url_is_site_relative() {
        let store = LocalStore::new("/srv/public");
        assert_eq!(store.public_url("uploads/a.png"), "/uploads/a.png");
    }
}
