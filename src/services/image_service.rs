//! Image upload, listing, and deletion.

use crate::errors::{MediaError, MediaResult};
use crate::models::folder::Source;
use crate::models::image::{ImageEntry, UploadResult};
use crate::services::paths;
use crate::storage::{LocalStore, ObjectStore};
use bytes::Bytes;
use chrono::Utc;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// One uploaded file as extracted from the multipart request.
#[derive(Clone, Debug)]
pub struct UploadedFile {
    pub name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

#[derive(Clone)]
pub struct ImageService {
    blob: Arc<dyn ObjectStore>,
    local: LocalStore,
}

impl ImageService {
    pub fn new(blob: Arc<dyn ObjectStore>, local: LocalStore) -> Self {
        Self { blob, local }
    }

    /// Validate and store one image, returning its public URL and key.
    ///
    /// Writes to the blob store and falls back to the local mirror when the
    /// blob store rejects the write; the returned URL comes from whichever
    /// backend took the bytes.
    pub async fn upload_image(
        &self,
        file: UploadedFile,
        folder: Option<&str>,
    ) -> MediaResult<UploadResult> {
        if file.bytes.is_empty() {
            return Err(MediaError::Validation("No file uploaded".into()));
        }
        if !file.content_type.starts_with("image/") {
            return Err(MediaError::Validation("Only image files allowed".into()));
        }
        if file.bytes.len() > paths::MAX_IMAGE_BYTES {
            return Err(MediaError::Validation("Image must be under 5MB".into()));
        }

        let folder = paths::normalize_folder(folder);
        if let Some(f) = folder.as_deref() {
            if !paths::is_safe_folder_path(f) {
                return Err(MediaError::Validation("Invalid folder path".into()));
            }
        }

        let filename = derive_filename(&file.name);
        let key = paths::join_key(&paths::prefix_for(folder.as_deref()), &filename);

        let url = match self
            .blob
            .put(&key, file.bytes.clone(), &file.content_type)
            .await
        {
            Ok(()) => self.blob.public_url(&key),
            Err(err) => {
                warn!("blob upload failed, using local fallback: {}", err);
                self.local
                    .put(&key, file.bytes, &file.content_type)
                    .await?;
                self.local.public_url(&key)
            }
        };

        info!(key, "uploaded image");
        Ok(UploadResult {
            url,
            filename,
            folder: folder.unwrap_or_else(|| paths::ROOT_FOLDER.to_string()),
            path: key,
        })
    }

    /// List images in a folder, merging both backends (dedup by filename,
    /// blob first) and sorting newest-first. A folder neither backend knows
    /// is an empty list, not an error.
    pub async fn list_images(&self, folder: Option<&str>) -> MediaResult<Vec<ImageEntry>> {
        let folder = paths::normalize_folder(folder);
        if let Some(f) = folder.as_deref() {
            if !paths::is_safe_folder_path(f) {
                return Err(MediaError::Validation("Invalid folder path".into()));
            }
        }
        let prefix = paths::prefix_for(folder.as_deref());
        let folder_label = folder.unwrap_or_else(|| paths::ROOT_FOLDER.to_string());

        let mut images = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();

        match self.blob.list(&prefix).await {
            Ok(entries) => {
                for entry in entries {
                    if entry.is_placeholder() || !entry.is_file() {
                        continue;
                    }
                    seen.insert(entry.filename.clone());
                    images.push(ImageEntry {
                        url: self.blob.public_url(&entry.key),
                        filename: entry.filename,
                        size: entry.size_bytes,
                        uploaded_at: entry.created_at,
                        source: Source::Blob,
                        folder: folder_label.clone(),
                        path: entry.key,
                    });
                }
            }
            Err(err) => warn!("blob image listing degraded to empty: {}", err),
        }

        match self.local.list(&prefix).await {
            Ok(entries) => {
                for entry in entries {
                    if entry.is_placeholder()
                        || !entry.is_file()
                        || !paths::has_image_extension(&entry.filename)
                        || seen.contains(&entry.filename)
                    {
                        continue;
                    }
                    images.push(ImageEntry {
                        url: self.local.public_url(&entry.key),
                        filename: entry.filename,
                        size: entry.size_bytes,
                        uploaded_at: entry.created_at,
                        source: Source::Local,
                        folder: folder_label.clone(),
                        path: entry.key,
                    });
                }
            }
            Err(err) => warn!("local image listing degraded to empty: {}", err),
        }

        images.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at));
        Ok(images)
    }

    /// Delete one image addressed by its public (or static) URL.
    pub async fn delete_image(&self, url: &str) -> MediaResult<()> {
        let key = paths::key_from_url(url)
            .ok_or_else(|| MediaError::Validation("Invalid image URL format".into()))?;
        self.delete_key(key).await
    }

    /// Delete one top-level upload addressed by bare filename.
    pub async fn delete_by_filename(&self, filename: &str) -> MediaResult<()> {
        if !paths::is_plain_filename(filename) {
            return Err(MediaError::Validation("Invalid filename".into()));
        }
        let key = paths::join_key(paths::ROOT_PREFIX, filename);
        self.delete_key(&key).await
    }

    /// Blob delete first; when the blob reports nothing removed (or fails),
    /// the local mirror is consulted. Not-found only when both backends miss.
    async fn delete_key(&self, key: &str) -> MediaResult<()> {
        let key_owned = key.to_string();
        match self.blob.remove(std::slice::from_ref(&key_owned)).await {
            Ok(removed) if removed > 0 => {
                info!(key, "deleted image");
                return Ok(());
            }
            Ok(_) => {}
            Err(err) => warn!("blob image delete failed, trying local: {}", err),
        }

        if !self.local.file_exists(key).await {
            return Err(MediaError::NotFound("Image not found".into()));
        }
        self.local.remove(std::slice::from_ref(&key_owned)).await?;
        info!(key, "deleted local image");
        Ok(())
    }
}

/// Collision-resistant upload filename: millisecond prefix (keeps names
/// sorting by upload time) plus a uuid token, then the sanitized original
/// name.
fn derive_filename(original: &str) -> String {
    let token = Uuid::new_v4().simple().to_string();
    format!(
        "{}_{}_{}",
        Utc::now().timestamp_millis(),
        &token[..8],
        paths::sanitize_file_name(original)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::FailingStore;
    use crate::storage::LocalStore;

    fn service() -> (tempfile::TempDir, tempfile::TempDir, ImageService) {
        let blob_dir = tempfile::tempdir().unwrap();
        let local_dir = tempfile::tempdir().unwrap();
        let service = ImageService::new(
            Arc::new(LocalStore::new(blob_dir.path())),
            LocalStore::new(local_dir.path()),
        );
        (blob_dir, local_dir, service)
    }

    fn failing_service() -> (tempfile::TempDir, ImageService) {
        let local_dir = tempfile::tempdir().unwrap();
        let service = ImageService::new(
            Arc::new(FailingStore),
            LocalStore::new(local_dir.path()),
        );
        (local_dir, service)
    }

    fn png(name: &str, bytes: &'static [u8]) -> UploadedFile {
        UploadedFile {
            name: name.into(),
            content_type: "image/png".into(),
            bytes: Bytes::from_static(bytes),
        }
    }

    #[tokio::test]
    async fn upload_then_delete_round_trip() {
        let (_b, _l, svc) = service();
        let result = svc
            .upload_image(png("logo.png", b"pngdata"), Some("gallery"))
            .await
            .unwrap();
        assert_eq!(result.folder, "gallery");
        assert!(result.path.starts_with("uploads/gallery/"));
        assert!(result.filename.ends_with("_logo.png"));

        let listed = svc.list_images(Some("gallery")).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].filename, result.filename);

        svc.delete_image(&result.url).await.unwrap();
        assert!(svc.list_images(Some("gallery")).await.unwrap().is_empty());

        // Second delete of the same URL: nothing left anywhere.
        let err = svc.delete_image(&result.url).await.unwrap_err();
        assert!(matches!(err, MediaError::NotFound(_)));
    }

    #[tokio::test]
    async fn rejects_non_image_content_types() {
        let (blob_dir, local_dir, svc) = service();
        let file = UploadedFile {
            name: "doc.pdf".into(),
            content_type: "application/pdf".into(),
            bytes: Bytes::from_static(b"%PDF"),
        };
        let err = svc.upload_image(file, None).await.unwrap_err();
        assert!(matches!(err, MediaError::Validation(_)));

        // Idempotent rejection: nothing was written to either backend.
        assert!(!blob_dir.path().join("uploads").exists());
        assert!(!local_dir.path().join("uploads").exists());
    }

    #[tokio::test]
    async fn rejects_oversized_images() {
        let (_b, _l, svc) = service();
        let file = UploadedFile {
            name: "big.png".into(),
            content_type: "image/png".into(),
            bytes: Bytes::from(vec![0u8; paths::MAX_IMAGE_BYTES + 1]),
        };
        let err = svc.upload_image(file, None).await.unwrap_err();
        assert!(matches!(err, MediaError::Validation(ref msg) if msg.contains("5MB")));
    }

    #[tokio::test]
    async fn rejects_empty_files() {
        let (_b, _l, svc) = service();
        let err = svc
            .upload_image(png("empty.png", b""), None)
            .await
            .unwrap_err();
        assert!(matches!(err, MediaError::Validation(ref msg) if msg == "No file uploaded"));
    }

    #[tokio::test]
    async fn root_sentinel_uploads_to_top_level() {
        let (_b, _l, svc) = service();
        let result = svc
            .upload_image(png("top.png", b"data"), Some("root"))
            .await
            .unwrap();
        assert_eq!(result.folder, "root");
        assert!(!result.path.trim_start_matches("uploads/").contains('/'));
    }

    #[tokio::test]
    async fn same_name_uploads_do_not_collide() {
        let (_b, _l, svc) = service();
        let a = svc.upload_image(png("x.png", b"a"), None).await.unwrap();
        let b = svc.upload_image(png("x.png", b"b"), None).await.unwrap();
        assert_ne!(a.filename, b.filename);
        assert_eq!(svc.list_images(None).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn listing_merges_local_files_and_dedups_by_name() {
        let (_b, local_dir, svc) = service();
        let uploaded = svc
            .upload_image(png("shared.png", b"blob"), Some("gallery"))
            .await
            .unwrap();

        let gallery = local_dir.path().join("uploads/gallery");
        std::fs::create_dir_all(&gallery).unwrap();
        std::fs::write(gallery.join(&uploaded.filename), b"local-copy").unwrap();
        std::fs::write(gallery.join("only-local.png"), b"local").unwrap();
        std::fs::write(gallery.join("notes.txt"), b"skip").unwrap();

        let listed = svc.list_images(Some("gallery")).await.unwrap();
        assert_eq!(listed.len(), 2);

        let local_entry = listed.iter().find(|i| i.filename == "only-local.png").unwrap();
        assert_eq!(local_entry.source, Source::Local);
        assert_eq!(local_entry.url, "/uploads/gallery/only-local.png");

        let shared = listed.iter().find(|i| i.filename == uploaded.filename).unwrap();
        assert_eq!(shared.source, Source::Blob);
    }

    #[tokio::test]
    async fn unknown_folder_lists_empty() {
        let (_b, _l, svc) = service();
        assert!(svc.list_images(Some("never-made")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn upload_falls_back_to_local_store() {
        let (local_dir, svc) = failing_service();
        let result = svc
            .upload_image(png("offline.png", b"bits"), None)
            .await
            .unwrap();
        assert!(result.url.starts_with("/uploads/"));
        assert!(local_dir.path().join(&result.path).is_file());
    }

    #[tokio::test]
    async fn delete_falls_back_to_local_store() {
        let (local_dir, svc) = failing_service();
        let dir = local_dir.path().join("uploads");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("x.png"), b"img").unwrap();

        svc.delete_image("/uploads/x.png").await.unwrap();
        assert!(!dir.join("x.png").exists());

        let err = svc.delete_image("/uploads/x.png").await.unwrap_err();
        assert!(matches!(err, MediaError::NotFound(_)));
    }

    #[tokio::test]
    async fn delete_rejects_urls_without_root_marker() {
        let (_b, _l, svc) = service();
        let err = svc
            .delete_image("http://host/images/x.jpg")
            .await
            .unwrap_err();
        assert!(matches!(err, MediaError::Validation(_)));
    }

    #[tokio::test]
    async fn delete_by_filename_guards_against_traversal() {
        let (_b, _l, svc) = service();
        for bad in ["", "a/b.png", "../etc/passwd"] {
            let err = svc.delete_by_filename(bad).await.unwrap_err();
            assert!(matches!(err, MediaError::Validation(_)));
        }
    }

    #[test]
    fn derived_filenames_carry_time_token_and_name() {
        let name = derive_filename("My Photo.png");
        let mut parts = name.splitn(3, '_');
        let millis: i64 = parts.next().unwrap().parse().unwrap();
        assert!(millis > 0);
        assert_eq!(parts.next().unwrap().len(), 8);
        assert_eq!(parts.next().unwrap(), "My_Photo.png");
    }
}
