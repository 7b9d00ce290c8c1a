//! Blob-store backend: a thin client for the hosted storage REST API.
//!
//! One bucket, flat keys. The endpoints mirror the hosted service:
//! `POST {base}/object/{bucket}/{key}` uploads, `POST {base}/object/list/{bucket}`
//! lists one directory level under a prefix, `DELETE {base}/object/{bucket}`
//! removes a batch of keys and echoes the set it actually deleted, and public
//! URLs derive as `{base}/object/public/{bucket}/{key}`.

use crate::errors::{MediaError, MediaResult};
use crate::models::object::StorageObject;
use crate::storage::ObjectStore;
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Clone, Debug)]
pub struct HttpBlobStore {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    bucket: String,
}

/// One entry of a list response. Folder prefixes come back with no metadata;
/// real objects carry size and mimetype.
#[derive(Debug, Deserialize)]
struct ListEntry {
    name: String,
    #[serde(default)]
    created_at: Option<String>,
    #[serde(default)]
    metadata: Option<ListEntryMeta>,
}

#[derive(Debug, Deserialize)]
struct ListEntryMeta {
    #[serde(default)]
    size: Option<i64>,
    #[serde(default)]
    mimetype: Option<String>,
}

#[derive(Debug, Serialize)]
struct ListRequest<'a> {
    prefix: &'a str,
    limit: usize,
    offset: usize,
    #[serde(rename = "sortBy")]
    sort_by: SortBy,
}

#[derive(Debug, Serialize)]
struct SortBy {
    column: &'static str,
    order: &'static str,
}

#[derive(Debug, Serialize)]
struct RemoveRequest<'a> {
    prefixes: &'a [String],
}

impl HttpBlobStore {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        bucket: impl Into<String>,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client: reqwest::Client::new(),
            base_url,
            api_key: api_key.into(),
            bucket: bucket.into(),
        }
    }

    fn object_url(&self, path: &str) -> String {
        format!("{}/object/{}/{}", self.base_url, self.bucket, path)
    }

    /// Map a raw list entry to a [`StorageObject`] keyed under `prefix`.
    fn entry_to_object(prefix: &str, entry: ListEntry) -> StorageObject {
        let key = if prefix.is_empty() {
            entry.name.clone()
        } else {
            format!("{}/{}", prefix.trim_end_matches('/'), entry.name)
        };
        let (size_bytes, content_type) = match entry.metadata {
            Some(meta) => (meta.size, meta.mimetype),
            None => (None, None),
        };
        let created_at = entry
            .created_at
            .as_deref()
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
            .map(|dt| dt.with_timezone(&Utc));

        StorageObject {
            key,
            filename: entry.name,
            size_bytes,
            content_type,
            created_at,
        }
    }

    /// Turn a non-success response into a `Storage` error with the backend's
    /// message attached.
    async fn fail(context: &str, resp: reqwest::Response) -> MediaError {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        MediaError::Storage(format!("{context} failed with {status}: {body}"))
    }
}

#[async_trait]
impl ObjectStore for HttpBlobStore {
    async fn put(&self, path: &str, bytes: Bytes, content_type: &str) -> MediaResult<()> {
        let resp = self
            .client
            .post(self.object_url(path))
            .bearer_auth(&self.api_key)
            .header(CONTENT_TYPE, content_type)
            // Duplicate keys overwrite silently.
            .header("x-upsert", "true")
            .body(bytes)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(Self::fail("upload", resp).await);
        }
        debug!(path, "uploaded object");
        Ok(())
    }

    async fn list(&self, prefix: &str) -> MediaResult<Vec<StorageObject>> {
        let url = format!("{}/object/list/{}", self.base_url, self.bucket);
        let body = ListRequest {
            prefix,
            limit: 1000,
            offset: 0,
            sort_by: SortBy {
                column: "name",
                order: "asc",
            },
        };

        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(Self::fail("list", resp).await);
        }

        let entries: Vec<ListEntry> = resp.json().await?;
        Ok(entries
            .into_iter()
            .map(|entry| Self::entry_to_object(prefix, entry))
            .collect())
    }

    async fn remove(&self, paths: &[String]) -> MediaResult<usize> {
        if paths.is_empty() {
            return Ok(0);
        }
        let url = format!("{}/object/{}", self.base_url, self.bucket);
        let resp = self
            .client
            .delete(&url)
            .bearer_auth(&self.api_key)
            .json(&RemoveRequest { prefixes: paths })
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(Self::fail("remove", resp).await);
        }

        // The backend echoes the set it deleted; an unreadable body is
        // treated as the whole batch having gone through.
        let removed = match resp.json::<Vec<serde_json::Value>>().await {
            Ok(deleted) => deleted.len(),
            Err(err) => {
                debug!("unreadable remove response: {}", err);
                paths.len()
            }
        };
        Ok(removed)
    }

    fn public_url(&self, path: &str) -> String {
        format!("{}/object/public/{}/{}", self.base_url, self.bucket, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_url_derivation() {
        let store = HttpBlobStore::new("http://localhost:54321/storage/v1/", "key", "images");
        assert_eq!(
            store.public_url("uploads/gallery/x.jpg"),
            "http://localhost:54321/storage/v1/object/public/images/uploads/gallery/x.jpg"
        );
    }

    #[test]
    fn list_entries_map_to_objects() {
        let raw = r#"[
            {"name": "gallery", "id": null, "metadata": null},
            {
                "name": "1710000000000_ab12cd34_logo.png",
                "id": "8f7e",
                "created_at": "2024-03-09T15:20:00.000Z",
                "metadata": {"size": 2048, "mimetype": "image/png"}
            }
        ]"#;
        let entries: Vec<ListEntry> = serde_json::from_str(raw).unwrap();
        let objects: Vec<StorageObject> = entries
            .into_iter()
            .map(|e| HttpBlobStore::entry_to_object("uploads", e))
            .collect();

        assert_eq!(objects[0].key, "uploads/gallery");
        assert!(!objects[0].is_file());

        assert_eq!(objects[1].key, "uploads/1710000000000_ab12cd34_logo.png");
        assert_eq!(objects[1].size_bytes, Some(2048));
        assert!(objects[1].created_at.is_some());
        assert!(objects[1].is_file());
    }

    #[test]
    fn empty_prefix_keys_are_bare_names() {
        let entry = ListEntry {
            name: "top.png".into(),
            created_at: None,
            metadata: None,
        };
        let obj = HttpBlobStore::entry_to_object("", entry);
        assert_eq!(obj.key, "top.png");
    }
}
