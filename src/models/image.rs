//! Derived views returned by the image listing and upload operations.

use crate::models::folder::Source;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One image in a folder listing, merged from both backends.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ImageEntry {
    /// Public URL: absolute for blob-store entries, site-relative static
    /// path for local entries.
    pub url: String,

    pub filename: String,

    /// Byte size when the backend reports one.
    pub size: Option<i64>,

    pub uploaded_at: Option<DateTime<Utc>>,

    pub source: Source,

    /// Folder the entry was listed from; `root` for the top level.
    pub folder: String,

    /// Full key within the bucket.
    pub path: String,
}

/// Result of a successful upload.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct UploadResult {
    pub url: String,
    pub filename: String,
    pub folder: String,
    pub path: String,
}
