//! Derived view of a virtual folder.

use serde::{Deserialize, Serialize};

/// Which backend an entry was discovered in. Blob-store entries win over
/// local entries with the same name when listings are merged.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Blob,
    Local,
}

/// A computed (never persisted) view of a virtual folder.
///
/// Folders have no record of their own; a descriptor exists exactly while
/// objects (or the empty-folder placeholder) live under its key prefix.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct FolderDescriptor {
    /// Folder name, the last segment of `full_path`.
    pub name: String,

    /// Full key prefix within the bucket, e.g. `uploads/gallery/summer`.
    pub path: String,

    /// Path relative to the managed root, e.g. `gallery/summer`.
    pub full_path: String,

    /// Parent path relative to the managed root; empty for top-level folders.
    pub parent_path: String,

    pub source: Source,

    /// Derived: true when `parent_path` is non-empty.
    pub is_nested: bool,
}
