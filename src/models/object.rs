//! Represents one stored entry in a backend: an uploaded file or a folder
//! marker discovered while scanning a key prefix.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One entry returned by a backend listing.
///
/// The underlying stores are flat, so "folder" is not a first-class concept:
/// an entry is treated as a folder marker purely by the shape of its name and
/// recorded size. That classification lives in [`StorageObject::is_file`] and
/// nowhere else, so listing and deletion can never disagree about it.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct StorageObject {
    /// Full key within the bucket, e.g. `uploads/gallery/172..._logo.png`.
    pub key: String,

    /// Entry name relative to the listed prefix. The last key segment in the
    /// common case, but backends may report a deeper relative path.
    pub filename: String,

    /// Recorded byte size, when the backend reports one. Folder markers and
    /// bare prefixes have none.
    pub size_bytes: Option<i64>,

    /// Content type, when the backend reports one.
    pub content_type: Option<String>,

    /// Creation or last-modified timestamp, when the backend reports one.
    pub created_at: Option<DateTime<Utc>>,
}

impl StorageObject {
    /// The single file-vs-folder predicate shared by every caller.
    ///
    /// An entry is a file iff it is the reserved empty-folder placeholder,
    /// its name carries a real extension, or the backend recorded a non-zero
    /// byte size for it. A name that embeds a deeper path segment is always a
    /// folder marker (only its first segment names the folder). Everything
    /// else is treated as a folder marker too.
    pub fn is_file(&self) -> bool {
        if self.filename.contains('/') {
            return false;
        }
        self.filename == crate::services::paths::FOLDER_PLACEHOLDER
            || crate::services::paths::has_extension(&self.filename)
            || self.size_bytes.is_some_and(|size| size > 0)
    }

    pub fn is_placeholder(&self) -> bool {
        self.filename == crate::services::paths::FOLDER_PLACEHOLDER
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(filename: &str, size_bytes: Option<i64>) -> StorageObject {
        StorageObject {
            key: format!("uploads/{filename}"),
            filename: filename.to_string(),
            size_bytes,
            content_type: None,
            created_at: None,
        }
    }

    #[test]
    fn classification_is_by_extension_size_or_placeholder() {
        assert!(entry("photo.jpg", None).is_file());
        assert!(entry("blob", Some(42)).is_file());
        assert!(entry(".emptyFolderPlaceholder", Some(0)).is_file());
        assert!(!entry("gallery", None).is_file());
        assert!(!entry("gallery", Some(0)).is_file());
        // Deeper relative paths always name a folder, extension or not.
        assert!(!entry("sub/photo.jpg", Some(9)).is_file());
    }
}
