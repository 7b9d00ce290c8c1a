//! Path namespace convention shared by every service and backend.
//!
//! All managed keys live under [`ROOT_PREFIX`]. Folders are simulated by key
//! prefixes; an explicitly created empty folder is kept enumerable by a
//! reserved zero-byte placeholder object. Both sanitizers and the URL/key
//! helpers live here so the convention has exactly one home.

/// Fixed logical root segment for every managed key.
pub const ROOT_PREFIX: &str = "uploads";

/// Reserved zero-byte object name that makes an empty folder enumerable in a
/// flat store.
pub const FOLDER_PLACEHOLDER: &str = ".emptyFolderPlaceholder";

/// Sentinel folder value meaning "the top level".
pub const ROOT_FOLDER: &str = "root";

/// Legacy bucket-root folders the cleanup endpoint inspects and removes.
pub const LEGACY_FOLDERS: [&str; 3] = ["products", "categories", "gallery"];

/// Upload size cap: 5 MiB.
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Depth bound for the recursive folder delete walk. Listings that keep
/// producing folder-shaped entries past this depth abort the walk instead of
/// recursing forever.
pub const MAX_FOLDER_DEPTH: usize = 16;

/// Extensions the local fallback recognizes as images when listing.
pub const IMAGE_EXTENSIONS: [&str; 9] = [
    "jpg", "jpeg", "png", "gif", "webp", "svg", "avif", "bmp", "ico",
];

/// True when the last path segment of `name` carries a real extension
/// (non-empty stem and non-empty suffix).
pub fn has_extension(name: &str) -> bool {
    let segment = name.rsplit('/').next().unwrap_or(name);
    match segment.rsplit_once('.') {
        Some((stem, ext)) => !stem.is_empty() && !ext.is_empty(),
        None => false,
    }
}

/// True when `name` ends in one of the allow-listed image extensions.
pub fn has_image_extension(name: &str) -> bool {
    let Some((_, ext)) = name.rsplit_once('.') else {
        return false;
    };
    let ext = ext.to_ascii_lowercase();
    IMAGE_EXTENSIONS.contains(&ext.as_str())
}

/// Sanitize a user-supplied folder name: lowercase, anything outside
/// `[a-z0-9-_]` becomes `-`, runs of `-` collapse, leading/trailing `-`
/// trimmed. Returns `None` when nothing survives.
pub fn sanitize_folder_name(raw: &str) -> Option<String> {
    let mut out = String::with_capacity(raw.len());
    for c in raw.to_lowercase().chars() {
        let mapped = match c {
            'a'..='z' | '0'..='9' | '_' => c,
            '-' => '-',
            _ => '-',
        };
        if mapped == '-' && out.ends_with('-') {
            continue;
        }
        out.push(mapped);
    }
    let trimmed = out.trim_matches('-');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Sanitize an uploaded file's original name: anything outside
/// `[A-Za-z0-9._-]` becomes `_`. A name that sanitizes to nothing becomes
/// `file`.
pub fn sanitize_file_name(raw: &str) -> String {
    let out: String = raw
        .chars()
        .map(|c| match c {
            'A'..='Z' | 'a'..='z' | '0'..='9' | '.' | '_' | '-' => c,
            _ => '_',
        })
        .collect();
    if out.is_empty() { "file".into() } else { out }
}

/// Normalize the caller-supplied folder value: absent, empty, and the `root`
/// sentinel all mean the top level.
pub fn normalize_folder(folder: Option<&str>) -> Option<String> {
    match folder {
        Some(f) if !f.is_empty() && f != ROOT_FOLDER => Some(f.to_string()),
        _ => None,
    }
}

/// Key prefix for a folder: `uploads` or `uploads/<folder>`.
pub fn prefix_for(folder: Option<&str>) -> String {
    match normalize_folder(folder) {
        Some(f) => format!("{ROOT_PREFIX}/{f}"),
        None => ROOT_PREFIX.to_string(),
    }
}

pub fn join_key(prefix: &str, name: &str) -> String {
    format!("{prefix}/{name}")
}

/// Recover a bucket key from a public or static URL by locating the root
/// segment marker. The key keeps the root prefix:
/// `.../object/public/images/uploads/gallery/x.jpg` -> `uploads/gallery/x.jpg`.
pub fn key_from_url(url: &str) -> Option<&str> {
    let idx = url.find("/uploads/")?;
    let key = &url[idx + 1..];
    if key.len() > ROOT_PREFIX.len() + 1 {
        Some(key)
    } else {
        None
    }
}

/// Basic guard for filename-addressed deletes: rejects empty names, path
/// separators, and parent-directory hops.
pub fn is_plain_filename(name: &str) -> bool {
    !name.is_empty() && !name.contains('/') && !name.contains('\\') && !name.contains("..")
}

/// Guard for caller-supplied folder paths (already-sanitized segments joined
/// by `/`). Rejects traversal and absolute paths.
pub fn is_safe_folder_path(path: &str) -> bool {
    !path.is_empty()
        && !path.starts_with('/')
        && !path.contains("..")
        && !path.contains('\\')
        && !path.split('/').any(|segment| segment.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folder_name_sanitization() {
        assert_eq!(sanitize_folder_name("My Folder!"), Some("my-folder".into()));
        assert_eq!(sanitize_folder_name("Summer--2024"), Some("summer-2024".into()));
        assert_eq!(sanitize_folder_name("under_score"), Some("under_score".into()));
        assert_eq!(sanitize_folder_name("---"), None);
        assert_eq!(sanitize_folder_name("###"), None);
        assert_eq!(sanitize_folder_name(""), None);
    }

    #[test]
    fn file_name_sanitization() {
        assert_eq!(sanitize_file_name("logo (final).png"), "logo__final_.png");
        assert_eq!(sanitize_file_name("ok-name_1.jpg"), "ok-name_1.jpg");
        assert_eq!(sanitize_file_name(""), "file");
    }

    #[test]
    fn extension_detection() {
        assert!(has_extension("photo.jpg"));
        assert!(has_extension("a/b/photo.jpg"));
        assert!(!has_extension("gallery"));
        assert!(!has_extension(".emptyFolderPlaceholder"));
        assert!(!has_extension("trailingdot."));
    }

    #[test]
    fn image_extension_allow_list() {
        assert!(has_image_extension("x.PNG"));
        assert!(has_image_extension("x.webp"));
        assert!(!has_image_extension("x.pdf"));
        assert!(!has_image_extension("noext"));
    }

    #[test]
    fn folder_normalization_and_prefixes() {
        assert_eq!(prefix_for(None), "uploads");
        assert_eq!(prefix_for(Some("")), "uploads");
        assert_eq!(prefix_for(Some("root")), "uploads");
        assert_eq!(prefix_for(Some("gallery")), "uploads/gallery");
        assert_eq!(prefix_for(Some("a/b")), "uploads/a/b");
    }

    #[test]
    fn key_recovery_from_urls() {
        assert_eq!(
            key_from_url("http://host/storage/v1/object/public/images/uploads/gallery/x.jpg"),
            Some("uploads/gallery/x.jpg")
        );
        assert_eq!(key_from_url("/uploads/x.jpg"), Some("uploads/x.jpg"));
        assert_eq!(key_from_url("http://host/images/x.jpg"), None);
        assert_eq!(key_from_url("/uploads/"), None);
    }

    #[test]
    fn path_guards() {
        assert!(is_plain_filename("172_logo.png"));
        assert!(!is_plain_filename("a/b.png"));
        assert!(!is_plain_filename("..secret"));
        assert!(is_safe_folder_path("gallery/summer"));
        assert!(!is_safe_folder_path("/gallery"));
        assert!(!is_safe_folder_path("a//b"));
        assert!(!is_safe_folder_path("a/../b"));
    }
}
