//! Storage backends.
//!
//! [`ObjectStore`] is the single seam between the services and persistence:
//! four operations, two implementations. [`HttpBlobStore`] talks to the
//! hosted storage REST API; [`LocalStore`] mirrors the same namespace under
//! the served static-assets root and doubles as the fallback backend.

use crate::errors::MediaResult;
use crate::models::object::StorageObject;
use async_trait::async_trait;
use bytes::Bytes;

pub mod http_store;
pub mod local_store;

pub use http_store::HttpBlobStore;
pub use local_store::LocalStore;

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Write `bytes` at `path`. Overwrite-silent: an existing object at the
    /// same path is replaced without protest.
    async fn put(&self, path: &str, bytes: Bytes, content_type: &str) -> MediaResult<()>;

    /// Entries exactly one directory level below `prefix`.
    async fn list(&self, prefix: &str) -> MediaResult<Vec<StorageObject>>;

    /// Batched delete. Returns how many objects were actually removed; a
    /// failure anywhere references the whole batch.
    async fn remove(&self, paths: &[String]) -> MediaResult<usize>;

    /// Pure URL derivation, no I/O.
    fn public_url(&self, path: &str) -> String;
}
