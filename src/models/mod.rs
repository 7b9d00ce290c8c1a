//! Core data models for the media storage service.
//!
//! `StorageObject` is the raw view of one stored entry; the folder and image
//! types are derived projections computed fresh on every list call and
//! serialized as JSON for the admin UI.

pub mod cleanup;
pub mod folder;
pub mod image;
pub mod object;
