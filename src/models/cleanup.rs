//! Per-folder rows returned by the legacy-folder cleanup endpoint.

use serde::{Deserialize, Serialize};

/// Inspection row for one legacy folder (GET /api/upload/cleanup).
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CleanupReport {
    pub folder: String,
    pub exists: bool,
    /// Objects found under the folder prefix, placeholder included.
    pub object_count: usize,
}

/// Removal row for one legacy folder (DELETE /api/upload/cleanup).
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CleanupOutcome {
    pub folder: String,
    pub removed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
