//! Health & readiness handlers.
//!
//! - GET /healthz  -> simple liveness ("ok")
//! - GET /readyz   -> readiness that checks blob-store reachability and disk I/O

use crate::services::{AppState, paths};
use crate::storage::ObjectStore;
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use bytes::Bytes;
use serde::Serialize;
use std::collections::HashMap;
use uuid::Uuid;

/// `GET /healthz`
///
/// Very small liveness probe — always returns 200 OK with a plain JSON body.
/// This endpoint should be cheap and never perform I/O.
pub async fn healthz() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok".into(),
        }),
    )
}

/// `GET /readyz`
///
/// Readiness probe that:
/// 1. Lists the managed root on the blob store.
/// 2. Performs a best-effort write/check/delete against the static root.
///
/// Returns JSON describing each check. HTTP 200 when all checks pass,
/// HTTP 503 when any check fails. The blob check failing still returns the
/// body — the service keeps working against the local fallback.
pub async fn readyz(State(state): State<AppState>) -> impl IntoResponse {
    // 1) Blob store check
    let blob_check = match state.blob.list(paths::ROOT_PREFIX).await {
        Ok(_) => (true, None::<String>),
        Err(err) => (false, Some(format!("error: {err}"))),
    };

    // 2) Disk write/check/delete against the static root
    let probe = format!(".readyz-{}", Uuid::new_v4());
    let disk_check = match state
        .local
        .put(&probe, Bytes::from_static(b"readyz"), "text/plain")
        .await
    {
        Ok(()) => {
            if state.local.file_exists(&probe).await {
                match state.local.remove(std::slice::from_ref(&probe)).await {
                    Ok(_) => (true, None::<String>),
                    Err(err) => (true, Some(format!("could not remove probe file: {err}"))),
                }
            } else {
                (false, Some("probe file missing after write".to_string()))
            }
        }
        Err(err) => (false, Some(format!("could not write probe file: {err}"))),
    };

    let blob_ok = blob_check.0;
    let disk_ok = disk_check.0;
    let overall_ok = blob_ok && disk_ok;

    let mut checks = HashMap::new();
    checks.insert(
        "blob",
        CheckStatus {
            ok: blob_ok,
            error: blob_check.1,
        },
    );
    checks.insert(
        "disk",
        CheckStatus {
            ok: disk_ok,
            error: disk_check.1,
        },
    );

    let body = ReadyResponse {
        status: if overall_ok {
            "ok".into()
        } else {
            "error".into()
        },
        checks,
    };

    let status = if overall_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(body))
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
}

#[derive(Serialize)]
struct ReadyResponse {
    status: String,
    checks: HashMap<&'static str, CheckStatus>,
}

#[derive(Serialize)]
struct CheckStatus {
    ok: bool,
    error: Option<String>,
}
