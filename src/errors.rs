use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::{fmt, io};
use thiserror::Error;

/// Service-level error taxonomy shared by the storage backends and the
/// folder/image services.
#[derive(Debug, Error)]
pub enum MediaError {
    /// Caller-supplied input is malformed. Never retried, surfaced as 400.
    #[error("{0}")]
    Validation(String),

    /// Target object or folder absent on every consulted backend.
    #[error("{0}")]
    NotFound(String),

    /// The blob-store backend rejected or failed a call.
    #[error("storage backend error: {0}")]
    Storage(String),

    /// The local filesystem fallback failed.
    #[error(transparent)]
    Filesystem(#[from] io::Error),
}

pub type MediaResult<T> = Result<T, MediaError>;

impl From<reqwest::Error> for MediaError {
    fn from(err: reqwest::Error) -> Self {
        MediaError::Storage(err.to_string())
    }
}

/// A lightweight wrapper for general errors that keeps the message local.
#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    /// Create a new AppError with a specific status and message.
    pub fn new(status: StatusCode, msg: impl Into<String>) -> Self {
        Self {
            status,
            message: msg.into(),
        }
    }

    /// Shortcut for 400 Bad Request
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, msg)
    }

    /// Shortcut for a 500 Internal Server Error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, msg)
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.message,
            "status": self.status.as_u16()
        }));

        (self.status, body).into_response()
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::internal(err.to_string())
    }
}

impl From<MediaError> for AppError {
    fn from(err: MediaError) -> Self {
        let status = match &err {
            MediaError::Validation(_) => StatusCode::BAD_REQUEST,
            MediaError::NotFound(_) => StatusCode::NOT_FOUND,
            MediaError::Storage(_) | MediaError::Filesystem(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        AppError::new(status, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn media_error_maps_to_http_status() {
        let cases = [
            (MediaError::Validation("bad".into()), StatusCode::BAD_REQUEST),
            (MediaError::NotFound("gone".into()), StatusCode::NOT_FOUND),
            (
                MediaError::Storage("down".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(AppError::from(err).status, status);
        }
    }

    #[test]
    fn io_error_converts_to_filesystem_kind() {
        let err: MediaError = io::Error::new(io::ErrorKind::NotFound, "missing").into();
        assert!(matches!(err, MediaError::Filesystem(_)));
    }
}
