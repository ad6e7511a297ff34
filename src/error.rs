//! Crate-wide error taxonomy.
//!
//! Mirrors the shape of the teacher's `HlsError`/`HttpError` pair: one
//! `thiserror` enum for internal propagation, with an `IntoResponse` impl
//! that maps each variant onto the HTTP status spec §7 assigns it.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{kind} not found")]
    NotFound { kind: &'static str },

    #[error("permission denied")]
    PermissionDenied,

    #[error("validation error: {field}: {message}")]
    ValidationError { field: String, message: String },

    #[error("conflict: {0}")]
    ConflictBusy(String),

    #[error("transcode timed out")]
    TranscodeTimeout,

    #[error("external failure: {0}")]
    ExternalFailure(String),

    #[error("store error: {0}")]
    StoreError(String),
}

impl AppError {
    pub fn not_found(kind: &'static str) -> Self {
        AppError::NotFound { kind }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => AppError::NotFound { kind: "row" },
            other => AppError::StoreError(other.to_string()),
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::ExternalFailure(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::NotFound { kind } => (StatusCode::NOT_FOUND, format!("{kind} not found")),
            AppError::PermissionDenied => (StatusCode::FORBIDDEN, "permission denied".to_string()),
            AppError::ValidationError { field, message } => {
                (StatusCode::BAD_REQUEST, format!("{field}: {message}"))
            }
            AppError::ConflictBusy(msg) => (StatusCode::CONFLICT, msg.clone()),
            AppError::TranscodeTimeout => (
                StatusCode::GATEWAY_TIMEOUT,
                "transcode session did not become ready in time".to_string(),
            ),
            AppError::ExternalFailure(msg) => (StatusCode::BAD_GATEWAY, msg.clone()),
            AppError::StoreError(msg) => {
                tracing::error!("store error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal store error".to_string(),
                )
            }
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_maps_to_404() {
        let resp = AppError::not_found("media").into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn conflict_maps_to_409() {
        let resp = AppError::ConflictBusy("scan already running".into()).into_response();
        assert_eq!(resp.status(), StatusCode::CONFLICT);
    }
}
