use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use civicstats_core::error::StatsError;

/// Application-level errors that map directly to HTTP responses.
///
/// Every variant implements [`IntoResponse`] so Axum handlers can use
/// `Result<impl IntoResponse, AppError>` as their return type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Missing or unsupported `interval` on a time-series route.
    #[error("invalid interval: {0:?}")]
    InvalidInterval(String),

    /// Time-series export whose range holds no buckets.
    #[error("empty export domain")]
    EmptyExportDomain,

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<StatsError> for AppError {
    fn from(err: StatsError) -> Self {
        match err {
            StatsError::InvalidInterval(raw) => AppError::InvalidInterval(raw),
            StatsError::EmptyExportDomain => AppError::EmptyExportDomain,
            StatsError::Store(e) => AppError::Internal(e),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, field) = match &self {
            AppError::InvalidInterval(raw) if raw.is_empty() => (
                StatusCode::BAD_REQUEST,
                "invalid_interval",
                "interval is required: one of day, week, month, year".to_string(),
                Some("interval"),
            ),
            AppError::InvalidInterval(raw) => (
                StatusCode::BAD_REQUEST,
                "invalid_interval",
                format!("unsupported interval '{raw}': expected one of day, week, month, year"),
                Some("interval"),
            ),
            AppError::EmptyExportDomain => (
                StatusCode::BAD_REQUEST,
                "empty_export_domain",
                "The requested range contains no time buckets to export".to_string(),
                None,
            ),
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "Internal server error".to_string(),
                    None,
                )
            }
        };

        (
            status,
            Json(json!({
                "error": {
                    "code": code,
                    "message": message,
                    "field": field
                }
            })),
        )
            .into_response()
    }
}
