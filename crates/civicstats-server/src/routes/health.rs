use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::state::AppState;

/// `GET /health`: store liveness plus the platform timezone series are
/// bucketed in.
///
/// Reading the platform settings exercises the same path every stats query
/// starts with, so a 200 means queries can run:
/// ```json
/// { "status": "ok", "version": "0.1.0", "timezone": "Europe/Brussels" }
/// ```
/// A failed read answers 503 with `"status": "degraded"` and no timezone.
#[tracing::instrument(skip(state))]
pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let version = env!("CARGO_PKG_VERSION");
    match state.db.platform_settings().await {
        Ok(settings) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "version": version,
                "timezone": settings.timezone.name(),
            })),
        ),
        Err(e) => {
            tracing::error!(error = %e, "Health check: platform settings unreadable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "degraded", "version": version })),
            )
        }
    }
}
