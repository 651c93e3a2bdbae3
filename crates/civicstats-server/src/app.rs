use std::sync::Arc;

use axum::{http::HeaderValue, routing::get, Router};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{routes, state::AppState};

/// Idea statistics, mounted under `/web_api/v1/stats`.
fn stats_routes() -> Router<Arc<AppState>> {
    use routes::stats;

    Router::new()
        .route("/ideas_count", get(stats::ideas_count))
        .route("/ideas_by_topic", get(stats::ideas_by_topic))
        .route("/ideas_by_topic_as_csv", get(stats::ideas_by_topic_as_csv))
        .route("/ideas_by_status", get(stats::ideas_by_status))
        .route("/ideas_by_status_as_csv", get(stats::ideas_by_status_as_csv))
        .route("/ideas_by_project", get(stats::ideas_by_project))
        .route(
            "/ideas_by_project_as_csv",
            get(stats::ideas_by_project_as_csv),
        )
        .route("/ideas_by_time", get(stats::ideas_by_time))
        .route("/ideas_by_time_as_csv", get(stats::ideas_by_time_as_csv))
        .route(
            "/ideas_by_time_cumulative",
            get(stats::ideas_by_time_cumulative),
        )
        .route(
            "/ideas_by_time_cumulative_as_csv",
            get(stats::ideas_by_time_cumulative_as_csv),
        )
}

/// Construct the Axum [`Router`] with all routes and middleware attached.
///
/// Middleware is applied in outer-to-inner order (outermost runs first on
/// request, last on response):
///
/// 1. `TraceLayer`: structured request/response logging via `tracing`.
/// 2. `CorsLayer`: any origin unless `CIVICSTATS_CORS_ORIGINS` lists some.
pub fn build_app(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(allowed_origins(&state.config.cors_origins))
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(routes::health::health))
        .nest("/web_api/v1/stats", stats_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn allowed_origins(origins: &[String]) -> AllowOrigin {
    let parsed: Vec<HeaderValue> = origins
        .iter()
        .map(|o| o.trim())
        .filter(|o| !o.is_empty())
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = o, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    if parsed.is_empty() {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(parsed)
    }
}
