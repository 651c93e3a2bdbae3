//! `GET /web_api/v1/stats/ideas_*`: idea statistics.
//!
//! Every route takes the same query parameters (`start_at`, `end_at`,
//! `project`, `group`, `topic`, `feedback_needed`, `interval`) and ignores
//! those that do not apply to it. Pagination parameters are ignored too.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
    Json,
};

use civicstats_core::analytics::Dimension;
use civicstats_core::filter::RawFilterParams;
use civicstats_core::report::{CompactReport, CountReport};

use crate::{error::AppError, routes::export::table_response, state::AppState};

/// Drop a filter the route does not accept.
fn without_topic(mut raw: RawFilterParams) -> RawFilterParams {
    raw.topic = None;
    raw
}

fn without_project(mut raw: RawFilterParams) -> RawFilterParams {
    raw.project = None;
    raw
}

async fn grouped(
    state: &AppState,
    raw: &RawFilterParams,
    dimension: Dimension,
) -> Result<Json<CompactReport>, AppError> {
    let result = state.engine.by_dimension(raw, dimension).await?;
    Ok(Json(result.to_compact()))
}

async fn grouped_csv(
    state: &AppState,
    raw: &RawFilterParams,
    dimension: Dimension,
) -> Result<Response, AppError> {
    let table = state.engine.export_by_dimension(raw, dimension).await?;
    table_response(&format!("ideas_by_{}.csv", dimension.as_str()), &table)
}

/// `GET /ideas_count`: `{ "count": n }`.
#[tracing::instrument(skip(state))]
pub async fn ideas_count(
    State(state): State<Arc<AppState>>,
    Query(raw): Query<RawFilterParams>,
) -> Result<impl IntoResponse, AppError> {
    let count = state.engine.count(&raw).await?;
    Ok(Json(CountReport { count }))
}

/// `GET /ideas_by_topic`: topic fan-out; `topic` is not a filter here.
#[tracing::instrument(skip(state))]
pub async fn ideas_by_topic(
    State(state): State<Arc<AppState>>,
    Query(raw): Query<RawFilterParams>,
) -> Result<impl IntoResponse, AppError> {
    grouped(&state, &without_topic(raw), Dimension::Topic).await
}

#[tracing::instrument(skip(state))]
pub async fn ideas_by_topic_as_csv(
    State(state): State<Arc<AppState>>,
    Query(raw): Query<RawFilterParams>,
) -> Result<Response, AppError> {
    grouped_csv(&state, &without_topic(raw), Dimension::Topic).await
}

#[tracing::instrument(skip(state))]
pub async fn ideas_by_status(
    State(state): State<Arc<AppState>>,
    Query(raw): Query<RawFilterParams>,
) -> Result<impl IntoResponse, AppError> {
    grouped(&state, &without_topic(raw), Dimension::Status).await
}

#[tracing::instrument(skip(state))]
pub async fn ideas_by_status_as_csv(
    State(state): State<Arc<AppState>>,
    Query(raw): Query<RawFilterParams>,
) -> Result<Response, AppError> {
    grouped_csv(&state, &without_topic(raw), Dimension::Status).await
}

/// `GET /ideas_by_project`: adds the `projects` id → title map.
#[tracing::instrument(skip(state))]
pub async fn ideas_by_project(
    State(state): State<Arc<AppState>>,
    Query(raw): Query<RawFilterParams>,
) -> Result<impl IntoResponse, AppError> {
    grouped(&state, &without_project(raw), Dimension::Project).await
}

#[tracing::instrument(skip(state))]
pub async fn ideas_by_project_as_csv(
    State(state): State<Arc<AppState>>,
    Query(raw): Query<RawFilterParams>,
) -> Result<Response, AppError> {
    grouped_csv(&state, &without_project(raw), Dimension::Project).await
}

/// `GET /ideas_by_time`: dense per-bucket counts; `interval` is required.
#[tracing::instrument(skip(state))]
pub async fn ideas_by_time(
    State(state): State<Arc<AppState>>,
    Query(raw): Query<RawFilterParams>,
) -> Result<impl IntoResponse, AppError> {
    let series = state.engine.over_time(&raw, false).await?;
    Ok(Json(series.to_compact()))
}

#[tracing::instrument(skip(state))]
pub async fn ideas_by_time_as_csv(
    State(state): State<Arc<AppState>>,
    Query(raw): Query<RawFilterParams>,
) -> Result<Response, AppError> {
    let table = state.engine.export_over_time(&raw, false).await?;
    table_response("ideas_by_time.csv", &table)
}

/// `GET /ideas_by_time_cumulative`: running totals over the same buckets.
#[tracing::instrument(skip(state))]
pub async fn ideas_by_time_cumulative(
    State(state): State<Arc<AppState>>,
    Query(raw): Query<RawFilterParams>,
) -> Result<impl IntoResponse, AppError> {
    let series = state.engine.over_time(&raw, true).await?;
    Ok(Json(series.to_compact()))
}

#[tracing::instrument(skip(state))]
pub async fn ideas_by_time_cumulative_as_csv(
    State(state): State<Arc<AppState>>,
    Query(raw): Query<RawFilterParams>,
) -> Result<Response, AppError> {
    let table = state.engine.export_over_time(&raw, true).await?;
    table_response("ideas_by_time_cumulative.csv", &table)
}
