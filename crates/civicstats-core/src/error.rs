use thiserror::Error;

/// Errors surfaced by the stats engine.
///
/// `InvalidInterval` and `EmptyExportDomain` are client-input errors and are
/// raised before any aggregate is produced. `Store` wraps collaborator
/// failures (DuckDB, I/O) and maps to an internal error at the HTTP edge.
#[derive(Debug, Error)]
pub enum StatsError {
    #[error("interval must be one of: day, week, month, year (got '{0}')")]
    InvalidInterval(String),

    #[error("the requested range contains no buckets to export")]
    EmptyExportDomain,

    #[error("store error: {0}")]
    Store(#[from] anyhow::Error),
}
