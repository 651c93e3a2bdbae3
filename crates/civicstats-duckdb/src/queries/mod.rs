pub mod catalog;
pub mod ideas;
pub mod labels;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDateTime, Utc};

/// Format used to bind `TIMESTAMP` parameters. Values are naive UTC.
const BIND_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Format of `CAST(ts AS VARCHAR)`; the fractional part is omitted when zero.
const READ_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

pub(crate) fn to_sql_timestamp(ts: DateTime<Utc>) -> String {
    ts.naive_utc().format(BIND_FORMAT).to_string()
}

pub(crate) fn from_sql_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    let naive = NaiveDateTime::parse_from_str(raw, READ_FORMAT)
        .with_context(|| format!("unexpected timestamp from DuckDB: {raw}"))?;
    Ok(naive.and_utc())
}

/// `?n, ?n+1, ...` placeholders for `count` parameters starting at `first`.
pub(crate) fn placeholders(first: usize, count: usize) -> String {
    (first..first + count)
        .map(|i| format!("?{i}"))
        .collect::<Vec<_>>()
        .join(", ")
}
