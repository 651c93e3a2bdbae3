use std::collections::HashMap;

use anyhow::Result;
use duckdb::Connection;

use civicstats_core::analytics::Dimension;

use super::placeholders;
use crate::DuckDbBackend;

fn catalog_table(dimension: Dimension) -> Option<&'static str> {
    match dimension {
        Dimension::Topic => Some("topics"),
        Dimension::Status => Some("idea_statuses"),
        Dimension::Project => Some("projects"),
        Dimension::None => None,
    }
}

/// Titles of `ids` in the catalog behind `dimension`. Unknown ids are absent.
pub(crate) fn titles_sync(
    conn: &Connection,
    dimension: Dimension,
    ids: &[String],
) -> Result<HashMap<String, String>> {
    let Some(table) = catalog_table(dimension) else {
        return Ok(HashMap::new());
    };
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let sql = format!(
        "SELECT id, title FROM {table} WHERE id IN ({})",
        placeholders(1, ids.len())
    );
    let param_refs: Vec<&dyn duckdb::types::ToSql> =
        ids.iter().map(|id| id as &dyn duckdb::types::ToSql).collect();
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(param_refs.as_slice(), |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
    })?;
    Ok(rows.collect::<std::result::Result<HashMap<_, _>, _>>()?)
}

impl DuckDbBackend {
    pub async fn titles(
        &self,
        dimension: Dimension,
        ids: &[String],
    ) -> Result<HashMap<String, String>> {
        let conn = self.conn.lock().await;
        titles_sync(&conn, dimension, ids)
    }
}
