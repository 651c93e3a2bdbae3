use anyhow::Result;
use duckdb::Connection;
use tracing::debug;

use civicstats_core::analytics::{IdeaRecord, IdeaSink};
use civicstats_core::filter::FilterSpec;

use super::{from_sql_timestamp, to_sql_timestamp};
use crate::DuckDbBackend;

/// Separator for the aggregated topic list; never part of an id.
const TOPIC_SEPARATOR: char = '\u{1f}';

/// SQL fragment and bound values for the parts of `filter` evaluated inside
/// DuckDB. `feedback_needed` depends on the status configuration and is left
/// to the engine.
fn pushdown(filter: &FilterSpec) -> (String, Vec<Box<dyn duckdb::types::ToSql>>) {
    let mut filter_sql = String::new();
    let mut filter_params: Vec<Box<dyn duckdb::types::ToSql>> = Vec::new();
    let mut param_idx = 1;

    if let Some(start_at) = filter.start_at {
        filter_sql.push_str(&format!(" AND i.published_at >= ?{param_idx}"));
        filter_params.push(Box::new(to_sql_timestamp(start_at)));
        param_idx += 1;
    }
    if let Some(end_at) = filter.end_at {
        filter_sql.push_str(&format!(" AND i.published_at <= ?{param_idx}"));
        filter_params.push(Box::new(to_sql_timestamp(end_at)));
        param_idx += 1;
    }
    if let Some(ref project_id) = filter.project_id {
        filter_sql.push_str(&format!(" AND i.project_id = ?{param_idx}"));
        filter_params.push(Box::new(project_id.clone()));
        param_idx += 1;
    }
    if let Some(ref topic_id) = filter.topic_id {
        filter_sql.push_str(&format!(
            " AND i.id IN (SELECT idea_id FROM ideas_topics WHERE topic_id = ?{param_idx})"
        ));
        filter_params.push(Box::new(topic_id.clone()));
        param_idx += 1;
    }
    if let Some(ref group_id) = filter.group_id {
        filter_sql.push_str(&format!(
            " AND i.author_id IN (SELECT user_id FROM memberships WHERE group_id = ?{param_idx})"
        ));
        filter_params.push(Box::new(group_id.clone()));
    }

    (filter_sql, filter_params)
}

fn split_topics(raw: Option<String>) -> Vec<String> {
    match raw {
        Some(list) if !list.is_empty() => list.split(TOPIC_SEPARATOR).map(str::to_string).collect(),
        _ => Vec::new(),
    }
}

/// Stream published, non-survey ideas matching the pushed-down filters into
/// `sink`, ordered by publication time.
pub(crate) fn scan_ideas_sync(
    conn: &Connection,
    filter: &FilterSpec,
    sink: &mut IdeaSink<'_>,
) -> Result<u64> {
    let (filter_sql, filter_params) = pushdown(filter);

    let sql = format!(
        r#"
        WITH topic_lists AS (
            SELECT idea_id,
                   string_agg(topic_id, chr(31) ORDER BY ordering, topic_id) AS topic_ids
            FROM ideas_topics
            GROUP BY idea_id
        ),
        answered AS (
            SELECT DISTINCT idea_id FROM official_feedbacks
        ),
        surveys AS (
            SELECT id FROM projects WHERE participation_method = 'native_survey'
        )
        SELECT
            i.id,
            i.project_id,
            i.author_id,
            i.status_id,
            CAST(i.published_at AS VARCHAR) AS published_at,
            t.topic_ids,
            a.idea_id IS NOT NULL AS has_official_feedback
        FROM ideas i
        LEFT JOIN topic_lists t ON t.idea_id = i.id
        LEFT JOIN answered a ON a.idea_id = i.id
        WHERE i.published_at IS NOT NULL
          AND i.project_id NOT IN (SELECT id FROM surveys)
          {filter_sql}
        ORDER BY i.published_at, i.id
        "#
    );

    let param_refs: Vec<&dyn duckdb::types::ToSql> =
        filter_params.iter().map(|p| p.as_ref()).collect();
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query(param_refs.as_slice())?;

    let mut streamed: u64 = 0;
    while let Some(row) = rows.next()? {
        let published_at: String = row.get(4)?;
        let record = IdeaRecord {
            id: row.get(0)?,
            project_id: row.get(1)?,
            author_id: row.get(2)?,
            status_id: row.get(3)?,
            published_at: Some(from_sql_timestamp(&published_at)?),
            topic_ids: split_topics(row.get(5)?),
            has_official_feedback: row.get(6)?,
        };
        sink(&record);
        streamed += 1;
    }
    Ok(streamed)
}

impl DuckDbBackend {
    pub async fn scan_ideas(&self, filter: &FilterSpec, sink: &mut IdeaSink<'_>) -> Result<()> {
        let conn = self.conn.lock().await;
        let streamed = scan_ideas_sync(&conn, filter, sink)?;
        debug!(streamed, "ideas streamed from DuckDB");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pushdown_numbers_parameters_in_order() {
        let filter = FilterSpec {
            project_id: Some("p1".to_string()),
            group_id: Some("g1".to_string()),
            ..Default::default()
        };
        let (sql, params) = pushdown(&filter);
        assert_eq!(params.len(), 2);
        assert!(sql.contains("i.project_id = ?1"));
        assert!(sql.contains("group_id = ?2"));
    }

    #[test]
    fn empty_filter_pushes_nothing() {
        let (sql, params) = pushdown(&FilterSpec::default());
        assert!(sql.is_empty());
        assert!(params.is_empty());
    }

    #[test]
    fn topic_lists_split_on_separator() {
        assert_eq!(
            split_topics(Some("t1\u{1f}t2".to_string())),
            vec!["t1".to_string(), "t2".to_string()]
        );
        assert!(split_topics(None).is_empty());
        assert!(split_topics(Some(String::new())).is_empty());
    }
}
