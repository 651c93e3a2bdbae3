//! Insert helpers for seeding and tests.
//!
//! Inserts are keyed by id so fixtures can be re-run. Tables with secondary
//! indexes are rewritten with delete + insert, since DuckDB refuses
//! `INSERT OR REPLACE` on indexed columns.

use anyhow::Result;
use chrono::{DateTime, Utc};

use crate::queries::to_sql_timestamp;
use crate::DuckDbBackend;

/// An idea row plus its ordered topics.
#[derive(Debug, Clone, Default)]
pub struct NewIdea {
    pub id: String,
    pub project_id: String,
    pub author_id: Option<String>,
    pub status_id: String,
    /// `None` inserts a draft.
    pub published_at: Option<DateTime<Utc>>,
    pub topic_ids: Vec<String>,
}

impl DuckDbBackend {
    pub async fn insert_project(
        &self,
        id: &str,
        title: &str,
        participation_method: &str,
    ) -> Result<()> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT OR REPLACE INTO projects (id, title, participation_method) VALUES (?1, ?2, ?3)",
            duckdb::params![id, title, participation_method],
        )?;
        Ok(())
    }

    pub async fn insert_status(&self, id: &str, code: &str, title: &str) -> Result<()> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT OR REPLACE INTO idea_statuses (id, code, title) VALUES (?1, ?2, ?3)",
            duckdb::params![id, code, title],
        )?;
        Ok(())
    }

    pub async fn insert_topic(&self, id: &str, title: &str) -> Result<()> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT OR REPLACE INTO topics (id, title) VALUES (?1, ?2)",
            duckdb::params![id, title],
        )?;
        Ok(())
    }

    /// Insert or replace an idea and its topic links in one transaction.
    pub async fn insert_idea(&self, idea: &NewIdea) -> Result<()> {
        let mut conn = self.conn.lock().await;
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM ideas WHERE id = ?1", duckdb::params![idea.id])?;
        tx.execute(
            r#"INSERT INTO ideas (id, project_id, author_id, status_id, published_at)
               VALUES (?1, ?2, ?3, ?4, ?5)"#,
            duckdb::params![
                idea.id,
                idea.project_id,
                idea.author_id,
                idea.status_id,
                idea.published_at.map(to_sql_timestamp),
            ],
        )?;
        tx.execute(
            "DELETE FROM ideas_topics WHERE idea_id = ?1",
            duckdb::params![idea.id],
        )?;
        for (ordering, topic_id) in idea.topic_ids.iter().enumerate() {
            tx.execute(
                "INSERT OR IGNORE INTO ideas_topics (idea_id, topic_id, ordering) VALUES (?1, ?2, ?3)",
                duckdb::params![idea.id, topic_id, ordering as i32],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    pub async fn insert_official_feedback(
        &self,
        id: &str,
        idea_id: &str,
        created_at: DateTime<Utc>,
    ) -> Result<()> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT OR IGNORE INTO official_feedbacks (id, idea_id, created_at) VALUES (?1, ?2, ?3)",
            duckdb::params![id, idea_id, to_sql_timestamp(created_at)],
        )?;
        Ok(())
    }

    pub async fn insert_membership(&self, group_id: &str, user_id: &str) -> Result<()> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT OR IGNORE INTO memberships (group_id, user_id) VALUES (?1, ?2)",
            duckdb::params![group_id, user_id],
        )?;
        Ok(())
    }
}
