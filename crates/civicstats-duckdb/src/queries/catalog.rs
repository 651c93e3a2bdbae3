use std::collections::HashSet;

use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use duckdb::Connection;
use tracing::warn;

use civicstats_core::analytics::{IdeaStatus, ParticipationMethod, PlatformSettings, Project};

use crate::DuckDbBackend;

pub(crate) fn platform_settings_sync(conn: &Connection) -> Result<PlatformSettings> {
    let mut stmt = conn.prepare(
        "SELECT key, value FROM settings WHERE key IN ('timezone', 'platform_created_at')",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
    })?;

    let mut timezone: Option<String> = None;
    let mut created_at: Option<String> = None;
    for row in rows {
        let (key, value) = row?;
        match key.as_str() {
            "timezone" => timezone = Some(value),
            _ => created_at = Some(value),
        }
    }

    let timezone = match timezone {
        Some(raw) => raw
            .parse::<Tz>()
            .map_err(|e| anyhow!("invalid timezone setting {raw:?}: {e}"))?,
        None => {
            warn!("no timezone setting, falling back to UTC");
            chrono_tz::UTC
        }
    };
    let created_at = created_at.ok_or_else(|| anyhow!("missing platform_created_at setting"))?;
    let created_at = DateTime::parse_from_rfc3339(&created_at)
        .map_err(|e| anyhow!("invalid platform_created_at setting {created_at:?}: {e}"))?
        .with_timezone(&Utc);

    Ok(PlatformSettings {
        timezone,
        created_at,
    })
}

pub(crate) fn projects_sync(conn: &Connection) -> Result<Vec<Project>> {
    let mut stmt =
        conn.prepare("SELECT id, title, participation_method FROM projects ORDER BY id")?;
    let rows = stmt.query_map([], |row| {
        Ok(Project {
            id: row.get(0)?,
            title: row.get(1)?,
            participation_method: ParticipationMethod::parse(&row.get::<_, String>(2)?),
        })
    })?;
    Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
}

pub(crate) fn idea_statuses_sync(conn: &Connection) -> Result<Vec<IdeaStatus>> {
    let mut stmt = conn.prepare("SELECT id, code, title FROM idea_statuses ORDER BY id")?;
    let rows = stmt.query_map([], |row| {
        Ok(IdeaStatus {
            id: row.get(0)?,
            code: row.get(1)?,
            title: row.get(2)?,
        })
    })?;
    Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
}

pub(crate) fn group_member_ids_sync(conn: &Connection, group_id: &str) -> Result<HashSet<String>> {
    let mut stmt = conn.prepare("SELECT user_id FROM memberships WHERE group_id = ?1")?;
    let rows = stmt.query_map(duckdb::params![group_id], |row| row.get::<_, String>(0))?;
    Ok(rows.collect::<std::result::Result<HashSet<_>, _>>()?)
}

impl DuckDbBackend {
    pub async fn platform_settings(&self) -> Result<PlatformSettings> {
        let conn = self.conn.lock().await;
        platform_settings_sync(&conn)
    }

    pub async fn projects(&self) -> Result<Vec<Project>> {
        let conn = self.conn.lock().await;
        projects_sync(&conn)
    }

    pub async fn idea_statuses(&self) -> Result<Vec<IdeaStatus>> {
        let conn = self.conn.lock().await;
        idea_statuses_sync(&conn)
    }

    pub async fn group_member_ids(&self, group_id: &str) -> Result<HashSet<String>> {
        let conn = self.conn.lock().await;
        group_member_ids_sync(&conn, group_id)
    }
}
