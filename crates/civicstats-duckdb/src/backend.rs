use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use duckdb::Connection;
use tokio::sync::Mutex;
use tracing::info;

use civicstats_core::analytics::PlatformSettings;

use crate::schema::init_sql;

/// DuckDB-backed record store for civicstats.
///
/// DuckDB is single-writer, so the connection lives behind `Arc<Mutex<_>>`:
/// the struct is cheap to share across axum handlers and every query holds
/// the lock for its whole duration, which gives each scan a consistent
/// snapshot.
///
/// Memory and thread limits are enforced by [`init_sql`] at open time.
pub struct DuckDbBackend {
    pub(crate) conn: Arc<Mutex<Connection>>,
}

impl DuckDbBackend {
    /// Open (or create) a DuckDB database file at `path`.
    ///
    /// `platform` only seeds the `settings` table of a fresh database; an
    /// existing timezone or creation time is left untouched.
    pub fn open(path: &str, memory_limit: &str, platform: &PlatformSettings) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch(&init_sql(memory_limit))?;
        Self::seed_settings_sync(&conn, platform)?;
        info!(
            path,
            memory_limit,
            timezone = platform.timezone.name(),
            "DuckDB opened"
        );
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an **in-memory** DuckDB database seeded with a UTC platform
    /// created now.
    ///
    /// Intended for tests only; data is discarded when the struct is dropped.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(&init_sql("1GB"))?;
        let platform = PlatformSettings {
            timezone: chrono_tz::UTC,
            created_at: Utc::now(),
        };
        Self::seed_settings_sync(&conn, &platform)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Seed the `settings` table if the keys don't already exist.
    ///
    /// Uses `INSERT OR IGNORE` so re-runs on every startup are safe.
    fn seed_settings_sync(conn: &Connection, platform: &PlatformSettings) -> Result<()> {
        conn.execute(
            "INSERT OR IGNORE INTO settings (key, value) VALUES ('timezone', ?1)",
            duckdb::params![platform.timezone.name()],
        )?;
        conn.execute(
            "INSERT OR IGNORE INTO settings (key, value) VALUES ('platform_created_at', ?1)",
            duckdb::params![platform.created_at.to_rfc3339()],
        )?;
        conn.execute(
            "INSERT OR IGNORE INTO settings (key, value) VALUES ('version', ?1)",
            duckdb::params!["1"],
        )?;
        Ok(())
    }

    /// Overwrite the platform timezone and creation time.
    pub async fn set_platform_settings(&self, platform: &PlatformSettings) -> Result<()> {
        let mut conn = self.conn.lock().await;
        let tx = conn.transaction()?;
        tx.execute(
            "INSERT OR REPLACE INTO settings (key, value) VALUES ('timezone', ?1)",
            duckdb::params![platform.timezone.name()],
        )?;
        tx.execute(
            "INSERT OR REPLACE INTO settings (key, value) VALUES ('platform_created_at', ?1)",
            duckdb::params![platform.created_at.to_rfc3339()],
        )?;
        tx.commit()?;
        info!(timezone = platform.timezone.name(), "platform settings updated");
        Ok(())
    }
}
