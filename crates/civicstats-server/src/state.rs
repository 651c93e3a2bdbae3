use std::sync::Arc;

use chrono::{DateTime, Utc};

use civicstats_core::analytics::IdeaStore;
use civicstats_core::engine::StatsEngine;
use civicstats_duckdb::DuckDbBackend;

use crate::config::Config;

/// Shared application state, passed to every Axum handler via
/// `State<Arc<AppState>>`.
pub struct AppState {
    /// The DuckDB backend. Internally uses `Arc<tokio::sync::Mutex<Connection>>`
    /// so it is already cheap to share and async-safe.
    pub db: Arc<DuckDbBackend>,

    /// Stats engine reading through `db`.
    pub engine: StatsEngine,

    /// Parsed configuration, loaded once at startup from environment variables.
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(db: DuckDbBackend, config: Config) -> Self {
        let db = Arc::new(db);
        let store: Arc<dyn IdeaStore> = db.clone();
        let engine = StatsEngine::new(store, config.feedback_status_codes.clone());
        Self {
            db,
            engine,
            config: Arc::new(config),
        }
    }

    /// Pin the engine's notion of "now"; used by tests of open-ended series.
    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.engine = self.engine.with_clock(clock);
        self
    }
}
