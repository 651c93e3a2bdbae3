use chrono::{DateTime, Utc};
use chrono_tz::Tz;

/// Status codes that require an official response when none is configured.
pub const DEFAULT_FEEDBACK_STATUS_CODES: &[&str] = &["proposed"];

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub data_dir: String,
    pub duckdb_memory_limit: String,
    /// Platform timezone seeded into the store on first open.
    pub timezone: Tz,
    /// Platform creation instant seeded into the store on first open.
    pub platform_created_at: DateTime<Utc>,
    /// Idea status codes whose ideas await an official response.
    pub feedback_status_codes: Vec<String>,
    pub cors_origins: Vec<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        Ok(Self {
            port: std::env::var("CIVICSTATS_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .map_err(|e| format!("invalid port: {e}"))?,
            data_dir: std::env::var("CIVICSTATS_DATA_DIR")
                .unwrap_or_else(|_| "./data".to_string()),
            duckdb_memory_limit: std::env::var("CIVICSTATS_DUCKDB_MEMORY")
                .unwrap_or_else(|_| "1GB".to_string()),
            timezone: {
                let raw =
                    std::env::var("CIVICSTATS_TIMEZONE").unwrap_or_else(|_| "UTC".to_string());
                raw.trim()
                    .parse::<Tz>()
                    .map_err(|_| format!("invalid CIVICSTATS_TIMEZONE: {raw}"))?
            },
            platform_created_at: match std::env::var("CIVICSTATS_PLATFORM_CREATED_AT") {
                Ok(raw) => DateTime::parse_from_rfc3339(raw.trim())
                    .map_err(|e| format!("invalid CIVICSTATS_PLATFORM_CREATED_AT: {e}"))?
                    .with_timezone(&Utc),
                Err(_) => Utc::now(),
            },
            feedback_status_codes: std::env::var("CIVICSTATS_FEEDBACK_STATUS_CODES")
                .map(|v| parse_code_list(&v))
                .unwrap_or_else(|_| default_feedback_status_codes()),
            cors_origins: std::env::var("CIVICSTATS_CORS_ORIGINS")
                .map(|v| v.split(',').map(str::to_string).collect())
                .unwrap_or_default(),
        })
    }
}

pub fn default_feedback_status_codes() -> Vec<String> {
    DEFAULT_FEEDBACK_STATUS_CODES
        .iter()
        .map(|c| (*c).to_string())
        .collect()
}

fn parse_code_list(raw: &str) -> Vec<String> {
    let codes: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect();
    if codes.is_empty() {
        default_feedback_status_codes()
    } else {
        codes
    }
}
