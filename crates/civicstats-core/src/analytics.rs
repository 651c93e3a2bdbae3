//! Record-store abstraction and the records the stats engine reads.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::filter::FilterSpec;

/// How a project collects input. Only `NativeSurvey` matters to statistics:
/// ideas posted under it are form responses and never count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticipationMethod {
    Ideation,
    NativeSurvey,
    Other(String),
}

impl ParticipationMethod {
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "ideation" => Self::Ideation,
            "native_survey" => Self::NativeSurvey,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Ideation => "ideation",
            Self::NativeSurvey => "native_survey",
            Self::Other(raw) => raw.as_str(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Project {
    pub id: String,
    pub title: String,
    pub participation_method: ParticipationMethod,
}

impl Project {
    pub fn is_native_survey(&self) -> bool {
        self.participation_method == ParticipationMethod::NativeSurvey
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct IdeaStatus {
    pub id: String,
    pub code: String,
    pub title: String,
}

/// One idea as streamed out of the record store.
///
/// `has_official_feedback` is a fact, not the derived "feedback needed"
/// flag; the latter is recomputed by the engine from the status catalog on
/// every query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdeaRecord {
    pub id: String,
    pub project_id: String,
    pub author_id: Option<String>,
    /// Ordered, duplicate-free.
    pub topic_ids: Vec<String>,
    pub status_id: String,
    /// `None` while the idea is an unpublished draft.
    pub published_at: Option<DateTime<Utc>>,
    pub has_official_feedback: bool,
}

/// Platform-wide settings the engine needs for bucketing and date parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformSettings {
    pub timezone: Tz,
    pub created_at: DateTime<Utc>,
}

/// Dimension an eligible idea set is grouped by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Topic,
    Status,
    Project,
    None,
}

impl Dimension {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Topic => "topic",
            Self::Status => "status",
            Self::Project => "project",
            Self::None => "none",
        }
    }
}

/// Callback the store invokes once per streamed idea.
pub type IdeaSink<'a> = dyn FnMut(&IdeaRecord) + Send + 'a;

/// Read-only view of the participation records.
///
/// The DuckDB backend implements this in `civicstats-duckdb`. Implementations
/// may push any part of a [`FilterSpec`] down into their query, but must never
/// drop a record that satisfies it; the engine re-checks every streamed
/// record against the full eligibility predicate.
#[async_trait]
pub trait IdeaStore: Send + Sync + 'static {
    async fn platform_settings(&self) -> anyhow::Result<PlatformSettings>;

    async fn projects(&self) -> anyhow::Result<Vec<Project>>;

    async fn idea_statuses(&self) -> anyhow::Result<Vec<IdeaStatus>>;

    /// User ids of the members of `group_id`. Empty for unknown groups.
    async fn group_member_ids(&self, group_id: &str) -> anyhow::Result<HashSet<String>>;

    /// Stream every idea that may satisfy `filter` into `sink`.
    async fn scan_ideas(&self, filter: &FilterSpec, sink: &mut IdeaSink<'_>)
        -> anyhow::Result<()>;

    /// Display titles for the given ids of `dimension`. Unknown ids are
    /// absent from the result.
    async fn titles(
        &self,
        dimension: Dimension,
        ids: &[String],
    ) -> anyhow::Result<HashMap<String, String>>;
}
