//! In-memory [`IdeaStore`] implementations for unit tests.

use std::collections::{HashMap, HashSet};

use anyhow::anyhow;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use crate::analytics::{
    Dimension, IdeaRecord, IdeaSink, IdeaStatus, IdeaStore, ParticipationMethod,
    PlatformSettings, Project,
};
use crate::filter::FilterSpec;

/// Streams every idea it holds; no filter push-down.
pub(crate) struct MemoryStore {
    pub settings: PlatformSettings,
    pub projects: Vec<Project>,
    pub statuses: Vec<IdeaStatus>,
    pub topics: HashMap<String, String>,
    /// `(group_id, user_id)` pairs.
    pub memberships: Vec<(String, String)>,
    pub ideas: Vec<IdeaRecord>,
}

impl MemoryStore {
    pub fn new(timezone: Tz, created_at: DateTime<Utc>) -> Self {
        Self {
            settings: PlatformSettings {
                timezone,
                created_at,
            },
            projects: Vec::new(),
            statuses: Vec::new(),
            topics: HashMap::new(),
            memberships: Vec::new(),
            ideas: Vec::new(),
        }
    }

    pub fn add_project(&mut self, id: &str, title: &str, method: ParticipationMethod) {
        self.projects.push(Project {
            id: id.to_string(),
            title: title.to_string(),
            participation_method: method,
        });
    }

    pub fn add_status(&mut self, id: &str, code: &str, title: &str) {
        self.statuses.push(IdeaStatus {
            id: id.to_string(),
            code: code.to_string(),
            title: title.to_string(),
        });
    }

    pub fn add_topic(&mut self, id: &str, title: &str) {
        self.topics.insert(id.to_string(), title.to_string());
    }

    /// A published, topic-less idea in status `proposed`, authored by
    /// `author-{id}`.
    pub fn idea(id: &str, project_id: &str, published_at: &str) -> IdeaRecord {
        let published_at = DateTime::parse_from_rfc3339(published_at)
            .expect("valid timestamp")
            .with_timezone(&Utc);
        IdeaRecord {
            id: id.to_string(),
            project_id: project_id.to_string(),
            author_id: Some(format!("author-{id}")),
            topic_ids: Vec::new(),
            status_id: "proposed".to_string(),
            published_at: Some(published_at),
            has_official_feedback: false,
        }
    }
}

#[async_trait]
impl IdeaStore for MemoryStore {
    async fn platform_settings(&self) -> anyhow::Result<PlatformSettings> {
        Ok(self.settings.clone())
    }

    async fn projects(&self) -> anyhow::Result<Vec<Project>> {
        Ok(self.projects.clone())
    }

    async fn idea_statuses(&self) -> anyhow::Result<Vec<IdeaStatus>> {
        Ok(self.statuses.clone())
    }

    async fn group_member_ids(&self, group_id: &str) -> anyhow::Result<HashSet<String>> {
        Ok(self
            .memberships
            .iter()
            .filter(|(group, _)| group == group_id)
            .map(|(_, user)| user.clone())
            .collect())
    }

    async fn scan_ideas(
        &self,
        _filter: &FilterSpec,
        sink: &mut IdeaSink<'_>,
    ) -> anyhow::Result<()> {
        for idea in &self.ideas {
            sink(idea);
        }
        Ok(())
    }

    async fn titles(
        &self,
        dimension: Dimension,
        ids: &[String],
    ) -> anyhow::Result<HashMap<String, String>> {
        let catalog: HashMap<&str, &str> = match dimension {
            Dimension::Topic => self
                .topics
                .iter()
                .map(|(id, title)| (id.as_str(), title.as_str()))
                .collect(),
            Dimension::Status => self
                .statuses
                .iter()
                .map(|s| (s.id.as_str(), s.title.as_str()))
                .collect(),
            Dimension::Project => self
                .projects
                .iter()
                .map(|p| (p.id.as_str(), p.title.as_str()))
                .collect(),
            Dimension::None => HashMap::new(),
        };
        Ok(ids
            .iter()
            .filter_map(|id| {
                catalog
                    .get(id.as_str())
                    .map(|title| (id.clone(), (*title).to_string()))
            })
            .collect())
    }
}

/// Fails every call.
pub(crate) struct FailingStore;

#[async_trait]
impl IdeaStore for FailingStore {
    async fn platform_settings(&self) -> anyhow::Result<PlatformSettings> {
        Err(anyhow!("store unavailable"))
    }

    async fn projects(&self) -> anyhow::Result<Vec<Project>> {
        Err(anyhow!("store unavailable"))
    }

    async fn idea_statuses(&self) -> anyhow::Result<Vec<IdeaStatus>> {
        Err(anyhow!("store unavailable"))
    }

    async fn group_member_ids(&self, _group_id: &str) -> anyhow::Result<HashSet<String>> {
        Err(anyhow!("store unavailable"))
    }

    async fn scan_ideas(
        &self,
        _filter: &FilterSpec,
        _sink: &mut IdeaSink<'_>,
    ) -> anyhow::Result<()> {
        Err(anyhow!("store unavailable"))
    }

    async fn titles(
        &self,
        _dimension: Dimension,
        _ids: &[String],
    ) -> anyhow::Result<HashMap<String, String>> {
        Err(anyhow!("store unavailable"))
    }
}
