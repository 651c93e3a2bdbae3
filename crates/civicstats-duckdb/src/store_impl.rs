use std::collections::{HashMap, HashSet};

use async_trait::async_trait;

use civicstats_core::analytics::{
    Dimension, IdeaSink, IdeaStatus, IdeaStore, PlatformSettings, Project,
};
use civicstats_core::filter::FilterSpec;

use crate::DuckDbBackend;

#[async_trait]
impl IdeaStore for DuckDbBackend {
    async fn platform_settings(&self) -> anyhow::Result<PlatformSettings> {
        DuckDbBackend::platform_settings(self).await
    }

    async fn projects(&self) -> anyhow::Result<Vec<Project>> {
        DuckDbBackend::projects(self).await
    }

    async fn idea_statuses(&self) -> anyhow::Result<Vec<IdeaStatus>> {
        DuckDbBackend::idea_statuses(self).await
    }

    async fn group_member_ids(&self, group_id: &str) -> anyhow::Result<HashSet<String>> {
        DuckDbBackend::group_member_ids(self, group_id).await
    }

    async fn scan_ideas(
        &self,
        filter: &FilterSpec,
        sink: &mut IdeaSink<'_>,
    ) -> anyhow::Result<()> {
        DuckDbBackend::scan_ideas(self, filter, sink).await
    }

    async fn titles(
        &self,
        dimension: Dimension,
        ids: &[String],
    ) -> anyhow::Result<HashMap<String, String>> {
        DuckDbBackend::titles(self, dimension, ids).await
    }
}
