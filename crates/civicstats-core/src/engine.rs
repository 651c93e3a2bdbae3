//! The stats engine: filter → eligibility → grouping/bucketing → report.
//!
//! Every call is independent. Catalogs (projects, statuses, group members)
//! and platform settings are read fresh for each query; ideas are streamed
//! through the eligibility predicate straight into counters.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use tracing::debug;

use crate::analytics::{Dimension, IdeaRecord, IdeaStore};
use crate::bucket::{bucket_of, resolve_domain, DomainBounds, Interval};
use crate::config::default_feedback_status_codes;
use crate::eligibility::Eligibility;
use crate::error::StatsError;
use crate::filter::{FilterSpec, RawFilterParams};
use crate::grouping::GroupCounts;
use crate::report::{GroupedResult, Table, TimeSeries};

pub struct StatsEngine {
    store: Arc<dyn IdeaStore>,
    feedback_status_codes: Vec<String>,
    clock: fn() -> DateTime<Utc>,
}

impl StatsEngine {
    pub fn new(store: Arc<dyn IdeaStore>, feedback_status_codes: Vec<String>) -> Self {
        let feedback_status_codes = if feedback_status_codes.is_empty() {
            default_feedback_status_codes()
        } else {
            feedback_status_codes
        };
        Self {
            store,
            feedback_status_codes,
            clock: Utc::now,
        }
    }

    /// Replace the source of "now" used for open-ended series.
    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    /// Number of eligible ideas.
    pub async fn count(&self, raw: &RawFilterParams) -> Result<u64, StatsError> {
        let settings = self.store.platform_settings().await?;
        let filter = FilterSpec::build(raw, settings.timezone);

        let mut counts = GroupCounts::new(Dimension::None);
        self.scan(&filter, Dimension::None, |idea| counts.add(idea))
            .await?;
        Ok(counts.eligible())
    }

    /// Eligible ideas grouped by `dimension`, with display titles of the keys.
    pub async fn by_dimension(
        &self,
        raw: &RawFilterParams,
        dimension: Dimension,
    ) -> Result<GroupedResult, StatsError> {
        let settings = self.store.platform_settings().await?;
        let filter = FilterSpec::build(raw, settings.timezone);

        let mut counts = GroupCounts::new(dimension);
        self.scan(&filter, dimension, |idea| counts.add(idea)).await?;

        let keys = counts.keys();
        let labels = if dimension == Dimension::None || keys.is_empty() {
            HashMap::new()
        } else {
            self.store.titles(dimension, &keys).await?
        };
        Ok(GroupedResult { counts, labels })
    }

    /// Dense time series of eligible ideas at `raw.interval`.
    ///
    /// A degenerate range yields an empty series rather than an error.
    pub async fn over_time(
        &self,
        raw: &RawFilterParams,
        cumulative: bool,
    ) -> Result<TimeSeries, StatsError> {
        let interval = Interval::parse(raw.interval.as_deref())?;
        let settings = self.store.platform_settings().await?;
        let tz = settings.timezone;
        let filter = FilterSpec::build(raw, tz);
        let bounds = DomainBounds {
            start_at: filter.start_at,
            end_at: filter.end_at,
            platform_created_at: settings.created_at,
            now: (self.clock)(),
        };

        // With both bounds set the domain does not depend on the data.
        if filter.start_at.is_some()
            && filter.end_at.is_some()
            && resolve_domain(interval, tz, bounds, None).is_none()
        {
            debug!(interval = interval.as_str(), "empty series domain");
            return Ok(finish(
                TimeSeries::dense(interval, None, &BTreeMap::new()),
                cumulative,
            ));
        }

        let mut per_bucket: BTreeMap<NaiveDate, u64> = BTreeMap::new();
        self.scan(&filter, Dimension::None, |idea| {
            if let Some(published_at) = idea.published_at {
                *per_bucket
                    .entry(bucket_of(published_at, tz, interval))
                    .or_insert(0) += 1;
            }
        })
        .await?;

        let observed = per_bucket
            .keys()
            .next()
            .zip(per_bucket.keys().next_back())
            .map(|(first, last)| (*first, *last));
        let domain = resolve_domain(interval, tz, bounds, observed);
        Ok(finish(
            TimeSeries::dense(interval, domain, &per_bucket),
            cumulative,
        ))
    }

    /// Tabular rendering of [`Self::over_time`]. An empty domain cannot be
    /// exported and fails with [`StatsError::EmptyExportDomain`].
    pub async fn export_over_time(
        &self,
        raw: &RawFilterParams,
        cumulative: bool,
    ) -> Result<Table, StatsError> {
        let series = self.over_time(raw, cumulative).await?;
        if series.is_empty() {
            return Err(StatsError::EmptyExportDomain);
        }
        Ok(series.to_table())
    }

    /// Tabular rendering of [`Self::by_dimension`].
    pub async fn export_by_dimension(
        &self,
        raw: &RawFilterParams,
        dimension: Dimension,
    ) -> Result<Table, StatsError> {
        Ok(self.by_dimension(raw, dimension).await?.to_table())
    }

    async fn scan<F>(
        &self,
        filter: &FilterSpec,
        dimension: Dimension,
        mut visit: F,
    ) -> Result<(), StatsError>
    where
        F: FnMut(&IdeaRecord) + Send,
    {
        let projects = self.store.projects().await?;
        let statuses = self.store.idea_statuses().await?;
        let group_members = match filter.group_id {
            Some(ref group_id) => Some(self.store.group_member_ids(group_id).await?),
            None => None,
        };
        let eligibility = Eligibility::new(
            filter,
            &projects,
            &statuses,
            &self.feedback_status_codes,
            group_members,
        );

        let mut scanned: u64 = 0;
        let mut admitted: u64 = 0;
        let mut sink = |idea: &IdeaRecord| {
            scanned += 1;
            if eligibility.admits(idea) {
                admitted += 1;
                visit(idea);
            }
        };
        self.store.scan_ideas(filter, &mut sink).await?;

        debug!(
            dimension = dimension.as_str(),
            scanned, admitted, "idea scan finished"
        );
        Ok(())
    }
}

fn finish(series: TimeSeries, cumulative: bool) -> TimeSeries {
    if cumulative {
        series.into_cumulative()
    } else {
        series
    }
}
