//! Eligibility Predicate: does an idea count, and does it match the filter?

use std::collections::HashSet;

use crate::analytics::{IdeaRecord, IdeaStatus, Project};
use crate::filter::FilterSpec;

/// Per-query predicate built from the filter and the catalogs loaded for it.
///
/// The catalogs are attribute lookups recomputed for every query, so a status
/// reconfigured between two requests is picked up by the second one.
#[derive(Debug, Clone)]
pub struct Eligibility<'a> {
    filter: &'a FilterSpec,
    survey_projects: HashSet<String>,
    feedback_statuses: HashSet<String>,
    group_members: Option<HashSet<String>>,
}

impl<'a> Eligibility<'a> {
    /// `group_members` must be `Some` whenever `filter.group_id` is set.
    pub fn new(
        filter: &'a FilterSpec,
        projects: &[Project],
        statuses: &[IdeaStatus],
        feedback_status_codes: &[String],
        group_members: Option<HashSet<String>>,
    ) -> Self {
        let survey_projects = projects
            .iter()
            .filter(|p| p.is_native_survey())
            .map(|p| p.id.clone())
            .collect();
        let feedback_statuses = statuses
            .iter()
            .filter(|s| feedback_status_codes.iter().any(|code| code == &s.code))
            .map(|s| s.id.clone())
            .collect();
        Self {
            filter,
            survey_projects,
            feedback_statuses,
            group_members,
        }
    }

    /// Platform-level exclusions that apply regardless of any filter: survey
    /// responses and unpublished drafts never count.
    pub fn excluded_globally(&self, idea: &IdeaRecord) -> bool {
        idea.published_at.is_none() || self.survey_projects.contains(&idea.project_id)
    }

    /// Current status awaits an official response and none was recorded yet.
    pub fn feedback_needed(&self, idea: &IdeaRecord) -> bool {
        self.feedback_statuses.contains(&idea.status_id) && !idea.has_official_feedback
    }

    pub fn admits(&self, idea: &IdeaRecord) -> bool {
        if self.excluded_globally(idea) {
            return false;
        }
        let Some(published_at) = idea.published_at else {
            return false;
        };
        if !self.filter.within_bounds(published_at) {
            return false;
        }
        if let Some(ref project_id) = self.filter.project_id {
            if &idea.project_id != project_id {
                return false;
            }
        }
        if self.filter.group_id.is_some() {
            let is_member = match (&self.group_members, &idea.author_id) {
                (Some(members), Some(author_id)) => members.contains(author_id),
                _ => false,
            };
            if !is_member {
                return false;
            }
        }
        if let Some(ref topic_id) = self.filter.topic_id {
            if !idea.topic_ids.iter().any(|t| t == topic_id) {
                return false;
            }
        }
        if self.filter.requires_feedback_needed() && !self.feedback_needed(idea) {
            return false;
        }
        true
    }
}
