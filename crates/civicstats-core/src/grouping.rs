//! Dimension Grouper.
//!
//! Grouping is a pure expansion of each idea into zero or more group keys,
//! followed by a reduction into counts. Topics fan out (one key per topic);
//! status and project yield exactly one key; `Dimension::None` yields none and
//! only the eligible total is kept.

use std::collections::BTreeMap;

use crate::analytics::{Dimension, IdeaRecord};

/// Group keys `idea` contributes +1 to under `dimension`.
pub fn contributions(idea: &IdeaRecord, dimension: Dimension) -> Vec<&str> {
    match dimension {
        Dimension::Topic => idea.topic_ids.iter().map(String::as_str).collect(),
        Dimension::Status => vec![idea.status_id.as_str()],
        Dimension::Project => vec![idea.project_id.as_str()],
        Dimension::None => Vec::new(),
    }
}

/// Running reduction of [`contributions`] over a stream of eligible ideas.
///
/// Holds one counter per distinct key, never the ideas themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupCounts {
    dimension: Dimension,
    counts: BTreeMap<String, u64>,
    eligible: u64,
}

impl GroupCounts {
    pub fn new(dimension: Dimension) -> Self {
        Self {
            dimension,
            counts: BTreeMap::new(),
            eligible: 0,
        }
    }

    pub fn add(&mut self, idea: &IdeaRecord) {
        self.eligible += 1;
        for key in contributions(idea, self.dimension) {
            match self.counts.get_mut(key) {
                Some(n) => *n += 1,
                None => {
                    self.counts.insert(key.to_string(), 1);
                }
            }
        }
    }

    pub fn dimension(&self) -> Dimension {
        self.dimension
    }

    /// Number of eligible ideas seen, independent of fan-out.
    pub fn eligible(&self) -> u64 {
        self.eligible
    }

    /// Sum over all groups. Equals [`Self::eligible`] for partitioning
    /// dimensions; may exceed it for topics.
    pub fn grouped_total(&self) -> u64 {
        self.counts.values().sum()
    }

    pub fn keys(&self) -> Vec<String> {
        self.counts.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.counts.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn get(&self, key: &str) -> u64 {
        self.counts.get(key).copied().unwrap_or(0)
    }
}
