//! Result Assembler: the compact (keyed map) and tabular renderings.
//!
//! Both renderings are produced from the same ordered key/count pairs, so a
//! tabular export always reports the same per-key counts, in the same order,
//! as the compact form.

use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::analytics::Dimension;
use crate::bucket::{format_bucket, BucketDomain, Interval};
use crate::cumulative::running_totals;
use crate::grouping::GroupCounts;

/// Name of the count column in grouped tables.
pub const IDEAS_COLUMN: &str = "ideas";

/// Ordered key → count pairs. Serializes as a JSON object in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyedCounts(Vec<(String, u64)>);

impl KeyedCounts {
    pub fn push(&mut self, key: impl Into<String>, count: u64) {
        self.0.push((key.into(), count));
    }

    pub fn get(&self, key: &str) -> Option<u64> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| *v)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sum of all values.
    pub fn total(&self) -> u64 {
        self.0.iter().map(|(_, v)| *v).sum()
    }
}

impl Serialize for KeyedCounts {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, count) in &self.0 {
            map.serialize_entry(key, count)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CountReport {
    pub count: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SeriesBody {
    pub ideas: KeyedCounts,
}

/// `{ "series": { "ideas": {...} } }`, plus `projects` labels when grouped by
/// project.
#[derive(Debug, Clone, Serialize)]
pub struct CompactReport {
    pub series: SeriesBody,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub projects: Option<BTreeMap<String, String>>,
}

/// One scalar value in a table row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
    /// Human-entered display title.
    Label(String),
    /// Group key or bucket date; identical to the compact-form key.
    Key(String),
    Count(u64),
}

impl Cell {
    pub fn as_field(&self) -> Cow<'_, str> {
        match self {
            Self::Label(text) | Self::Key(text) => Cow::Borrowed(text.as_str()),
            Self::Count(n) => Cow::Owned(n.to_string()),
        }
    }
}

/// Header row plus scalar rows, handed to a tabular writer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    fn new(headers: &[&str]) -> Self {
        Self {
            headers: headers.iter().map(|h| (*h).to_string()).collect(),
            rows: Vec::new(),
        }
    }

    /// Sum of the count column (the last one).
    pub fn count_total(&self) -> u64 {
        self.rows
            .iter()
            .filter_map(|row| match row.last() {
                Some(Cell::Count(n)) => Some(*n),
                _ => None,
            })
            .sum()
    }
}

/// Grouped counts together with the display titles of their keys.
#[derive(Debug, Clone)]
pub struct GroupedResult {
    pub counts: GroupCounts,
    pub labels: HashMap<String, String>,
}

impl GroupedResult {
    pub fn dimension(&self) -> Dimension {
        self.counts.dimension()
    }

    pub fn keyed_counts(&self) -> KeyedCounts {
        let mut keyed = KeyedCounts::default();
        for (key, count) in self.counts.iter() {
            keyed.push(key, count);
        }
        keyed
    }

    pub fn to_compact(&self) -> CompactReport {
        let projects = (self.dimension() == Dimension::Project).then(|| {
            self.counts
                .iter()
                .map(|(key, _)| (key.to_string(), self.label(key).to_string()))
                .collect()
        });
        CompactReport {
            series: SeriesBody {
                ideas: self.keyed_counts(),
            },
            projects,
        }
    }

    pub fn to_table(&self) -> Table {
        let dimension = self.dimension();
        if dimension == Dimension::None {
            let mut table = Table::new(&[IDEAS_COLUMN]);
            table.rows.push(vec![Cell::Count(self.counts.eligible())]);
            return table;
        }

        let label_column = dimension.as_str();
        let id_column = format!("{label_column}_id");
        let mut table = Table::new(&[label_column, id_column.as_str(), IDEAS_COLUMN]);
        for (key, count) in self.counts.iter() {
            table.rows.push(vec![
                Cell::Label(self.label(key).to_string()),
                Cell::Key(key.to_string()),
                Cell::Count(count),
            ]);
        }
        table
    }

    fn label(&self, key: &str) -> &str {
        self.labels.get(key).map(String::as_str).unwrap_or("")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeriesPoint {
    pub bucket: NaiveDate,
    pub count: u64,
}

/// Dense, ascending series over a bucket domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeSeries {
    pub interval: Interval,
    pub cumulative: bool,
    pub points: Vec<SeriesPoint>,
}

impl TimeSeries {
    /// Zero-fill `counts` over `domain`. No domain gives an empty series.
    pub fn dense(
        interval: Interval,
        domain: Option<BucketDomain>,
        counts: &BTreeMap<NaiveDate, u64>,
    ) -> Self {
        let points = domain
            .map(|d| {
                d.iter()
                    .map(|bucket| SeriesPoint {
                        bucket,
                        count: counts.get(&bucket).copied().unwrap_or(0),
                    })
                    .collect()
            })
            .unwrap_or_default();
        Self {
            interval,
            cumulative: false,
            points,
        }
    }

    pub fn into_cumulative(self) -> Self {
        if self.cumulative {
            return self;
        }
        let totals = running_totals(self.points.iter().map(|p| p.count));
        let points = self
            .points
            .iter()
            .zip(totals)
            .map(|(p, total)| SeriesPoint {
                bucket: p.bucket,
                count: total,
            })
            .collect();
        Self {
            interval: self.interval,
            cumulative: true,
            points,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of ideas the series covers: the last running total for a
    /// cumulative series, the plain sum otherwise.
    pub fn covered_total(&self) -> u64 {
        if self.cumulative {
            self.points.last().map_or(0, |p| p.count)
        } else {
            self.points.iter().map(|p| p.count).sum()
        }
    }

    pub fn keyed_counts(&self) -> KeyedCounts {
        let mut keyed = KeyedCounts::default();
        for point in &self.points {
            keyed.push(format_bucket(point.bucket), point.count);
        }
        keyed
    }

    pub fn to_compact(&self) -> CompactReport {
        CompactReport {
            series: SeriesBody {
                ideas: self.keyed_counts(),
            },
            projects: None,
        }
    }

    pub fn to_table(&self) -> Table {
        let mut table = Table::new(&["date", "amount"]);
        for point in &self.points {
            table.rows.push(vec![
                Cell::Key(format_bucket(point.bucket)),
                Cell::Count(point.count),
            ]);
        }
        table
    }
}
