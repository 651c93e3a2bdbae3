//! Filter Spec Builder: raw request values → a normalized [`FilterSpec`].
//!
//! Everything here is lenient. Empty or malformed bounds, blank ids and
//! unrecognised booleans all normalize to "no filter"; only the interval of a
//! time-series query can fail (see [`crate::bucket::Interval::parse`]).

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::bucket::{local_end_of_day, local_start_of_day, local_to_utc};

/// Years a bound may fall in. Anything outside is treated as malformed.
const BOUND_YEARS: std::ops::RangeInclusive<i32> = 1..=9999;

const LOCAL_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Filter values exactly as they arrived, before normalization.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawFilterParams {
    pub start_at: Option<String>,
    pub end_at: Option<String>,
    pub project: Option<String>,
    pub group: Option<String>,
    pub topic: Option<String>,
    pub feedback_needed: Option<String>,
    pub interval: Option<String>,
}

/// A validated, conjunctive set of idea predicates. Bounds are inclusive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterSpec {
    pub start_at: Option<DateTime<Utc>>,
    pub end_at: Option<DateTime<Utc>>,
    pub project_id: Option<String>,
    pub group_id: Option<String>,
    pub topic_id: Option<String>,
    pub feedback_needed: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundEdge {
    Start,
    End,
}

impl FilterSpec {
    /// Normalize `raw`, reading naked dates and local times in `tz`.
    pub fn build(raw: &RawFilterParams, tz: Tz) -> Self {
        Self {
            start_at: parse_bound(raw.start_at.as_deref(), tz, BoundEdge::Start),
            end_at: parse_bound(raw.end_at.as_deref(), tz, BoundEdge::End),
            project_id: normalize_id(raw.project.as_deref()),
            group_id: normalize_id(raw.group.as_deref()),
            topic_id: normalize_id(raw.topic.as_deref()),
            feedback_needed: parse_flag(raw.feedback_needed.as_deref()),
        }
    }

    /// `true` when `ts` lies within both bounds.
    pub fn within_bounds(&self, ts: DateTime<Utc>) -> bool {
        self.start_at.map_or(true, |start| ts >= start) && self.end_at.map_or(true, |end| ts <= end)
    }

    pub fn requires_feedback_needed(&self) -> bool {
        self.feedback_needed == Some(true)
    }
}

/// Parse one bound. Accepts RFC 3339, a local date-time, or a bare date.
///
/// A bare date means the first instant of that local day for a start bound
/// and the last instant of it for an end bound. Instants outside years
/// 1..=9999 are unset.
pub fn parse_bound(raw: Option<&str>, tz: Tz, edge: BoundEdge) -> Option<DateTime<Utc>> {
    parse_bound_unchecked(raw, tz, edge).filter(|ts| BOUND_YEARS.contains(&ts.year()))
}

fn parse_bound_unchecked(raw: Option<&str>, tz: Tz, edge: BoundEdge) -> Option<DateTime<Utc>> {
    let trimmed = raw?.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(ts) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(ts.with_timezone(&Utc));
    }

    for format in LOCAL_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            if !BOUND_YEARS.contains(&naive.year()) {
                return None;
            }
            return local_to_utc(tz, naive);
        }
    }

    let date = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .filter(|d| BOUND_YEARS.contains(&d.year()))?;
    match edge {
        BoundEdge::Start => local_start_of_day(tz, date),
        BoundEdge::End => local_end_of_day(tz, date),
    }
}

fn normalize_id(raw: Option<&str>) -> Option<String> {
    let trimmed = raw?.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// `true`/`1` and `false`/`0`, case-insensitive. Anything else is unset.
fn parse_flag(raw: Option<&str>) -> Option<bool> {
    match raw?.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(raw: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(raw)
            .expect("valid timestamp")
            .with_timezone(&Utc)
    }

    fn brussels() -> Tz {
        "Europe/Brussels".parse().expect("tz")
    }

    #[test]
    fn rfc3339_bounds_are_taken_as_is() {
        let spec = FilterSpec::build(
            &RawFilterParams {
                start_at: Some("2024-01-01T10:00:00+01:00".to_string()),
                end_at: Some("2024-02-01T00:00:00Z".to_string()),
                ..Default::default()
            },
            brussels(),
        );
        assert_eq!(spec.start_at, Some(utc("2024-01-01T09:00:00Z")));
        assert_eq!(spec.end_at, Some(utc("2024-02-01T00:00:00Z")));
    }

    #[test]
    fn naked_dates_cover_whole_local_days() {
        let spec = FilterSpec::build(
            &RawFilterParams {
                start_at: Some("2024-01-01".to_string()),
                end_at: Some("2024-01-31".to_string()),
                ..Default::default()
            },
            brussels(),
        );
        assert_eq!(spec.start_at, Some(utc("2023-12-31T23:00:00Z")));
        assert_eq!(spec.end_at, Some(utc("2024-01-31T22:59:59.999999Z")));
    }

    #[test]
    fn local_datetimes_use_platform_timezone() {
        let parsed = parse_bound(Some("2024-07-01 12:00:00"), brussels(), BoundEdge::Start);
        assert_eq!(parsed, Some(utc("2024-07-01T10:00:00Z")));
    }

    #[test]
    fn malformed_and_empty_bounds_are_unset() {
        let spec = FilterSpec::build(
            &RawFilterParams {
                start_at: Some("".to_string()),
                end_at: Some("not-a-date".to_string()),
                ..Default::default()
            },
            chrono_tz::UTC,
        );
        assert_eq!(spec.start_at, None);
        assert_eq!(spec.end_at, None);
        assert_eq!(
            parse_bound(Some("2024-13-45"), chrono_tz::UTC, BoundEdge::End),
            None
        );
    }

    #[test]
    fn bounds_outside_the_calendar_window_are_unset() {
        for raw in ["-262143-01-01", "+200000-01-01", "0000-06-01", "+10000-01-01T00:00:00"] {
            assert_eq!(parse_bound(Some(raw), chrono_tz::UTC, BoundEdge::Start), None, "{raw}");
            assert_eq!(parse_bound(Some(raw), brussels(), BoundEdge::End), None, "{raw}");
        }
        assert_eq!(
            parse_bound(Some("9999-12-31"), chrono_tz::UTC, BoundEdge::End),
            Some(utc("9999-12-31T23:59:59.999999Z"))
        );
        assert_eq!(
            parse_bound(Some("0001-01-01"), chrono_tz::UTC, BoundEdge::Start),
            Some(utc("0001-01-01T00:00:00Z"))
        );
    }

    #[test]
    fn blank_ids_are_unset_and_unknown_ids_pass_through() {
        let spec = FilterSpec::build(
            &RawFilterParams {
                project: Some("  ".to_string()),
                group: Some("no-such-group".to_string()),
                topic: Some(" t1 ".to_string()),
                ..Default::default()
            },
            chrono_tz::UTC,
        );
        assert_eq!(spec.project_id, None);
        assert_eq!(spec.group_id.as_deref(), Some("no-such-group"));
        assert_eq!(spec.topic_id.as_deref(), Some("t1"));
    }

    #[test]
    fn feedback_flag_is_lenient() {
        assert_eq!(parse_flag(Some("true")), Some(true));
        assert_eq!(parse_flag(Some("TRUE")), Some(true));
        assert_eq!(parse_flag(Some("1")), Some(true));
        assert_eq!(parse_flag(Some("0")), Some(false));
        assert_eq!(parse_flag(Some("yes")), None);
        assert_eq!(parse_flag(None), None);
    }

    #[test]
    fn bounds_are_inclusive() {
        let spec = FilterSpec {
            start_at: Some(utc("2024-01-01T00:00:00Z")),
            end_at: Some(utc("2024-01-31T00:00:00Z")),
            ..Default::default()
        };
        assert!(spec.within_bounds(utc("2024-01-01T00:00:00Z")));
        assert!(spec.within_bounds(utc("2024-01-31T00:00:00Z")));
        assert!(!spec.within_bounds(utc("2024-01-31T00:00:00.000001Z")));
        assert!(!spec.within_bounds(utc("2023-12-31T23:59:59Z")));
        assert!(FilterSpec::default().within_bounds(utc("1999-01-01T00:00:00Z")));
    }
}
