//! Timezone-aware time buckets.
//!
//! Every boundary computation here is a pure function of (timestamp,
//! timezone, interval). Buckets are identified by the local calendar date on
//! which they start: a day bucket by its date, a week bucket by its Monday
//! (ISO weeks), a month bucket by its first day and a year bucket by January 1.
//! Working on local dates rather than UTC offsets keeps daylight-saving
//! transitions out of the bucket arithmetic entirely.

use chrono::{
    DateTime, Datelike, Days, Duration, LocalResult, Months, NaiveDate, NaiveDateTime, TimeZone,
    Utc,
};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::StatsError;

/// Upper bound on 15-minute steps taken to leave a DST gap.
const MAX_GAP_STEPS: usize = 4 * 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Interval {
    Day,
    Week,
    Month,
    Year,
}

impl Interval {
    pub fn parse(raw: Option<&str>) -> Result<Self, StatsError> {
        match raw.map(str::trim) {
            Some("day") => Ok(Self::Day),
            Some("week") => Ok(Self::Week),
            Some("month") => Ok(Self::Month),
            Some("year") => Ok(Self::Year),
            Some(other) => Err(StatsError::InvalidInterval(other.to_string())),
            None => Err(StatsError::InvalidInterval(String::new())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
            Self::Year => "year",
        }
    }

    /// First local date of the bucket containing `date`.
    pub fn truncate(self, date: NaiveDate) -> NaiveDate {
        match self {
            Self::Day => date,
            Self::Week => date
                .checked_sub_days(Days::new(u64::from(date.weekday().num_days_from_monday())))
                .unwrap_or(date),
            Self::Month => NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap_or(date),
            Self::Year => NaiveDate::from_ymd_opt(date.year(), 1, 1).unwrap_or(date),
        }
    }

    /// Start of the bucket following `bucket`. `None` past the calendar's end.
    pub fn succ(self, bucket: NaiveDate) -> Option<NaiveDate> {
        match self {
            Self::Day => bucket.checked_add_days(Days::new(1)),
            Self::Week => bucket.checked_add_days(Days::new(7)),
            Self::Month => bucket.checked_add_months(Months::new(1)),
            Self::Year => bucket.checked_add_months(Months::new(12)),
        }
    }
}

/// Local calendar date of `ts` in `tz`.
pub fn local_date(ts: DateTime<Utc>, tz: Tz) -> NaiveDate {
    ts.with_timezone(&tz).date_naive()
}

/// Bucket (identified by its first local date) that `ts` falls into.
pub fn bucket_of(ts: DateTime<Utc>, tz: Tz, interval: Interval) -> NaiveDate {
    interval.truncate(local_date(ts, tz))
}

/// Resolve a wall-clock time in `tz` to an instant.
///
/// Ambiguous times (clocks turned back) resolve to the earlier instant.
/// Times inside a gap (clocks turned forward) move forward in 15-minute steps
/// until they exist.
pub fn local_to_utc(tz: Tz, naive: NaiveDateTime) -> Option<DateTime<Utc>> {
    let mut candidate = naive;
    for _ in 0..=MAX_GAP_STEPS {
        match tz.from_local_datetime(&candidate) {
            LocalResult::Single(dt) => return Some(dt.with_timezone(&Utc)),
            LocalResult::Ambiguous(a, b) => return Some(a.min(b).with_timezone(&Utc)),
            LocalResult::None => {
                candidate = candidate.checked_add_signed(Duration::minutes(15))?;
            }
        }
    }
    None
}

/// First instant of the local day `date`.
pub fn local_start_of_day(tz: Tz, date: NaiveDate) -> Option<DateTime<Utc>> {
    local_to_utc(tz, date.and_hms_opt(0, 0, 0)?)
}

/// Last representable instant (microsecond precision) of the local day `date`.
pub fn local_end_of_day(tz: Tz, date: NaiveDate) -> Option<DateTime<Utc>> {
    let next_start = local_start_of_day(tz, date.succ_opt()?)?;
    Some(next_start - Duration::microseconds(1))
}

/// Compact-form key of a bucket.
pub fn format_bucket(bucket: NaiveDate) -> String {
    bucket.format("%Y-%m-%d").to_string()
}

/// An inclusive, non-empty run of buckets at one interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BucketDomain {
    interval: Interval,
    first: NaiveDate,
    last: NaiveDate,
}

impl BucketDomain {
    /// Domain covering the buckets of `from` through `to`. `None` when `to`
    /// falls in a bucket before `from`'s.
    pub fn new(interval: Interval, from: NaiveDate, to: NaiveDate) -> Option<Self> {
        let first = interval.truncate(from);
        let last = interval.truncate(to);
        (first <= last).then_some(Self {
            interval,
            first,
            last,
        })
    }

    pub fn first(&self) -> NaiveDate {
        self.first
    }

    pub fn last(&self) -> NaiveDate {
        self.last
    }

    pub fn iter(&self) -> Buckets {
        Buckets {
            interval: self.interval,
            next: Some(self.first),
            last: self.last,
        }
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// Always `false`: an empty range is represented by `None` instead.
    pub fn is_empty(&self) -> bool {
        false
    }
}

/// Iterator over the bucket starts of a [`BucketDomain`], ascending.
#[derive(Debug, Clone)]
pub struct Buckets {
    interval: Interval,
    next: Option<NaiveDate>,
    last: NaiveDate,
}

impl Iterator for Buckets {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<NaiveDate> {
        let current = self.next?;
        if current > self.last {
            self.next = None;
            return None;
        }
        self.next = self.interval.succ(current);
        Some(current)
    }
}

/// Inputs needed to decide which buckets a series spans.
#[derive(Debug, Clone, Copy)]
pub struct DomainBounds {
    pub start_at: Option<DateTime<Utc>>,
    pub end_at: Option<DateTime<Utc>>,
    pub platform_created_at: DateTime<Utc>,
    pub now: DateTime<Utc>,
}

/// Decide the series domain.
///
/// With both bounds set the domain is exactly their buckets, unless the range
/// is reversed or ends before the platform existed. A missing bound widens to
/// cover the platform's lifetime and every observed bucket (`observed` is the
/// first and last bucket holding an eligible idea). `None` means an empty
/// series.
pub fn resolve_domain(
    interval: Interval,
    tz: Tz,
    bounds: DomainBounds,
    observed: Option<(NaiveDate, NaiveDate)>,
) -> Option<BucketDomain> {
    if let (Some(start), Some(end)) = (bounds.start_at, bounds.end_at) {
        if end < start || end < bounds.platform_created_at {
            return None;
        }
        return BucketDomain::new(interval, local_date(start, tz), local_date(end, tz));
    }

    let first = bounds.start_at.map_or_else(
        || {
            let created = local_date(bounds.platform_created_at, tz);
            observed.map_or(created, |(lo, _)| lo.min(created))
        },
        |start| local_date(start, tz),
    );
    let last = bounds.end_at.map_or_else(
        || {
            let now = local_date(bounds.now, tz);
            observed.map_or(now, |(_, hi)| hi.max(now))
        },
        |end| local_date(end, tz),
    );
    BucketDomain::new(interval, first, last)
}
