//! Time handling for query windows and plot axes.

use std::ops::Range;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Naive layouts accepted after the zone designator has been removed.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

const MILLIS_PER_DAY: f64 = 86_400_000.0;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TimeParseError {
    #[error("Invalid time format: {0}")]
    InvalidFormat(String),

    #[error("Time window start {start} is after end {end}")]
    ReversedWindow { start: String, end: String },
}

/// Drop the final character of a configured timestamp.
///
/// Configured dates carry a trailing `Z` that the store's label slicing
/// rejects. The last character is removed unconditionally, whatever it is.
pub fn strip_zone_suffix(s: &str) -> &str {
    match s.char_indices().next_back() {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Parse a zone-less timestamp, interpreting it as UTC.
pub fn parse_naive_utc(s: &str) -> Result<DateTime<Utc>, TimeParseError> {
    let s = s.trim();

    for format in NAIVE_FORMATS {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(Utc.from_utc_datetime(&ndt));
        }
    }

    // Date only
    if let Some(ndt) = NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
    {
        return Ok(Utc.from_utc_datetime(&ndt));
    }

    Err(TimeParseError::InvalidFormat(s.to_string()))
}

/// Inclusive time window used to slice the `time` coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Build a window from configured date strings such as `2024-05-01T00:00:00Z`.
    pub fn from_config_strings(start: &str, end: &str) -> Result<Self, TimeParseError> {
        let start_dt = parse_naive_utc(strip_zone_suffix(start))?;
        let end_dt = parse_naive_utc(strip_zone_suffix(end))?;

        if start_dt > end_dt {
            return Err(TimeParseError::ReversedWindow {
                start: start.to_string(),
                end: end.to_string(),
            });
        }

        Ok(Self::new(start_dt, end_dt))
    }

    pub fn contains(&self, dt: &DateTime<Utc>) -> bool {
        dt >= &self.start && dt <= &self.end
    }

    /// Index range of `axis` (sorted ascending) that falls inside the window.
    ///
    /// Both ends are inclusive, matching label-based slicing on the store's
    /// time index. Returns an empty range when nothing matches.
    pub fn index_range(&self, axis: &[DateTime<Utc>]) -> Range<usize> {
        let first = axis.partition_point(|t| t < &self.start);
        let last = axis.partition_point(|t| t <= &self.end);
        first..last.max(first)
    }
}

/// Fractional days since the Unix epoch, the unit of the plot's time axis.
pub fn date_num(dt: &DateTime<Utc>) -> f64 {
    dt.timestamp_millis() as f64 / MILLIS_PER_DAY
}

/// Inverse of [`date_num`].
pub fn from_date_num(days: f64) -> Option<DateTime<Utc>> {
    if !days.is_finite() {
        return None;
    }
    DateTime::from_timestamp_millis((days * MILLIS_PER_DAY).round() as i64)
}
