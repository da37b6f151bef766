//! Decoding of CF-convention time coordinates (`<unit> since <reference>`).

use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};

use adcp_common::parse_naive_utc;

use crate::error::{DatasetError, Result};

/// Parsed `units` attribute of a time coordinate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CfTimeUnits {
    /// Length of one unit in seconds.
    pub unit_seconds: f64,
    /// Reference instant.
    pub reference: DateTime<Utc>,
}

impl CfTimeUnits {
    /// Epoch seconds, used when a time coordinate has no `units` attribute.
    pub fn epoch_seconds() -> Self {
        Self {
            unit_seconds: 1.0,
            reference: DateTime::<Utc>::UNIX_EPOCH,
        }
    }

    /// Convert one raw offset into an instant.
    pub fn decode(&self, value: f64) -> Option<DateTime<Utc>> {
        if !value.is_finite() {
            return None;
        }
        let micros = (value * self.unit_seconds * 1e6).round();
        if micros.abs() > i64::MAX as f64 {
            return None;
        }
        self.reference
            .checked_add_signed(Duration::microseconds(micros as i64))
    }
}

impl FromStr for CfTimeUnits {
    type Err = DatasetError;

    fn from_str(s: &str) -> Result<Self> {
        let (unit, reference) = s
            .split_once(" since ")
            .ok_or_else(|| DatasetError::InvalidTime(format!("unrecognised units '{}'", s)))?;

        let unit_seconds = match unit.trim().to_ascii_lowercase().as_str() {
            "nanoseconds" | "nanosecond" | "ns" => 1e-9,
            "microseconds" | "microsecond" | "us" => 1e-6,
            "milliseconds" | "millisecond" | "ms" => 1e-3,
            "seconds" | "second" | "secs" | "sec" | "s" => 1.0,
            "minutes" | "minute" | "mins" | "min" => 60.0,
            "hours" | "hour" | "hrs" | "hr" | "h" => 3_600.0,
            "days" | "day" | "d" => 86_400.0,
            other => {
                return Err(DatasetError::InvalidTime(format!(
                    "unsupported time unit '{}'",
                    other
                )))
            }
        };

        Ok(Self {
            unit_seconds,
            reference: parse_reference(reference.trim())?,
        })
    }
}

/// Parse the reference instant of a units string.
fn parse_reference(s: &str) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    let naive = s
        .trim_end_matches(" UTC")
        .trim_end_matches("+00:00")
        .trim_end_matches('Z')
        .trim();

    parse_naive_utc(naive).map_err(DatasetError::from)
}

/// Decode a raw time coordinate.
///
/// Without a `units` attribute the values are taken as epoch seconds.
/// Any missing value is an error: the time axis must be complete.
pub fn decode_times(values: &[f64], units: Option<&str>) -> Result<Vec<DateTime<Utc>>> {
    let units = match units {
        Some(u) => u.parse::<CfTimeUnits>()?,
        None => CfTimeUnits::epoch_seconds(),
    };

    values
        .iter()
        .enumerate()
        .map(|(i, &v)| {
            units.decode(v).ok_or_else(|| {
                DatasetError::InvalidTime(format!("undecodable time value {} at index {}", v, i))
            })
        })
        .collect()
}
