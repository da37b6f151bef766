//! Date tick placement for the time axis.

use adcp_common::from_date_num;

/// Candidate tick steps in hours, finest first.
const STEP_HOURS: &[u32] = &[1, 2, 3, 6, 12, 24, 48, 96, 168, 336, 672];

/// Upper bound on tick count along the axis.
pub const MAX_TICKS: usize = 10;

/// A tick position (days since the epoch) and its label.
#[derive(Debug, Clone, PartialEq)]
pub struct DateTick {
    pub days: f64,
    pub label: String,
}

/// Smallest step that keeps the tick count within `max_ticks`.
pub fn choose_step_hours(span_days: f64, max_ticks: usize) -> u32 {
    let span_hours = span_days * 24.0;
    STEP_HOURS
        .iter()
        .copied()
        .find(|&step| (span_hours / step as f64).floor() as usize + 1 <= max_ticks)
        .unwrap_or(STEP_HOURS[STEP_HOURS.len() - 1])
}

/// Ticks inside `[start, end]` (days), aligned to whole steps since the
/// epoch. Sub-day steps get a time of day in their labels.
pub fn date_ticks(start: f64, end: f64, max_ticks: usize) -> Vec<DateTick> {
    if !(start.is_finite() && end.is_finite()) || end <= start {
        return Vec::new();
    }

    let step_hours = choose_step_hours(end - start, max_ticks);
    let step_days = step_hours as f64 / 24.0;
    let format = if step_hours < 24 {
        "%m-%d %H:%M"
    } else {
        "%Y-%m-%d"
    };

    // Tolerate rounding in the day fraction of exact step boundaries
    let first = (start / step_days - 1e-9).ceil() as i64;
    let last = (end / step_days + 1e-9).floor() as i64;

    (first..=last)
        .filter_map(|k| {
            let days = k as f64 * step_days;
            let time = from_date_num(days)?;
            Some(DateTick {
                days,
                label: time.format(format).to_string(),
            })
        })
        .collect()
}
