//! Flat current-velocity records and their per-depth grouping.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Inclusive depth interval in metres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DepthRange {
    pub min: f64,
    pub max: f64,
}

impl DepthRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, depth: f64) -> bool {
        depth >= self.min && depth <= self.max
    }

    pub fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min <= self.max
    }
}

/// One (time, depth) sample of the current profile.
///
/// `speed` is in m/s and `direction` in degrees clockwise from north.
/// Latitude and longitude are NaN when the dataset carries no position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlatRecord {
    pub time: DateTime<Utc>,
    pub depth: f64,
    pub latitude: f64,
    pub longitude: f64,
    pub speed: f64,
    pub direction: f64,
}

impl FlatRecord {
    /// True when both speed and direction are present.
    pub fn is_complete(&self) -> bool {
        !self.speed.is_nan() && !self.direction.is_nan()
    }
}

/// All records sharing one depth value, in ascending time order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DepthGroup {
    pub depth: f64,
    pub records: Vec<FlatRecord>,
}

impl DepthGroup {
    pub fn new(depth: f64, mut records: Vec<FlatRecord>) -> Self {
        records.sort_by_key(|r| r.time);
        Self { depth, records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Earliest and latest record time.
    pub fn time_span(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let first = self.records.first()?.time;
        let last = self.records.last()?.time;
        Some((first, last))
    }
}

/// Group records by exact depth value, deepest group first.
///
/// Records keep their relative time order inside each group.
pub fn group_by_depth<I>(records: I) -> Vec<DepthGroup>
where
    I: IntoIterator<Item = FlatRecord>,
{
    let mut index: HashMap<u64, usize> = HashMap::new();
    let mut buckets: Vec<(f64, Vec<FlatRecord>)> = Vec::new();

    for record in records {
        // +0.0 and -0.0 share a bucket
        let key = if record.depth == 0.0 { 0.0f64 } else { record.depth }.to_bits();
        let slot = *index.entry(key).or_insert_with(|| {
            buckets.push((record.depth, Vec::new()));
            buckets.len() - 1
        });
        buckets[slot].1.push(record);
    }

    let mut groups: Vec<DepthGroup> = buckets
        .into_iter()
        .map(|(depth, records)| DepthGroup::new(depth, records))
        .collect();
    sort_deepest_first(&mut groups);
    groups
}

/// Order groups by depth, largest value first.
pub fn sort_deepest_first(groups: &mut [DepthGroup]) {
    groups.sort_by(|a, b| b.depth.total_cmp(&a.depth));
}

/// Format a depth the way row labels show it (`10.0`, `12.5`).
pub fn format_depth(depth: f64) -> String {
    if depth.fract() == 0.0 && depth.is_finite() {
        format!("{:.1}", depth)
    } else {
        format!("{}", depth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record(hour: u32, depth: f64) -> FlatRecord {
        FlatRecord {
            time: Utc.with_ymd_and_hms(2024, 5, 1, hour, 0, 0).unwrap(),
            depth,
            latitude: 27.0,
            longitude: -90.0,
            speed: 0.2,
            direction: 45.0,
        }
    }

    #[test]
    fn test_depth_range_inclusive() {
        let range = DepthRange::new(5.0, 15.0);
        assert!(range.contains(5.0));
        assert!(range.contains(15.0));
        assert!(!range.contains(15.000001));
        assert!(!range.contains(4.9));
    }

    #[test]
    fn test_depth_range_validity() {
        assert!(DepthRange::new(0.0, 10.0).is_valid());
        assert!(DepthRange::new(3.0, 3.0).is_valid());
        assert!(!DepthRange::new(10.0, 0.0).is_valid());
        assert!(!DepthRange::new(f64::NAN, 1.0).is_valid());
    }

    #[test]
    fn test_group_by_depth_orders_deepest_first() {
        let records = vec![record(0, 5.0), record(0, 15.0), record(0, 10.0), record(1, 5.0)];
        let groups = group_by_depth(records);

        let depths: Vec<f64> = groups.iter().map(|g| g.depth).collect();
        assert_eq!(depths, vec![15.0, 10.0, 5.0]);
        assert_eq!(groups[2].len(), 2);
    }

    #[test]
    fn test_group_keeps_time_order() {
        let records = vec![record(3, 8.0), record(1, 8.0), record(2, 8.0)];
        let groups = group_by_depth(records);

        assert_eq!(groups.len(), 1);
        let hours: Vec<_> = groups[0]
            .records
            .iter()
            .map(|r| r.time.format("%H").to_string())
            .collect();
        assert_eq!(hours, vec!["01", "02", "03"]);
        let (first, last) = groups[0].time_span().unwrap();
        assert!(first < last);
    }

    #[test]
    fn test_record_completeness() {
        let mut r = record(0, 1.0);
        assert!(r.is_complete());
        r.direction = f64::NAN;
        assert!(!r.is_complete());
    }

    #[test]
    fn test_format_depth() {
        assert_eq!(format_depth(10.0), "10.0");
        assert_eq!(format_depth(5.0), "5.0");
        assert_eq!(format_depth(12.5), "12.5");
    }

    #[test]
    fn test_record_serializes() {
        let json = serde_json::to_value(record(0, 4.0)).unwrap();
        assert_eq!(json["depth"], 4.0);
    }
}
