//! Flattening of narrowed datasets into per-depth record groups.

use tracing::{debug, info};

use adcp_common::{group_by_depth, DepthGroup, DepthRange, FlatRecord};

use crate::types::{Dataset, Variable, DEPTH_DIM, TIME_DIM};

/// Speeds are stored in cm/s.
pub const CM_PER_M: f64 = 100.0;

const LATITUDE_NAMES: &[&str] = &["lat", "latitude"];
const LONGITUDE_NAMES: &[&str] = &["lon", "longitude"];

pub fn speed_variable(suffix: &str) -> String {
    format!("sea_water_speed_{}", suffix)
}

pub fn direction_variable(suffix: &str) -> String {
    format!("sea_water_direction_{}", suffix)
}

/// Variables a plot cannot do without: at least one must be in the store.
pub fn required_variables(suffix: &str) -> Vec<String> {
    vec![speed_variable(suffix), direction_variable(suffix)]
}

/// Variables extracted for one ADCP instrument.
pub fn variables_for_instrument(suffix: &str) -> Vec<String> {
    vec![
        TIME_DIM.to_string(),
        "lat".to_string(),
        "lon".to_string(),
        DEPTH_DIM.to_string(),
        format!("ocean_currents_instrument_{}", suffix),
        speed_variable(suffix),
        direction_variable(suffix),
        format!("upward_sea_water_velocity_{}", suffix),
    ]
}

fn first_present<'a>(dataset: &'a Dataset, names: &[&str]) -> Option<&'a Variable> {
    names.iter().find_map(|name| dataset.get(name))
}

fn value_at(variable: Option<&Variable>, time_idx: usize, depth_idx: usize) -> f64 {
    variable.map_or(f64::NAN, |v| v.at(time_idx, depth_idx))
}

/// Rows in time-major order, one per (time, depth) cell.
///
/// Values come out as stored: speed stays in cm/s and missing cells are NaN.
pub fn to_records(dataset: &Dataset, suffix: &str) -> Vec<FlatRecord> {
    let n_depth = dataset.dim_len(DEPTH_DIM).unwrap_or(1);

    let depth = dataset.get(DEPTH_DIM);
    let latitude = first_present(dataset, LATITUDE_NAMES);
    let longitude = first_present(dataset, LONGITUDE_NAMES);
    let speed = dataset.get(&speed_variable(suffix));
    let direction = dataset.get(&direction_variable(suffix));

    let mut records = Vec::with_capacity(dataset.times.len() * n_depth);
    for (t, &time) in dataset.times.iter().enumerate() {
        for d in 0..n_depth {
            records.push(FlatRecord {
                time,
                depth: value_at(depth, t, d),
                latitude: value_at(latitude, t, d),
                longitude: value_at(longitude, t, d),
                speed: value_at(speed, t, d),
                direction: value_at(direction, t, d),
            });
        }
    }
    records
}

/// Flatten a dataset into depth groups, deepest first.
///
/// Incomplete rows are dropped, speed is converted to m/s and only depths
/// inside `depths` (inclusive) are kept. An empty result is logged, not an
/// error.
pub fn flatten(dataset: &Dataset, suffix: &str, depths: &DepthRange) -> Vec<DepthGroup> {
    let rows = to_records(dataset, suffix);
    let total = rows.len();

    let kept: Vec<FlatRecord> = rows
        .into_iter()
        .filter(FlatRecord::is_complete)
        .map(|mut r| {
            r.speed /= CM_PER_M;
            r
        })
        .filter(|r| depths.contains(r.depth))
        .collect();

    debug!(total, kept = kept.len(), "Flattened dataset");

    if kept.is_empty() {
        info!(
            "No data available for depths between {}m and {}m.",
            depths.min, depths.max
        );
        return Vec::new();
    }

    group_by_depth(kept)
}
