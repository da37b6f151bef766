//! Integration test: write an ADCP profile as Zarr and load it back.
//!
//! Arrays are laid out the way xarray writes them: one array per variable
//! with dimension names in the `_ARRAY_DIMENSIONS` attribute. Most fixtures
//! are V3; the V2 fixture mirrors what a `/zarr/` dataset endpoint serves.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use adcp_common::{DepthRange, TimeWindow};
use adcp_dataset::{
    flatten, load, required_variables, variables_for_instrument, ArrayStore, DatasetError,
    ZarrStore,
};
use serde_json::{json, Map, Value};
use test_utils::{assert_approx_eq, create_adcp_profile, dates, depths, AdcpProfile, PROFILE_TIME_UNITS};
use zarrs::array::{ArrayBuilder, DataType, FillValue};
use zarrs::array_subset::ArraySubset;
use zarrs_filesystem::FilesystemStore;

type BoxResult<T> = Result<T, Box<dyn std::error::Error>>;

fn attrs(dims: &[&str], extra: &[(&str, Value)]) -> Map<String, Value> {
    let mut attrs = Map::new();
    attrs.insert("_ARRAY_DIMENSIONS".to_string(), json!(dims));
    for (key, value) in extra {
        attrs.insert(key.to_string(), value.clone());
    }
    attrs
}

/// Write a Float64 array (no compression, single chunk).
fn write_f64(
    store: &Arc<FilesystemStore>,
    name: &str,
    shape: Vec<u64>,
    attributes: Map<String, Value>,
    data: &[f64],
) -> BoxResult<()> {
    let array = ArrayBuilder::new(
        shape.clone(),
        DataType::Float64,
        shape.iter().map(|&n| n.max(1)).collect::<Vec<u64>>().try_into()?,
        FillValue::from(f64::NAN),
    )
    .attributes(attributes)
    .build(store.clone(), &format!("/{}", name))?;

    array.store_metadata()?;
    let subset = ArraySubset::new_with_start_shape(vec![0; shape.len()], shape)?;
    array.store_array_subset_elements(&subset, data)?;
    Ok(())
}

/// Write a Float32 array whose fill value is a -999 sentinel.
fn write_f32_sentinel(
    store: &Arc<FilesystemStore>,
    name: &str,
    shape: Vec<u64>,
    attributes: Map<String, Value>,
    data: &[f32],
) -> BoxResult<()> {
    let array = ArrayBuilder::new(
        shape.clone(),
        DataType::Float32,
        shape.iter().map(|&n| n.max(1)).collect::<Vec<u64>>().try_into()?,
        FillValue::from(-999.0f32),
    )
    .attributes(attributes)
    .build(store.clone(), &format!("/{}", name))?;

    array.store_metadata()?;
    let subset = ArraySubset::new_with_start_shape(vec![0; shape.len()], shape)?;
    array.store_array_subset_elements(&subset, data)?;
    Ok(())
}

/// Write a one-element Bool array, standing in for a non-numeric variable.
fn write_bool(store: &Arc<FilesystemStore>, name: &str) -> BoxResult<()> {
    let array = ArrayBuilder::new(
        vec![1],
        DataType::Bool,
        vec![1u64].try_into()?,
        FillValue::from(false),
    )
    .attributes(attrs(&["station"], &[]))
    .build(store.clone(), &format!("/{}", name))?;

    array.store_metadata()?;
    let subset = ArraySubset::new_with_start_shape(vec![0], vec![1])?;
    array.store_array_subset_elements(&subset, &[true])?;
    Ok(())
}

/// Write an uncompressed single-chunk `<f8` array with V2 metadata.
fn write_v2_f64(
    root: &Path,
    name: &str,
    shape: &[u64],
    attributes: Map<String, Value>,
    data: &[f64],
) -> BoxResult<()> {
    let dir = root.join(name);
    fs::create_dir_all(&dir)?;

    let zarray = json!({
        "zarr_format": 2,
        "shape": shape,
        "chunks": shape,
        "dtype": "<f8",
        "compressor": null,
        "fill_value": "NaN",
        "order": "C",
        "filters": null,
    });
    fs::write(dir.join(".zarray"), serde_json::to_vec(&zarray)?)?;
    fs::write(dir.join(".zattrs"), serde_json::to_vec(&Value::Object(attributes))?)?;

    let chunk_key = vec!["0"; shape.len()].join(".");
    let bytes: Vec<u8> = data.iter().flat_map(|v| v.to_le_bytes()).collect();
    fs::write(dir.join(chunk_key), bytes)?;
    Ok(())
}

/// Write a profile for instrument `1` under `path` with V2 metadata.
fn write_v2_profile(path: &Path, profile: &AdcpProfile) -> BoxResult<()> {
    fs::create_dir_all(path)?;
    fs::write(path.join(".zgroup"), br#"{"zarr_format": 2}"#)?;
    let grid = profile.shape();

    write_v2_f64(
        path,
        "time",
        &grid[..1],
        attrs(&["time"], &[("units", json!(PROFILE_TIME_UNITS))]),
        &profile.hours,
    )?;
    write_v2_f64(path, "depth", &grid[1..], attrs(&["depth"], &[]), &profile.depths)?;
    write_v2_f64(path, "lat", &[1], attrs(&["station"], &[]), &[44.6])?;
    write_v2_f64(path, "lon", &[1], attrs(&["station"], &[]), &[-63.6])?;
    write_v2_f64(
        path,
        "sea_water_speed_1",
        &grid,
        attrs(&["time", "depth"], &[("units", json!("cm/s"))]),
        &profile.speed_cm_s,
    )?;
    write_v2_f64(
        path,
        "sea_water_direction_1",
        &grid,
        attrs(&["time", "depth"], &[]),
        &profile.direction_deg,
    )?;
    Ok(())
}

/// Write a profile for instrument `1` under `path`.
fn write_profile(path: &Path, profile: &AdcpProfile) -> BoxResult<Arc<FilesystemStore>> {
    std::fs::create_dir_all(path)?;
    let store = Arc::new(FilesystemStore::new(path)?);
    let grid = profile.shape().to_vec();

    write_f64(
        &store,
        "time",
        vec![profile.n_times() as u64],
        attrs(&["time"], &[("units", json!(PROFILE_TIME_UNITS))]),
        &profile.hours,
    )?;
    write_f64(
        &store,
        "depth",
        vec![profile.n_depths() as u64],
        attrs(&["depth"], &[("units", json!("m"))]),
        &profile.depths,
    )?;
    write_f64(&store, "lat", vec![1], attrs(&["station"], &[]), &[44.6])?;
    write_f64(&store, "lon", vec![1], attrs(&["station"], &[]), &[-63.6])?;
    write_f64(
        &store,
        "sea_water_speed_1",
        grid.clone(),
        attrs(&["time", "depth"], &[("units", json!("cm/s"))]),
        &profile.speed_cm_s,
    )?;

    let direction: Vec<f32> = profile
        .direction_deg
        .iter()
        .map(|&d| if d.is_nan() { -999.0 } else { d as f32 })
        .collect();
    write_f32_sentinel(
        &store,
        "sea_water_direction_1",
        grid,
        attrs(&["time", "depth"], &[("units", json!("degree"))]),
        &direction,
    )?;

    Ok(store)
}

fn window(start: &str, end: &str) -> TimeWindow {
    TimeWindow::from_config_strings(start, end).expect("valid window")
}

#[test]
fn test_load_profile_from_zarr() {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let profile = create_adcp_profile(48, &depths::BINS);
    let store = write_profile(&temp_dir.path().join("adcp.zarr"), &profile)
        .expect("Failed to write Zarr");

    let store = ZarrStore::new(store, "adcp.zarr");
    let dataset = load(
        &store,
        &window(dates::START, dates::END),
        &variables_for_instrument("1"),
        &required_variables("1"),
    )
    .expect("Failed to load");

    // 00:00 through 23:00 fall inside the first day
    assert_eq!(dataset.times.len(), 24);
    assert!(dataset.contains("sea_water_speed_1"));
    assert!(dataset.contains("lat"));
    assert!(!dataset.contains("upward_sea_water_velocity_1"));
    assert!(!dataset.contains("ocean_currents_instrument_1"));

    let speed = dataset.get("sea_water_speed_1").unwrap();
    assert_eq!(speed.dims, vec!["time", "depth"]);
    assert_eq!(speed.shape, vec![24, 3]);
    assert_eq!(speed.values[profile.index(1, 1)], 16.0);
}

#[test]
fn test_window_slices_middle_of_profile() {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let profile = create_adcp_profile(48, &depths::BINS);
    let store = write_profile(&temp_dir.path().join("adcp.zarr"), &profile).unwrap();

    let store = ZarrStore::new(store, "adcp.zarr");
    let dataset = load(
        &store,
        &window("2024-05-01T06:00:00Z", "2024-05-01T08:00:00Z"),
        &variables_for_instrument("1"),
        &required_variables("1"),
    )
    .unwrap();

    // both ends inclusive
    assert_eq!(dataset.times.len(), 3);
    let speed = dataset.get("sea_water_speed_1").unwrap();
    // first selected step is t = 6, where t % 6 == 0
    assert_eq!(speed.values[0], 5.0);
}

#[test]
fn test_sentinel_fill_value_is_dropped() {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let profile = create_adcp_profile(4, &depths::BINS).with_missing_direction(0, 2);
    let store = write_profile(&temp_dir.path().join("adcp.zarr"), &profile).unwrap();

    let store = ZarrStore::new(store, "adcp.zarr");
    let dataset = load(
        &store,
        &window(dates::START, dates::END),
        &variables_for_instrument("1"),
        &required_variables("1"),
    )
    .unwrap();

    let direction = dataset.get("sea_water_direction_1").unwrap();
    assert!(direction.values[2].is_nan());

    let groups = flatten(&dataset, "1", &DepthRange::new(depths::ALL.0, depths::ALL.1));
    assert_eq!(groups.len(), 3);
    assert_eq!(groups[0].depth, 15.0);
    assert_eq!(groups[0].len(), 3, "row with fill direction is dropped");
    assert_eq!(groups[2].len(), 4);
    assert_approx_eq!(groups[2].records[0].speed, 0.05, 1e-9);
    assert_approx_eq!(groups[2].records[0].latitude, 44.6, 1e-9);
}

#[test]
fn test_store_without_time_is_unavailable() {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = temp_dir.path().join("empty.zarr");
    std::fs::create_dir_all(&path).unwrap();
    let store = ZarrStore::new(Arc::new(FilesystemStore::new(&path).unwrap()), "empty.zarr");

    let err = load(
        &store,
        &window(dates::START, dates::END),
        &variables_for_instrument("1"),
        &required_variables("1"),
    )
    .unwrap_err();
    assert!(matches!(err, DatasetError::DataUnavailable(_)));
}

#[test]
fn test_non_numeric_instrument_variable_is_skipped() {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let profile = create_adcp_profile(4, &depths::BINS);
    let store = write_profile(&temp_dir.path().join("adcp.zarr"), &profile).unwrap();
    write_bool(&store, "ocean_currents_instrument_1").unwrap();

    let store = ZarrStore::new(store, "adcp.zarr");
    let dataset = load(
        &store,
        &window(dates::START, dates::END),
        &variables_for_instrument("1"),
        &required_variables("1"),
    )
    .expect("instrument variable should not block the load");

    assert!(!dataset.contains("ocean_currents_instrument_1"));
    assert!(dataset.contains("sea_water_speed_1"));
    assert!(dataset.contains("sea_water_direction_1"));
}

#[test]
fn test_store_without_instrument_data_is_unavailable() {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let profile = create_adcp_profile(4, &depths::BINS);
    let store = write_profile(&temp_dir.path().join("adcp.zarr"), &profile).unwrap();

    let store = ZarrStore::new(store, "adcp.zarr");
    let err = load(
        &store,
        &window(dates::START, dates::END),
        &variables_for_instrument("2"),
        &required_variables("2"),
    )
    .unwrap_err();
    assert!(matches!(err, DatasetError::DataUnavailable(_)));
}

#[test]
fn test_load_profile_from_zarr_v2() {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = temp_dir.path().join("adcp-v2.zarr");
    let profile = create_adcp_profile(6, &depths::BINS).with_missing_speed(0, 0);
    write_v2_profile(&path, &profile).expect("Failed to write Zarr V2");

    let store = ZarrStore::new(Arc::new(FilesystemStore::new(&path).unwrap()), "adcp-v2.zarr");

    let info = store
        .describe("sea_water_speed_1")
        .unwrap()
        .expect("V2 array should be found");
    assert_eq!(info.dims, vec!["time", "depth"]);
    assert_eq!(info.shape, vec![6, 3]);
    assert_eq!(info.attr_str("units"), Some("cm/s"));

    let dataset = load(
        &store,
        &window(dates::START, dates::END),
        &variables_for_instrument("1"),
        &required_variables("1"),
    )
    .expect("Failed to load");
    assert_eq!(dataset.times.len(), 6);

    let groups = flatten(&dataset, "1", &DepthRange::new(depths::ALL.0, depths::ALL.1));
    let depths_found: Vec<f64> = groups.iter().map(|g| g.depth).collect();
    assert_eq!(depths_found, vec![15.0, 10.0, 5.0]);
    assert_eq!(groups[0].len(), 6);
    assert_eq!(groups[2].len(), 5, "row with NaN speed is dropped");
    assert_approx_eq!(groups[2].records[0].latitude, 44.6, 1e-9);
}
