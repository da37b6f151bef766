//! End-to-end runs of the pipeline over in-memory stores.

use std::path::Path;

use serde_json::json;
use stick_plot::{run_with_store, RunOutcome, StickPlotConfig};
use test_utils::{
    create_adcp_profile, dates, depths, palettes, plot_path, temp_test_dir, AdcpProfile,
    PROFILE_TIME_UNITS,
};

use adcp_dataset::MemoryStore;

fn memory_store(profile: &AdcpProfile, suffix: &str) -> MemoryStore {
    let grid = profile.shape();
    MemoryStore::new("memory://adcp_station_1")
        .with_array("time", &["time"], &[grid[0]], profile.hours.clone())
        .with_attribute("time", "units", json!(PROFILE_TIME_UNITS))
        .with_array("depth", &["depth"], &[grid[1]], profile.depths.clone())
        .with_array("lat", &[], &[], vec![44.5])
        .with_array("lon", &[], &[], vec![-63.5])
        .with_array(
            &format!("sea_water_speed_{}", suffix),
            &["time", "depth"],
            &grid,
            profile.speed_cm_s.clone(),
        )
        .with_array(
            &format!("sea_water_direction_{}", suffix),
            &["time", "depth"],
            &grid,
            profile.direction_deg.clone(),
        )
}

fn config(output: &Path, depth_range: (f64, f64)) -> StickPlotConfig {
    StickPlotConfig {
        server_url: "http://0.0.0.0:9000/".to_string(),
        dataset_id: "adcp_station_1".to_string(),
        start_date: dates::START.to_string(),
        end_date: dates::END.to_string(),
        depth_range,
        height_per_plot: 1.0,
        color_pallete: palettes::NAMED.iter().map(|c| c.to_string()).collect(),
        arrow_head: true,
        output_filename: output.to_path_buf(),
        instrument: "1".to_string(),
        zarr_path: "zarr/".to_string(),
        row_spacing: 10.0,
        width_inches: 10.0,
        dpi: 20,
    }
}

#[test]
fn test_run_writes_plot() {
    let dir = temp_test_dir();
    let output = plot_path(dir.path(), "stick");
    let store = memory_store(&create_adcp_profile(24, &depths::BINS), "1");

    let outcome = run_with_store(&store, &config(&output, depths::ALL)).unwrap();

    let RunOutcome::Rendered(result) = outcome else {
        panic!("expected a rendered plot, got {:?}", outcome);
    };
    assert_eq!(result.path, output);
    assert_eq!(result.rows, 3);
    assert_eq!(result.arrows, 72);
    assert_eq!((result.width, result.height), (200, 60));

    let bytes = std::fs::read(&output).unwrap();
    assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
    assert_eq!(bytes.len(), result.bytes);
}

#[test]
fn test_depth_filter_sets_row_count() {
    let dir = temp_test_dir();
    let output = plot_path(dir.path(), "upper");
    let store = memory_store(&create_adcp_profile(6, &depths::BINS), "1");

    let outcome = run_with_store(&store, &config(&output, depths::UPPER_TWO)).unwrap();

    match outcome {
        RunOutcome::Rendered(result) => {
            assert_eq!(result.rows, 2);
            assert_eq!(result.height, 40);
        }
        other => panic!("expected a rendered plot, got {:?}", other),
    }
}

#[test]
fn test_unreachable_store_is_data_unavailable() {
    let dir = temp_test_dir();
    let output = plot_path(dir.path(), "offline");
    let store = MemoryStore::unreachable("http://0.0.0.0:9000/zarr/");

    let outcome = run_with_store(&store, &config(&output, depths::ALL)).unwrap();

    assert!(matches!(outcome, RunOutcome::DataUnavailable { .. }));
    assert!(!output.exists());
}

#[test]
fn test_no_depths_in_range_is_empty_result() {
    let dir = temp_test_dir();
    let output = plot_path(dir.path(), "deep");
    let store = memory_store(&create_adcp_profile(6, &depths::BINS), "1");

    let outcome = run_with_store(&store, &config(&output, depths::NONE)).unwrap();

    assert!(matches!(outcome, RunOutcome::EmptyResult));
    assert!(!output.exists());
}

#[test]
fn test_other_instrument_is_data_unavailable() {
    let dir = temp_test_dir();
    let output = plot_path(dir.path(), "instrument");
    let store = memory_store(&create_adcp_profile(6, &depths::BINS), "2");

    let outcome = run_with_store(&store, &config(&output, depths::ALL)).unwrap();

    assert!(matches!(outcome, RunOutcome::DataUnavailable { .. }));
    assert!(!output.exists());
}

#[test]
fn test_window_after_data_is_empty_result() {
    let dir = temp_test_dir();
    let output = plot_path(dir.path(), "late");
    let store = memory_store(&create_adcp_profile(24, &depths::BINS), "1");

    let mut cfg = config(&output, depths::ALL);
    cfg.start_date = dates::LATE_START.to_string();
    cfg.end_date = dates::LATE_END.to_string();

    let outcome = run_with_store(&store, &cfg).unwrap();

    assert!(matches!(outcome, RunOutcome::EmptyResult));
    assert!(!output.exists());
}

#[test]
fn test_missing_output_directory_is_error() {
    let dir = temp_test_dir();
    let output = dir.path().join("missing").join("plot.png");
    let store = memory_store(&create_adcp_profile(6, &depths::BINS), "1");

    let err = run_with_store(&store, &config(&output, depths::ALL)).unwrap_err();
    assert!(err.to_string().contains("Failed to render stick plot"));
}

#[test]
fn test_invalid_dates_are_errors() {
    let dir = temp_test_dir();
    let store = memory_store(&create_adcp_profile(6, &depths::BINS), "1");

    let mut cfg = config(&plot_path(dir.path(), "dates"), depths::ALL);
    cfg.start_date = "not a date".to_string();

    assert!(run_with_store(&store, &cfg).is_err());
}
