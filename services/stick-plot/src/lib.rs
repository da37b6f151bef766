//! ADCP stick-plot service.
//!
//! Reads a YAML configuration, loads the configured time window from a Zarr
//! store, flattens it into depth groups and renders the stick plot.

pub mod config;
pub mod pipeline;

pub use config::{load_config, ConfigError, StickPlotConfig};
pub use pipeline::{run, run_with_store, RunOutcome};
