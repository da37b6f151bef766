//! Load → flatten → render.

use anyhow::{Context, Result};
use tracing::{error, info, warn};

use adcp_dataset::{
    flatten, http, load, required_variables, variables_for_instrument, ArrayStore,
};
use renderer::{render, RenderError, RenderResult};

use crate::config::StickPlotConfig;

/// How a run ended. Only `Rendered` writes a file.
#[derive(Debug)]
pub enum RunOutcome {
    /// The store could not be read or holds none of the needed data.
    DataUnavailable { reason: String },
    /// Nothing left after dropping incomplete rows and filtering depths.
    EmptyResult,
    /// The renderer had nothing to draw.
    RenderSkipped,
    Rendered(RenderResult),
}

impl RunOutcome {
    pub fn is_rendered(&self) -> bool {
        matches!(self, RunOutcome::Rendered(_))
    }
}

/// Run the pipeline against the configured HTTP Zarr store.
pub fn run(config: &StickPlotConfig) -> Result<RunOutcome> {
    let url = config.store_url();
    let store = http::open_http_store(&url)
        .with_context(|| format!("Failed to open Zarr store at {}", url))?;
    run_with_store(&store, config)
}

/// Run the pipeline against an already opened store.
///
/// Data problems end the run early with a logged outcome; configuration and
/// output failures are errors.
pub fn run_with_store<S: ArrayStore + ?Sized>(
    store: &S,
    config: &StickPlotConfig,
) -> Result<RunOutcome> {
    let window = config.time_window()?;
    let names = variables_for_instrument(&config.instrument);
    let required = required_variables(&config.instrument);

    info!(
        dataset_id = %config.dataset_id,
        store = %store.location(),
        instrument = %config.instrument,
        start = %window.start,
        end = %window.end,
        "Fetching ADCP data"
    );

    let dataset = match load(store, &window, &names, &required) {
        Ok(dataset) => dataset,
        Err(e) => {
            error!(dataset_id = %config.dataset_id, error = %e, "Failed to fetch or process data");
            return Ok(RunOutcome::DataUnavailable {
                reason: e.to_string(),
            });
        }
    };

    let groups = flatten(&dataset, &config.instrument, &config.depth_range());
    if groups.is_empty() {
        return Ok(RunOutcome::EmptyResult);
    }

    match render(&groups, &config.style(), &config.output_filename) {
        Ok(result) => Ok(RunOutcome::Rendered(result)),
        Err(RenderError::Skipped) => {
            warn!("No depth groups to plot");
            Ok(RunOutcome::RenderSkipped)
        }
        Err(e) => Err(e).context("Failed to render stick plot"),
    }
}
