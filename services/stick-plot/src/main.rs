//! Stick-plot command line entry point.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use stick_plot::{load_config, pipeline, RunOutcome};

#[derive(Parser, Debug)]
#[command(name = "stick-plot")]
#[command(about = "Render an ADCP current stick plot from a Zarr dataset")]
struct Args {
    /// Configuration file
    #[arg(short, long, default_value = "config.yaml", env = "STICK_PLOT_CONFIG")]
    config: PathBuf,

    /// Output PNG, overriding `output_filename`
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Log level
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,
}

fn init_tracing(args: &Args) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    if args.json_logs {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let args = Args::parse();
    init_tracing(&args);

    let mut config = load_config(&args.config)?;
    if let Some(output) = args.output {
        config.output_filename = output;
    }

    info!(
        config = %args.config.display(),
        dataset_id = %config.dataset_id,
        output = %config.output_filename.display(),
        "Starting stick plot"
    );

    match pipeline::run(&config).context("Stick plot run failed")? {
        RunOutcome::Rendered(result) => info!(
            path = %result.path.display(),
            rows = result.rows,
            arrows = result.arrows,
            bytes = result.bytes,
            "Stick plot complete"
        ),
        RunOutcome::DataUnavailable { reason } => {
            info!(%reason, "No plot written: data unavailable")
        }
        RunOutcome::EmptyResult => info!("No plot written: no records in range"),
        RunOutcome::RenderSkipped => info!("No plot written: nothing to draw"),
    }

    Ok(())
}
