//! Stick-plot configuration.
//!
//! The configuration is a single YAML document. `${VAR}` and
//! `${VAR:-default}` references are expanded from the environment before it
//! is parsed.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

use adcp_common::{DepthRange, TimeParseError, TimeWindow};
use renderer::{depth_range_title, RenderError, StickStyle};

/// Configuration problems found before any data is fetched.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Environment variable {0} not set")]
    MissingEnvVar(String),

    #[error("Unclosed variable substitution: ${{{0}")]
    UnclosedSubstitution(String),

    #[error("invalid date: {0}")]
    InvalidDate(#[from] TimeParseError),

    #[error("invalid style: {0}")]
    InvalidStyle(#[from] RenderError),

    #[error("{0}")]
    Invalid(String),
}

fn default_zarr_path() -> String {
    "zarr/".to_string()
}

fn default_row_spacing() -> f64 {
    10.0
}

fn default_width_inches() -> f64 {
    20.0
}

fn default_dpi() -> u32 {
    300
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StickPlotConfig {
    /// Base URL of the dataset server.
    pub server_url: String,

    /// Dataset identifier, used for logging.
    pub dataset_id: String,

    /// Window start, e.g. `2024-05-01T00:00:00Z`.
    pub start_date: String,

    /// Window end, inclusive.
    pub end_date: String,

    /// `[min, max]` depth in metres, both inclusive.
    pub depth_range: (f64, f64),

    /// Figure height per depth row, in inches.
    pub height_per_plot: f64,

    /// Six colours for the speed buckets, slowest first.
    pub color_pallete: Vec<String>,

    pub arrow_head: bool,

    pub output_filename: PathBuf,

    /// Instrument suffix selecting `sea_water_speed_<n>` and friends.
    #[serde(deserialize_with = "string_or_number")]
    pub instrument: String,

    /// Path of the Zarr store below `server_url`.
    #[serde(default = "default_zarr_path")]
    pub zarr_path: String,

    #[serde(default = "default_row_spacing")]
    pub row_spacing: f64,

    #[serde(default = "default_width_inches")]
    pub width_inches: f64,

    #[serde(default = "default_dpi")]
    pub dpi: u32,
}

/// Accept `instrument: 1` as well as `instrument: "1"`.
fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Scalar {
        Int(i64),
        Str(String),
    }

    Ok(match Scalar::deserialize(deserializer)? {
        Scalar::Int(n) => n.to_string(),
        Scalar::Str(s) => s.trim().to_string(),
    })
}

impl StickPlotConfig {
    /// URL of the Zarr store: `server_url` joined with `zarr_path`.
    pub fn store_url(&self) -> String {
        let base = self.server_url.trim_end_matches('/');
        let path = self.zarr_path.trim_matches('/');
        if path.is_empty() {
            format!("{}/", base)
        } else {
            format!("{}/{}/", base, path)
        }
    }

    pub fn time_window(&self) -> std::result::Result<TimeWindow, ConfigError> {
        Ok(TimeWindow::from_config_strings(&self.start_date, &self.end_date)?)
    }

    pub fn depth_range(&self) -> DepthRange {
        DepthRange::new(self.depth_range.0, self.depth_range.1)
    }

    /// Rendering style; the title names the configured depth range.
    pub fn style(&self) -> StickStyle {
        StickStyle {
            colors: self.color_pallete.clone(),
            arrow_head: self.arrow_head,
            row_spacing: self.row_spacing,
            height_per_row: self.height_per_plot,
            width_inches: self.width_inches,
            dpi: self.dpi,
            title: depth_range_title(self.depth_range.0, self.depth_range.1),
        }
    }

    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        ensure(!self.server_url.trim().is_empty(), "server_url cannot be empty")?;
        ensure(!self.instrument.is_empty(), "instrument cannot be empty")?;
        ensure(
            !self.output_filename.as_os_str().is_empty(),
            "output_filename cannot be empty",
        )?;

        self.time_window()?;

        let depths = self.depth_range();
        ensure(
            depths.is_valid(),
            &format!(
                "depth_range must be [min, max] with min <= max, got [{}, {}]",
                depths.min, depths.max
            ),
        )?;

        ensure(
            self.height_per_plot.is_finite() && self.height_per_plot > 0.0,
            &format!("height_per_plot must be positive, got {}", self.height_per_plot),
        )?;
        ensure(
            self.width_inches.is_finite() && self.width_inches > 0.0,
            &format!("width_inches must be positive, got {}", self.width_inches),
        )?;

        self.style().validate()?;
        Ok(())
    }
}

fn ensure(condition: bool, message: &str) -> std::result::Result<(), ConfigError> {
    if condition {
        Ok(())
    } else {
        Err(ConfigError::Invalid(message.to_string()))
    }
}

/// Load, expand and validate a configuration file.
pub fn load_config(path: impl AsRef<Path>) -> Result<StickPlotConfig> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config = parse_config(&content)
        .with_context(|| format!("Invalid config file: {}", path.display()))?;

    debug!(
        path = %path.display(),
        dataset_id = %config.dataset_id,
        instrument = %config.instrument,
        "Loaded configuration"
    );

    Ok(config)
}

/// Parse and validate configuration text.
pub fn parse_config(content: &str) -> Result<StickPlotConfig> {
    let expanded = expand_env_vars(content)?;
    let config: StickPlotConfig =
        serde_yaml::from_str(&expanded).context("Failed to parse YAML")?;
    config.validate()?;
    Ok(config)
}

/// Expand `${VAR}` and `${VAR:-default}` references.
pub fn expand_env_vars(content: &str) -> std::result::Result<String, ConfigError> {
    let mut result = String::with_capacity(content.len());
    let mut chars = content.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '$' || chars.peek() != Some(&'{') {
            result.push(ch);
            continue;
        }
        chars.next();

        let mut expr = String::new();
        let mut depth = 1;
        while depth > 0 {
            match chars.next() {
                Some('{') => {
                    depth += 1;
                    expr.push('{');
                }
                Some('}') => {
                    depth -= 1;
                    if depth > 0 {
                        expr.push('}');
                    }
                }
                Some(c) => expr.push(c),
                None => return Err(ConfigError::UnclosedSubstitution(expr)),
            }
        }

        result.push_str(&resolve_var_expr(&expr)?);
    }

    Ok(result)
}

fn resolve_var_expr(expr: &str) -> std::result::Result<String, ConfigError> {
    match expr.split_once(":-") {
        Some((name, default)) => match std::env::var(name.trim()) {
            Ok(val) if !val.is_empty() => Ok(val),
            _ => Ok(default.to_string()),
        },
        None => {
            std::env::var(expr.trim()).map_err(|_| ConfigError::MissingEnvVar(expr.to_string()))
        }
    }
}
