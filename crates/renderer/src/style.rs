//! Stick-plot style configuration.

use serde::{Deserialize, Serialize};

use crate::color::{SpeedPalette, PALETTE_SIZE};
use crate::error::{RenderError, Result};

/// Largest figure edge accepted, in pixels.
pub const MAX_EDGE_PX: f64 = 32_767.0;

fn default_colors() -> Vec<String> {
    ["blue", "green", "yellow", "orange", "red", "purple"]
        .iter()
        .map(|c| c.to_string())
        .collect()
}

fn default_arrow_head() -> bool {
    true
}

fn default_row_spacing() -> f64 {
    10.0
}

fn default_height_per_row() -> f64 {
    1.0
}

fn default_width_inches() -> f64 {
    20.0
}

fn default_dpi() -> u32 {
    300
}

fn default_title() -> String {
    "Stick Plot".to_string()
}

/// Appearance of a stick plot.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct StickStyle {
    /// Six colours for the speed buckets, slowest first.
    #[serde(default = "default_colors")]
    pub colors: Vec<String>,

    /// Draw arrowheads (otherwise bare sticks).
    #[serde(default = "default_arrow_head")]
    pub arrow_head: bool,

    /// Vertical distance between rows, in axis units.
    #[serde(default = "default_row_spacing")]
    pub row_spacing: f64,

    /// Figure height per depth row, in inches.
    #[serde(default = "default_height_per_row")]
    pub height_per_row: f64,

    /// Figure width, in inches.
    #[serde(default = "default_width_inches")]
    pub width_inches: f64,

    #[serde(default = "default_dpi")]
    pub dpi: u32,

    #[serde(default = "default_title")]
    pub title: String,
}

impl Default for StickStyle {
    fn default() -> Self {
        Self {
            colors: default_colors(),
            arrow_head: default_arrow_head(),
            row_spacing: default_row_spacing(),
            height_per_row: default_height_per_row(),
            width_inches: default_width_inches(),
            dpi: default_dpi(),
            title: default_title(),
        }
    }
}

impl StickStyle {
    /// Parse the palette.
    pub fn palette(&self) -> Result<SpeedPalette> {
        SpeedPalette::parse(&self.colors)
    }

    /// Figure size in pixels for `rows` depth rows.
    pub fn figure_size_px(&self, rows: usize) -> Result<(u32, u32)> {
        let dpi = self.dpi as f64;
        let width = (self.width_inches * dpi).round();
        let height = (self.height_per_row * rows as f64 * dpi).round();

        for (name, px) in [("width", width), ("height", height)] {
            if !(px >= 1.0 && px <= MAX_EDGE_PX) {
                return Err(RenderError::InvalidStyle(format!(
                    "figure {} of {} px is outside 1..={}",
                    name, px, MAX_EDGE_PX
                )));
            }
        }
        Ok((width as u32, height as u32))
    }

    /// Check everything that does not depend on the data.
    pub fn validate(&self) -> Result<()> {
        if self.colors.len() != PALETTE_SIZE {
            return Err(RenderError::InvalidStyle(format!(
                "palette needs {} colours, got {}",
                PALETTE_SIZE,
                self.colors.len()
            )));
        }
        self.palette()?;
        if !(self.row_spacing.is_finite() && self.row_spacing > 0.0) {
            return Err(RenderError::InvalidStyle(format!(
                "row spacing must be positive, got {}",
                self.row_spacing
            )));
        }
        if self.dpi == 0 {
            return Err(RenderError::InvalidStyle("dpi must be positive".to_string()));
        }
        self.figure_size_px(1).map(|_| ())
    }

    /// Points to pixels at this style's resolution.
    pub fn points_to_px(&self, points: f32) -> f32 {
        points * self.dpi as f32 / 72.0
    }
}

/// Title naming the configured depth range, e.g.
/// `Stick Plot for Depths from 0m to 50m`.
pub fn depth_range_title(min: f64, max: f64) -> String {
    format!("Stick Plot for Depths from {}m to {}m", min, max)
}
