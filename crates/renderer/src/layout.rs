//! Figure layout: row offsets, axis ranges and data-to-pixel mapping.
//!
//! The axes occupy the figure minus fixed subplot margins. x is time in days
//! since the Unix epoch, y is the row offset with row 0 at the bottom.

use chrono::{DateTime, Utc};

use adcp_common::{date_num, DepthGroup};

use crate::error::{RenderError, Result};
use crate::style::StickStyle;

/// Subplot margins as fractions of the figure (left, right, bottom, top).
pub const SUBPLOT_LEFT: f32 = 0.125;
pub const SUBPLOT_RIGHT: f32 = 0.9;
pub const SUBPLOT_BOTTOM: f32 = 0.11;
pub const SUBPLOT_TOP: f32 = 0.88;

/// Space before the first sample, in days. Depth labels end here.
pub const LEFT_PAD_DAYS: f64 = 0.15;

/// Space after the last sample, in days.
pub const RIGHT_PAD_DAYS: f64 = 0.2;

/// Axes rectangle in pixels, y growing downward.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxesRect {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl AxesRect {
    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }
}

/// Vertical offset of each row, deepest group first.
pub fn row_offsets(rows: usize, spacing: f64) -> Vec<f64> {
    (0..rows).map(|i| i as f64 * spacing).collect()
}

/// Earliest and latest record time over all groups.
pub fn time_extent(groups: &[DepthGroup]) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    groups
        .iter()
        .filter_map(DepthGroup::time_span)
        .reduce(|(a0, a1), (b0, b1)| (a0.min(b0), a1.max(b1)))
}

#[derive(Debug, Clone, PartialEq)]
pub struct FigureLayout {
    pub width_px: u32,
    pub height_px: u32,
    pub axes: AxesRect,
    /// Visible time range, days since the epoch.
    pub x_range: (f64, f64),
    pub y_range: (f64, f64),
    pub row_offsets: Vec<f64>,
}

impl FigureLayout {
    pub fn new(groups: &[DepthGroup], style: &StickStyle) -> Result<Self> {
        let (first, last) = time_extent(groups).ok_or(RenderError::Skipped)?;
        let (width_px, height_px) = style.figure_size_px(groups.len())?;

        let (w, h) = (width_px as f32, height_px as f32);
        let axes = AxesRect {
            left: SUBPLOT_LEFT * w,
            right: SUBPLOT_RIGHT * w,
            top: (1.0 - SUBPLOT_TOP) * h,
            bottom: (1.0 - SUBPLOT_BOTTOM) * h,
        };

        let row_offsets = row_offsets(groups.len(), style.row_spacing);
        let last_offset = row_offsets.last().copied().unwrap_or(0.0);

        Ok(Self {
            width_px,
            height_px,
            axes,
            x_range: (date_num(&first) - LEFT_PAD_DAYS, date_num(&last) + RIGHT_PAD_DAYS),
            y_range: (-style.row_spacing, last_offset + style.row_spacing),
            row_offsets,
        })
    }

    pub fn x_to_px(&self, days: f64) -> f32 {
        let (x0, x1) = self.x_range;
        self.axes.left + ((days - x0) / (x1 - x0)) as f32 * self.axes.width()
    }

    pub fn time_to_px(&self, time: &DateTime<Utc>) -> f32 {
        self.x_to_px(date_num(time))
    }

    pub fn y_to_px(&self, y: f64) -> f32 {
        let (y0, y1) = self.y_range;
        self.axes.bottom - ((y - y0) / (y1 - y0)) as f32 * self.axes.height()
    }

    /// Pixel row of depth row `i`.
    pub fn row_px(&self, i: usize) -> f32 {
        self.y_to_px(self.row_offsets.get(i).copied().unwrap_or(f64::NAN))
    }
}
