//! Stick-plot rendering for ADCP current profiles.
//!
//! - `style`: figure and palette configuration
//! - `color`: colour parsing and speed buckets
//! - `stick`: arrow geometry
//! - `layout` / `ticks`: axes, row offsets and date ticks
//! - `plot`: figure composition and output
//! - `png`: PNG encoding with DPI metadata

pub mod color;
pub mod error;
pub mod layout;
pub mod plot;
pub mod png;
pub mod stick;
pub mod style;
pub mod text;
pub mod ticks;

pub use color::{speed_bucket, Rgba, SpeedPalette, SPEED_THRESHOLDS};
pub use error::RenderError;
pub use plot::{render, render_png, RenderResult, RenderedPlot};
pub use style::{depth_range_title, StickStyle};
