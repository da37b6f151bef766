//! Stick (current arrow) geometry and drawing.
//!
//! Arrows follow quiver conventions: the arrow starts at the sample position
//! and points the way the current flows, with length proportional to speed.
//! Sizes are in pixels; the layout converts from axes-width units.

use tiny_skia::{FillRule, Mask, Paint, PathBuilder, Pixmap, Transform};

use crate::color::Rgba;

/// Data units per arrow length unit; one unit spans the axes width.
pub const QUIVER_SCALE: f64 = 20.0;

/// Shaft width as a fraction of the axes width.
pub const SHAFT_WIDTH_WITH_HEAD: f64 = 0.002;
pub const SHAFT_WIDTH_WITHOUT_HEAD: f64 = 0.001;

/// Head dimensions, in shaft widths.
const HEAD_LENGTH: f32 = 2.0;
const HEAD_WIDTH: f32 = 2.0;
const HEAD_AXIS_LENGTH: f32 = 2.5;

/// Decompose a compass heading into (east, north) components.
///
/// `direction_deg` is clockwise from north, the direction the current flows
/// toward.
pub fn compass_components(speed: f64, direction_deg: f64) -> (f64, f64) {
    let rad = direction_deg.to_radians();
    (speed * rad.sin(), speed * rad.cos())
}

/// Pixel dimensions of an arrow style.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrowGeometry {
    /// Pixels per m/s of speed.
    pub px_per_unit: f32,
    pub shaft_width: f32,
    /// Head length, head half-width and head-axis length in pixels, or
    /// `None` for bare sticks.
    pub head: Option<(f32, f32, f32)>,
}

impl ArrowGeometry {
    /// Geometry for an axes `axes_width_px` wide.
    pub fn for_axes(axes_width_px: f32, arrow_head: bool) -> Self {
        let px_per_unit = axes_width_px / QUIVER_SCALE as f32;
        if arrow_head {
            let w = (SHAFT_WIDTH_WITH_HEAD as f32 * axes_width_px).max(1.0);
            Self {
                px_per_unit,
                shaft_width: w,
                head: Some((HEAD_LENGTH * w, HEAD_WIDTH * w / 2.0, HEAD_AXIS_LENGTH * w)),
            }
        } else {
            Self {
                px_per_unit,
                shaft_width: (SHAFT_WIDTH_WITHOUT_HEAD as f32 * axes_width_px).max(1.0),
                head: None,
            }
        }
    }

    /// Screen vector (dx, dy) for a current; screen y grows downward.
    pub fn screen_vector(&self, east: f64, north: f64) -> (f32, f32) {
        (
            east as f32 * self.px_per_unit,
            -(north as f32) * self.px_per_unit,
        )
    }

    /// Outline of an arrow from `origin` along `vector`.
    ///
    /// Returns an empty outline for zero-length arrows. Heads on arrows
    /// shorter than the head-axis length shrink with the arrow.
    pub fn outline(&self, origin: (f32, f32), vector: (f32, f32)) -> Vec<(f32, f32)> {
        let length = (vector.0 * vector.0 + vector.1 * vector.1).sqrt();
        if !length.is_finite() || length <= f32::EPSILON {
            return Vec::new();
        }

        let half = self.shaft_width / 2.0;
        let local: Vec<(f32, f32)> = match self.head {
            None => vec![(0.0, -half), (length, -half), (length, half), (0.0, half)],
            Some((head_len, head_half, axis_len)) => {
                let shrink = (length / axis_len).min(1.0);
                let (head_len, head_half, axis_len, half) = (
                    head_len * shrink,
                    head_half * shrink,
                    axis_len * shrink,
                    half * shrink,
                );
                vec![
                    (0.0, -half),
                    (length - axis_len, -half),
                    (length - head_len, -head_half),
                    (length, 0.0),
                    (length - head_len, head_half),
                    (length - axis_len, half),
                    (0.0, half),
                ]
            }
        };

        // Rotate local (along, across) into screen space
        let (ux, uy) = (vector.0 / length, vector.1 / length);
        local
            .into_iter()
            .map(|(a, c)| (origin.0 + a * ux - c * uy, origin.1 + a * uy + c * ux))
            .collect()
    }
}

/// Fill an arrow outline onto the canvas, optionally clipped.
pub fn draw_arrow(pixmap: &mut Pixmap, outline: &[(f32, f32)], color: Rgba, clip: Option<&Mask>) {
    let Some((&(x0, y0), rest)) = outline.split_first() else {
        return;
    };

    let mut paint = Paint::default();
    paint.set_color(color.to_skia());
    paint.anti_alias = true;

    let mut pb = PathBuilder::new();
    pb.move_to(x0, y0);
    for &(x, y) in rest {
        pb.line_to(x, y);
    }
    pb.close();

    if let Some(path) = pb.finish() {
        pixmap.fill_path(&path, &paint, FillRule::Winding, Transform::identity(), clip);
    }
}
