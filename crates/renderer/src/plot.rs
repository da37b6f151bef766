//! Stick-plot figure composition.
//!
//! One row per depth group, deepest at the bottom. Each record becomes an
//! arrow at (time, row offset) pointing the way the current flows, coloured
//! by speed bucket. Shapes are rasterised with tiny-skia, text is drawn on
//! the resulting image, and the figure is encoded as PNG.

use std::path::{Path, PathBuf};

use image::RgbaImage;
use tiny_skia::{Mask, Paint, PathBuilder, Pixmap, Rect, Stroke, Transform};
use tracing::{debug, info};

use adcp_common::{format_depth, DepthGroup};

use crate::color::Rgba;
use crate::error::{RenderError, Result};
use crate::layout::FigureLayout;
use crate::png::encode_png;
use crate::stick::{compass_components, draw_arrow, ArrowGeometry};
use crate::style::StickStyle;
use crate::text::{HAlign, TextPainter, VAlign, LABEL_POINTS, TITLE_POINTS};
use crate::ticks::{date_ticks, MAX_TICKS};

/// Axes frame line width, in points.
const FRAME_POINTS: f32 = 0.8;

/// Tick mark length, in points.
const TICK_POINTS: f32 = 3.5;

/// Gap between tick marks and their labels, in points.
const TICK_PAD_POINTS: f32 = 3.5;

/// Gap between the axes and the title, in points.
const TITLE_PAD_POINTS: f32 = 6.0;

/// An encoded figure held in memory.
#[derive(Debug, Clone)]
pub struct RenderedPlot {
    pub png: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub rows: usize,
    pub arrows: usize,
}

/// A figure written to disk.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderResult {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub rows: usize,
    pub arrows: usize,
    pub bytes: usize,
}

/// Render depth groups (deepest first) to an in-memory PNG.
///
/// # Errors
/// `Skipped` when there are no groups or no records.
pub fn render_png(groups: &[DepthGroup], style: &StickStyle) -> Result<RenderedPlot> {
    if groups.iter().all(DepthGroup::is_empty) {
        return Err(RenderError::Skipped);
    }

    style.validate()?;
    let palette = style.palette()?;
    let painter = TextPainter::new()?;
    let layout = FigureLayout::new(groups, style)?;

    debug!(
        width = layout.width_px,
        height = layout.height_px,
        rows = groups.len(),
        x_range = ?layout.x_range,
        y_range = ?layout.y_range,
        "Laid out stick plot"
    );

    let mut pixmap = Pixmap::new(layout.width_px, layout.height_px).ok_or_else(|| {
        RenderError::Encode(format!(
            "cannot allocate {}x{} canvas",
            layout.width_px, layout.height_px
        ))
    })?;
    pixmap.fill(Rgba::WHITE.to_skia());

    let clip = axes_clip(&layout);
    let geometry = ArrowGeometry::for_axes(layout.axes.width(), style.arrow_head);

    let mut arrows = 0usize;
    for (row, group) in groups.iter().enumerate() {
        let y = layout.row_px(row);
        for record in &group.records {
            let x = layout.time_to_px(&record.time);
            let (east, north) = compass_components(record.speed, record.direction);
            let outline = geometry.outline((x, y), geometry.screen_vector(east, north));
            draw_arrow(
                &mut pixmap,
                &outline,
                palette.color_for(record.speed),
                clip.as_ref(),
            );
            arrows += 1;
        }
    }

    let ticks = date_ticks(layout.x_range.0, layout.x_range.1, MAX_TICKS);
    draw_frame(&mut pixmap, &layout, style);
    draw_tick_marks(&mut pixmap, &layout, style, ticks.iter().map(|t| t.days));

    let (width, height) = (layout.width_px, layout.height_px);
    // Every pixel is opaque, so premultiplied and straight RGBA agree
    let mut img = RgbaImage::from_raw(width, height, pixmap.take())
        .ok_or_else(|| RenderError::Encode("canvas size mismatch".to_string()))?;

    let label_px = style.points_to_px(LABEL_POINTS);
    let label_x = layout.x_to_px(layout.x_range.0);
    for (row, group) in groups.iter().enumerate() {
        painter.draw(
            &mut img,
            &format!("{}m", format_depth(group.depth)),
            label_x,
            layout.row_px(row),
            label_px,
            HAlign::Right,
            VAlign::Center,
            Rgba::BLACK,
        );
    }

    let tick_label_y =
        layout.axes.bottom + style.points_to_px(TICK_POINTS + TICK_PAD_POINTS);
    for tick in &ticks {
        painter.draw(
            &mut img,
            &tick.label,
            layout.x_to_px(tick.days),
            tick_label_y,
            label_px,
            HAlign::Center,
            VAlign::Top,
            Rgba::BLACK,
        );
    }

    painter.draw(
        &mut img,
        &style.title,
        (layout.axes.left + layout.axes.right) / 2.0,
        layout.axes.top - style.points_to_px(TITLE_PAD_POINTS),
        style.points_to_px(TITLE_POINTS),
        HAlign::Center,
        VAlign::Bottom,
        Rgba::BLACK,
    );

    let png = encode_png(img.as_raw(), width as usize, height as usize, Some(style.dpi))?;

    debug!(arrows, ticks = ticks.len(), bytes = png.len(), "Encoded stick plot");

    Ok(RenderedPlot {
        png,
        width,
        height,
        rows: groups.len(),
        arrows,
    })
}

/// Render depth groups and write the PNG to `path`, replacing any existing
/// file. Nothing is written when rendering fails.
pub fn render(
    groups: &[DepthGroup],
    style: &StickStyle,
    path: impl AsRef<Path>,
) -> Result<RenderResult> {
    let path = path.as_ref();
    let plot = render_png(groups, style)?;

    std::fs::write(path, &plot.png).map_err(|source| RenderError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    info!(
        path = %path.display(),
        width = plot.width,
        height = plot.height,
        rows = plot.rows,
        arrows = plot.arrows,
        "Saved stick plot"
    );

    Ok(RenderResult {
        path: path.to_path_buf(),
        width: plot.width,
        height: plot.height,
        rows: plot.rows,
        arrows: plot.arrows,
        bytes: plot.png.len(),
    })
}

/// Mask limiting arrows to the axes area.
fn axes_clip(layout: &FigureLayout) -> Option<Mask> {
    let a = layout.axes;
    let rect = Rect::from_ltrb(a.left, a.top, a.right, a.bottom)?;
    let mut mask = Mask::new(layout.width_px, layout.height_px)?;
    mask.fill_path(
        &PathBuilder::from_rect(rect),
        tiny_skia::FillRule::Winding,
        false,
        Transform::identity(),
    );
    Some(mask)
}

fn black_stroke(width: f32) -> (Paint<'static>, Stroke) {
    let mut paint = Paint::default();
    paint.set_color(Rgba::BLACK.to_skia());
    paint.anti_alias = true;

    let stroke = Stroke {
        width,
        ..Stroke::default()
    };
    (paint, stroke)
}

fn draw_frame(pixmap: &mut Pixmap, layout: &FigureLayout, style: &StickStyle) {
    let a = layout.axes;
    let Some(rect) = Rect::from_ltrb(a.left, a.top, a.right, a.bottom) else {
        return;
    };
    let (paint, stroke) = black_stroke(style.points_to_px(FRAME_POINTS));
    pixmap.stroke_path(
        &PathBuilder::from_rect(rect),
        &paint,
        &stroke,
        Transform::identity(),
        None,
    );
}

fn draw_tick_marks(
    pixmap: &mut Pixmap,
    layout: &FigureLayout,
    style: &StickStyle,
    days: impl Iterator<Item = f64>,
) {
    let (paint, stroke) = black_stroke(style.points_to_px(FRAME_POINTS));
    let length = style.points_to_px(TICK_POINTS);

    let mut pb = PathBuilder::new();
    for d in days {
        let x = layout.x_to_px(d);
        pb.move_to(x, layout.axes.bottom);
        pb.line_to(x, layout.axes.bottom + length);
    }
    if let Some(path) = pb.finish() {
        pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
    }
}
