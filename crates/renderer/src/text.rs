//! Text drawing with the embedded font.

use image::RgbaImage;
use imageproc::drawing::{draw_text_mut, text_size};
use rusttype::{Font, Scale};

use crate::color::Rgba;
use crate::error::{RenderError, Result};

/// Embedded font data - DejaVu Sans
const FONT_DATA: &[u8] = include_bytes!("../assets/DejaVuSans.ttf");

/// Label and tick text size, in points.
pub const LABEL_POINTS: f32 = 10.0;

/// Title text size, in points.
pub const TITLE_POINTS: f32 = 12.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HAlign {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VAlign {
    Top,
    Center,
    Bottom,
}

pub fn load_font() -> Result<Font<'static>> {
    Font::try_from_bytes(FONT_DATA)
        .ok_or_else(|| RenderError::Font("embedded font could not be parsed".to_string()))
}

/// Draws text anchored at a point.
pub struct TextPainter {
    font: Font<'static>,
}

impl TextPainter {
    pub fn new() -> Result<Self> {
        Ok(Self { font: load_font()? })
    }

    /// Rendered (width, height) of `text` at `size_px`.
    pub fn measure(&self, text: &str, size_px: f32) -> (i32, i32) {
        text_size(Scale::uniform(size_px), &self.font, text)
    }

    /// Draw `text` so that the anchor point sits at (x, y).
    #[allow(clippy::too_many_arguments)]
    pub fn draw(
        &self,
        img: &mut RgbaImage,
        text: &str,
        x: f32,
        y: f32,
        size_px: f32,
        h: HAlign,
        v: VAlign,
        color: Rgba,
    ) {
        if text.is_empty() || !(x.is_finite() && y.is_finite()) {
            return;
        }

        let (w, _) = self.measure(text, size_px);
        // Use the font's line metrics so labels at different heights align
        let metrics = self.font.v_metrics(Scale::uniform(size_px));
        let line_height = metrics.ascent - metrics.descent;

        let left = match h {
            HAlign::Left => x,
            HAlign::Center => x - w as f32 / 2.0,
            HAlign::Right => x - w as f32,
        };
        let top = match v {
            VAlign::Top => y,
            VAlign::Center => y - line_height / 2.0,
            VAlign::Bottom => y - line_height,
        };

        draw_text_mut(
            img,
            color.to_image(),
            left.round() as i32,
            top.round() as i32,
            Scale::uniform(size_px),
            &self.font,
            text,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::ImageBuffer;

    #[test]
    fn test_font_loads() {
        assert!(load_font().is_ok());
    }

    #[test]
    fn test_measure_grows_with_text() {
        let painter = TextPainter::new().unwrap();
        let (short, _) = painter.measure("5.0m", 20.0);
        let (long, _) = painter.measure("150.0m", 20.0);
        assert!(long > short);
    }

    #[test]
    fn test_right_aligned_text_ends_at_anchor() {
        let painter = TextPainter::new().unwrap();
        let mut img: RgbaImage = ImageBuffer::from_pixel(200, 60, image::Rgba([255, 255, 255, 255]));
        painter.draw(
            &mut img,
            "10.0m",
            150.0,
            30.0,
            20.0,
            HAlign::Right,
            VAlign::Center,
            Rgba::BLACK,
        );

        let inked = |x: u32| (0..60).any(|y| img.get_pixel(x, y)[0] < 128);
        assert!((100..150).any(inked));
        assert!(!(155..200).any(inked));
    }
}
