//! Colour parsing and speed-bucket palettes.

use crate::error::{RenderError, Result};

/// Upper bounds (m/s, inclusive) of the first five speed buckets.
pub const SPEED_THRESHOLDS: [f64; 5] = [0.10, 0.20, 0.30, 0.40, 0.50];

/// Number of colours in a speed palette.
pub const PALETTE_SIZE: usize = SPEED_THRESHOLDS.len() + 1;

/// Bucket index for a speed in m/s.
///
/// `≤0.10 → 0`, `≤0.20 → 1`, ... `≤0.50 → 4`, anything faster `→ 5`.
pub fn speed_bucket(speed: f64) -> usize {
    SPEED_THRESHOLDS
        .iter()
        .position(|&upper| speed <= upper)
        .unwrap_or(SPEED_THRESHOLDS.len())
}

/// An opaque or translucent RGBA colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const BLACK: Rgba = Rgba::rgb(0, 0, 0);
    pub const WHITE: Rgba = Rgba::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Parse a colour name or a `#rgb`, `#rrggbb` or `#rrggbbaa` hex string.
    pub fn parse(spec: &str) -> Result<Self> {
        let trimmed = spec.trim();
        if let Some(hex) = trimmed.strip_prefix('#') {
            return hex_to_rgba(hex).ok_or_else(|| RenderError::InvalidColor(spec.to_string()));
        }

        let name = trimmed.to_ascii_lowercase();
        NAMED_COLORS
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, c)| *c)
            .ok_or_else(|| RenderError::InvalidColor(spec.to_string()))
    }

    pub fn to_skia(self) -> tiny_skia::Color {
        tiny_skia::Color::from_rgba8(self.r, self.g, self.b, self.a)
    }

    pub fn to_image(self) -> image::Rgba<u8> {
        image::Rgba([self.r, self.g, self.b, self.a])
    }
}

/// Parse hex digits (without `#`) into a colour.
fn hex_to_rgba(hex: &str) -> Option<Rgba> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    match hex.len() {
        3 => {
            let mut out = [0u8; 3];
            for (slot, c) in out.iter_mut().zip(hex.chars()) {
                let v = c.to_digit(16)? as u8;
                *slot = v * 17;
            }
            Some(Rgba::rgb(out[0], out[1], out[2]))
        }
        6 => Some(Rgba::rgb(channel(0)?, channel(2)?, channel(4)?)),
        8 => Some(Rgba {
            r: channel(0)?,
            g: channel(2)?,
            b: channel(4)?,
            a: channel(6)?,
        }),
        _ => None,
    }
}

/// Common colour names, including single-letter shorthands.
const NAMED_COLORS: &[(&str, Rgba)] = &[
    ("b", Rgba::rgb(0, 0, 255)),
    ("g", Rgba::rgb(0, 128, 0)),
    ("r", Rgba::rgb(255, 0, 0)),
    ("c", Rgba::rgb(0, 191, 191)),
    ("m", Rgba::rgb(191, 0, 191)),
    ("y", Rgba::rgb(191, 191, 0)),
    ("k", Rgba::rgb(0, 0, 0)),
    ("w", Rgba::rgb(255, 255, 255)),
    ("black", Rgba::rgb(0, 0, 0)),
    ("white", Rgba::rgb(255, 255, 255)),
    ("gray", Rgba::rgb(128, 128, 128)),
    ("grey", Rgba::rgb(128, 128, 128)),
    ("lightgray", Rgba::rgb(211, 211, 211)),
    ("darkgray", Rgba::rgb(169, 169, 169)),
    ("red", Rgba::rgb(255, 0, 0)),
    ("darkred", Rgba::rgb(139, 0, 0)),
    ("maroon", Rgba::rgb(128, 0, 0)),
    ("crimson", Rgba::rgb(220, 20, 60)),
    ("pink", Rgba::rgb(255, 192, 203)),
    ("orange", Rgba::rgb(255, 165, 0)),
    ("darkorange", Rgba::rgb(255, 140, 0)),
    ("gold", Rgba::rgb(255, 215, 0)),
    ("yellow", Rgba::rgb(255, 255, 0)),
    ("olive", Rgba::rgb(128, 128, 0)),
    ("lime", Rgba::rgb(0, 255, 0)),
    ("green", Rgba::rgb(0, 128, 0)),
    ("darkgreen", Rgba::rgb(0, 100, 0)),
    ("lightgreen", Rgba::rgb(144, 238, 144)),
    ("teal", Rgba::rgb(0, 128, 128)),
    ("cyan", Rgba::rgb(0, 255, 255)),
    ("aqua", Rgba::rgb(0, 255, 255)),
    ("lightblue", Rgba::rgb(173, 216, 230)),
    ("skyblue", Rgba::rgb(135, 206, 235)),
    ("blue", Rgba::rgb(0, 0, 255)),
    ("darkblue", Rgba::rgb(0, 0, 139)),
    ("navy", Rgba::rgb(0, 0, 128)),
    ("purple", Rgba::rgb(128, 0, 128)),
    ("violet", Rgba::rgb(238, 130, 238)),
    ("magenta", Rgba::rgb(255, 0, 255)),
    ("fuchsia", Rgba::rgb(255, 0, 255)),
    ("brown", Rgba::rgb(165, 42, 42)),
];

/// Six colours indexed by speed bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeedPalette {
    colors: [Rgba; PALETTE_SIZE],
}

impl SpeedPalette {
    /// Parse six colour strings, slowest bucket first.
    pub fn parse<S: AsRef<str>>(specs: &[S]) -> Result<Self> {
        if specs.len() != PALETTE_SIZE {
            return Err(RenderError::InvalidStyle(format!(
                "palette needs {} colours, got {}",
                PALETTE_SIZE,
                specs.len()
            )));
        }
        let mut colors = [Rgba::BLACK; PALETTE_SIZE];
        for (slot, spec) in colors.iter_mut().zip(specs) {
            *slot = Rgba::parse(spec.as_ref())?;
        }
        Ok(Self { colors })
    }

    pub fn color_for(&self, speed: f64) -> Rgba {
        self.colors[speed_bucket(speed)]
    }

    pub fn colors(&self) -> &[Rgba; PALETTE_SIZE] {
        &self.colors
    }
}
