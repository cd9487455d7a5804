//! Colors and level-to-color lookup.
//!
//! This module provides:
//! - `Rgba`, a byte-packed pixel shared with rendering backends
//! - Gradient color stops and hex color parsing
//! - A precomputed gradient lookup table with clamped indexing

pub mod lut;

pub use lut::{ColorLookupTable, LevelColorizer};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Errors raised while building color tables or parsing colors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ColorError {
    #[error("A color gradient needs at least 2 stops, got {0}")]
    TooFewStops(usize),
    #[error("A color table needs at least 1 step")]
    ZeroSteps,
    #[error("Color stop position must be within [0, 1], got {0}")]
    InvalidStopPosition(f32),
    #[error("Invalid hex color: {0}")]
    InvalidHex(String),
}

/// One RGBA pixel, 8 bits per channel.
///
/// `#[repr(C)]` + `Pod` lets a row of pixels be handed to a backend as raw
/// bytes with `bytemuck::cast_slice`.
#[repr(C)]
#[derive(
    Copy, Clone, Debug, Default, PartialEq, Eq, Hash, bytemuck::Pod, bytemuck::Zeroable,
    Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba::new(0, 0, 0, 0);
    pub const BLACK: Rgba = Rgba::rgb(0, 0, 0);
    pub const WHITE: Rgba = Rgba::rgb(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque color.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Parse `#rrggbb` or `#rrggbbaa` (leading `#` optional).
    pub fn from_hex(hex: &str) -> Result<Self, ColorError> {
        let digits = hex.trim().trim_start_matches('#');
        let is_hex = digits.bytes().all(|b| b.is_ascii_hexdigit());
        if (digits.len() != 6 && digits.len() != 8) || !is_hex {
            return Err(ColorError::InvalidHex(hex.to_string()));
        }
        let channel = |i: usize| {
            u8::from_str_radix(&digits[i..i + 2], 16)
                .map_err(|_| ColorError::InvalidHex(hex.to_string()))
        };
        let a = if digits.len() == 8 { channel(6)? } else { 255 };
        Ok(Self::new(channel(0)?, channel(2)?, channel(4)?, a))
    }

    /// Hex form; alpha is omitted when opaque.
    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }

    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Per-channel linear interpolation, `t` in [0, 1].
    pub fn lerp(self, other: Rgba, t: f32) -> Rgba {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Rgba::new(
            mix(self.r, other.r),
            mix(self.g, other.g),
            mix(self.b, other.b),
            mix(self.a, other.a),
        )
    }
}

impl From<[u8; 4]> for Rgba {
    fn from(c: [u8; 4]) -> Self {
        Rgba::new(c[0], c[1], c[2], c[3])
    }
}

impl FromStr for Rgba {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Rgba::from_hex(s)
    }
}

impl TryFrom<String> for Rgba {
    type Error = ColorError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Rgba::from_hex(&s)
    }
}

impl From<Rgba> for String {
    fn from(c: Rgba) -> Self {
        c.to_hex()
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// A gradient stop: a color pinned at `position` in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorStop {
    pub position: f32,
    pub color: Rgba,
}

impl ColorStop {
    pub const fn new(position: f32, color: Rgba) -> Self {
        Self { position, color }
    }
}

/// Evenly spaced stops for a list of colors (first at 0, last at 1).
pub fn evenly_spaced(colors: &[Rgba]) -> Vec<ColorStop> {
    let last = colors.len().saturating_sub(1).max(1) as f32;
    colors
        .iter()
        .enumerate()
        .map(|(i, &color)| ColorStop::new(i as f32 / last, color))
        .collect()
}

/// Default waterfall ramp: deep blue through cyan, green and yellow to red.
pub fn default_stops() -> Vec<ColorStop> {
    evenly_spaced(&[
        Rgba::rgb(0, 0, 48),
        Rgba::rgb(0, 0, 255),
        Rgba::rgb(0, 255, 255),
        Rgba::rgb(0, 255, 0),
        Rgba::rgb(255, 255, 0),
        Rgba::rgb(255, 0, 0),
    ])
}
