//! Pixel surfaces and the tiled waterfall buffer.
//!
//! This module provides:
//! - The `PixelSurface` trait implemented by blit destinations
//! - `RgbaSurface`, a plain in-memory surface
//! - `PixelSurface` for `image::RgbaImage`
//! - `TiledPixelBuffer`, a fixed-height grid of unbounded width built from
//!   bounded-width tiles

pub mod tiled;

pub use tiled::{TiledPixelBuffer, MAX_TILE_WIDTH};

use crate::color::Rgba;
use image::{ImageBuffer, RgbaImage};

/// Errors raised by raster operations.
#[derive(Debug, thiserror::Error)]
pub enum RasterError {
    #[error("Row width mismatch: buffer is {expected} pixels wide but row has {got}")]
    RowWidthMismatch { expected: usize, got: usize },
    #[error("Row {row} is outside a buffer of height {height}")]
    RowOutOfBounds { row: usize, height: usize },
    #[error("Source rectangle {rect:?} is outside a {width}x{height} buffer")]
    InvalidSourceRect {
        rect: SourceRect,
        width: usize,
        height: usize,
    },
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

/// A sub-rectangle of a source buffer in (fractional) pixel units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SourceRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl SourceRect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Whether the rectangle is non-empty and lies inside a non-empty
    /// `width` x `height` buffer.
    pub fn fits_within(&self, width: usize, height: usize) -> bool {
        const EPS: f64 = 1e-9;
        width > 0
            && height > 0
            && [self.x, self.y, self.width, self.height]
                .iter()
                .all(|v| v.is_finite())
            && self.width > 0.0
            && self.height > 0.0
            && self.x >= -EPS
            && self.y >= -EPS
            && self.right() <= width as f64 + EPS
            && self.bottom() <= height as f64 + EPS
    }
}

/// A bounded destination for pixel output.
pub trait PixelSurface {
    fn width(&self) -> usize;

    fn height(&self) -> usize;

    /// Write one pixel. Coordinates are guaranteed in bounds by callers.
    fn put_pixel(&mut self, x: usize, y: usize, color: Rgba);

    fn fill(&mut self, color: Rgba) {
        for y in 0..self.height() {
            for x in 0..self.width() {
                self.put_pixel(x, y, color);
            }
        }
    }
}

/// Row-major in-memory RGBA surface.
#[derive(Debug, Clone, PartialEq)]
pub struct RgbaSurface {
    width: usize,
    height: usize,
    pixels: Vec<Rgba>,
}

impl RgbaSurface {
    /// Create a transparent surface.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![Rgba::TRANSPARENT; width * height],
        }
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<Rgba> {
        if x < self.width && y < self.height {
            Some(self.pixels[y * self.width + x])
        } else {
            None
        }
    }

    pub fn row(&self, y: usize) -> &[Rgba] {
        &self.pixels[y * self.width..(y + 1) * self.width]
    }

    pub fn pixels(&self) -> &[Rgba] {
        &self.pixels
    }

    /// Raw RGBA bytes, row-major.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    pub fn to_image(&self) -> RgbaImage {
        ImageBuffer::from_fn(self.width as u32, self.height as u32, |x, y| {
            image::Rgba(self.pixels[y as usize * self.width + x as usize].to_array())
        })
    }
}

impl PixelSurface for RgbaSurface {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    #[inline]
    fn put_pixel(&mut self, x: usize, y: usize, color: Rgba) {
        self.pixels[y * self.width + x] = color;
    }

    fn fill(&mut self, color: Rgba) {
        self.pixels.fill(color);
    }
}

impl PixelSurface for RgbaImage {
    fn width(&self) -> usize {
        ImageBuffer::width(self) as usize
    }

    fn height(&self) -> usize {
        ImageBuffer::height(self) as usize
    }

    #[inline]
    fn put_pixel(&mut self, x: usize, y: usize, color: Rgba) {
        ImageBuffer::put_pixel(self, x as u32, y as u32, image::Rgba(color.to_array()));
    }
}
