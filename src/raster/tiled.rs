//! Tiled pixel buffer for arbitrarily wide waterfalls.
//!
//! A single addressable surface cannot safely exceed a platform width ceiling,
//! so the logical grid is split along its width into tiles of at most
//! `max_tile_width` columns. Callers always use global (row, column)
//! coordinates; the split is invisible to them.

use std::path::Path;

use image::{ImageBuffer, ImageFormat, RgbaImage};

use super::{PixelSurface, RasterError, SourceRect};
use crate::color::Rgba;

/// Conservative width ceiling for a single drawing surface.
pub const MAX_TILE_WIDTH: usize = 16_000;

#[derive(Debug, Clone)]
struct Tile {
    /// First global column covered by this tile.
    x_offset: usize,
    width: usize,
    /// Row-major, `height * width` pixels.
    pixels: Vec<Rgba>,
}

impl Tile {
    fn row_mut(&mut self, row: usize) -> &mut [Rgba] {
        &mut self.pixels[row * self.width..(row + 1) * self.width]
    }
}

/// Fixed-height, effectively unbounded-width pixel grid.
#[derive(Debug, Clone)]
pub struct TiledPixelBuffer {
    width: usize,
    height: usize,
    max_tile_width: usize,
    tiles: Vec<Tile>,
}

impl TiledPixelBuffer {
    /// Allocate a transparent `height` x `width` buffer using the default
    /// tile ceiling.
    pub fn new(height: usize, width: usize) -> Self {
        Self::with_max_tile_width(height, width, MAX_TILE_WIDTH)
    }

    /// Allocate with an explicit tile ceiling. Every tile but the last is
    /// exactly `max_tile_width` wide; the last takes the remainder.
    pub fn with_max_tile_width(height: usize, width: usize, max_tile_width: usize) -> Self {
        let max_tile_width = max_tile_width.max(1);
        let tile_count = width.div_ceil(max_tile_width);
        let tiles = (0..tile_count)
            .map(|i| {
                let x_offset = i * max_tile_width;
                let tile_width = max_tile_width.min(width - x_offset);
                Tile {
                    x_offset,
                    width: tile_width,
                    pixels: vec![Rgba::TRANSPARENT; tile_width * height],
                }
            })
            .collect();

        Self {
            width,
            height,
            max_tile_width,
            tiles,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn max_tile_width(&self) -> usize {
        self.max_tile_width
    }

    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    pub fn tile_widths(&self) -> Vec<usize> {
        self.tiles.iter().map(|t| t.width).collect()
    }

    /// Pixel at global coordinates.
    pub fn pixel(&self, x: usize, y: usize) -> Option<Rgba> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let tile = &self.tiles[x / self.max_tile_width];
        Some(tile.pixels[y * tile.width + (x - tile.x_offset)])
    }

    /// Shift all content down by `rows`. Content pushed past the bottom edge
    /// is discarded; the exposed top rows keep stale pixels until rewritten.
    pub fn scroll_down(&mut self, rows: usize) {
        if rows == 0 || rows >= self.height {
            return;
        }
        let kept = self.height - rows;
        for tile in &mut self.tiles {
            let w = tile.width;
            tile.pixels.copy_within(0..kept * w, rows * w);
        }
    }

    /// Write one full-width row at `at_row`.
    pub fn write_row(&mut self, row: &[Rgba], at_row: usize) -> Result<(), RasterError> {
        self.check_row(row, at_row)?;
        for tile in &mut self.tiles {
            let src = &row[tile.x_offset..tile.x_offset + tile.width];
            tile.row_mut(at_row).copy_from_slice(src);
        }
        Ok(())
    }

    /// Scroll down one row and write `row` as the new top row.
    pub fn push_row(&mut self, row: &[Rgba]) -> Result<(), RasterError> {
        self.check_row(row, 0)?;
        self.scroll_down(1);
        self.write_row(row, 0)
    }

    fn check_row(&self, row: &[Rgba], at_row: usize) -> Result<(), RasterError> {
        if at_row >= self.height {
            return Err(RasterError::RowOutOfBounds {
                row: at_row,
                height: self.height,
            });
        }
        if row.len() != self.width {
            return Err(RasterError::RowWidthMismatch {
                expected: self.width,
                got: row.len(),
            });
        }
        Ok(())
    }

    pub fn fill(&mut self, color: Rgba) {
        for tile in &mut self.tiles {
            tile.pixels.fill(color);
        }
    }

    pub fn clear(&mut self) {
        self.fill(Rgba::TRANSPARENT);
    }

    /// Copy `src` scaled (nearest neighbour) to fill `dest`.
    ///
    /// Each destination column samples the source at its pixel centre and is
    /// drawn by the one tile containing that sample, tiles composited left to
    /// right, so the output is identical to an untiled buffer. Tiles that do
    /// not overlap `src` are skipped.
    pub fn blit_scaled<S>(&self, dest: &mut S, src: SourceRect) -> Result<(), RasterError>
    where
        S: PixelSurface + ?Sized,
    {
        if !src.fits_within(self.width, self.height) {
            return Err(RasterError::InvalidSourceRect {
                rect: src,
                width: self.width,
                height: self.height,
            });
        }
        let (dest_w, dest_h) = (dest.width(), dest.height());
        if dest_w == 0 || dest_h == 0 {
            return Ok(());
        }

        // Source column/row sampled by each destination column/row; both are
        // non-decreasing.
        let sample = |origin: f64, scale: f64, i: usize, len: usize| -> usize {
            let s = origin + (i as f64 + 0.5) * scale;
            (s.floor().max(0.0) as usize).min(len - 1)
        };
        let x_scale = src.width / dest_w as f64;
        let y_scale = src.height / dest_h as f64;
        let columns: Vec<usize> = (0..dest_w)
            .map(|px| sample(src.x, x_scale, px, self.width))
            .collect();
        let rows: Vec<usize> = (0..dest_h)
            .map(|py| sample(src.y, y_scale, py, self.height))
            .collect();

        for tile in &self.tiles {
            let first = columns.partition_point(|&c| c < tile.x_offset);
            let last = columns.partition_point(|&c| c < tile.x_offset + tile.width);
            if first == last {
                continue;
            }
            for (px, &column) in columns.iter().enumerate().take(last).skip(first) {
                let local = column - tile.x_offset;
                for (py, &row) in rows.iter().enumerate() {
                    dest.put_pixel(px, py, tile.pixels[row * tile.width + local]);
                }
            }
        }
        Ok(())
    }

    /// Stitch all tiles into a single image.
    pub fn to_image(&self) -> RgbaImage {
        let mut img: RgbaImage = ImageBuffer::new(self.width as u32, self.height as u32);
        for tile in &self.tiles {
            for y in 0..self.height {
                for x in 0..tile.width {
                    let color = tile.pixels[y * tile.width + x];
                    img.put_pixel(
                        (tile.x_offset + x) as u32,
                        y as u32,
                        image::Rgba(color.to_array()),
                    );
                }
            }
        }
        img
    }

    /// Write the stitched buffer as a PNG file.
    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> Result<(), RasterError> {
        self.to_image()
            .save_with_format(path.as_ref(), ImageFormat::Png)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::RgbaSurface;

    fn gray(v: u8) -> Rgba {
        Rgba::rgb(v, v, v)
    }

    #[test]
    fn test_tile_partitioning() {
        let buffer = TiledPixelBuffer::with_max_tile_width(4, 20_000, 8_000);
        assert_eq!(buffer.tile_count(), 3);
        assert_eq!(buffer.tile_widths(), vec![8_000, 8_000, 4_000]);

        let exact = TiledPixelBuffer::with_max_tile_width(1, 16, 8);
        assert_eq!(exact.tile_widths(), vec![8, 8]);

        let default = TiledPixelBuffer::new(2, 100);
        assert_eq!(default.tile_count(), 1);
        assert_eq!(default.max_tile_width(), MAX_TILE_WIDTH);
    }

    #[test]
    fn test_write_row_spans_tiles() {
        let mut buffer = TiledPixelBuffer::with_max_tile_width(2, 10, 4);
        let row: Vec<Rgba> = (0..10).map(|i| gray(i as u8)).collect();
        buffer.write_row(&row, 1).unwrap();
        for x in 0..10 {
            assert_eq!(buffer.pixel(x, 1), Some(gray(x as u8)));
            assert_eq!(buffer.pixel(x, 0), Some(Rgba::TRANSPARENT));
        }
    }

    #[test]
    fn test_write_row_validation() {
        let mut buffer = TiledPixelBuffer::with_max_tile_width(2, 5, 2);
        assert!(matches!(
            buffer.write_row(&[Rgba::WHITE; 4], 0),
            Err(RasterError::RowWidthMismatch { expected: 5, got: 4 })
        ));
        assert!(matches!(
            buffer.write_row(&[Rgba::WHITE; 5], 2),
            Err(RasterError::RowOutOfBounds { row: 2, height: 2 })
        ));
    }

    #[test]
    fn test_scroll_down_shifts_and_discards() {
        let mut buffer = TiledPixelBuffer::with_max_tile_width(3, 5, 2);
        for (y, v) in [10u8, 20, 30].iter().enumerate() {
            buffer.write_row(&[gray(*v); 5], y).unwrap();
        }
        buffer.scroll_down(1);
        for x in 0..5 {
            // Exposed top row keeps stale content
            assert_eq!(buffer.pixel(x, 0), Some(gray(10)));
            assert_eq!(buffer.pixel(x, 1), Some(gray(10)));
            assert_eq!(buffer.pixel(x, 2), Some(gray(20)));
        }
    }

    #[test]
    fn test_push_row_puts_newest_on_top() {
        let mut buffer = TiledPixelBuffer::with_max_tile_width(3, 3, 2);
        for v in 1..=4u8 {
            buffer.push_row(&[gray(v); 3]).unwrap();
        }
        assert_eq!(buffer.pixel(2, 0), Some(gray(4)));
        assert_eq!(buffer.pixel(2, 1), Some(gray(3)));
        assert_eq!(buffer.pixel(2, 2), Some(gray(2)));
    }

    #[test]
    fn test_push_row_rejects_bad_width_without_scrolling() {
        let mut buffer = TiledPixelBuffer::with_max_tile_width(2, 3, 2);
        buffer.push_row(&[gray(1); 3]).unwrap();
        assert!(buffer.push_row(&[gray(2); 2]).is_err());
        assert_eq!(buffer.pixel(0, 0), Some(gray(1)));
        assert_eq!(buffer.pixel(0, 1), Some(Rgba::TRANSPARENT));
    }

    #[test]
    fn test_blit_identity_copy() {
        let mut buffer = TiledPixelBuffer::with_max_tile_width(2, 6, 4);
        let row: Vec<Rgba> = (0..6).map(|i| gray(i as u8 * 10)).collect();
        buffer.write_row(&row, 0).unwrap();
        buffer.write_row(&[Rgba::WHITE; 6], 1).unwrap();

        let mut dest = RgbaSurface::new(6, 2);
        buffer
            .blit_scaled(&mut dest, SourceRect::new(0.0, 0.0, 6.0, 2.0))
            .unwrap();
        assert_eq!(dest.row(0), row.as_slice());
        assert_eq!(dest.row(1), &[Rgba::WHITE; 6]);
    }

    #[test]
    fn test_blit_sub_rectangle_skips_other_tiles() {
        let mut buffer = TiledPixelBuffer::with_max_tile_width(1, 12, 4);
        let row: Vec<Rgba> = (0..12).map(|i| gray(i as u8)).collect();
        buffer.write_row(&row, 0).unwrap();

        // Columns 5..7 live entirely in the middle tile
        let mut dest = RgbaSurface::new(4, 1);
        buffer
            .blit_scaled(&mut dest, SourceRect::new(5.0, 0.0, 2.0, 1.0))
            .unwrap();
        assert_eq!(dest.row(0), &[gray(5), gray(5), gray(6), gray(6)]);
    }

    #[test]
    fn test_blit_rejects_out_of_bounds_source() {
        let buffer = TiledPixelBuffer::with_max_tile_width(2, 6, 4);
        let mut dest = RgbaSurface::new(3, 3);
        assert!(matches!(
            buffer.blit_scaled(&mut dest, SourceRect::new(4.0, 0.0, 3.0, 2.0)),
            Err(RasterError::InvalidSourceRect { .. })
        ));
    }

    #[test]
    fn test_blit_into_empty_destination_is_noop() {
        let buffer = TiledPixelBuffer::with_max_tile_width(2, 6, 4);
        let mut dest = RgbaSurface::new(0, 0);
        assert!(buffer
            .blit_scaled(&mut dest, SourceRect::new(0.0, 0.0, 6.0, 2.0))
            .is_ok());
    }

    #[test]
    fn test_to_image_stitches_tiles() {
        let mut buffer = TiledPixelBuffer::with_max_tile_width(1, 5, 2);
        let row: Vec<Rgba> = (0..5).map(|i| gray(i as u8 * 50)).collect();
        buffer.write_row(&row, 0).unwrap();
        let img = buffer.to_image();
        assert_eq!(img.dimensions(), (5, 1));
        for x in 0..5u32 {
            let v = x as u8 * 50;
            assert_eq!(img.get_pixel(x, 0), &image::Rgba([v, v, v, 255]));
        }
    }
}
