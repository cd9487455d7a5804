//! Axis tick generation.
//!
//! Tick intervals target roughly one grid cell per 100 pixels. The raw
//! interval's mantissa is rounded to the nearest half, so intervals read as
//! 1, 1.5, 2, 2.5, ... times a power of ten.

use super::{Axis, AxisRange, ViewportMapper};

/// Preferred grid cell size in pixels.
pub const TARGET_CELL_PX: f64 = 100.0;

/// One tick: a data value and its pixel position along the axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tick {
    pub value: f64,
    pub pixel: f64,
}

/// Interval between ticks for `span` data units drawn across `pixel_len`
/// pixels. Returns `None` for empty or non-finite input.
pub fn nice_interval(span: f64, pixel_len: f64) -> Option<f64> {
    if !(span.is_finite() && span > 0.0 && pixel_len.is_finite() && pixel_len > 0.0) {
        return None;
    }
    let cells = (pixel_len / TARGET_CELL_PX).max(1.0);
    let raw = span / cells;
    let magnitude = 10f64.powf(raw.log10().floor());
    let mantissa = (raw / magnitude * 2.0).round() / 2.0;
    Some(mantissa.max(0.5) * magnitude)
}

/// Ticks at every multiple of the nice interval inside `range`. Pixels run
/// from `range.start` (pixel 0) to `range.end` (pixel `pixel_len`).
pub fn axis_ticks(range: AxisRange, pixel_len: f64) -> Vec<Tick> {
    let Some(interval) = nice_interval(range.span(), pixel_len) else {
        return Vec::new();
    };
    let first = (range.start / interval).ceil() as i64;
    let last = (range.end / interval).floor() as i64;
    (first..=last)
        .map(|k| {
            let value = k as f64 * interval;
            Tick {
                value,
                pixel: range.fraction(value) * pixel_len,
            }
        })
        .collect()
}

impl ViewportMapper {
    /// Ticks for the current view on `axis`, with pixels in plot
    /// coordinates (level ticks count up from the bottom edge).
    pub fn ticks(&self, axis: Axis) -> Vec<Tick> {
        let extent = self.surface().extent(axis) as f64;
        axis_ticks(self.view_space().axis(axis), extent)
            .into_iter()
            .map(|tick| Tick {
                value: tick.value,
                pixel: self.value_to_pixel(axis, tick.value),
            })
            .collect()
    }
}
