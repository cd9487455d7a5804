//! Viewport state machine.
//!
//! The mapper holds a `DataSpace`, a `ViewSpace` and the plot surface size.
//! Every mutation validates first and either applies completely or leaves the
//! state untouched.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use super::{
    Axis, AxisRange, DataSpace, PixelPoint, SurfaceSize, ViewSpace, ViewportError, WorldPoint,
};
use crate::raster::SourceRect;

/// How a drag selection whose end lies left of its start is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionPolicy {
    /// Reversed drags are swapped; a zero-width drag resets to full range.
    #[default]
    OrderBounds,
    /// Any right-to-left or zero-width drag resets to full range.
    ReverseResets,
}

impl SelectionPolicy {
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "order_bounds" | "order" | "swap" => Some(SelectionPolicy::OrderBounds),
            "reverse_resets" | "reset" => Some(SelectionPolicy::ReverseResets),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SelectionPolicy::OrderBounds => "order_bounds",
            SelectionPolicy::ReverseResets => "reverse_resets",
        }
    }
}

/// Converts between plot pixels, bin indices and physical units.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewportMapper {
    data: DataSpace,
    view: ViewSpace,
    surface: SurfaceSize,
    frame_length: usize,
    selection_policy: SelectionPolicy,
}

impl ViewportMapper {
    /// Create a mapper showing the whole dataset.
    ///
    /// `time_rows` is the history depth; the time axis spans `[0, time_rows)`.
    pub fn new(
        freq: (f64, f64),
        level: (f64, f64),
        time_rows: usize,
        frame_length: usize,
        surface: SurfaceSize,
    ) -> Result<Self, ViewportError> {
        let data = DataSpace {
            freq: checked(Axis::Freq, freq.0, freq.1)?,
            level: checked(Axis::Level, level.0, level.1)?,
            time: checked(Axis::Time, 0.0, time_rows as f64)?,
        };
        check_surface(surface)?;
        Ok(Self {
            data,
            view: data.into(),
            surface,
            frame_length,
            selection_policy: SelectionPolicy::default(),
        })
    }

    /// Read-only copy of the data bounds.
    pub fn data_space(&self) -> DataSpace {
        self.data
    }

    /// Read-only copy of the visible bounds.
    pub fn view_space(&self) -> ViewSpace {
        self.view
    }

    pub fn surface(&self) -> SurfaceSize {
        self.surface
    }

    pub fn frame_length(&self) -> usize {
        self.frame_length
    }

    pub fn selection_policy(&self) -> SelectionPolicy {
        self.selection_policy
    }

    pub fn set_selection_policy(&mut self, policy: SelectionPolicy) {
        self.selection_policy = policy;
    }

    /// Set the full frequency span; the frequency view resets to it.
    pub fn set_data_range(&mut self, start: f64, end: f64) -> Result<(), ViewportError> {
        self.set_data_axis(Axis::Freq, start, end)
    }

    /// Set the full level span; the level view resets to it.
    pub fn set_level_range(&mut self, min: f64, max: f64) -> Result<(), ViewportError> {
        self.set_data_axis(Axis::Level, min, max)
    }

    /// Set the history depth; the time view resets to all rows.
    pub fn set_time_rows(&mut self, rows: usize) -> Result<(), ViewportError> {
        self.set_data_axis(Axis::Time, 0.0, rows as f64)
    }

    fn set_data_axis(&mut self, axis: Axis, start: f64, end: f64) -> Result<(), ViewportError> {
        let range = checked(axis, start, end)?;
        log::info!("Data {} range set to [{}, {}]", axis, start, end);
        *self.data.axis_mut(axis) = range;
        *self.view.axis_mut(axis) = range;
        Ok(())
    }

    pub fn set_frame_length(&mut self, frame_length: usize) {
        self.frame_length = frame_length;
    }

    pub fn set_surface(&mut self, surface: SurfaceSize) -> Result<(), ViewportError> {
        check_surface(surface)?;
        self.surface = surface;
        Ok(())
    }

    /// Set the visible range on `axis`.
    ///
    /// Fails if the range is empty, reversed, non-finite or leaves the data
    /// bounds; the view is unchanged on failure.
    pub fn set_view_range(
        &mut self,
        axis: Axis,
        start: f64,
        end: f64,
    ) -> Result<(), ViewportError> {
        let range = checked(axis, start, end)?;
        if !self.data.axis(axis).encloses(&range) {
            return Err(ViewportError::Range { axis, start, end });
        }
        *self.view.axis_mut(axis) = range;
        Ok(())
    }

    pub fn set_view_freq_range(&mut self, start: f64, end: f64) -> Result<(), ViewportError> {
        self.set_view_range(Axis::Freq, start, end)
    }

    pub fn set_view_level_range(&mut self, low: f64, high: f64) -> Result<(), ViewportError> {
        self.set_view_range(Axis::Level, low, high)
    }

    pub fn set_view_time_range(&mut self, start: f64, end: f64) -> Result<(), ViewportError> {
        self.set_view_range(Axis::Time, start, end)
    }

    /// Show the full data range on `axis`.
    pub fn reset_view(&mut self, axis: Axis) {
        *self.view.axis_mut(axis) = self.data.axis(axis);
    }

    pub fn reset_all(&mut self) {
        self.view = self.data.into();
    }

    /// Bin index for `freq`. Not clamped: out-of-range frequencies map to
    /// indices outside `[0, frame_length]`.
    pub fn freq_to_index(&self, freq: f64) -> i64 {
        let t = self.data.freq.fraction(freq);
        (t * self.frame_length as f64).round() as i64
    }

    /// Frequency at the start of bin `index`.
    pub fn index_to_freq(&self, index: i64) -> f64 {
        if self.frame_length == 0 {
            return self.data.freq.start;
        }
        self.data.freq.start + index as f64 * self.data.freq.span() / self.frame_length as f64
    }

    /// Bin indices covered by the frequency view, clamped to the frame.
    pub fn visible_bins(&self) -> Range<usize> {
        let len = self.frame_length as i64;
        let start = self.freq_to_index(self.view.freq.start).clamp(0, len);
        let end = self.freq_to_index(self.view.freq.end).clamp(start, len);
        if end == start && len > 0 {
            // Narrower than one bin: show the bin under the view.
            let start = start.min(len - 1);
            return start as usize..start as usize + 1;
        }
        start as usize..end as usize
    }

    /// Pixel coordinate of `value` along `axis`. Level grows upward; time
    /// grows downward from the newest row at the top.
    pub fn value_to_pixel(&self, axis: Axis, value: f64) -> f64 {
        let extent = self.surface.extent(axis) as f64;
        let t = self.view.axis(axis).fraction(value);
        match axis {
            Axis::Freq | Axis::Time => t * extent,
            Axis::Level => (1.0 - t) * extent,
        }
    }

    /// Inverse of `value_to_pixel`.
    pub fn pixel_to_value(&self, axis: Axis, pixel: f64) -> f64 {
        let extent = self.surface.extent(axis) as f64;
        let t = pixel / extent;
        let range = self.view.axis(axis);
        match axis {
            Axis::Freq | Axis::Time => range.at_fraction(t),
            Axis::Level => range.at_fraction(1.0 - t),
        }
    }

    /// Physical coordinates under a plot pixel. `y` resolves to both a level
    /// (spectrum plots) and a time offset (waterfalls).
    pub fn pixel_to_world(&self, point: PixelPoint) -> WorldPoint {
        WorldPoint {
            freq: self.pixel_to_value(Axis::Freq, point.x),
            level: self.pixel_to_value(Axis::Level, point.y),
            time: self.pixel_to_value(Axis::Time, point.y),
        }
    }

    /// Plot pixel for a frequency and level.
    pub fn world_to_pixel(&self, point: WorldPoint) -> PixelPoint {
        PixelPoint::new(
            self.value_to_pixel(Axis::Freq, point.freq),
            self.value_to_pixel(Axis::Level, point.level),
        )
    }

    /// Plot pixel for a frequency and time offset, as drawn on a waterfall.
    pub fn world_to_waterfall_pixel(&self, point: WorldPoint) -> PixelPoint {
        PixelPoint::new(
            self.value_to_pixel(Axis::Freq, point.freq),
            self.value_to_pixel(Axis::Time, point.time),
        )
    }

    /// Scale the view on `axis` by `scale`, keeping `anchor` at the same
    /// relative position. The result is clamped to the data bounds.
    pub fn zoom_around_point(
        &mut self,
        anchor: f64,
        scale: f64,
        axis: Axis,
    ) -> Result<(), ViewportError> {
        if !(scale.is_finite() && scale > 0.0) {
            return Err(ViewportError::InvalidScale(scale));
        }
        let old = self.view.axis(axis);
        let new_len = old.span() * scale;
        let new_start = anchor - new_len * old.fraction(anchor);
        let zoomed =
            AxisRange::new(new_start, new_start + new_len).clamped_to(&self.data.axis(axis));
        self.set_view_range(axis, zoomed.start, zoomed.end)
    }

    /// Pan by a pointer drag of `delta_px` along `axis`: content follows the
    /// pointer. Spans are preserved, pinned against the data edges.
    pub fn pan_by(&mut self, delta_px: f64, axis: Axis) -> Result<(), ViewportError> {
        let view = self.view.axis(axis);
        let per_pixel = view.span() / self.surface.extent(axis) as f64;
        let delta = match axis {
            Axis::Freq | Axis::Time => -delta_px * per_pixel,
            Axis::Level => delta_px * per_pixel,
        };
        self.shift_view(axis, delta)
    }

    /// Scrollbar drag: the thumb moves with the pointer, so one pixel covers
    /// the full data span divided by the surface width.
    pub fn scroll_by(&mut self, delta_px: f64) -> Result<(), ViewportError> {
        let per_pixel = self.data.freq.span() / self.surface.width as f64;
        self.shift_view(Axis::Freq, delta_px * per_pixel)
    }

    fn shift_view(&mut self, axis: Axis, delta: f64) -> Result<(), ViewportError> {
        if !delta.is_finite() {
            return Err(ViewportError::Range {
                axis,
                start: self.view.axis(axis).start + delta,
                end: self.view.axis(axis).end + delta,
            });
        }
        let shifted = self.view.axis(axis).shifted_within(delta, &self.data.axis(axis));
        self.set_view_range(axis, shifted.start, shifted.end)
    }

    /// Zoom the frequency view to the span between two plot pixels.
    pub fn select_range_zoom(
        &mut self,
        p1: PixelPoint,
        p2: PixelPoint,
    ) -> Result<(), ViewportError> {
        let f1 = self.pixel_to_value(Axis::Freq, p1.x);
        let f2 = self.pixel_to_value(Axis::Freq, p2.x);
        let degenerate = match self.selection_policy {
            SelectionPolicy::OrderBounds => f1 == f2,
            SelectionPolicy::ReverseResets => f2 <= f1,
        };
        if degenerate {
            self.reset_view(Axis::Freq);
            return Ok(());
        }
        let selected = AxisRange::new(f1.min(f2), f1.max(f2)).clamped_to(&self.data.freq);
        self.set_view_freq_range(selected.start, selected.end)
    }

    /// Region of a `buffer_width` x `buffer_height` waterfall buffer that the
    /// current frequency and time view covers.
    pub fn source_rect(&self, buffer_width: usize, buffer_height: usize) -> SourceRect {
        let freq = (
            self.data.freq.fraction(self.view.freq.start),
            self.data.freq.fraction(self.view.freq.end),
        );
        let time = (
            self.data.time.fraction(self.view.time.start),
            self.data.time.fraction(self.view.time.end),
        );
        let (w, h) = (buffer_width as f64, buffer_height as f64);
        SourceRect::new(
            freq.0 * w,
            time.0 * h,
            (freq.1 - freq.0) * w,
            (time.1 - time.0) * h,
        )
    }
}

fn checked(axis: Axis, start: f64, end: f64) -> Result<AxisRange, ViewportError> {
    let range = AxisRange::new(start, end);
    if range.is_valid() {
        Ok(range)
    } else {
        Err(ViewportError::Range { axis, start, end })
    }
}

fn check_surface(surface: SurfaceSize) -> Result<(), ViewportError> {
    if surface.is_empty() {
        return Err(ViewportError::EmptySurface {
            width: surface.width,
            height: surface.height,
        });
    }
    Ok(())
}
