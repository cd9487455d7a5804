//! Waterfall (spectrogram) controller.
//!
//! Each ingested frame is reduced by the aggregator, colorized through the
//! lookup table and pushed as the new top row of a tiled pixel buffer that is
//! `cache_count` rows tall and one column per bin wide. The current view
//! selects the source rectangle that gets blitted onto the plot surface.

use std::path::Path;

use image::RgbaImage;

use super::interaction::ViewCommand;
use super::{view_change_for, Broadcast, ChangeQueue, ChartError, ViewChange, ViewSync};
use crate::color::{ColorLookupTable, ColorStop, LevelColorizer, Rgba};
use crate::config::{ChartColors, ChartConfig};
use crate::frame::{Frame, FrameAggregator, HistoryRing, KeepMode};
use crate::raster::{PixelSurface, SourceRect, TiledPixelBuffer};
use crate::viewport::{Axis, ChartLayout, PixelPoint, SurfaceSize, ViewportMapper};

/// Source rectangle and destination size of the blit that presents the
/// current view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlitRequest {
    pub src: SourceRect,
    pub dest: SurfaceSize,
}

#[derive(Debug, Clone)]
pub struct WaterfallView {
    aggregator: FrameAggregator,
    colorizer: LevelColorizer,
    buffer: TiledPixelBuffer,
    /// Capture time of each buffer row, newest first.
    timestamps: HistoryRing<i64>,
    row: Vec<Rgba>,
    viewport: ViewportMapper,
    layout: ChartLayout,
    colors: ChartColors,
    auto_resize: bool,
    outbox: ChangeQueue,
}

impl WaterfallView {
    pub fn new(config: &ChartConfig) -> Result<Self, ChartError> {
        config.validate()?;
        let layout = config.layout();
        let aggregator =
            FrameAggregator::new(config.frame_length, config.keep_mode, config.cache_count)?;
        let mut viewport = ViewportMapper::new(
            config.data_freq_range,
            config.data_level_range,
            config.cache_count,
            config.frame_length,
            layout.plot_size(),
        )?;
        viewport.set_selection_policy(config.selection_policy);

        let mut buffer = TiledPixelBuffer::with_max_tile_width(
            config.cache_count,
            config.frame_length,
            config.max_tile_width,
        );
        buffer.fill(config.colors.background);
        log::debug!(
            "Waterfall buffer {}x{} in {} tile(s)",
            buffer.width(),
            buffer.height(),
            buffer.tile_count()
        );

        Ok(Self {
            aggregator,
            colorizer: config.colorizer()?,
            buffer,
            timestamps: HistoryRing::with_capacity(config.cache_count),
            row: Vec::with_capacity(config.frame_length),
            viewport,
            layout,
            colors: config.colors,
            auto_resize: config.auto_resize,
            outbox: ChangeQueue::default(),
        })
    }

    /// Ingest one frame, write its colorized display row at the top of the
    /// waterfall and return the display frame.
    pub fn update(&mut self, frame: Frame) -> Result<&[f32], ChartError> {
        if self.auto_resize && !frame.is_empty() && frame.len() != self.aggregator.frame_length() {
            self.resize_frame(frame.len())?;
        }
        let timestamp = frame.timestamp_ms;
        let display = self.aggregator.ingest(frame)?;
        self.colorizer.colorize_into(display, &mut self.row);
        self.buffer.push_row(&self.row)?;
        self.timestamps.push(timestamp);
        Ok(display)
    }

    fn resize_frame(&mut self, frame_length: usize) -> Result<(), ChartError> {
        log::info!(
            "Waterfall frame length changed from {} to {} bins, reallocating buffer",
            self.aggregator.frame_length(),
            frame_length
        );
        let cache_count = self.aggregator.cache_count();
        self.aggregator
            .configure(frame_length, self.aggregator.keep_mode(), cache_count)?;
        self.buffer = TiledPixelBuffer::with_max_tile_width(
            cache_count,
            frame_length,
            self.buffer.max_tile_width(),
        );
        self.buffer.fill(self.colors.background);
        self.timestamps.clear();
        self.viewport.set_frame_length(frame_length);
        self.viewport.reset_view(Axis::Freq);
        self.emit_view(Axis::Freq);
        Ok(())
    }

    fn clear_rows(&mut self) {
        self.aggregator.reset();
        self.buffer.fill(self.colors.background);
        self.timestamps.clear();
    }

    /// Current display frame, if any frame arrived since the last reset.
    pub fn display(&self) -> Option<&[f32]> {
        self.aggregator.display()
    }

    pub fn keep_mode(&self) -> KeepMode {
        self.aggregator.keep_mode()
    }

    /// Switch keep mode. Rows already drawn stay; accumulators restart.
    pub fn set_keep_mode(&mut self, mode: KeepMode) {
        self.aggregator.set_keep_mode(mode);
    }

    pub fn set_auto_resize(&mut self, enabled: bool) {
        self.auto_resize = enabled;
    }

    /// Set the full frequency span. Clears history, accumulators and every
    /// waterfall row.
    pub fn set_data_range(&mut self, start: f64, end: f64) -> Result<(), ChartError> {
        self.apply_data_range(start, end, Broadcast::Emit)
    }

    fn apply_data_range(
        &mut self,
        start: f64,
        end: f64,
        broadcast: Broadcast,
    ) -> Result<(), ChartError> {
        self.viewport.set_data_range(start, end)?;
        self.clear_rows();
        if broadcast == Broadcast::Emit {
            self.outbox.push(ViewChange::DataFreqRange { start, end });
        }
        Ok(())
    }

    /// Set the full level span and the color mapping range. Rows colored
    /// under the previous mapping are cleared along with history.
    pub fn set_level_range(&mut self, min: f64, max: f64) -> Result<(), ChartError> {
        self.viewport.set_level_range(min, max)?;
        self.colorizer.set_range(min as f32, max as f32);
        self.clear_rows();
        Ok(())
    }

    /// Rebuild the color table. Applies to rows written from now on.
    pub fn set_color_stops(&mut self, stops: &[ColorStop], steps: usize) -> Result<(), ChartError> {
        self.colorizer.set_table(ColorLookupTable::build(stops, steps)?);
        Ok(())
    }

    pub fn set_view_freq_range(&mut self, start: f64, end: f64) -> Result<(), ChartError> {
        self.viewport.set_view_freq_range(start, end)?;
        self.emit_view(Axis::Freq);
        Ok(())
    }

    /// Narrow the level range that spans the color table. Applies to rows
    /// written from now on.
    pub fn set_view_level_range(&mut self, low: f64, high: f64) -> Result<(), ChartError> {
        self.apply_view_level(low, high)?;
        self.emit_view(Axis::Level);
        Ok(())
    }

    fn apply_view_level(&mut self, low: f64, high: f64) -> Result<(), ChartError> {
        self.viewport.set_view_level_range(low, high)?;
        self.colorizer.set_range(low as f32, high as f32);
        Ok(())
    }

    /// Visible history rows, 0 = newest.
    pub fn set_view_time_range(&mut self, start: f64, end: f64) -> Result<(), ChartError> {
        self.viewport.set_view_time_range(start, end)?;
        Ok(())
    }

    pub fn reset_view(&mut self, axis: Axis) {
        self.viewport.reset_view(axis);
        if axis == Axis::Level {
            let range = self.viewport.view_space().level;
            self.colorizer.set_range(range.start as f32, range.end as f32);
        }
        self.emit_view(axis);
    }

    pub fn zoom_around_point(
        &mut self,
        anchor: f64,
        scale: f64,
        axis: Axis,
    ) -> Result<(), ChartError> {
        self.viewport.zoom_around_point(anchor, scale, axis)?;
        self.emit_view(axis);
        Ok(())
    }

    pub fn pan_by(&mut self, delta_px: f64, axis: Axis) -> Result<(), ChartError> {
        self.viewport.pan_by(delta_px, axis)?;
        self.emit_view(axis);
        Ok(())
    }

    pub fn scroll_by(&mut self, delta_px: f64) -> Result<(), ChartError> {
        self.viewport.scroll_by(delta_px)?;
        self.emit_view(Axis::Freq);
        Ok(())
    }

    pub fn select_range_zoom(&mut self, p1: PixelPoint, p2: PixelPoint) -> Result<(), ChartError> {
        self.viewport.select_range_zoom(p1, p2)?;
        self.emit_view(Axis::Freq);
        Ok(())
    }

    pub fn apply_command(&mut self, command: ViewCommand) -> Result<(), ChartError> {
        match command {
            ViewCommand::Pan { axis, delta_px } => self.pan_by(delta_px, axis),
            ViewCommand::Scroll { delta_px } => self.scroll_by(delta_px),
            ViewCommand::Zoom {
                anchor,
                scale,
                axis,
            } => self.zoom_around_point(anchor, scale, axis),
            ViewCommand::SelectRange { from, to } => self.select_range_zoom(from, to),
        }
    }

    /// Resize the widget; margins are kept.
    pub fn resize(&mut self, width: usize, height: usize) -> Result<(), ChartError> {
        let layout = ChartLayout::new(
            width,
            height,
            self.layout.left_margin,
            self.layout.bottom_margin,
            self.layout.scrollbar_height,
        );
        self.viewport.set_surface(layout.plot_size())?;
        self.layout = layout;
        Ok(())
    }

    fn emit_view(&mut self, axis: Axis) {
        if let Some(change) = view_change_for(&self.viewport.view_space(), axis) {
            self.outbox.push(change);
        }
    }

    /// Capture timestamp of buffer row `row` (0 = newest).
    pub fn timestamp_at_row(&self, row: usize) -> Option<i64> {
        self.timestamps.nth_newest(row).copied()
    }

    /// Capture timestamp of the row drawn at plot pixel row `y`.
    pub fn timestamp_at_pixel(&self, y: f64) -> Option<i64> {
        let row = self.viewport.pixel_to_value(Axis::Time, y).floor();
        if row < 0.0 {
            return None;
        }
        self.timestamp_at_row(row as usize)
    }

    /// Rows written since the last reset, capped at the history depth.
    pub fn row_count(&self) -> usize {
        self.timestamps.len()
    }

    /// The blit that presents the current view on the plot surface.
    pub fn blit_request(&self) -> BlitRequest {
        BlitRequest {
            src: self
                .viewport
                .source_rect(self.buffer.width(), self.buffer.height()),
            dest: self.viewport.surface(),
        }
    }

    /// Draw the current view into `dest`, scaled to fill it.
    pub fn render<S: PixelSurface + ?Sized>(&self, dest: &mut S) -> Result<(), ChartError> {
        self.buffer.blit_scaled(dest, self.blit_request().src)?;
        Ok(())
    }

    /// The full logical buffer as one image, newest row on top.
    pub fn snapshot(&self) -> RgbaImage {
        self.buffer.to_image()
    }

    /// Write `snapshot()` as a PNG file.
    pub fn save_snapshot<P: AsRef<Path>>(&self, path: P) -> Result<(), ChartError> {
        self.buffer.save_png(path.as_ref())?;
        log::info!("Saved waterfall snapshot to {}", path.as_ref().display());
        Ok(())
    }

    pub fn buffer(&self) -> &TiledPixelBuffer {
        &self.buffer
    }

    pub fn colorizer(&self) -> &LevelColorizer {
        &self.colorizer
    }

    pub fn viewport(&self) -> &ViewportMapper {
        &self.viewport
    }

    pub fn aggregator(&self) -> &FrameAggregator {
        &self.aggregator
    }

    pub fn layout(&self) -> &ChartLayout {
        &self.layout
    }
}

impl ViewSync for WaterfallView {
    fn apply_change(
        &mut self,
        change: &ViewChange,
        broadcast: Broadcast,
    ) -> Result<(), ChartError> {
        match *change {
            ViewChange::DataFreqRange { start, end } => {
                self.apply_data_range(start, end, broadcast)
            }
            ViewChange::ViewFreqRange { start, end } => {
                self.viewport.set_view_freq_range(start, end)?;
                if broadcast == Broadcast::Emit {
                    self.emit_view(Axis::Freq);
                }
                Ok(())
            }
            ViewChange::ViewLevelRange { low, high } => {
                self.apply_view_level(low, high)?;
                if broadcast == Broadcast::Emit {
                    self.emit_view(Axis::Level);
                }
                Ok(())
            }
        }
    }

    fn take_changes(&mut self) -> Vec<ViewChange> {
        self.outbox.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::evenly_spaced;
    use crate::raster::RgbaSurface;

    fn config() -> ChartConfig {
        ChartConfig {
            frame_length: 8,
            cache_count: 4,
            data_freq_range: (0.0, 800.0),
            data_level_range: (0.0, 1.0),
            color_stops: evenly_spaced(&[Rgba::BLACK, Rgba::WHITE]),
            color_steps: 2,
            width: 58,
            height: 54,
            ..ChartConfig::default()
        }
    }

    #[test]
    fn test_update_pushes_colorized_row() {
        let mut view = WaterfallView::new(&config()).unwrap();
        view.update(Frame::new(10, vec![0.0; 8])).unwrap();
        view.update(Frame::new(20, vec![1.0; 8])).unwrap();
        assert_eq!(view.buffer().pixel(3, 0), Some(Rgba::WHITE));
        assert_eq!(view.buffer().pixel(3, 1), Some(Rgba::BLACK));
        assert_eq!(view.buffer().pixel(3, 2), Some(Rgba::BLACK));
        assert_eq!(view.timestamp_at_row(0), Some(20));
        assert_eq!(view.timestamp_at_row(1), Some(10));
        assert_eq!(view.timestamp_at_row(2), None);
    }

    #[test]
    fn test_rows_beyond_depth_are_dropped() {
        let mut view = WaterfallView::new(&config()).unwrap();
        for ts in 0..6 {
            view.update(Frame::new(ts, vec![0.0; 8])).unwrap();
        }
        assert_eq!(view.row_count(), 4);
        assert_eq!(view.timestamp_at_row(0), Some(5));
        assert_eq!(view.timestamp_at_row(3), Some(2));
    }

    #[test]
    fn test_auto_resize_reallocates_buffer() {
        let mut view = WaterfallView::new(&config()).unwrap();
        view.update(Frame::new(0, vec![0.0; 8])).unwrap();
        view.update(Frame::new(1, vec![1.0; 12])).unwrap();
        assert_eq!(view.buffer().width(), 12);
        assert_eq!(view.buffer().height(), 4);
        assert_eq!(view.row_count(), 1);
        assert_eq!(view.viewport().frame_length(), 12);
    }

    #[test]
    fn test_data_range_clears_rows() {
        let mut view = WaterfallView::new(&config()).unwrap();
        view.update(Frame::new(0, vec![1.0; 8])).unwrap();
        view.set_data_range(100.0, 900.0).unwrap();
        assert_eq!(view.row_count(), 0);
        assert_eq!(view.buffer().pixel(0, 0), Some(Rgba::BLACK));
        assert!(view.display().is_none());
    }

    #[test]
    fn test_level_range_clears_rows() {
        let mut view = WaterfallView::new(&config()).unwrap();
        view.update(Frame::new(0, vec![1.0; 8])).unwrap();
        assert_eq!(view.buffer().pixel(0, 0), Some(Rgba::WHITE));

        view.set_level_range(2.0, 4.0).unwrap();
        assert_eq!(view.row_count(), 0);
        assert_eq!(view.buffer().pixel(0, 0), Some(Rgba::BLACK));
        assert!(view.display().is_none());

        // 1.0 now sits below the range
        view.update(Frame::new(1, vec![1.0; 8])).unwrap();
        assert_eq!(view.buffer().pixel(0, 0), Some(Rgba::BLACK));
        view.update(Frame::new(2, vec![4.0; 8])).unwrap();
        assert_eq!(view.buffer().pixel(0, 0), Some(Rgba::WHITE));
    }

    #[test]
    fn test_blit_request_follows_view() {
        let mut view = WaterfallView::new(&config()).unwrap();
        let request = view.blit_request();
        assert_eq!(request.src, SourceRect::new(0.0, 0.0, 8.0, 4.0));
        assert_eq!(request.dest, SurfaceSize::new(8, 4));
        view.set_view_freq_range(200.0, 600.0).unwrap();
        view.set_view_time_range(0.0, 2.0).unwrap();
        assert_eq!(view.blit_request().src, SourceRect::new(2.0, 0.0, 4.0, 2.0));
    }

    #[test]
    fn test_render_draws_newest_rows() {
        let mut view = WaterfallView::new(&config()).unwrap();
        view.update(Frame::new(0, synth_ramp())).unwrap();
        let mut dest = RgbaSurface::new(8, 4);
        view.render(&mut dest).unwrap();
        assert_eq!(dest.pixel(0, 0), Some(Rgba::BLACK));
        assert_eq!(dest.pixel(7, 0), Some(Rgba::WHITE));
    }

    #[test]
    fn test_view_level_range_drives_colors() {
        let mut view = WaterfallView::new(&config()).unwrap();
        view.set_view_level_range(0.0, 0.5).unwrap();
        view.update(Frame::new(0, vec![0.5; 8])).unwrap();
        assert_eq!(view.buffer().pixel(0, 0), Some(Rgba::WHITE));
        assert_eq!(view.colorizer().range(), (0.0, 0.5));
    }

    #[test]
    fn test_timestamp_at_pixel() {
        let mut view = WaterfallView::new(&config()).unwrap();
        for ts in [100, 200, 300] {
            view.update(Frame::new(ts, vec![0.0; 8])).unwrap();
        }
        // 4 plot rows map one-to-one onto 4 history rows
        assert_eq!(view.timestamp_at_pixel(0.5), Some(300));
        assert_eq!(view.timestamp_at_pixel(2.5), Some(100));
        assert_eq!(view.timestamp_at_pixel(3.5), None);
    }

    fn synth_ramp() -> Vec<f32> {
        crate::frame::synth::ramp(8, 0.0, 1.0)
    }
}
