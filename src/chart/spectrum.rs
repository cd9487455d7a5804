//! Spectrum line-plot controller.

use std::ops::Range;

use super::interaction::ViewCommand;
use super::markers::{Marker, MarkerLine, MarkerReading, MarkerSet};
use super::{view_change_for, Broadcast, ChangeQueue, ChartError, ViewChange, ViewSync};
use crate::config::{ChartColors, ChartConfig};
use crate::frame::{Frame, FrameAggregator, KeepMode};
use crate::viewport::{Axis, ChartLayout, PixelPoint, ViewportMapper};

/// Drives a single-line spectrum plot: keep-mode aggregation, viewport,
/// markers and marker lines. Rendering is left to the caller, which reads
/// `visible_trace()` and the marker readings.
#[derive(Debug, Clone)]
pub struct SpectrumView {
    aggregator: FrameAggregator,
    viewport: ViewportMapper,
    layout: ChartLayout,
    colors: ChartColors,
    markers: MarkerSet,
    marker_lines: Vec<MarkerLine>,
    auto_resize: bool,
    outbox: ChangeQueue,
}

impl SpectrumView {
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

        Ok(Self {
            aggregator,
            viewport,
            layout,
            colors: config.colors,
            markers: MarkerSet::new(),
            marker_lines: Vec::new(),
            auto_resize: config.auto_resize,
            outbox: ChangeQueue::default(),
        })
    }

    /// Ingest one frame and return the frame to display.
    ///
    /// A frame of a new length reconfigures the chart when auto resize is on;
    /// otherwise it fails with a shape mismatch.
    pub fn update(&mut self, frame: Frame) -> Result<&[f32], ChartError> {
        if self.auto_resize && !frame.is_empty() && frame.len() != self.aggregator.frame_length() {
            self.resize_frame(frame.len())?;
        }
        Ok(self.aggregator.ingest(frame)?)
    }

    fn resize_frame(&mut self, frame_length: usize) -> Result<(), ChartError> {
        log::info!(
            "Spectrum frame length changed from {} to {} bins, reconfiguring",
            self.aggregator.frame_length(),
            frame_length
        );
        self.aggregator.configure(
            frame_length,
            self.aggregator.keep_mode(),
            self.aggregator.cache_count(),
        )?;
        self.viewport.set_frame_length(frame_length);
        self.viewport.reset_view(Axis::Freq);
        self.emit_view(Axis::Freq);
        Ok(())
    }

    /// Current display frame, if any frame arrived since the last reset.
    pub fn display(&self) -> Option<&[f32]> {
        self.aggregator.display()
    }

    pub fn keep_mode(&self) -> KeepMode {
        self.aggregator.keep_mode()
    }

    pub fn set_keep_mode(&mut self, mode: KeepMode) {
        self.aggregator.set_keep_mode(mode);
    }

    pub fn set_auto_resize(&mut self, enabled: bool) {
        self.auto_resize = enabled;
    }

    /// Set the full frequency span. History and accumulators are reset and
    /// the frequency view shows the new span.
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
        self.aggregator.reset();
        if broadcast == Broadcast::Emit {
            self.outbox.push(ViewChange::DataFreqRange { start, end });
        }
        Ok(())
    }

    /// Set the full level span. History and accumulators are reset and the
    /// level view shows the new span.
    pub fn set_level_range(&mut self, min: f64, max: f64) -> Result<(), ChartError> {
        self.viewport.set_level_range(min, max)?;
        self.aggregator.reset();
        Ok(())
    }

    pub fn set_view_freq_range(&mut self, start: f64, end: f64) -> Result<(), ChartError> {
        self.viewport.set_view_freq_range(start, end)?;
        self.emit_view(Axis::Freq);
        Ok(())
    }

    pub fn set_view_level_range(&mut self, low: f64, high: f64) -> Result<(), ChartError> {
        self.viewport.set_view_level_range(low, high)?;
        self.emit_view(Axis::Level);
        Ok(())
    }

    pub fn reset_view(&mut self, axis: Axis) {
        self.viewport.reset_view(axis);
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

    /// Apply a command produced by the gesture interpreter.
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

    /// Bins a line renderer should draw.
    pub fn visible_bins(&self) -> Range<usize> {
        self.viewport.visible_bins()
    }

    /// Plot-pixel polyline of the visible part of the display frame.
    pub fn visible_trace(&self) -> Vec<PixelPoint> {
        let Some(display) = self.display() else {
            return Vec::new();
        };
        self.visible_bins()
            .filter_map(|bin| {
                let level = *display.get(bin)?;
                let freq = self.viewport.index_to_freq(bin as i64);
                Some(PixelPoint::new(
                    self.viewport.value_to_pixel(Axis::Freq, freq),
                    self.viewport.value_to_pixel(Axis::Level, level as f64),
                ))
            })
            .collect()
    }

    /// Highest display level in the visible bins and its frequency.
    pub fn peak_in_view(&self) -> Option<(f64, f32)> {
        let display = self.display()?;
        let bins = self.visible_bins();
        let offset = bins.start;
        display
            .get(bins)?
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, &level)| (self.viewport.index_to_freq((offset + i) as i64), level))
    }

    /// Add a marker with a generated name (`marker1`, `marker2`, ...).
    pub fn add_marker(&mut self, freq: f64, level: Option<f64>) -> String {
        self.markers.add(freq, level)
    }

    /// Add or replace a marker under its own name.
    pub fn insert_marker(&mut self, marker: Marker) {
        self.markers.insert(marker);
    }

    pub fn set_marker(
        &mut self,
        name: &str,
        freq: f64,
        level: Option<f64>,
    ) -> Result<(), ChartError> {
        if self.markers.set(name, freq, level) {
            Ok(())
        } else {
            Err(ChartError::UnknownMarker(name.to_string()))
        }
    }

    pub fn remove_marker(&mut self, name: &str) -> Option<Marker> {
        self.markers.remove(name)
    }

    pub fn clear_markers(&mut self) {
        self.markers.clear();
    }

    /// Snapshot of every marker measured against the display frame.
    pub fn markers(&self) -> Vec<MarkerReading> {
        self.markers.readings(self.display(), &self.viewport)
    }

    /// Add or replace a marker line under its name.
    pub fn set_marker_line(&mut self, line: MarkerLine) {
        match self.marker_lines.iter_mut().find(|l| l.name == line.name) {
            Some(existing) => *existing = line,
            None => self.marker_lines.push(line),
        }
    }

    pub fn remove_marker_line(&mut self, name: &str) -> Option<MarkerLine> {
        let index = self.marker_lines.iter().position(|l| l.name == name)?;
        Some(self.marker_lines.remove(index))
    }

    pub fn marker_lines(&self) -> &[MarkerLine] {
        &self.marker_lines
    }

    /// Plot-pixel row of a marker line.
    pub fn marker_line_y(&self, name: &str) -> Option<f64> {
        let line = self.marker_lines.iter().find(|l| l.name == name)?;
        Some(self.viewport.value_to_pixel(Axis::Level, line.level))
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

    pub fn colors(&self) -> &ChartColors {
        &self.colors
    }
}

impl ViewSync for SpectrumView {
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
                self.viewport.set_view_level_range(low, high)?;
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
    use crate::frame::synth;
    use crate::viewport::AxisRange;

    fn config() -> ChartConfig {
        ChartConfig {
            frame_length: 100,
            cache_count: 5,
            data_freq_range: (0.0, 1_000.0),
            data_level_range: (-100.0, 0.0),
            width: 150,
            height: 150,
            ..ChartConfig::default()
        }
    }

    #[test]
    fn test_update_returns_display_frame() {
        let mut view = SpectrumView::new(&config()).unwrap();
        let out = view.update(synth::constant_frame(100, -40.0, 0)).unwrap();
        assert_eq!(out.len(), 100);
        assert!(view.display().is_some());
    }

    #[test]
    fn test_auto_resize_reconfigures() {
        let mut view = SpectrumView::new(&config()).unwrap();
        view.set_view_freq_range(100.0, 200.0).unwrap();
        view.take_changes();
        view.update(synth::constant_frame(100, -40.0, 0)).unwrap();
        view.update(synth::constant_frame(50, -40.0, 1)).unwrap();
        assert_eq!(view.aggregator().frame_length(), 50);
        assert_eq!(view.aggregator().history().len(), 1);
        assert_eq!(view.viewport().view_space().freq.span(), 1_000.0);
        assert_eq!(
            view.take_changes(),
            vec![ViewChange::ViewFreqRange { start: 0.0, end: 1_000.0 }]
        );
    }

    #[test]
    fn test_shape_mismatch_without_auto_resize() {
        let mut view = SpectrumView::new(&config()).unwrap();
        view.set_auto_resize(false);
        assert!(matches!(
            view.update(synth::constant_frame(50, -40.0, 0)),
            Err(ChartError::Aggregator(_))
        ));
    }

    #[test]
    fn test_data_range_resets_history() {
        let mut view = SpectrumView::new(&config()).unwrap();
        view.update(synth::constant_frame(100, -40.0, 0)).unwrap();
        view.set_data_range(1e6, 2e6).unwrap();
        assert!(view.display().is_none());
        assert_eq!(
            view.take_changes(),
            vec![ViewChange::DataFreqRange { start: 1e6, end: 2e6 }]
        );
    }

    #[test]
    fn test_level_range_resets_history() {
        let mut view = SpectrumView::new(&config()).unwrap();
        view.update(synth::constant_frame(100, -40.0, 0)).unwrap();
        view.set_level_range(-120.0, 0.0).unwrap();
        assert!(view.display().is_none());
        assert_eq!(view.viewport().view_space().level, AxisRange::new(-120.0, 0.0));

        // A bad range leaves the history alone
        view.update(synth::constant_frame(100, -40.0, 1)).unwrap();
        assert!(view.set_level_range(0.0, 0.0).is_err());
        assert!(view.display().is_some());
    }

    #[test]
    fn test_peak_in_view_respects_visible_bins() {
        let mut view = SpectrumView::new(&config()).unwrap();
        let mut samples = vec![-90.0; 100];
        samples[10] = -5.0;
        samples[60] = -20.0;
        view.update(Frame::new(0, samples)).unwrap();

        assert_eq!(view.peak_in_view(), Some((100.0, -5.0)));
        view.set_view_freq_range(500.0, 800.0).unwrap();
        assert_eq!(view.peak_in_view(), Some((600.0, -20.0)));
    }

    #[test]
    fn test_visible_trace_spans_plot() {
        let mut view = SpectrumView::new(&config()).unwrap();
        view.update(Frame::new(0, synth::ramp(100, -100.0, 0.0))).unwrap();
        view.set_view_freq_range(0.0, 500.0).unwrap();
        let trace = view.visible_trace();
        assert_eq!(trace.len(), 50);
        assert_eq!(trace[0], PixelPoint::new(0.0, 100.0));
        assert!(trace.windows(2).all(|w| w[1].x > w[0].x));
    }

    #[test]
    fn test_markers_and_lines() {
        let mut view = SpectrumView::new(&config()).unwrap();
        view.update(synth::constant_frame(100, -30.0, 0)).unwrap();
        let name = view.add_marker(250.0, None);
        assert_eq!(view.markers()[0].measured_level, Some(-30.0));
        assert!(view.set_marker(&name, 300.0, Some(-10.0)).is_ok());
        assert!(matches!(
            view.set_marker("nope", 1.0, None),
            Err(ChartError::UnknownMarker(_))
        ));

        view.set_marker_line(MarkerLine::new("limit", -50.0));
        assert_eq!(view.marker_line_y("limit"), Some(50.0));
        view.set_marker_line(MarkerLine::new("limit", -25.0));
        assert_eq!(view.marker_lines().len(), 1);
        assert!(view.remove_marker_line("limit").is_some());
        assert_eq!(view.marker_line_y("limit"), None);
    }

    #[test]
    fn test_suppressed_changes_are_not_queued() {
        let mut view = SpectrumView::new(&config()).unwrap();
        let change = ViewChange::ViewFreqRange {
            start: 10.0,
            end: 20.0,
        };
        view.apply_change(&change, Broadcast::Suppress).unwrap();
        assert!(view.take_changes().is_empty());
        assert_eq!(view.viewport().view_space().freq.start, 10.0);

        view.apply_change(&ViewChange::ViewLevelRange { low: -50.0, high: -10.0 }, Broadcast::Emit)
            .unwrap();
        assert_eq!(
            view.take_changes(),
            vec![ViewChange::ViewLevelRange { low: -50.0, high: -10.0 }]
        );
    }

    #[test]
    fn test_resize_updates_plot_surface() {
        let mut view = SpectrumView::new(&config()).unwrap();
        view.resize(450, 250).unwrap();
        assert_eq!(view.viewport().surface().width, 400);
        assert!(view.resize(10, 10).is_err());
        assert_eq!(view.layout().width, 450);
    }
}
