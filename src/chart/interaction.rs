//! Pointer and wheel gesture interpretation.
//!
//! The interpreter owns no input device. The host forwards widget-space
//! pointer positions and wheel deltas, and gets back `ViewCommand`s to apply
//! to a chart:
//! - drag on the frequency axis pans frequency
//! - drag on the level axis pans the vertical axis
//! - drag on the scrollbar moves the view across the full span
//! - drag inside the plot selects a frequency range to zoom to
//! - wheel over the level axis zooms vertically (x1.2 / x0.8)
//! - wheel over the plot or frequency axis zooms frequency (x1.5 / x0.6)

use crate::viewport::{Axis, ChartLayout, PixelPoint, Region, ViewportMapper};

const VERTICAL_ZOOM: (f64, f64) = (1.2, 0.8);
const FREQ_ZOOM: (f64, f64) = (1.5, 0.6);

/// A view mutation requested by a gesture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewCommand {
    Pan { axis: Axis, delta_px: f64 },
    Scroll { delta_px: f64 },
    Zoom { anchor: f64, scale: f64, axis: Axis },
    /// Plot-space endpoints of a drag selection.
    SelectRange { from: PixelPoint, to: PixelPoint },
}

/// What the pointer is currently doing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureState {
    Idle,
    PanFreq { last_x: f64 },
    PanVertical { last_y: f64 },
    Scrollbar { last_x: f64 },
    /// Plot-space anchor and current point of a selection drag.
    Selecting { start: PixelPoint, current: PixelPoint },
}

/// Stateful gesture interpreter for one chart widget.
#[derive(Debug, Clone)]
pub struct Interaction {
    state: GestureState,
    /// `Axis::Level` for spectrum plots, `Axis::Time` for waterfalls.
    vertical: Axis,
}

impl Interaction {
    pub fn new(vertical: Axis) -> Self {
        Self {
            state: GestureState::Idle,
            vertical,
        }
    }

    pub fn state(&self) -> GestureState {
        self.state
    }

    /// Selection rectangle corners in plot space, while a selection drag is
    /// in progress.
    pub fn selection(&self) -> Option<(PixelPoint, PixelPoint)> {
        match self.state {
            GestureState::Selecting { start, current } => Some((start, current)),
            _ => None,
        }
    }

    pub fn pointer_down(&mut self, layout: &ChartLayout, x: f64, y: f64) {
        self.state = match layout.region_at(x, y) {
            Region::FreqAxis => GestureState::PanFreq { last_x: x },
            Region::LevelAxis => GestureState::PanVertical { last_y: y },
            Region::Scrollbar => GestureState::Scrollbar { last_x: x },
            Region::Plot => {
                let p = layout.to_plot(x, y);
                GestureState::Selecting { start: p, current: p }
            }
            Region::Outside => GestureState::Idle,
        };
    }

    /// Pointer moved with a button held.
    pub fn pointer_move(&mut self, layout: &ChartLayout, x: f64, y: f64) -> Option<ViewCommand> {
        match &mut self.state {
            GestureState::Idle => None,
            GestureState::PanFreq { last_x } => {
                let delta_px = x - std::mem::replace(last_x, x);
                Some(ViewCommand::Pan {
                    axis: Axis::Freq,
                    delta_px,
                })
            }
            GestureState::PanVertical { last_y } => {
                let delta_px = y - std::mem::replace(last_y, y);
                Some(ViewCommand::Pan {
                    axis: self.vertical,
                    delta_px,
                })
            }
            GestureState::Scrollbar { last_x } => {
                let delta_px = x - std::mem::replace(last_x, x);
                Some(ViewCommand::Scroll { delta_px })
            }
            GestureState::Selecting { current, .. } => {
                *current = layout.to_plot(x, y);
                None
            }
        }
    }

    /// Button released. A selection drag ending inside the plot yields a
    /// range zoom; anything else just ends the gesture.
    pub fn pointer_up(&mut self, layout: &ChartLayout, x: f64, y: f64) -> Option<ViewCommand> {
        let state = std::mem::replace(&mut self.state, GestureState::Idle);
        match state {
            GestureState::Selecting { start, .. } if layout.region_at(x, y) == Region::Plot => {
                Some(ViewCommand::SelectRange {
                    from: start,
                    to: layout.to_plot(x, y),
                })
            }
            _ => None,
        }
    }

    /// Wheel turned at widget position (`x`, `y`); positive `delta_y` zooms
    /// out.
    pub fn wheel(
        &self,
        layout: &ChartLayout,
        mapper: &ViewportMapper,
        x: f64,
        y: f64,
        delta_y: f64,
    ) -> Option<ViewCommand> {
        let pick = |(out, inward): (f64, f64)| if delta_y > 0.0 { out } else { inward };
        let p = layout.to_plot(x, y);
        match layout.region_at(x, y) {
            Region::LevelAxis => Some(ViewCommand::Zoom {
                anchor: mapper.pixel_to_value(self.vertical, p.y),
                scale: pick(VERTICAL_ZOOM),
                axis: self.vertical,
            }),
            Region::Plot | Region::FreqAxis => Some(ViewCommand::Zoom {
                anchor: mapper.pixel_to_value(Axis::Freq, p.x),
                scale: pick(FREQ_ZOOM),
                axis: Axis::Freq,
            }),
            Region::Scrollbar | Region::Outside => None,
        }
    }
}
