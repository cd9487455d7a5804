//! Chart controllers.
//!
//! This module provides:
//! - `SpectrumView`: line-plot controller (keep modes, markers, peak readout)
//! - `WaterfallView`: spectrogram controller (colorized rows in a tiled buffer)
//! - A gesture interpreter that turns pointer and wheel input into view changes
//! - `SyncGroup`: keeps the frequency/level views of several charts aligned

pub mod interaction;
pub mod markers;
pub mod spectrum;
pub mod sync;
pub mod waterfall;

pub use interaction::{GestureState, Interaction, ViewCommand};
pub use markers::{Marker, MarkerLine, MarkerReading, MarkerSet};
pub use spectrum::SpectrumView;
pub use sync::{ChartView, MemberId, SyncGroup};
pub use waterfall::{BlitRequest, WaterfallView};

use crate::color::ColorError;
use crate::config::ConfigError;
use crate::frame::AggregatorError;
use crate::raster::RasterError;
use crate::viewport::{Axis, ViewportError};

/// Errors raised by chart controllers.
#[derive(Debug, thiserror::Error)]
pub enum ChartError {
    #[error("Aggregator error: {0}")]
    Aggregator(#[from] AggregatorError),
    #[error("Color error: {0}")]
    Color(#[from] ColorError),
    #[error("Raster error: {0}")]
    Raster(#[from] RasterError),
    #[error("Viewport error: {0}")]
    Viewport(#[from] ViewportError),
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    #[error("Unknown marker: {0}")]
    UnknownMarker(String),
}

/// A view mutation that synchronized charts replay on each other.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewChange {
    /// Full frequency span changed.
    DataFreqRange { start: f64, end: f64 },
    ViewFreqRange { start: f64, end: f64 },
    ViewLevelRange { low: f64, high: f64 },
}

/// Whether a mutation should be reported to synchronized peers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Broadcast {
    Emit,
    /// Applied on behalf of a peer; must not be re-broadcast.
    Suppress,
}

/// A chart whose view can be kept in step with other charts.
///
/// Local mutations queue `ViewChange`s that the coordinator drains with
/// `take_changes` and replays on every other member with
/// `Broadcast::Suppress`. Only the latest change of each kind is kept
/// between drains.
pub trait ViewSync {
    fn apply_change(&mut self, change: &ViewChange, broadcast: Broadcast) -> Result<(), ChartError>;

    /// Drain changes queued since the last call.
    fn take_changes(&mut self) -> Vec<ViewChange>;
}

/// Pending outgoing view changes, at most one per kind.
///
/// A newer change replaces the queued one of the same kind and moves to the
/// back, so a chart that is never drained holds at most three entries.
#[derive(Debug, Clone, Default)]
pub(crate) struct ChangeQueue {
    changes: Vec<ViewChange>,
}

impl ChangeQueue {
    pub(crate) fn push(&mut self, change: ViewChange) {
        let kind = std::mem::discriminant(&change);
        self.changes.retain(|queued| std::mem::discriminant(queued) != kind);
        self.changes.push(change);
    }

    pub(crate) fn take(&mut self) -> Vec<ViewChange> {
        std::mem::take(&mut self.changes)
    }
}

/// The change that reports the current view on `axis`, if that axis is
/// synchronized.
pub(crate) fn view_change_for(view: &crate::viewport::ViewSpace, axis: Axis) -> Option<ViewChange> {
    match axis {
        Axis::Freq => Some(ViewChange::ViewFreqRange {
            start: view.freq.start,
            end: view.freq.end,
        }),
        Axis::Level => Some(ViewChange::ViewLevelRange {
            low: view.level.start,
            high: view.level.end,
        }),
        Axis::Time => None,
    }
}
