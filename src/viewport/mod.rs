//! Coordinate mapping between pixels, bins and physical units.
//!
//! This module provides:
//! - `DataSpace` / `ViewSpace`: full dataset bounds vs. the visible sub-range
//! - `ViewportMapper`: bidirectional transforms and the pan/zoom state machine
//! - Axis tick generation for grid and label rendering
//! - `ChartLayout`: axis margins, hit regions and the scrollbar thumb

pub mod layout;
pub mod mapper;
pub mod ticks;

pub use layout::{ChartLayout, Region};
pub use mapper::{SelectionPolicy, ViewportMapper};
pub use ticks::{axis_ticks, nice_interval, Tick};

use serde::{Deserialize, Serialize};

/// Errors raised by viewport operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ViewportError {
    #[error("Invalid {axis} range [{start}, {end}]")]
    Range { axis: Axis, start: f64, end: f64 },
    #[error("Surface must have non-zero width and height, got {width}x{height}")]
    EmptySurface { width: usize, height: usize },
    #[error("Zoom factor must be positive and finite, got {0}")]
    InvalidScale(f64),
}

/// A chart axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    /// Horizontal, Hz.
    Freq,
    /// Vertical on spectrum plots, dB.
    Level,
    /// Vertical on waterfalls, history rows (0 = newest).
    Time,
}

impl Axis {
    pub fn name(&self) -> &'static str {
        match self {
            Axis::Freq => "frequency",
            Axis::Level => "level",
            Axis::Time => "time",
        }
    }

    pub fn all() -> &'static [Axis] {
        &[Axis::Freq, Axis::Level, Axis::Time]
    }
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A closed-open interval on one axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisRange {
    pub start: f64,
    pub end: f64,
}

impl AxisRange {
    pub const fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    pub fn span(&self) -> f64 {
        self.end - self.start
    }

    /// Non-empty with finite bounds.
    pub fn is_valid(&self) -> bool {
        self.start.is_finite() && self.end.is_finite() && self.end > self.start
    }

    /// Whether `other` lies inside this range.
    pub fn encloses(&self, other: &AxisRange) -> bool {
        other.start >= self.start && other.end <= self.end
    }

    /// Fraction of the way from `start` to `end`.
    pub fn fraction(&self, value: f64) -> f64 {
        (value - self.start) / self.span()
    }

    pub fn at_fraction(&self, t: f64) -> f64 {
        self.start + t * self.span()
    }

    /// Shift by `delta`, keeping the span and pinning against `bounds`.
    pub fn shifted_within(&self, delta: f64, bounds: &AxisRange) -> AxisRange {
        let span = self.span();
        if span >= bounds.span() {
            return *bounds;
        }
        let start = (self.start + delta).clamp(bounds.start, bounds.end - span);
        AxisRange::new(start, (start + span).min(bounds.end))
    }

    /// Clamp each bound independently to `bounds`.
    pub fn clamped_to(&self, bounds: &AxisRange) -> AxisRange {
        AxisRange::new(
            self.start.max(bounds.start),
            self.end.min(bounds.end),
        )
    }
}

/// Full bounds of the dataset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DataSpace {
    pub freq: AxisRange,
    pub level: AxisRange,
    pub time: AxisRange,
}

/// The currently visible sub-range of a `DataSpace`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewSpace {
    pub freq: AxisRange,
    pub level: AxisRange,
    pub time: AxisRange,
}

macro_rules! axis_accessors {
    ($ty:ty) => {
        impl $ty {
            pub fn axis(&self, axis: Axis) -> AxisRange {
                match axis {
                    Axis::Freq => self.freq,
                    Axis::Level => self.level,
                    Axis::Time => self.time,
                }
            }

            fn axis_mut(&mut self, axis: Axis) -> &mut AxisRange {
                match axis {
                    Axis::Freq => &mut self.freq,
                    Axis::Level => &mut self.level,
                    Axis::Time => &mut self.time,
                }
            }
        }
    };
}

axis_accessors!(DataSpace);
axis_accessors!(ViewSpace);

impl From<DataSpace> for ViewSpace {
    fn from(data: DataSpace) -> Self {
        Self {
            freq: data.freq,
            level: data.level,
            time: data.time,
        }
    }
}

/// Pixel dimensions of a plot area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurfaceSize {
    pub width: usize,
    pub height: usize,
}

impl SurfaceSize {
    pub const fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Pixel extent along `axis`.
    pub fn extent(&self, axis: Axis) -> usize {
        match axis {
            Axis::Freq => self.width,
            Axis::Level | Axis::Time => self.height,
        }
    }
}

/// A point in physical units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldPoint {
    pub freq: f64,
    pub level: f64,
    /// History rows back from the newest frame.
    pub time: f64,
}

/// A point in plot-area pixels, origin top-left.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PixelPoint {
    pub x: f64,
    pub y: f64,
}

impl PixelPoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}
