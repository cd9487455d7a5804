//! Specview Core
//!
//! Streaming visualization engine for live spectrum data: single-line spectrum
//! plots and scrolling waterfalls with interactive pan and zoom.
//!
//! # Features
//!
//! - Keep-mode reduction (CLEAN, MAX, MIN, AVG) over a bounded frame history
//! - Precomputed color lookup tables with clamped level mapping
//! - Tiled pixel buffers for waterfalls wider than a single surface allows
//! - Pixel/bin/physical-unit coordinate mapping with a pan/zoom state machine
//! - Markers, axis ticks, hit testing and gesture interpretation
//! - Explicit cross-chart view synchronization
//! - PNG snapshot export via `image`
//!
//! The engine never draws on screen itself. A rendering backend feeds it
//! frames and input events and reads back display frames, colorized rows and
//! blit requests.

pub mod chart;
pub mod color;
pub mod config;
pub mod frame;
pub mod raster;
pub mod viewport;

// Re-export commonly used types
pub use chart::{
    Broadcast, ChartError, ChartView, Interaction, Marker, MarkerLine, MarkerReading, MemberId,
    SpectrumView, SyncGroup, ViewChange, ViewCommand, ViewSync, WaterfallView,
};
pub use color::{ColorError, ColorLookupTable, ColorStop, LevelColorizer, Rgba};
pub use config::{ChartColors, ChartConfig, ConfigError};
pub use frame::{AggregatorError, Frame, FrameAggregator, HistoryRing, KeepMode};
pub use raster::{PixelSurface, RasterError, RgbaSurface, SourceRect, TiledPixelBuffer};
pub use viewport::{
    Axis, AxisRange, ChartLayout, DataSpace, PixelPoint, Region, SelectionPolicy, SurfaceSize,
    ViewSpace, ViewportError, ViewportMapper, WorldPoint,
};
