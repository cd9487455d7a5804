//! Chart configuration.
//!
//! `ChartConfig` is a plain struct: every field has a documented default in
//! `ChartConfig::default()`, and fields missing from a JSON document resolve
//! to those defaults when it is deserialized.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::color::{default_stops, ColorError, ColorLookupTable, ColorStop, LevelColorizer, Rgba};
use crate::frame::KeepMode;
use crate::raster::MAX_TILE_WIDTH;
use crate::viewport::{ChartLayout, SelectionPolicy};

/// Errors raised while loading or validating a configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Palette for chart decorations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartColors {
    pub background: Rgba,
    pub grid: Rgba,
    pub axis: Rgba,
    pub label: Rgba,
    /// Spectrum trace.
    pub line: Rgba,
    /// Crosshair and marker lines.
    pub focus_line: Rgba,
}

impl Default for ChartColors {
    fn default() -> Self {
        Self {
            background: Rgba::rgb(0x00, 0x00, 0x00),
            grid: Rgba::rgb(0x55, 0x55, 0x55),
            axis: Rgba::WHITE,
            label: Rgba::WHITE,
            line: Rgba::rgb(0x3e, 0xd6, 0x30),
            focus_line: Rgba::rgb(0xf5, 0x05, 0x05),
        }
    }
}

/// Configuration shared by spectrum and waterfall charts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    /// Bins per frame.
    pub frame_length: usize,
    /// History depth, and waterfall height in rows.
    pub cache_count: usize,
    pub keep_mode: KeepMode,
    /// Full frequency span in Hz.
    pub data_freq_range: (f64, f64),
    /// Full level span in dB.
    pub data_level_range: (f64, f64),
    /// Gradient stops for the waterfall, lowest level first.
    pub color_stops: Vec<ColorStop>,
    /// Entries in the precomputed color table.
    pub color_steps: usize,
    /// Widget size in pixels, axes included.
    pub width: usize,
    pub height: usize,
    /// Level axis strip width.
    pub left_margin: usize,
    /// Frequency axis strip height, scrollbar included.
    pub bottom_margin: usize,
    pub scrollbar_height: usize,
    pub max_tile_width: usize,
    /// Reconfigure automatically when a frame of a new length arrives.
    pub auto_resize: bool,
    pub selection_policy: SelectionPolicy,
    pub colors: ChartColors,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            frame_length: 4800,
            cache_count: 500,
            keep_mode: KeepMode::Clean,
            data_freq_range: (0.0, 10_000.0),
            data_level_range: (-150.0, 30.0),
            color_stops: default_stops(),
            color_steps: 200,
            width: 850,
            height: 450,
            left_margin: 50,
            bottom_margin: 50,
            scrollbar_height: 15,
            max_tile_width: MAX_TILE_WIDTH,
            auto_resize: true,
            selection_policy: SelectionPolicy::OrderBounds,
            colors: ChartColors::default(),
        }
    }
}

impl ChartConfig {
    /// Parse and validate a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: ChartConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        log::debug!("Loading chart config from {}", path.as_ref().display());
        Self::from_json_str(&json)
    }

    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| Err(ConfigError::Invalid(msg));

        if self.frame_length == 0 {
            return invalid("frame_length must be greater than zero".into());
        }
        if self.cache_count == 0 {
            return invalid("cache_count must be greater than zero".into());
        }
        if self.color_steps == 0 {
            return invalid("color_steps must be greater than zero".into());
        }
        if self.max_tile_width == 0 {
            return invalid("max_tile_width must be greater than zero".into());
        }
        for (name, (start, end)) in [
            ("data_freq_range", self.data_freq_range),
            ("data_level_range", self.data_level_range),
        ] {
            if !(start.is_finite() && end.is_finite() && end > start) {
                return invalid(format!("{name} [{start}, {end}] is empty or not finite"));
            }
        }
        if self.color_stops.len() < 2 {
            return invalid(format!(
                "at least 2 color stops are required, got {}",
                self.color_stops.len()
            ));
        }
        if self.layout().plot_size().is_empty() {
            return invalid(format!(
                "{}x{} widget leaves no room for a plot inside its margins",
                self.width, self.height
            ));
        }
        Ok(())
    }

    /// Widget geometry.
    pub fn layout(&self) -> ChartLayout {
        ChartLayout::new(
            self.width,
            self.height,
            self.left_margin,
            self.bottom_margin,
            self.scrollbar_height,
        )
    }

    pub fn color_table(&self) -> Result<ColorLookupTable, ColorError> {
        ColorLookupTable::build(&self.color_stops, self.color_steps)
    }

    /// Colorizer over the configured level range.
    pub fn colorizer(&self) -> Result<LevelColorizer, ColorError> {
        let (min, max) = self.data_level_range;
        Ok(LevelColorizer::new(self.color_table()?, min as f32, max as f32))
    }
}
