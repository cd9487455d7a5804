//! Frequency markers and horizontal level lines.

use serde::{Deserialize, Serialize};

use crate::color::Rgba;
use crate::viewport::{PixelPoint, ViewportMapper, WorldPoint};

/// Default marker line color.
pub const DEFAULT_MARKER_LINE_COLOR: Rgba = Rgba::rgb(0xf5, 0x05, 0x05);

/// A named frequency marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub name: String,
    /// Hz.
    pub freq: f64,
    /// Pinned level; when unset the marker follows the display frame.
    pub level: Option<f64>,
}

/// A marker resolved against the current display frame and viewport.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerReading {
    pub name: String,
    pub freq: f64,
    pub pinned_level: Option<f64>,
    /// Display frame value at the marker's bin.
    pub measured_level: Option<f32>,
    /// Tip position in plot pixels, when a level is known.
    pub pixel: Option<PixelPoint>,
}

impl MarkerReading {
    /// Pinned level if set, otherwise the measured one.
    pub fn level(&self) -> Option<f64> {
        self.pinned_level
            .or(self.measured_level.map(f64::from))
    }
}

/// Markers in insertion order with `marker{n}` auto-naming.
#[derive(Debug, Clone)]
pub struct MarkerSet {
    markers: Vec<Marker>,
    next_id: usize,
}

impl Default for MarkerSet {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkerSet {
    pub fn new() -> Self {
        Self {
            markers: Vec::new(),
            next_id: 1,
        }
    }

    /// Add a marker with a generated name and return the name.
    pub fn add(&mut self, freq: f64, level: Option<f64>) -> String {
        let name = loop {
            let candidate = format!("marker{}", self.next_id);
            self.next_id += 1;
            if self.get(&candidate).is_none() {
                break candidate;
            }
        };
        self.markers.push(Marker {
            name: name.clone(),
            freq,
            level,
        });
        name
    }

    /// Add or replace a marker under `name`.
    pub fn insert(&mut self, marker: Marker) {
        match self.markers.iter_mut().find(|m| m.name == marker.name) {
            Some(existing) => *existing = marker,
            None => self.markers.push(marker),
        }
    }

    /// Move an existing marker. Returns `false` if `name` is unknown.
    pub fn set(&mut self, name: &str, freq: f64, level: Option<f64>) -> bool {
        match self.markers.iter_mut().find(|m| m.name == name) {
            Some(marker) => {
                marker.freq = freq;
                marker.level = level;
                true
            }
            None => false,
        }
    }

    pub fn get(&self, name: &str) -> Option<&Marker> {
        self.markers.iter().find(|m| m.name == name)
    }

    pub fn remove(&mut self, name: &str) -> Option<Marker> {
        let index = self.markers.iter().position(|m| m.name == name)?;
        Some(self.markers.remove(index))
    }

    pub fn clear(&mut self) {
        self.markers.clear();
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Marker> {
        self.markers.iter()
    }

    /// Resolve every marker against `display` and `mapper`.
    pub fn readings(&self, display: Option<&[f32]>, mapper: &ViewportMapper) -> Vec<MarkerReading> {
        let data = mapper.data_space().freq;
        self.markers
            .iter()
            .map(|marker| {
                let measured_level = display.and_then(|frame| {
                    let index = (data.fraction(marker.freq) * frame.len() as f64).round();
                    let last = frame.len().checked_sub(1)?;
                    Some(frame[(index.max(0.0) as usize).min(last)])
                });
                let mut reading = MarkerReading {
                    name: marker.name.clone(),
                    freq: marker.freq,
                    pinned_level: marker.level,
                    measured_level,
                    pixel: None,
                };
                reading.pixel = reading.level().map(|level| {
                    mapper.world_to_pixel(WorldPoint {
                        freq: marker.freq,
                        level,
                        time: 0.0,
                    })
                });
                reading
            })
            .collect()
    }
}

/// A named horizontal line at a fixed level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerLine {
    pub name: String,
    /// dB.
    pub level: f64,
    pub color: Rgba,
}

impl MarkerLine {
    pub fn new(name: impl Into<String>, level: f64) -> Self {
        Self {
            name: name.into(),
            level,
            color: DEFAULT_MARKER_LINE_COLOR,
        }
    }

    pub fn with_color(mut self, color: Rgba) -> Self {
        self.color = color;
        self
    }
}
