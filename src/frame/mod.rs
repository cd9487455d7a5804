//! Spectrum frames and keep-mode aggregation.
//!
//! This module provides:
//! - The `Frame` type (one capture of per-bin magnitudes)
//! - A bounded history ring that reports evictions
//! - Keep-mode reduction (CLEAN/MAX/MIN/AVG) of a frame stream
//! - Deterministic synthetic spectra for tests and benchmarks

pub mod aggregator;
pub mod history;
pub mod synth;

pub use aggregator::{AggregatorError, FrameAggregator};
pub use history::{HistoryIter, HistoryRing};

use serde::{Deserialize, Serialize};

/// One capture of magnitude-per-bin samples (typically dBm).
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// Capture time in milliseconds since the Unix epoch.
    pub timestamp_ms: i64,
    /// Bin magnitudes, lowest frequency first.
    pub samples: Vec<f32>,
}

impl Frame {
    pub fn new(timestamp_ms: i64, samples: Vec<f32>) -> Self {
        Self {
            timestamp_ms,
            samples,
        }
    }

    /// Number of bins in the frame.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// How successive frames combine into the displayed frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum KeepMode {
    /// Display the latest frame unmodified.
    #[default]
    Clean,
    /// Per-bin maximum since the last reset.
    Max,
    /// Per-bin minimum since the last reset.
    Min,
    /// Per-bin mean over the frames currently held in history.
    Avg,
}

impl KeepMode {
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "clean" | "clear" | "refresh" => Some(Self::Clean),
            "max" | "max-hold" | "maxhold" => Some(Self::Max),
            "min" | "min-hold" | "minhold" => Some(Self::Min),
            "avg" | "average" | "mean" => Some(Self::Avg),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Clean => "clean",
            Self::Max => "max",
            Self::Min => "min",
            Self::Avg => "avg",
        }
    }

    pub fn all() -> &'static [Self] {
        &[Self::Clean, Self::Max, Self::Min, Self::Avg]
    }
}
