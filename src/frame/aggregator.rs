//! Keep-mode reduction of a frame stream.
//!
//! The aggregator owns a bounded history of raw frames and reduces the stream
//! into one display frame per ingested frame:
//! - CLEAN: the latest frame
//! - MAX / MIN: per-bin hold since the last reset
//! - AVG: per-bin mean of the frames currently in history

use super::history::HistoryRing;
use super::{Frame, KeepMode};

/// Errors raised by the frame aggregator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AggregatorError {
    #[error("Frame length mismatch: configured for {expected} bins but got {got}")]
    ShapeMismatch { expected: usize, got: usize },
    #[error("Frame length must be greater than zero")]
    ZeroFrameLength,
    #[error("Cache count must be greater than zero")]
    ZeroCacheCount,
}

/// Windowed data reduction for a live frame stream.
#[derive(Debug, Clone)]
pub struct FrameAggregator {
    frame_length: usize,
    cache_count: usize,
    keep_mode: KeepMode,
    history: HistoryRing<Frame>,
    /// MAX/MIN hold values.
    keep: Vec<f32>,
    /// Elementwise sum of the finite samples in `history`.
    sum: Vec<f64>,
    /// Per-bin count of non-finite samples in `history`.
    non_finite: Vec<u32>,
    /// AVG output buffer.
    mean: Vec<f32>,
}

impl FrameAggregator {
    /// Create an aggregator for frames of `frame_length` bins.
    pub fn new(
        frame_length: usize,
        keep_mode: KeepMode,
        cache_count: usize,
    ) -> Result<Self, AggregatorError> {
        validate(frame_length, cache_count)?;
        let mut aggregator = Self {
            frame_length,
            cache_count,
            keep_mode,
            history: HistoryRing::with_capacity(cache_count),
            keep: Vec::new(),
            sum: Vec::new(),
            non_finite: Vec::new(),
            mean: Vec::new(),
        };
        aggregator.reset();
        Ok(aggregator)
    }

    /// Reallocate every buffer for a new frame shape and clear history.
    ///
    /// On error the previous configuration is left untouched.
    pub fn configure(
        &mut self,
        frame_length: usize,
        keep_mode: KeepMode,
        cache_count: usize,
    ) -> Result<(), AggregatorError> {
        validate(frame_length, cache_count)?;
        log::debug!(
            "Configuring aggregator: {} bins, {:?}, history depth {}",
            frame_length,
            keep_mode,
            cache_count
        );
        self.frame_length = frame_length;
        self.keep_mode = keep_mode;
        if cache_count != self.cache_count {
            self.cache_count = cache_count;
            self.history = HistoryRing::with_capacity(cache_count);
        }
        self.reset();
        Ok(())
    }

    /// Switch keep mode. Accumulators and history are cleared so state from
    /// the previous mode never leaks into the new one.
    pub fn set_keep_mode(&mut self, mode: KeepMode) {
        self.keep_mode = mode;
        self.reset();
    }

    /// Clear history and accumulators, keeping the current shape and mode.
    pub fn reset(&mut self) {
        let fill = match self.keep_mode {
            KeepMode::Max => f32::MIN,
            KeepMode::Min => f32::MAX,
            KeepMode::Clean | KeepMode::Avg => 0.0,
        };
        self.history.clear();
        self.keep.clear();
        self.keep.resize(self.frame_length, fill);
        self.sum.clear();
        self.sum.resize(self.frame_length, 0.0);
        self.non_finite.clear();
        self.non_finite.resize(self.frame_length, 0);
        self.mean.clear();
        self.mean.resize(self.frame_length, 0.0);
    }

    /// Push `frame` into history and return the frame to display.
    ///
    /// The returned slice borrows the aggregator and is valid until the next
    /// mutation. In CLEAN mode it is the ingested frame itself.
    pub fn ingest(&mut self, frame: Frame) -> Result<&[f32], AggregatorError> {
        if frame.len() != self.frame_length {
            return Err(AggregatorError::ShapeMismatch {
                expected: self.frame_length,
                got: frame.len(),
            });
        }

        match self.keep_mode {
            KeepMode::Clean => {
                self.history.push(frame);
            }
            KeepMode::Max => {
                for (held, &sample) in self.keep.iter_mut().zip(&frame.samples) {
                    *held = held.max(sample);
                }
                self.history.push(frame);
            }
            KeepMode::Min => {
                for (held, &sample) in self.keep.iter_mut().zip(&frame.samples) {
                    *held = held.min(sample);
                }
                self.history.push(frame);
            }
            KeepMode::Avg => {
                self.accumulate(&frame.samples, 1.0);
                if let Some(evicted) = self.history.push(frame) {
                    self.accumulate(&evicted.samples, -1.0);
                }
                self.update_mean();
            }
        }

        Ok(self.current())
    }

    /// Add (`sign` 1) or remove (`sign` -1) one frame from the running sum.
    /// Non-finite samples are counted instead of summed so that removing them
    /// later cannot leave NaN behind.
    fn accumulate(&mut self, samples: &[f32], sign: f64) {
        let bins = self.sum.iter_mut().zip(self.non_finite.iter_mut());
        for ((total, bad), &sample) in bins.zip(samples) {
            if sample.is_finite() {
                *total += sign * sample as f64;
            } else if sign > 0.0 {
                *bad += 1;
            } else {
                *bad = bad.saturating_sub(1);
            }
        }
    }

    fn update_mean(&mut self) {
        let count = self.history.len() as f64;
        for (bin, out) in self.mean.iter_mut().enumerate() {
            let total = if self.non_finite[bin] == 0 {
                self.sum[bin]
            } else {
                // Fold directly so inf and NaN propagate as in a plain mean
                self.history.iter().map(|f| f.samples[bin] as f64).sum()
            };
            *out = (total / count) as f32;
        }
    }

    /// The display frame produced by the last `ingest`, if any frame has been
    /// ingested since the last reset.
    pub fn display(&self) -> Option<&[f32]> {
        if self.history.is_empty() {
            None
        } else {
            Some(self.current())
        }
    }

    fn current(&self) -> &[f32] {
        match self.keep_mode {
            KeepMode::Clean => self
                .history
                .newest()
                .map(|frame| frame.samples.as_slice())
                .unwrap_or_default(),
            KeepMode::Max | KeepMode::Min => &self.keep,
            KeepMode::Avg => &self.mean,
        }
    }

    pub fn frame_length(&self) -> usize {
        self.frame_length
    }

    pub fn cache_count(&self) -> usize {
        self.cache_count
    }

    pub fn keep_mode(&self) -> KeepMode {
        self.keep_mode
    }

    /// Raw frames currently retained, oldest first.
    pub fn history(&self) -> &HistoryRing<Frame> {
        &self.history
    }

    /// Per-bin sum of the finite samples in the retained frames (maintained
    /// in AVG mode).
    pub fn running_sum(&self) -> &[f64] {
        &self.sum
    }

    /// MAX/MIN hold values.
    pub fn hold(&self) -> &[f32] {
        &self.keep
    }
}

fn validate(frame_length: usize, cache_count: usize) -> Result<(), AggregatorError> {
    if frame_length == 0 {
        return Err(AggregatorError::ZeroFrameLength);
    }
    if cache_count == 0 {
        return Err(AggregatorError::ZeroCacheCount);
    }
    Ok(())
}
