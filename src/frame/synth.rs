//! Synthetic spectrum generation for testing.
//!
//! Generates deterministic frames (noise floors, tones, sweeps) for unit and
//! integration tests, benchmarks and demos.

use super::Frame;

/// Generate a frame where every bin holds `level`.
pub fn constant_frame(len: usize, level: f32, timestamp_ms: i64) -> Frame {
    Frame::new(timestamp_ms, vec![level; len])
}

/// Generate a noise floor around `level` with +/- `jitter` dB of variation.
///
/// Uses a simple linear congruential generator for reproducibility.
pub fn noise_floor(len: usize, level: f32, jitter: f32, seed: u64) -> Vec<f32> {
    let mut state = seed;
    let a: u64 = 6364136223846793005;
    let c: u64 = 1442695040888963407;

    (0..len)
        .map(|_| {
            state = state.wrapping_mul(a).wrapping_add(c);
            let normalized = (state as f32 / u64::MAX as f32) * 2.0 - 1.0;
            level + jitter * normalized
        })
        .collect()
}

/// Add a tone to `samples`: a peak of `peak_level` at `center_bin` falling off
/// linearly over `half_width` bins on each side.
pub fn add_tone(samples: &mut [f32], center_bin: usize, half_width: usize, peak_level: f32) {
    let half_width = half_width.max(1);
    let start = center_bin.saturating_sub(half_width);
    let end = (center_bin + half_width).min(samples.len().saturating_sub(1));
    for (bin, sample) in samples.iter_mut().enumerate().take(end + 1).skip(start) {
        let distance = bin.abs_diff(center_bin) as f32 / half_width as f32;
        let level = peak_level - distance * (peak_level - *sample).max(0.0);
        *sample = sample.max(level);
    }
}

/// Generate a noisy frame with one tone.
pub fn tone_frame(
    len: usize,
    floor: f32,
    center_bin: usize,
    peak_level: f32,
    seed: u64,
    timestamp_ms: i64,
) -> Frame {
    let mut samples = noise_floor(len, floor, 3.0, seed);
    add_tone(&mut samples, center_bin, (len / 100).max(1), peak_level);
    Frame::new(timestamp_ms, samples)
}

/// Generate `count` frames with a tone sweeping from the lowest to the highest
/// bin, one frame every `interval_ms`.
pub fn sweep(
    len: usize,
    count: usize,
    floor: f32,
    peak_level: f32,
    interval_ms: i64,
) -> Vec<Frame> {
    (0..count)
        .map(|i| {
            let center = if count > 1 {
                i * (len.saturating_sub(1)) / (count - 1)
            } else {
                0
            };
            tone_frame(len, floor, center, peak_level, i as u64, i as i64 * interval_ms)
        })
        .collect()
}

/// Linear ramp of levels from `low` (first bin) to `high` (last bin).
pub fn ramp(len: usize, low: f32, high: f32) -> Vec<f32> {
    if len <= 1 {
        return vec![low; len];
    }
    (0..len)
        .map(|i| low + (high - low) * i as f32 / (len - 1) as f32)
        .collect()
}
