//! Precomputed gradient lookup tables.

use super::{ColorError, ColorStop, Rgba};

/// A gradient sampled into `steps` evenly spaced RGBA entries.
///
/// Indexing clamps instead of failing: level transients routinely leave the
/// configured dynamic range and are shown pinned at the extreme color.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorLookupTable {
    table: Vec<Rgba>,
}

impl ColorLookupTable {
    /// Sample the piecewise-linear gradient through `stops` (sorted by
    /// position) at `steps` evenly spaced points.
    pub fn build(stops: &[ColorStop], steps: usize) -> Result<Self, ColorError> {
        if stops.len() < 2 {
            return Err(ColorError::TooFewStops(stops.len()));
        }
        if steps == 0 {
            return Err(ColorError::ZeroSteps);
        }
        if let Some(bad) = stops
            .iter()
            .find(|s| !(0.0..=1.0).contains(&s.position))
        {
            return Err(ColorError::InvalidStopPosition(bad.position));
        }

        let mut sorted = stops.to_vec();
        sorted.sort_by(|a, b| a.position.total_cmp(&b.position));

        let table = (0..steps)
            .map(|i| {
                let t = if steps == 1 {
                    0.0
                } else {
                    i as f32 / (steps - 1) as f32
                };
                sample_gradient(&sorted, t)
            })
            .collect();

        Ok(Self { table })
    }

    /// Entry at `index`, clamped to `[0, steps - 1]`.
    #[inline]
    pub fn lookup(&self, index: isize) -> Rgba {
        let last = self.table.len() as isize - 1;
        self.table[index.clamp(0, last) as usize]
    }

    pub fn steps(&self) -> usize {
        self.table.len()
    }

    pub fn entries(&self) -> &[Rgba] {
        &self.table
    }
}

/// Color at `t` on a gradient whose stops are sorted by position.
fn sample_gradient(sorted: &[ColorStop], t: f32) -> Rgba {
    let first = sorted[0];
    let last = sorted[sorted.len() - 1];
    if t <= first.position {
        return first.color;
    }
    if t >= last.position {
        return last.color;
    }

    for pair in sorted.windows(2) {
        let (lo, hi) = (pair[0], pair[1]);
        if t >= lo.position && t < hi.position {
            let local = (t - lo.position) / (hi.position - lo.position);
            return lo.color.lerp(hi.color, local);
        }
    }
    last.color
}

/// Maps level values inside a dynamic range onto a lookup table.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelColorizer {
    table: ColorLookupTable,
    min_level: f32,
    max_level: f32,
}

impl LevelColorizer {
    pub fn new(table: ColorLookupTable, min_level: f32, max_level: f32) -> Self {
        Self {
            table,
            min_level,
            max_level,
        }
    }

    /// Table index for `level`; may fall outside the table and is clamped on
    /// lookup. NaN maps to 0.
    #[inline]
    pub fn index_for(&self, level: f32) -> isize {
        let span = self.max_level - self.min_level;
        if span.is_nan() || span <= 0.0 {
            return 0;
        }
        let t = (level - self.min_level) / span;
        // `as` saturates and maps NaN to 0
        (t * (self.table.steps() - 1) as f32).round() as isize
    }

    #[inline]
    pub fn color(&self, level: f32) -> Rgba {
        self.table.lookup(self.index_for(level))
    }

    /// Colorize a display frame into `out`, replacing its contents.
    pub fn colorize_into(&self, levels: &[f32], out: &mut Vec<Rgba>) {
        out.clear();
        out.extend(levels.iter().map(|&level| self.color(level)));
    }

    pub fn set_range(&mut self, min_level: f32, max_level: f32) {
        self.min_level = min_level;
        self.max_level = max_level;
    }

    pub fn set_table(&mut self, table: ColorLookupTable) {
        self.table = table;
    }

    pub fn range(&self) -> (f32, f32) {
        (self.min_level, self.max_level)
    }

    pub fn table(&self) -> &ColorLookupTable {
        &self.table
    }
}
