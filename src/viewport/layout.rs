//! Widget layout and hit testing.
//!
//! A chart widget is split into a plot area, a level axis strip on the left,
//! a frequency axis strip along the bottom and a scrollbar under that:
//!
//! ```text
//! +------+--------------------------+
//! | lvl  |           plot           |
//! | axis |                          |
//! +------+--------------------------+
//! |      |        freq axis         |
//! |      |--------------------------|
//! |      |        scrollbar         |
//! +------+--------------------------+
//! ```

use super::{PixelPoint, SurfaceSize, ViewportMapper};

/// Which part of the widget a point falls in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    Plot,
    LevelAxis,
    FreqAxis,
    Scrollbar,
    Outside,
}

/// Pixel geometry of a chart widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartLayout {
    pub width: usize,
    pub height: usize,
    /// Width of the level axis strip.
    pub left_margin: usize,
    /// Height of the frequency axis strip, scrollbar included.
    pub bottom_margin: usize,
    pub scrollbar_height: usize,
}

impl ChartLayout {
    pub fn new(
        width: usize,
        height: usize,
        left_margin: usize,
        bottom_margin: usize,
        scrollbar_height: usize,
    ) -> Self {
        Self {
            width,
            height,
            left_margin,
            bottom_margin: bottom_margin.max(scrollbar_height),
            scrollbar_height,
        }
    }

    /// Size of the plot area.
    pub fn plot_size(&self) -> SurfaceSize {
        SurfaceSize::new(
            self.width.saturating_sub(self.left_margin),
            self.height.saturating_sub(self.bottom_margin),
        )
    }

    /// Classify a widget-space point.
    pub fn region_at(&self, x: f64, y: f64) -> Region {
        let left = self.left_margin as f64;
        let width = self.width as f64;
        let height = self.height as f64;
        let plot_bottom = height - self.bottom_margin as f64;
        let scroll_top = height - self.scrollbar_height as f64;

        if !(x >= 0.0 && x < width && y >= 0.0 && y < height) {
            return Region::Outside;
        }
        if x < left {
            return if y < plot_bottom {
                Region::LevelAxis
            } else {
                Region::Outside
            };
        }
        if y < plot_bottom {
            Region::Plot
        } else if y < scroll_top {
            Region::FreqAxis
        } else {
            Region::Scrollbar
        }
    }

    /// Convert a widget-space point to plot coordinates.
    pub fn to_plot(&self, x: f64, y: f64) -> PixelPoint {
        PixelPoint::new(x - self.left_margin as f64, y)
    }

    /// Horizontal extent `(left, right)` of the scrollbar thumb in widget
    /// pixels. The track spans the plot width and represents the full data
    /// frequency range.
    pub fn scrollbar_thumb(&self, mapper: &ViewportMapper) -> (f64, f64) {
        let data = mapper.data_space().freq;
        let view = mapper.view_space().freq;
        let track = self.plot_size().width as f64;
        let left = self.left_margin as f64;
        (
            left + data.fraction(view.start) * track,
            left + data.fraction(view.end) * track,
        )
    }
}
