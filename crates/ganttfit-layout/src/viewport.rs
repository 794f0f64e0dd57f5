//! Viewport fitting.
//!
//! The external widget always renders its full configured date range, which
//! leaves long empty runways either side of the bars. Fitting computes a
//! crop window that starts just before the first bar and ends just after the
//! last one, trims dead whitespace below the rows, and on narrow screens
//! constrains the rendered pixel width so the chart stays swipeable.

use tracing::debug;

use crate::ChartGeometry;

/// The widget lays months out on a fixed 30-day grid regardless of the
/// calendar month under the cursor.
pub const DAYS_PER_MONTH: f64 = 30.0;

// ===== Configuration =====

/// Tuning knobs for [`fit_viewport`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitConfig {
    /// Pad left of the first bar, as a fraction of one month's width.
    pub left_pad_months: f64,
    /// Pad right of the last bar or label, as a fraction of one month.
    pub right_pad_months: f64,
    /// Fixed pad below the lowest bar, in pixels.
    pub bottom_pad_px: f64,
    /// Windows closer than this to the previous one count as unchanged.
    pub epsilon: f64,
    /// Rendered pixel width clamp applied on narrow viewports.
    pub narrow_width_range: (f64, f64),
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            left_pad_months: 0.12,
            right_pad_months: 0.06,
            bottom_pad_px: 8.0,
            epsilon: 0.5,
            narrow_width_range: (260.0, 340.0),
        }
    }
}

// ===== Output =====

/// A computed crop window for the chart's `viewBox`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportWindow {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// CSS pixel width to force on narrow viewports, already clamped into
    /// the configured range.
    pub pixel_width: f64,
}

impl ViewportWindow {
    /// The window formatted as an SVG `viewBox` attribute value.
    #[must_use]
    pub fn view_box(&self) -> String {
        format!(
            "{:.2} {:.2} {:.2} {:.2}",
            self.x, self.y, self.width, self.height
        )
    }

    /// Whether applying this window over `previous` would visibly move
    /// anything. A `None` previous always differs.
    #[must_use]
    pub fn differs_from(&self, previous: Option<&Self>, epsilon: f64) -> bool {
        match previous {
            None => true,
            Some(p) => {
                (self.x - p.x).abs() > epsilon
                    || (self.y - p.y).abs() > epsilon
                    || (self.width - p.width).abs() > epsilon
                    || (self.height - p.height).abs() > epsilon
            }
        }
    }
}

// ===== Fitting =====

/// Horizontal scale of the rendered chart in pixels per day.
///
/// Derived from the median gap between adjacent date-header ticks, which
/// rides out the odd misplaced tick. With fewer than two ticks the
/// configured column width stands in.
#[must_use]
pub fn px_per_day(geometry: &ChartGeometry) -> f64 {
    let mut gaps: Vec<f64> = geometry
        .tick_xs
        .windows(2)
        .map(|w| w[1] - w[0])
        .filter(|g| *g > 0.0)
        .collect();
    if gaps.is_empty() {
        return geometry.column_width / DAYS_PER_MONTH;
    }
    gaps.sort_by(|a, b| a.total_cmp(b));
    let median = gaps[gaps.len() / 2];
    median / DAYS_PER_MONTH
}

/// Compute the crop window for a rendered chart.
///
/// The right bound tracks the rightmost bar or label edge, so a label
/// overhanging the last bar is kept inside the crop rather than cut off.
/// Returns `None` when there is nothing usable to fit: no bars, or a
/// degenerate span that would produce a non-positive width or height.
#[must_use]
pub fn fit_viewport(geometry: &ChartGeometry, config: &FitConfig) -> Option<ViewportWindow> {
    let first = geometry.bars.first()?;
    let mut min_x = first.x;
    let mut max_x = first.right();
    let mut max_y = first.bottom();
    for bar in &geometry.bars[1..] {
        min_x = min_x.min(bar.x);
        max_x = max_x.max(bar.right());
        max_y = max_y.max(bar.bottom());
    }
    for label in &geometry.labels {
        max_x = max_x.max(label.right());
    }

    let month_px = px_per_day(geometry) * DAYS_PER_MONTH;
    let x = (min_x - config.left_pad_months * month_px).max(0.0);
    let width = (max_x + config.right_pad_months * month_px) - x;

    let y = 0.0;
    let height = max_y.max(geometry.header_height) + config.bottom_pad_px;

    if width <= 0.0 || height <= 0.0 {
        debug!(width, height, "degenerate fit span, leaving chart as rendered");
        return None;
    }

    let (narrow_min, narrow_max) = config.narrow_width_range;
    Some(ViewportWindow {
        x,
        y,
        width,
        height,
        pixel_width: width.clamp(narrow_min, narrow_max),
    })
}
