//! Pure layout arithmetic for read-only Gantt charts.
//!
//! This crate owns the geometry side of chart fitting: cropping the SVG
//! viewport to the span of the task bars, clamping labels that overflow the
//! cropped edge, and placing the hover/tap popup. Nothing here touches the
//! DOM; callers harvest a [`ChartGeometry`] from the rendered chart, run it
//! through the fitters and write the results back themselves.
//!
//! ```
//! use ganttfit_layout::{fit_viewport, ChartGeometry, FitConfig, Rect};
//!
//! let geometry = ChartGeometry {
//!     bars: vec![Rect::new(120.0, 60.0, 350.0, 24.0)],
//!     labels: vec![Rect::new(126.0, 66.0, 150.0, 12.0)],
//!     tick_xs: vec![0.0, 350.0, 700.0],
//!     content: Rect::new(0.0, 0.0, 1400.0, 200.0),
//!     header_height: 50.0,
//!     column_width: 350.0,
//! };
//! let window = fit_viewport(&geometry, &FitConfig::default()).unwrap();
//! assert!(window.x >= 0.0);
//! assert!(window.width > 0.0);
//! ```

pub mod labels;
pub mod popup;
pub mod viewport;

pub use labels::{Anchor, ApproxMeasure, LabelFitter, LabelInput, LabelPlacement, TextMeasure};
pub use popup::{
    place_popup, PointerClass, PopupAction, PopupController, PopupLayout, PopupState,
};
pub use viewport::{fit_viewport, px_per_day, FitConfig, ViewportWindow};

use serde::{Deserialize, Serialize};

// ===== Geometry primitives =====

/// Axis-aligned rectangle in SVG user units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    #[must_use]
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[must_use]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }
}

/// Pixel data measured off a rendered chart.
///
/// All coordinates are in the SVG's user units, which match CSS pixels
/// until a viewport crop rescales the element.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChartGeometry {
    /// Bounding boxes of the task bars, in document order.
    pub bars: Vec<Rect>,
    /// Bounding boxes of the bar labels that could be measured. Labels
    /// overhang their bars, so the crop has to account for them too.
    pub labels: Vec<Rect>,
    /// X positions of the lower date-header ticks, ascending.
    pub tick_xs: Vec<f64>,
    /// Full drawn extent of the chart contents.
    pub content: Rect,
    /// Height of the date header band at the top of the chart.
    pub header_height: f64,
    /// Column width the chart was configured with, used as a scale
    /// fallback when too few ticks rendered.
    pub column_width: f64,
}
