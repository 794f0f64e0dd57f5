//! Label overflow handling.
//!
//! Bar labels sit to the right of their bar. Once the viewport is cropped,
//! labels near the right edge can spill outside the visible window. The
//! fitter flips those to end-anchored at the bar's left edge, and if even
//! that side is too tight it truncates the text to the longest prefix that
//! fits, with an ellipsis. Original positions and texts are cached on first
//! touch so a later, wider viewport restores them exactly.

use std::collections::HashMap;

use tracing::trace;

use crate::Rect;

/// Ellipsis appended to truncated labels.
const ELLIPSIS: &str = "\u{2026}";

// ===== Measurement seam =====

/// Text width oracle.
///
/// In the browser this is backed by `getComputedTextLength`; tests and
/// fallback paths use [`ApproxMeasure`].
pub trait TextMeasure {
    fn width(&self, text: &str) -> f64;
}

/// Fixed per-character estimate for when precise measurement is
/// unavailable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ApproxMeasure {
    pub px_per_char: f64,
}

impl Default for ApproxMeasure {
    fn default() -> Self {
        Self { px_per_char: 7.0 }
    }
}

impl TextMeasure for ApproxMeasure {
    fn width(&self, text: &str) -> f64 {
        let chars = text.chars().count();
        chars as f64 * self.px_per_char
    }
}

// ===== Placement =====

/// Horizontal text anchor, mirroring the SVG `text-anchor` values used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    Start,
    End,
}

/// One label as currently rendered.
#[derive(Debug, Clone, Copy)]
pub struct LabelInput<'a> {
    /// Stable key, the owning task's id.
    pub key: &'a str,
    /// Text currently displayed, possibly truncated by an earlier pass.
    pub text: &'a str,
    /// Current x attribute of the text element.
    pub x: f64,
    /// Bounding box of the label's bar.
    pub bar: Rect,
}

/// Where and how a label should be rendered.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelPlacement {
    pub key: String,
    pub text: String,
    pub anchor: Anchor,
    pub x: f64,
}

/// Fits labels into a viewport, remembering pristine values across passes.
#[derive(Debug, Default)]
pub struct LabelFitter {
    /// Original `(x, text)` per label key, captured the first time the
    /// label passes through the fitter.
    originals: HashMap<String, (f64, String)>,
    /// Gap between a bar edge and its label.
    gap: f64,
}

impl LabelFitter {
    #[must_use]
    pub fn new() -> Self {
        Self {
            originals: HashMap::new(),
            gap: 6.0,
        }
    }

    /// Place one label within `[viewport_left, viewport_right]`.
    ///
    /// Always works from the cached original, so feeding back a previously
    /// truncated label cannot truncate it further, and a viewport wide
    /// enough for the original restores it byte for byte.
    pub fn place(
        &mut self,
        input: &LabelInput<'_>,
        viewport_left: f64,
        viewport_right: f64,
        measure: &dyn TextMeasure,
    ) -> LabelPlacement {
        let (orig_x, orig_text) = self
            .originals
            .entry(input.key.to_owned())
            .or_insert_with(|| (input.x, input.text.to_owned()))
            .clone();

        let full_width = measure.width(&orig_text);
        if orig_x + full_width <= viewport_right {
            return LabelPlacement {
                key: input.key.to_owned(),
                text: orig_text,
                anchor: Anchor::Start,
                x: orig_x,
            };
        }

        // Flip to the left side of the bar, text ending at the bar edge.
        let anchor_x = input.bar.x - self.gap;
        if anchor_x - full_width >= viewport_left {
            return LabelPlacement {
                key: input.key.to_owned(),
                text: orig_text,
                anchor: Anchor::End,
                x: anchor_x,
            };
        }

        // Both sides are tight. Truncate to the span left of the bar.
        let span = anchor_x - viewport_left;
        let text = truncate_to_fit(&orig_text, span, measure);
        trace!(key = input.key, %text, span, "label truncated");
        LabelPlacement {
            key: input.key.to_owned(),
            text,
            anchor: Anchor::End,
            x: anchor_x,
        }
    }

    /// Forget cached originals, e.g. after the chart is rebuilt with new
    /// task data.
    pub fn reset(&mut self) {
        self.originals.clear();
    }
}

/// Longest prefix of `text` whose width plus an ellipsis stays within
/// `span`, found by binary search over the prefix length.
fn truncate_to_fit(text: &str, span: f64, measure: &dyn TextMeasure) -> String {
    let chars: Vec<char> = text.chars().collect();
    if measure.width(text) <= span {
        return text.to_owned();
    }

    let fits = |len: usize| -> bool {
        let candidate: String = chars[..len].iter().collect::<String>() + ELLIPSIS;
        measure.width(&candidate) <= span
    };

    let mut lo = 0usize;
    let mut hi = chars.len();
    while lo < hi {
        let mid = (lo + hi).div_ceil(2);
        if fits(mid) {
            lo = mid;
        } else {
            hi = mid - 1;
        }
    }

    if lo == 0 {
        ELLIPSIS.to_owned()
    } else {
        chars[..lo].iter().collect::<String>() + ELLIPSIS
    }
}
