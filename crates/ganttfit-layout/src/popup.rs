//! Popup state machine and placement.
//!
//! The chart widget's own popup handling is bypassed entirely. This module
//! decides when a popup should open or close from hover and tap events, and
//! where the popup box goes relative to its bar. The adapter feeds it events
//! and applies the returned actions to the DOM.

use crate::Rect;

// ===== Device classification =====

/// How the current device points at things.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerClass {
    /// Mouse or trackpad, popups follow hover.
    Fine,
    /// Touch, popups toggle on tap.
    Coarse,
}

impl PointerClass {
    /// Classify from the `(pointer: coarse)` media query and the viewport
    /// width breakpoint. Either signal alone is enough to treat the device
    /// as touch-first.
    #[must_use]
    pub fn classify(coarse_pointer_mq: bool, viewport_width: f64) -> Self {
        if coarse_pointer_mq || viewport_width < 600.0 {
            Self::Coarse
        } else {
            Self::Fine
        }
    }
}

// ===== State machine =====

/// Current popup visibility.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PopupState {
    #[default]
    Hidden,
    Shown(String),
}

/// What the adapter should do to the DOM after an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PopupAction {
    /// Nothing changes.
    None,
    /// Open the popup for this task.
    Show(String),
    /// Close the popup.
    Hide,
    /// Close the current popup, then open for this task.
    Replace(String),
}

/// Drives popup visibility from pointer events.
///
/// Hover events only matter on fine pointers, taps only on coarse ones, so
/// a device that fires both (touch laptops) never gets a double toggle.
#[derive(Debug)]
pub struct PopupController {
    pointer: PointerClass,
    state: PopupState,
}

impl PopupController {
    #[must_use]
    pub fn new(pointer: PointerClass) -> Self {
        Self {
            pointer,
            state: PopupState::Hidden,
        }
    }

    #[must_use]
    pub fn state(&self) -> &PopupState {
        &self.state
    }

    /// Pointer moved onto a bar.
    pub fn pointer_enter(&mut self, task_id: &str) -> PopupAction {
        if self.pointer != PointerClass::Fine {
            return PopupAction::None;
        }
        match &self.state {
            PopupState::Shown(open) if open == task_id => PopupAction::None,
            PopupState::Shown(_) => {
                self.state = PopupState::Shown(task_id.to_owned());
                PopupAction::Replace(task_id.to_owned())
            }
            PopupState::Hidden => {
                self.state = PopupState::Shown(task_id.to_owned());
                PopupAction::Show(task_id.to_owned())
            }
        }
    }

    /// Pointer left a bar.
    pub fn pointer_leave(&mut self) -> PopupAction {
        if self.pointer != PointerClass::Fine || self.state == PopupState::Hidden {
            return PopupAction::None;
        }
        self.state = PopupState::Hidden;
        PopupAction::Hide
    }

    /// A bar was tapped.
    pub fn tap(&mut self, task_id: &str) -> PopupAction {
        if self.pointer != PointerClass::Coarse {
            return PopupAction::None;
        }
        match &self.state {
            // Re-tapping the open bar closes it.
            PopupState::Shown(open) if open == task_id => {
                self.state = PopupState::Hidden;
                PopupAction::Hide
            }
            PopupState::Shown(_) => {
                self.state = PopupState::Shown(task_id.to_owned());
                PopupAction::Replace(task_id.to_owned())
            }
            PopupState::Hidden => {
                self.state = PopupState::Shown(task_id.to_owned());
                PopupAction::Show(task_id.to_owned())
            }
        }
    }

    /// A tap landed outside every bar.
    pub fn tap_outside(&mut self) -> PopupAction {
        if self.pointer != PointerClass::Coarse || self.state == PopupState::Hidden {
            return PopupAction::None;
        }
        self.state = PopupState::Hidden;
        PopupAction::Hide
    }
}

// ===== Placement =====

/// Spacing constants for popup placement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PopupLayout {
    /// Vertical gap between the bar and the popup.
    pub gap: f64,
    /// Minimum distance kept from every container edge.
    pub margin: f64,
}

impl Default for PopupLayout {
    fn default() -> Self {
        Self {
            gap: 10.0,
            margin: 10.0,
        }
    }
}

/// Compute the popup's top-left corner within `container`, all rects in the
/// container's coordinate space.
///
/// Vertically the popup prefers sitting above the bar, flipping below when
/// it would cross the container top. Horizontally it hangs off the bar's
/// right edge on fine pointers (flipping to the left edge when it would
/// spill past the right margin) and centers in the container on coarse
/// ones. The result is clamped inside the margins either way.
#[must_use]
pub fn place_popup(
    bar: Rect,
    popup: Rect,
    container: Rect,
    pointer: PointerClass,
    layout: &PopupLayout,
) -> (f64, f64) {
    let above = bar.y - layout.gap - popup.height;
    let y = if above >= container.y + layout.margin {
        above
    } else {
        bar.bottom() + layout.gap
    };

    let x = match pointer {
        PointerClass::Fine => {
            let at_right = bar.right() + layout.gap;
            if at_right + popup.width > container.right() - layout.margin {
                bar.x - layout.gap - popup.width
            } else {
                at_right
            }
        }
        PointerClass::Coarse => container.x + (container.width - popup.width) / 2.0,
    };

    let max_x = container.right() - layout.margin - popup.width;
    let max_y = container.bottom() - layout.margin - popup.height;
    (
        x.clamp(container.x + layout.margin, max_x.max(container.x + layout.margin)),
        y.clamp(container.y + layout.margin, max_y.max(container.y + layout.margin)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn classify_combines_media_query_and_width() {
        assert_eq!(PointerClass::classify(false, 1280.0), PointerClass::Fine);
        assert_eq!(PointerClass::classify(true, 1280.0), PointerClass::Coarse);
        assert_eq!(PointerClass::classify(false, 480.0), PointerClass::Coarse);
        assert_eq!(PointerClass::classify(true, 480.0), PointerClass::Coarse);
    }

    #[test]
    fn hover_opens_and_leave_closes_on_fine() {
        let mut c = PopupController::new(PointerClass::Fine);
        assert_eq!(c.pointer_enter("io"), PopupAction::Show("io".into()));
        assert_eq!(c.state(), &PopupState::Shown("io".into()));
        assert_eq!(c.pointer_leave(), PopupAction::Hide);
        assert_eq!(c.state(), &PopupState::Hidden);
    }

    #[test]
    fn hover_moving_between_bars_replaces() {
        let mut c = PopupController::new(PointerClass::Fine);
        c.pointer_enter("io");
        assert_eq!(c.pointer_enter("qna"), PopupAction::Replace("qna".into()));
        // Re-entering the open bar is a no-op.
        assert_eq!(c.pointer_enter("qna"), PopupAction::None);
    }

    #[test]
    fn hover_ignored_on_coarse() {
        let mut c = PopupController::new(PointerClass::Coarse);
        assert_eq!(c.pointer_enter("io"), PopupAction::None);
        assert_eq!(c.pointer_leave(), PopupAction::None);
        assert_eq!(c.state(), &PopupState::Hidden);
    }

    #[test]
    fn tap_toggles_on_coarse() {
        let mut c = PopupController::new(PointerClass::Coarse);
        assert_eq!(c.tap("io"), PopupAction::Show("io".into()));
        assert_eq!(c.tap("io"), PopupAction::Hide);
        assert_eq!(c.state(), &PopupState::Hidden);
    }

    #[test]
    fn tap_on_other_bar_replaces() {
        let mut c = PopupController::new(PointerClass::Coarse);
        c.tap("io");
        assert_eq!(c.tap("qna"), PopupAction::Replace("qna".into()));
        assert_eq!(c.state(), &PopupState::Shown("qna".into()));
    }

    #[test]
    fn tap_outside_closes_only_when_open() {
        let mut c = PopupController::new(PointerClass::Coarse);
        assert_eq!(c.tap_outside(), PopupAction::None);
        c.tap("io");
        assert_eq!(c.tap_outside(), PopupAction::Hide);
    }

    #[test]
    fn tap_ignored_on_fine() {
        let mut c = PopupController::new(PointerClass::Fine);
        assert_eq!(c.tap("io"), PopupAction::None);
        assert_eq!(c.tap_outside(), PopupAction::None);
    }

    #[test]
    fn popup_prefers_above_the_bar() {
        let bar = Rect::new(200.0, 150.0, 100.0, 24.0);
        let popup = Rect::new(0.0, 0.0, 180.0, 80.0);
        let container = Rect::new(0.0, 0.0, 900.0, 400.0);
        let (x, y) = place_popup(bar, popup, container, PointerClass::Fine, &PopupLayout::default());
        assert_eq!(y, 150.0 - 10.0 - 80.0);
        assert_eq!(x, 300.0 + 10.0);
    }

    #[test]
    fn popup_flips_below_near_the_top() {
        let bar = Rect::new(200.0, 40.0, 100.0, 24.0);
        let popup = Rect::new(0.0, 0.0, 180.0, 80.0);
        let container = Rect::new(0.0, 0.0, 900.0, 400.0);
        let (_, y) = place_popup(bar, popup, container, PointerClass::Fine, &PopupLayout::default());
        assert_eq!(y, 64.0 + 10.0);
    }

    #[test]
    fn popup_flips_left_near_the_right_margin() {
        let bar = Rect::new(750.0, 150.0, 100.0, 24.0);
        let popup = Rect::new(0.0, 0.0, 180.0, 80.0);
        let container = Rect::new(0.0, 0.0, 900.0, 400.0);
        let (x, _) = place_popup(bar, popup, container, PointerClass::Fine, &PopupLayout::default());
        assert_eq!(x, 750.0 - 10.0 - 180.0);
    }

    #[test]
    fn popup_centers_on_coarse() {
        let bar = Rect::new(50.0, 150.0, 100.0, 24.0);
        let popup = Rect::new(0.0, 0.0, 200.0, 80.0);
        let container = Rect::new(0.0, 0.0, 360.0, 400.0);
        let (x, _) = place_popup(bar, popup, container, PointerClass::Coarse, &PopupLayout::default());
        assert_eq!(x, 80.0);
    }

    #[test]
    fn popup_stays_inside_margins() {
        let bar = Rect::new(0.0, 0.0, 20.0, 10.0);
        let popup = Rect::new(0.0, 0.0, 180.0, 80.0);
        let container = Rect::new(0.0, 0.0, 900.0, 400.0);
        let layout = PopupLayout::default();
        let (x, y) = place_popup(bar, popup, container, PointerClass::Fine, &layout);
        assert!(x >= layout.margin);
        assert!(y >= layout.margin);
        assert!(x + popup.width <= container.right() - layout.margin);
        assert!(y + popup.height <= container.bottom() - layout.margin);
    }
}
