//! Wire types for the external chart widget.
//!
//! The widget consumes a task array and an options object; these structs
//! serialize to exactly the shapes it expects. Editing is neutered at the
//! options level: all read-only flags on, dragging off, and the embedding
//! adapter installs no-op click/change handlers on top.

use crate::{ScheduledTask, Timeline};
use chrono::NaiveDate;
use serde::Serialize;

/// Date format the widget parses ("YYYY-MM-DD")
const DATE_FMT: &str = "%Y-%m-%d";

fn fmt_date(date: NaiveDate) -> String {
    date.format(DATE_FMT).to_string()
}

/// One entry of the widget's task array
#[derive(Clone, Debug, Serialize)]
pub struct WidgetTask {
    pub id: String,
    pub name: String,
    pub start: String,
    pub end: String,
    pub progress: u8,
    pub custom: CustomFields,
}

/// Free-form fields the widget carries through to the popup callback
#[derive(Clone, Debug, Serialize)]
pub struct CustomFields {
    pub info: String,
}

impl From<&ScheduledTask> for WidgetTask {
    fn from(task: &ScheduledTask) -> Self {
        Self {
            id: task.id.clone(),
            name: task.name.clone(),
            start: fmt_date(task.start),
            end: fmt_date(task.end),
            progress: task.progress,
            custom: CustomFields {
                info: task.info.clone(),
            },
        }
    }
}

/// Convert a timeline into the widget's task array, preserving order
pub fn widget_tasks(timeline: &Timeline) -> Vec<WidgetTask> {
    timeline.tasks.iter().map(WidgetTask::from).collect()
}

/// View granularity choices the widget understands
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum ViewMode {
    Day,
    Week,
    Month,
    Year,
}

/// Widget configuration for a locked, read-only month-view timeline.
///
/// The grid is pinned exactly to the first task's start and the last task's
/// end so the widget cannot pad the date range on its own.
#[derive(Clone, Debug, Serialize)]
pub struct ChartOptions {
    pub view_mode: ViewMode,
    pub start_date: String,
    pub end_date: String,
    pub readonly: bool,
    pub readonly_dates: bool,
    pub readonly_progress: bool,
    pub draggable: bool,
    pub column_width: u32,
    pub padding: u32,
    pub view_modes: Vec<ViewMode>,
}

impl ChartOptions {
    /// Column width in pixels for regular viewports
    pub const WIDE_COLUMN: u32 = 350;
    /// Column width in pixels for narrow (mobile) viewports
    pub const NARROW_COLUMN: u32 = 50;

    /// Build the locked configuration for a timeline. `narrow` selects the
    /// tighter column width and padding used on small viewports.
    pub fn locked(timeline: &Timeline, narrow: bool) -> Self {
        let (column_width, padding) = if narrow {
            (Self::NARROW_COLUMN, 6)
        } else {
            (Self::WIDE_COLUMN, 18)
        };
        Self {
            view_mode: ViewMode::Month,
            start_date: timeline.first_start().map(fmt_date).unwrap_or_default(),
            end_date: timeline.last_end().map(fmt_date).unwrap_or_default(),
            readonly: true,
            readonly_dates: true,
            readonly_progress: true,
            draggable: false,
            column_width,
            padding,
            view_modes: vec![ViewMode::Day, ViewMode::Week, ViewMode::Month, ViewMode::Year],
        }
    }
}
