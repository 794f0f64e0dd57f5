//! # ganttfit-core
//!
//! Task model and schedule building for ganttfit timelines.
//!
//! This crate provides:
//! - Domain types: `TaskDef`, `ScheduledTask`, `Timeline`
//! - The schedule builder: fixed durations plus one explicit parallel rule
//! - Wire types for the external chart widget (`widget` module)
//!
//! ## Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use ganttfit_core::{build_timeline, TaskDef};
//!
//! let plan = vec![
//!     TaskDef::new("prep").name("Preparation").days(14),
//!     TaskDef::new("io").name("Outreach").days(10),
//!     TaskDef::new("qna").name("Q&A").days(25).parallel_with("io"),
//!     TaskDef::new("ts").name("Negotiation").days(10),
//! ];
//! let today = NaiveDate::from_ymd_opt(2025, 3, 3).unwrap();
//! let timeline = build_timeline(&plan, today).unwrap();
//! assert_eq!(timeline.get("qna").unwrap().start, timeline.get("io").unwrap().start);
//! ```

pub mod schedule;
pub mod widget;

pub use schedule::build_timeline;
pub use widget::{widget_tasks, ChartOptions, ViewMode, WidgetTask};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unique identifier for a task
pub type TaskId = String;

// ============================================================================
// Task Definitions
// ============================================================================

/// A phase of work with a fixed duration, as authored.
///
/// Progress is carried through to the widget but the timeline is read-only,
/// so it stays at zero in practice.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TaskDef {
    /// Unique identifier
    pub id: TaskId,
    /// Human-readable name shown next to the bar
    pub name: String,
    /// Duration in whole days (must be positive)
    pub duration_days: i64,
    /// Completion percentage shown by the widget
    #[serde(default)]
    pub progress: u8,
    /// Short description shown in the popup
    #[serde(default)]
    pub info: String,
    /// How this task's start date is derived
    #[serde(default)]
    pub start_rule: StartRule,
}

impl TaskDef {
    /// Create a new task definition with the given ID
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            duration_days: 1,
            progress: 0,
            info: String::new(),
            start_rule: StartRule::Sequential,
        }
    }

    /// Set the task name
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the duration in days
    pub fn days(mut self, days: i64) -> Self {
        self.duration_days = days;
        self
    }

    /// Set the popup description
    pub fn info(mut self, info: impl Into<String>) -> Self {
        self.info = info.into();
        self
    }

    /// Start this task together with an earlier sibling instead of at the
    /// cursor. The cursor then advances one day past the later of the two
    /// end dates, so the next sequential task waits for both.
    pub fn parallel_with(mut self, sibling: impl Into<String>) -> Self {
        self.start_rule = StartRule::ParallelWith(sibling.into());
        self
    }
}

/// How a task's start date is derived from the plan order
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StartRule {
    /// Start at the cursor; advance the cursor past this task's end
    #[default]
    Sequential,
    /// Start when the named earlier task starts; advance the cursor one day
    /// past the later of the two end dates
    ParallelWith(TaskId),
}

// ============================================================================
// Scheduled Timeline
// ============================================================================

/// A task with computed dates. The end date is inclusive:
/// `end = start + duration - 1 day`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledTask {
    pub id: TaskId,
    pub name: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub progress: u8,
    pub info: String,
}

impl ScheduledTask {
    /// Duration in whole days (inclusive of both endpoints)
    pub fn duration_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

/// The dated schedule, preserving plan order
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Timeline {
    pub tasks: Vec<ScheduledTask>,
}

impl Timeline {
    /// Look up a task by ID
    pub fn get(&self, id: &str) -> Option<&ScheduledTask> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Earliest start across all tasks
    pub fn first_start(&self) -> Option<NaiveDate> {
        self.tasks.iter().map(|t| t.start).min()
    }

    /// Latest end across all tasks
    pub fn last_end(&self) -> Option<NaiveDate> {
        self.tasks.iter().map(|t| t.end).max()
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Plan validation / schedule building error
#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("plan has no tasks")]
    EmptyPlan,

    #[error("task '{task}' has non-positive duration ({days} days)")]
    InvalidDuration { task: TaskId, days: i64 },

    #[error("task '{task}' starts with '{sibling}', which is not an earlier task in the plan")]
    UnknownSibling { task: TaskId, sibling: TaskId },

    #[error("duplicate task id '{0}'")]
    DuplicateId(TaskId),
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn task_def_builder() {
        let def = TaskDef::new("dd")
            .name("Due Diligence")
            .days(40)
            .info("Legal docs and assessment");

        assert_eq!(def.id, "dd");
        assert_eq!(def.name, "Due Diligence");
        assert_eq!(def.duration_days, 40);
        assert_eq!(def.progress, 0);
        assert_eq!(def.info, "Legal docs and assessment");
        assert_eq!(def.start_rule, StartRule::Sequential);
    }

    #[test]
    fn task_def_parallel_rule() {
        let def = TaskDef::new("qna").days(25).parallel_with("io");
        assert_eq!(def.start_rule, StartRule::ParallelWith("io".into()));
    }

    #[test]
    fn task_def_defaults_name_to_id() {
        let def = TaskDef::new("close");
        assert_eq!(def.name, "close");
        assert_eq!(def.duration_days, 1);
    }

    #[test]
    fn scheduled_task_duration_inclusive() {
        let task = ScheduledTask {
            id: "prep".into(),
            name: "Prep".into(),
            start: date(2025, 3, 3),
            end: date(2025, 3, 16),
            progress: 0,
            info: String::new(),
        };
        assert_eq!(task.duration_days(), 14);
    }

    #[test]
    fn timeline_lookup_and_bounds() {
        let timeline = Timeline {
            tasks: vec![
                ScheduledTask {
                    id: "a".into(),
                    name: "A".into(),
                    start: date(2025, 1, 10),
                    end: date(2025, 1, 15),
                    progress: 0,
                    info: String::new(),
                },
                ScheduledTask {
                    id: "b".into(),
                    name: "B".into(),
                    start: date(2025, 1, 10),
                    end: date(2025, 2, 3),
                    progress: 0,
                    info: String::new(),
                },
            ],
        };

        assert_eq!(timeline.get("b").unwrap().name, "B");
        assert!(timeline.get("missing").is_none());
        assert_eq!(timeline.first_start(), Some(date(2025, 1, 10)));
        assert_eq!(timeline.last_end(), Some(date(2025, 2, 3)));
    }

    #[test]
    fn empty_timeline_has_no_bounds() {
        let timeline = Timeline::default();
        assert_eq!(timeline.first_start(), None);
        assert_eq!(timeline.last_end(), None);
    }

    #[test]
    fn task_def_deserializes_with_defaults() {
        let def: TaskDef =
            serde_json::from_str(r#"{"id":"io","name":"Outreach","duration_days":10}"#).unwrap();
        assert_eq!(def.start_rule, StartRule::Sequential);
        assert_eq!(def.progress, 0);
        assert_eq!(def.info, "");
    }
}
