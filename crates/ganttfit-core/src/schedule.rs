//! Schedule building: fixed durations to concrete dates.
//!
//! A cursor walks the plan in order, starting at the reference "today" date.
//! Sequential tasks consume the cursor back to back. A `ParallelWith` task
//! starts when its named sibling started; the cursor then advances one day
//! past the later of the two end dates, so whichever branch finishes last
//! gates the next sequential task.

use crate::{ScheduleError, ScheduledTask, StartRule, TaskDef, Timeline};
use chrono::{Duration, NaiveDate};
use std::collections::{HashMap, HashSet};

/// Compute a dated timeline from the ordered plan.
///
/// Deterministic and pure: the same plan and reference date always yield the
/// same timeline, one task per definition, order preserved.
pub fn build_timeline(defs: &[TaskDef], today: NaiveDate) -> Result<Timeline, ScheduleError> {
    validate(defs)?;

    let mut cursor = today;
    let mut dates: HashMap<&str, (NaiveDate, NaiveDate)> = HashMap::with_capacity(defs.len());
    let mut tasks = Vec::with_capacity(defs.len());

    for def in defs {
        let (start, end) = match &def.start_rule {
            StartRule::Sequential => {
                let start = cursor;
                let end = start + Duration::days(def.duration_days - 1);
                cursor = end + Duration::days(1);
                (start, end)
            }
            StartRule::ParallelWith(sibling) => {
                // Only earlier tasks are in the map, so forward and unknown
                // references fail the same way.
                let &(sib_start, sib_end) =
                    dates
                        .get(sibling.as_str())
                        .ok_or_else(|| ScheduleError::UnknownSibling {
                            task: def.id.clone(),
                            sibling: sibling.clone(),
                        })?;
                let start = sib_start;
                let end = start + Duration::days(def.duration_days - 1);
                cursor = end.max(sib_end) + Duration::days(1);
                (start, end)
            }
        };

        dates.insert(def.id.as_str(), (start, end));
        tasks.push(ScheduledTask {
            id: def.id.clone(),
            name: def.name.clone(),
            start,
            end,
            progress: def.progress,
            info: def.info.clone(),
        });
    }

    Ok(Timeline { tasks })
}

fn validate(defs: &[TaskDef]) -> Result<(), ScheduleError> {
    if defs.is_empty() {
        return Err(ScheduleError::EmptyPlan);
    }

    let mut seen = HashSet::with_capacity(defs.len());
    for def in defs {
        if def.duration_days <= 0 {
            return Err(ScheduleError::InvalidDuration {
                task: def.id.clone(),
                days: def.duration_days,
            });
        }
        if !seen.insert(def.id.as_str()) {
            return Err(ScheduleError::DuplicateId(def.id.clone()));
        }
        if let StartRule::ParallelWith(sibling) = &def.start_rule {
            if *sibling == def.id {
                return Err(ScheduleError::UnknownSibling {
                    task: def.id.clone(),
                    sibling: sibling.clone(),
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn day0() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 3).unwrap()
    }

    fn offset(timeline: &Timeline, id: &str) -> (i64, i64) {
        let task = timeline.get(id).unwrap();
        (
            (task.start - day0()).num_days(),
            (task.end - day0()).num_days(),
        )
    }

    #[test]
    fn sequential_tasks_chain_back_to_back() {
        let plan = vec![
            TaskDef::new("a").days(5),
            TaskDef::new("b").days(3),
            TaskDef::new("c").days(1),
        ];
        let timeline = build_timeline(&plan, day0()).unwrap();

        assert_eq!(offset(&timeline, "a"), (0, 4));
        assert_eq!(offset(&timeline, "b"), (5, 7));
        assert_eq!(offset(&timeline, "c"), (8, 8));
    }

    #[test]
    fn end_date_is_inclusive() {
        let plan = vec![TaskDef::new("solo").days(1)];
        let timeline = build_timeline(&plan, day0()).unwrap();
        let task = timeline.get("solo").unwrap();
        assert_eq!(task.start, task.end);
        assert_eq!(task.duration_days(), 1);
    }

    #[test]
    fn parallel_task_shares_sibling_start() {
        let plan = vec![
            TaskDef::new("io").days(10),
            TaskDef::new("qna").days(25).parallel_with("io"),
        ];
        let timeline = build_timeline(&plan, day0()).unwrap();

        assert_eq!(offset(&timeline, "io"), (0, 9));
        assert_eq!(offset(&timeline, "qna"), (0, 24));
    }

    #[test]
    fn successor_waits_for_later_parallel_branch() {
        let plan = vec![
            TaskDef::new("io").days(10),
            TaskDef::new("qna").days(25).parallel_with("io"),
            TaskDef::new("ts").days(10),
        ];
        let timeline = build_timeline(&plan, day0()).unwrap();

        // qna ends day 24, io ends day 9; ts starts one day after the later.
        assert_eq!(offset(&timeline, "ts"), (25, 34));
    }

    #[test]
    fn successor_waits_for_sibling_when_it_ends_later() {
        let plan = vec![
            TaskDef::new("long").days(30),
            TaskDef::new("short").days(5).parallel_with("long"),
            TaskDef::new("next").days(2),
        ];
        let timeline = build_timeline(&plan, day0()).unwrap();

        assert_eq!(offset(&timeline, "short"), (0, 4));
        // long ends day 29, so next starts day 30 despite short ending day 4.
        assert_eq!(offset(&timeline, "next"), (30, 31));
    }

    #[test]
    fn plan_order_is_preserved() {
        let plan = vec![
            TaskDef::new("z").days(1),
            TaskDef::new("a").days(1),
            TaskDef::new("m").days(1),
        ];
        let timeline = build_timeline(&plan, day0()).unwrap();
        let ids: Vec<&str> = timeline.tasks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["z", "a", "m"]);
    }

    #[test]
    fn empty_plan_is_rejected() {
        let err = build_timeline(&[], day0()).unwrap_err();
        assert!(matches!(err, ScheduleError::EmptyPlan));
    }

    #[test]
    fn zero_duration_is_rejected() {
        let plan = vec![TaskDef::new("bad").days(0)];
        let err = build_timeline(&plan, day0()).unwrap_err();
        assert!(matches!(
            err,
            ScheduleError::InvalidDuration { ref task, days: 0 } if task == "bad"
        ));
    }

    #[test]
    fn negative_duration_is_rejected() {
        let plan = vec![TaskDef::new("bad").days(-3)];
        let err = build_timeline(&plan, day0()).unwrap_err();
        assert!(matches!(err, ScheduleError::InvalidDuration { days: -3, .. }));
    }

    #[test]
    fn forward_parallel_reference_is_rejected() {
        // Sibling appears later in the plan, so it has no dates yet.
        let plan = vec![
            TaskDef::new("qna").days(25).parallel_with("io"),
            TaskDef::new("io").days(10),
        ];
        let err = build_timeline(&plan, day0()).unwrap_err();
        assert!(matches!(
            err,
            ScheduleError::UnknownSibling { ref task, ref sibling }
                if task == "qna" && sibling == "io"
        ));
    }

    #[test]
    fn unknown_parallel_reference_is_rejected() {
        let plan = vec![
            TaskDef::new("a").days(2),
            TaskDef::new("b").days(2).parallel_with("ghost"),
        ];
        let err = build_timeline(&plan, day0()).unwrap_err();
        assert!(matches!(err, ScheduleError::UnknownSibling { .. }));
    }

    #[test]
    fn self_parallel_reference_is_rejected() {
        let plan = vec![TaskDef::new("a").days(2).parallel_with("a")];
        let err = build_timeline(&plan, day0()).unwrap_err();
        assert!(matches!(err, ScheduleError::UnknownSibling { .. }));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let plan = vec![TaskDef::new("a").days(2), TaskDef::new("a").days(3)];
        let err = build_timeline(&plan, day0()).unwrap_err();
        assert!(matches!(err, ScheduleError::DuplicateId(ref id) if id == "a"));
    }
}
