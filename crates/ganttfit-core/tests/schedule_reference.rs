//! End-to-end schedule test for the full reference plan: eight phases with
//! one parallel pair, checked as day offsets from the reference date.

use chrono::NaiveDate;
use ganttfit_core::{build_timeline, TaskDef, Timeline};
use pretty_assertions::assert_eq;

fn reference_plan() -> Vec<TaskDef> {
    vec![
        TaskDef::new("prep").name("Deck & Data Room Prep").days(14),
        TaskDef::new("io").name("Investor Outreach").days(10),
        TaskDef::new("qna")
            .name("Investor Analysis & Q&A")
            .days(25)
            .parallel_with("io"),
        TaskDef::new("ts").name("Term-Sheet Negotiation").days(10),
        TaskDef::new("approv").name("Final Approvals").days(5),
        TaskDef::new("dd").name("Legal & Financial Due Diligence").days(40),
        TaskDef::new("close").name("Closing & Signing").days(5),
        TaskDef::new("capital").name("Capital Call").days(5),
    ]
}

fn day0() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 3).unwrap()
}

fn offsets(timeline: &Timeline, id: &str) -> (i64, i64) {
    let task = timeline.get(id).unwrap();
    (
        (task.start - day0()).num_days(),
        (task.end - day0()).num_days(),
    )
}

#[test]
fn reference_plan_schedules_exactly() {
    let timeline = build_timeline(&reference_plan(), day0()).unwrap();

    assert_eq!(offsets(&timeline, "prep"), (0, 13));
    assert_eq!(offsets(&timeline, "io"), (14, 23));
    assert_eq!(offsets(&timeline, "qna"), (14, 38));
    // qna ends later than io, so the join gates on qna: ts starts day 39.
    assert_eq!(offsets(&timeline, "ts"), (39, 48));
    assert_eq!(offsets(&timeline, "approv"), (49, 53));
    assert_eq!(offsets(&timeline, "dd"), (54, 93));
    assert_eq!(offsets(&timeline, "close"), (94, 98));
    assert_eq!(offsets(&timeline, "capital"), (99, 103));
}

#[test]
fn every_task_ends_on_or_after_its_start() {
    let timeline = build_timeline(&reference_plan(), day0()).unwrap();
    for task in &timeline.tasks {
        assert!(task.end >= task.start, "task {} ends before it starts", task.id);
        assert!(task.duration_days() >= 1);
    }
}

#[test]
fn sequential_successors_start_the_next_day() {
    let timeline = build_timeline(&reference_plan(), day0()).unwrap();

    // All purely sequential neighbors chain end + 1 day.
    for (prev, next) in [("ts", "approv"), ("approv", "dd"), ("dd", "close"), ("close", "capital")]
    {
        let prev_end = timeline.get(prev).unwrap().end;
        let next_start = timeline.get(next).unwrap().start;
        assert_eq!((next_start - prev_end).num_days(), 1, "{prev} -> {next}");
    }
}

#[test]
fn parallel_pair_shares_a_start_date() {
    let timeline = build_timeline(&reference_plan(), day0()).unwrap();
    assert_eq!(
        timeline.get("io").unwrap().start,
        timeline.get("qna").unwrap().start
    );
}
