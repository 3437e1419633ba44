use chrono::{Duration, NaiveDate};
use quarterly_tasks::{BatchError, TaskStatus, build_cycling_batch, build_simple_batch};

fn dates(count: usize) -> Vec<NaiveDate> {
    let start = NaiveDate::from_ymd_opt(2024, 1, 7).unwrap();
    (0..count)
        .map(|i| start + Duration::weeks(i as i64))
        .collect()
}

#[test]
fn simple_batch_shares_the_name_and_keeps_date_order() {
    let dates = dates(4);
    let tasks = build_simple_batch("Water plants", 9, &dates);
    assert_eq!(tasks.len(), 4);
    for (task, date) in tasks.iter().zip(&dates) {
        assert_eq!(task.name, "Water plants");
        assert_eq!(task.date, *date);
        assert_eq!(task.owner_id, 9);
        assert_eq!(task.status, TaskStatus::Pending);
        assert!(task.id.is_none());
    }
}

#[test]
fn cycling_batch_wraps_around_the_subtask_list() {
    let subtasks: Vec<String> = ["A", "B", "C"].iter().map(|s| s.to_string()).collect();
    let tasks = build_cycling_batch(&subtasks, 1, &dates(7)).unwrap();
    let names: Vec<&str> = tasks.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, ["A", "B", "C", "A", "B", "C", "A"]);
}

#[test]
fn fewer_dates_than_subtasks_uses_a_prefix() {
    let subtasks: Vec<String> = ["A", "B", "C"].iter().map(|s| s.to_string()).collect();
    let tasks = build_cycling_batch(&subtasks, 1, &dates(2)).unwrap();
    let names: Vec<&str> = tasks.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, ["A", "B"]);
}

#[test]
fn empty_subtasks_with_dates_is_rejected() {
    let err = build_cycling_batch(&[], 1, &dates(3)).unwrap_err();
    assert_eq!(err, BatchError::EmptyTaskCycle);
}

#[test]
fn empty_subtasks_without_dates_builds_nothing() {
    let tasks = build_cycling_batch(&[], 1, &[]).unwrap();
    assert!(tasks.is_empty());
}

#[test]
fn simple_batch_of_no_dates_is_empty() {
    assert!(build_simple_batch("Anything", 1, &[]).is_empty());
}
