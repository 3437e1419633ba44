use chrono::NaiveDate;
use quarterly_tasks::{
    PersistenceError, TaskInstance, TaskStatus, load_tasks_from_csv, load_tasks_from_json,
    save_tasks_to_csv, save_tasks_to_json,
};
use std::io::Write;
use tempfile::{NamedTempFile, TempDir};

fn sample_tasks() -> Vec<TaskInstance> {
    let mut first = TaskInstance::pending(
        "Water plants",
        NaiveDate::from_ymd_opt(2024, 1, 7).unwrap(),
        1,
    );
    first.id = Some(10);
    first.set_comments("needs the green can");

    let mut second = TaskInstance::pending(
        "Pay rent",
        NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
        1,
    );
    second.set_status(TaskStatus::Completed);

    vec![first, second]
}

#[test]
fn json_round_trip_preserves_tasks() {
    let dir = TempDir::new().expect("create temp dir");
    let path = dir.path().join("tasks.json");
    let tasks = sample_tasks();

    save_tasks_to_json(&tasks, &path).unwrap();
    let loaded = load_tasks_from_json(&path).unwrap();

    assert_eq!(loaded.len(), 2);
    assert_eq!(loaded[0].id, Some(10));
    assert_eq!(loaded[0].name, "Water plants");
    assert_eq!(loaded[0].comments, "needs the green can");
    assert_eq!(loaded[1].status, TaskStatus::Completed);
    assert_eq!(loaded[1].date, tasks[1].date);
}

#[test]
fn csv_round_trip_preserves_tasks() {
    let dir = TempDir::new().expect("create temp dir");
    let path = dir.path().join("tasks.csv");
    let tasks = sample_tasks();

    save_tasks_to_csv(&tasks, &path).unwrap();
    let loaded = load_tasks_from_csv(&path).unwrap();

    assert_eq!(loaded.len(), 2);
    assert_eq!(loaded[0].name, "Water plants");
    assert_eq!(loaded[0].date, tasks[0].date);
    assert_eq!(loaded[0].status, TaskStatus::Pending);
    // An unsaved id column stays empty and loads back as None.
    assert_eq!(loaded[1].id, None);
    assert_eq!(loaded[1].status, TaskStatus::Completed);
}

#[test]
fn malformed_json_is_a_serialization_error() {
    let mut file = NamedTempFile::new().expect("create temp file");
    write!(file, "{{ not json").unwrap();
    let err = load_tasks_from_json(file.path()).unwrap_err();
    assert!(matches!(err, PersistenceError::Serialization(_)));
}

#[test]
fn csv_with_an_unknown_status_is_invalid_data() {
    let mut file = NamedTempFile::new().expect("create temp file");
    writeln!(file, "id,name,date,owner_id,status,comments,created_at,updated_at").unwrap();
    writeln!(
        file,
        ",Water plants,2024-01-07,1,someday,,2024-01-01 00:00:00.0,2024-01-01 00:00:00.0"
    )
    .unwrap();
    let err = load_tasks_from_csv(file.path()).unwrap_err();
    assert!(matches!(err, PersistenceError::InvalidData(_)));
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = TempDir::new().expect("create temp dir");
    let path = dir.path().join("does-not-exist.json");
    let err = load_tasks_from_json(&path).unwrap_err();
    assert!(matches!(err, PersistenceError::Io(_)));
}
