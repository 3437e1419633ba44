#![cfg(feature = "sqlite")]

use chrono::NaiveDate;
use quarterly_tasks::persistence::{ApplicationStore, SchedulerStore, TaskStore};
use quarterly_tasks::{
    Application, PersistenceError, Quarter, Recurrence, Scheduler, SqliteStore, TaskInstance,
    TaskStatus,
};
use tempfile::TempDir;

fn sample_tasks(owner_id: i64) -> Vec<TaskInstance> {
    vec![
        TaskInstance::pending(
            "Water plants",
            NaiveDate::from_ymd_opt(2024, 1, 7).unwrap(),
            owner_id,
        ),
        TaskInstance::pending(
            "Water plants",
            NaiveDate::from_ymd_opt(2024, 1, 14).unwrap(),
            owner_id,
        ),
    ]
}

#[test]
fn scheduler_round_trips_through_a_database_file() {
    let dir = TempDir::new().expect("create temp dir");
    let path = dir.path().join("tasks.db");

    let scheduler = Scheduler::new(
        "Cleaning rotation",
        7,
        Recurrence::Interval {
            interval_days: 3,
            subtasks: vec!["Kitchen".to_string(), "Bathroom".to_string()],
        },
    );
    let id = {
        let store = SqliteStore::new(&path).unwrap();
        store.insert_scheduler(&scheduler).unwrap()
    };

    // Reopen the same file; the row must survive the connection.
    let store = SqliteStore::new(&path).unwrap();
    let loaded = store.scheduler(id).unwrap().expect("scheduler exists");
    assert_eq!(loaded.name, "Cleaning rotation");
    assert_eq!(loaded.owner_id, 7);
    assert_eq!(loaded.recurrence, scheduler.recurrence);
}

#[test]
fn duplicate_application_violates_the_unique_constraint() {
    let store = SqliteStore::in_memory().unwrap();
    let scheduler = Scheduler::new("Weekly", 1, Recurrence::Weekly { day_of_week: 0 });
    let scheduler_id = store.insert_scheduler(&scheduler).unwrap();

    let application = Application::new(scheduler_id, Quarter::Q1, 2024);
    store
        .insert_application_with_tasks(&application, &sample_tasks(1))
        .unwrap();

    let err = store
        .insert_application_with_tasks(&application, &sample_tasks(1))
        .unwrap_err();
    assert!(matches!(err, PersistenceError::Duplicate));

    // The failed insert must not have left a second task batch behind.
    assert_eq!(store.tasks_for_owner(1).unwrap().len(), 2);
}

#[test]
fn application_insert_is_atomic_with_its_tasks() {
    let store = SqliteStore::in_memory().unwrap();
    let scheduler = Scheduler::new("Weekly", 2, Recurrence::Weekly { day_of_week: 3 });
    let scheduler_id = store.insert_scheduler(&scheduler).unwrap();

    let application = Application::new(scheduler_id, Quarter::Q3, 2025);
    let (application_id, task_ids) = store
        .insert_application_with_tasks(&application, &sample_tasks(2))
        .unwrap();

    assert_eq!(task_ids.len(), 2);
    let stored = store.application(application_id).unwrap().unwrap();
    assert_eq!(stored.scheduler_id, scheduler_id);
    assert_eq!(stored.quarter, Quarter::Q3);
    assert_eq!(stored.year, 2025);
    assert!(
        store
            .application_exists(scheduler_id, Quarter::Q3, 2025)
            .unwrap()
    );
    assert!(
        !store
            .application_exists(scheduler_id, Quarter::Q4, 2025)
            .unwrap()
    );
}

#[test]
fn deleting_a_scheduler_cascades_to_its_applications() {
    let store = SqliteStore::in_memory().unwrap();
    let scheduler = Scheduler::new("Monthly", 3, Recurrence::Monthly { day_of_month: 5 });
    let scheduler_id = store.insert_scheduler(&scheduler).unwrap();
    let application = Application::new(scheduler_id, Quarter::Q2, 2024);
    let (application_id, _) = store
        .insert_application_with_tasks(&application, &[])
        .unwrap();

    assert!(store.delete_scheduler(scheduler_id).unwrap());
    assert!(store.application(application_id).unwrap().is_none());
}

#[test]
fn deleting_an_application_keeps_its_tasks() {
    let store = SqliteStore::in_memory().unwrap();
    let scheduler = Scheduler::new("Weekly", 4, Recurrence::Weekly { day_of_week: 6 });
    let scheduler_id = store.insert_scheduler(&scheduler).unwrap();
    let application = Application::new(scheduler_id, Quarter::Q1, 2024);
    let (application_id, task_ids) = store
        .insert_application_with_tasks(&application, &sample_tasks(4))
        .unwrap();

    assert!(store.delete_application(application_id).unwrap());
    assert_eq!(store.tasks_for_owner(4).unwrap().len(), task_ids.len());
}

#[test]
fn task_status_and_date_updates_persist() {
    let store = SqliteStore::in_memory().unwrap();
    let ids = store.bulk_insert_tasks(&sample_tasks(5)).unwrap();
    let id = ids[0];

    assert!(store.set_task_status(id, TaskStatus::Completed).unwrap());
    let task = store.task(id).unwrap().unwrap();
    assert_eq!(task.status, TaskStatus::Completed);

    let new_date = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
    assert!(store.reschedule_task(id, new_date).unwrap());
    let task = store.task(id).unwrap().unwrap();
    assert_eq!(task.date, new_date);

    // Completed tasks drop out of the pending view.
    let pending = store.pending_tasks(5).unwrap();
    assert!(pending.iter().all(|t| t.id != Some(id)));
    assert_eq!(pending.len(), 1);
}

#[test]
fn tasks_on_date_filters_by_owner_and_day() {
    let store = SqliteStore::in_memory().unwrap();
    store.bulk_insert_tasks(&sample_tasks(6)).unwrap();
    store.bulk_insert_tasks(&sample_tasks(7)).unwrap();

    let date = NaiveDate::from_ymd_opt(2024, 1, 7).unwrap();
    let tasks = store.tasks_on_date(6, date).unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].owner_id, 6);
    assert_eq!(tasks[0].date, date);
}

#[test]
fn missing_rows_update_and_delete_as_false() {
    let store = SqliteStore::in_memory().unwrap();
    assert!(!store.set_task_status(99, TaskStatus::Deferred).unwrap());
    assert!(
        !store
            .reschedule_task(99, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
            .unwrap()
    );
    assert!(!store.delete_task(99).unwrap());
    assert!(!store.rename_scheduler(99, "Renamed").unwrap());
    assert!(!store.delete_scheduler(99).unwrap());
    assert!(!store.delete_application(99).unwrap());
    assert!(store.task(99).unwrap().is_none());
    assert!(store.scheduler(99).unwrap().is_none());
}
