use crate::quarter::Quarter;
use crate::registry::Application;
use crate::scheduler::Scheduler;
use crate::task::{TaskInstance, TaskStatus};
use chrono::NaiveDate;
use serde_json::Error as SerdeJsonError;
use std::fmt;
use std::io;

#[derive(Debug)]
pub enum PersistenceError {
    Serialization(SerdeJsonError),
    Io(io::Error),
    #[cfg(feature = "sqlite")]
    Sqlite(rusqlite::Error),
    Csv(csv::Error),
    InvalidData(String),
    /// Unique-constraint violation on (scheduler, quarter, year).
    Duplicate,
    NotFound,
}

impl fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PersistenceError::Serialization(err) => write!(f, "serialization error: {err}"),
            PersistenceError::Io(err) => write!(f, "io error: {err}"),
            #[cfg(feature = "sqlite")]
            PersistenceError::Sqlite(err) => write!(f, "sqlite error: {err}"),
            PersistenceError::Csv(err) => write!(f, "csv error: {err}"),
            PersistenceError::InvalidData(msg) => write!(f, "invalid data: {msg}"),
            PersistenceError::Duplicate => {
                write!(f, "an application for this scheduler and quarter already exists")
            }
            PersistenceError::NotFound => write!(f, "record not found"),
        }
    }
}

impl std::error::Error for PersistenceError {}

impl From<SerdeJsonError> for PersistenceError {
    fn from(value: SerdeJsonError) -> Self {
        Self::Serialization(value)
    }
}

impl From<io::Error> for PersistenceError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

#[cfg(feature = "sqlite")]
impl From<rusqlite::Error> for PersistenceError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

impl From<csv::Error> for PersistenceError {
    fn from(value: csv::Error) -> Self {
        Self::Csv(value)
    }
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;

pub trait SchedulerStore {
    fn insert_scheduler(&self, scheduler: &Scheduler) -> PersistenceResult<i64>;
    fn scheduler(&self, id: i64) -> PersistenceResult<Option<Scheduler>>;
    fn schedulers_for_owner(&self, owner_id: i64) -> PersistenceResult<Vec<Scheduler>>;
    fn rename_scheduler(&self, id: i64, name: &str) -> PersistenceResult<bool>;
    fn delete_scheduler(&self, id: i64) -> PersistenceResult<bool>;
}

pub trait ApplicationStore {
    /// Persists the application record and its task batch as one unit.
    ///
    /// A (scheduler, quarter, year) tuple that is already applied must fail
    /// with [`PersistenceError::Duplicate`] and leave no partial state; the
    /// store's uniqueness guarantee is the final arbiter under concurrency.
    fn insert_application_with_tasks(
        &self,
        application: &Application,
        tasks: &[TaskInstance],
    ) -> PersistenceResult<(i64, Vec<i64>)>;

    fn application(&self, id: i64) -> PersistenceResult<Option<Application>>;

    fn application_exists(
        &self,
        scheduler_id: i64,
        quarter: Quarter,
        year: i32,
    ) -> PersistenceResult<bool>;

    fn applications_for_owner(&self, owner_id: i64) -> PersistenceResult<Vec<Application>>;

    fn applications_for_quarter(
        &self,
        owner_id: i64,
        quarter: Quarter,
        year: i32,
    ) -> PersistenceResult<Vec<Application>>;

    /// Deletes the application record only; generated tasks are untouched.
    fn delete_application(&self, id: i64) -> PersistenceResult<bool>;
}

pub trait TaskStore {
    fn bulk_insert_tasks(&self, tasks: &[TaskInstance]) -> PersistenceResult<Vec<i64>>;
    fn task(&self, id: i64) -> PersistenceResult<Option<TaskInstance>>;
    fn tasks_for_owner(&self, owner_id: i64) -> PersistenceResult<Vec<TaskInstance>>;
    fn tasks_on_date(&self, owner_id: i64, date: NaiveDate) -> PersistenceResult<Vec<TaskInstance>>;
    fn pending_tasks(&self, owner_id: i64) -> PersistenceResult<Vec<TaskInstance>>;
    fn set_task_status(&self, id: i64, status: TaskStatus) -> PersistenceResult<bool>;
    fn reschedule_task(&self, id: i64, date: NaiveDate) -> PersistenceResult<bool>;
    fn delete_task(&self, id: i64) -> PersistenceResult<bool>;
}

/// The full persistence contract the registry and outer surfaces work over.
pub trait Store: SchedulerStore + ApplicationStore + TaskStore {}

impl<T: SchedulerStore + ApplicationStore + TaskStore> Store for T {}

pub mod file;
pub mod memory;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use file::{
    load_tasks_from_csv, load_tasks_from_json, save_tasks_to_csv, save_tasks_to_json,
};
pub use memory::MemoryStore;
