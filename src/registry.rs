use crate::batch::{self, BatchError};
use crate::expansion;
use crate::persistence::{PersistenceError, Store};
use crate::quarter::Quarter;
use crate::scheduler::Recurrence;
use crate::validation::{self, ValidationError};
use chrono::NaiveDate;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The record of one scheduler having been expanded into a quarter.
///
/// At most one application may exist per (scheduler, quarter, year) tuple;
/// the store enforces that with a uniqueness constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    pub id: Option<i64>,
    pub scheduler_id: i64,
    pub quarter: Quarter,
    pub year: i32,
}

impl Application {
    pub fn new(scheduler_id: i64, quarter: Quarter, year: i32) -> Self {
        Self {
            id: None,
            scheduler_id,
            quarter,
            year,
        }
    }
}

impl fmt::Display for Application {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} for scheduler {}",
            self.quarter, self.year, self.scheduler_id
        )
    }
}

#[derive(Debug)]
pub enum ApplyError {
    Validation(ValidationError),
    DuplicateApplication {
        scheduler_id: i64,
        quarter: Quarter,
        year: i32,
    },
    SchedulerNotFound(i64),
    Configuration(BatchError),
    Store(PersistenceError),
}

impl fmt::Display for ApplyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApplyError::Validation(err) => write!(f, "invalid input: {err}"),
            ApplyError::DuplicateApplication {
                scheduler_id,
                quarter,
                year,
            } => write!(
                f,
                "scheduler {scheduler_id} is already applied to {quarter} {year}"
            ),
            ApplyError::SchedulerNotFound(id) => write!(f, "scheduler {id} not found"),
            ApplyError::Configuration(err) => write!(f, "configuration error: {err}"),
            ApplyError::Store(err) => write!(f, "store error: {err}"),
        }
    }
}

impl std::error::Error for ApplyError {}

impl From<ValidationError> for ApplyError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<BatchError> for ApplyError {
    fn from(value: BatchError) -> Self {
        Self::Configuration(value)
    }
}

#[derive(Debug)]
pub enum RevokeError {
    ApplicationNotFound(i64),
    Store(PersistenceError),
}

impl fmt::Display for RevokeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RevokeError::ApplicationNotFound(id) => write!(f, "application {id} not found"),
            RevokeError::Store(err) => write!(f, "store error: {err}"),
        }
    }
}

impl std::error::Error for RevokeError {}

impl From<PersistenceError> for RevokeError {
    fn from(value: PersistenceError) -> Self {
        Self::Store(value)
    }
}

/// What one successful apply materialized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplyOutcome {
    pub application_id: i64,
    pub task_ids: Vec<i64>,
    pub dates: Vec<NaiveDate>,
}

/// Orchestrates expander -> batch builder -> store for quarterly
/// applications, and enforces at-most-one application per
/// (scheduler, quarter, year).
pub struct ApplicationRegistry<S> {
    store: S,
}

impl<S: Store> ApplicationRegistry<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Expands the scheduler into the quarter and persists the resulting
    /// task batch together with the application record, atomically.
    ///
    /// A tuple that is already applied is rejected outright, never merged.
    /// The pre-check keeps the common duplicate path cheap; the store's
    /// uniqueness constraint settles races.
    pub fn apply<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        scheduler_id: i64,
        quarter: Quarter,
        year: i32,
    ) -> Result<ApplyOutcome, ApplyError> {
        validation::validate_year(year)?;

        let scheduler = self
            .store
            .scheduler(scheduler_id)
            .map_err(ApplyError::Store)?
            .ok_or(ApplyError::SchedulerNotFound(scheduler_id))?;
        validation::validate_recurrence(&scheduler.recurrence)?;

        if self
            .store
            .application_exists(scheduler_id, quarter, year)
            .map_err(ApplyError::Store)?
        {
            return Err(ApplyError::DuplicateApplication {
                scheduler_id,
                quarter,
                year,
            });
        }

        let dates = expansion::dates_for_recurrence(rng, &scheduler.recurrence, year, quarter)?;
        let tasks = match &scheduler.recurrence {
            Recurrence::Interval { subtasks, .. } => {
                batch::build_cycling_batch(subtasks, scheduler.owner_id, &dates)?
            }
            _ => batch::build_simple_batch(&scheduler.name, scheduler.owner_id, &dates),
        };

        let application = Application::new(scheduler_id, quarter, year);
        let (application_id, task_ids) = self
            .store
            .insert_application_with_tasks(&application, &tasks)
            .map_err(|err| match err {
                PersistenceError::Duplicate => ApplyError::DuplicateApplication {
                    scheduler_id,
                    quarter,
                    year,
                },
                other => ApplyError::Store(other),
            })?;

        Ok(ApplyOutcome {
            application_id,
            task_ids,
            dates,
        })
    }

    /// Deletes the application record, returning the tuple to Unapplied.
    ///
    /// Task instances the application generated are deliberately left in
    /// place; callers wanting cleanup delete them individually. Known
    /// data-hygiene gap, kept to match how applications behave today.
    pub fn revoke(&self, application_id: i64) -> Result<(), RevokeError> {
        if self.store.delete_application(application_id)? {
            Ok(())
        } else {
            Err(RevokeError::ApplicationNotFound(application_id))
        }
    }
}
