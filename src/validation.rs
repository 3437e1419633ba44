use crate::scheduler::{Recurrence, Scheduler};
use chrono::Weekday;
use std::fmt;

pub const MIN_YEAR: i32 = 2023;
pub const MAX_YEAR: i32 = 2035;
pub const MAX_NAME_LENGTH: usize = 255;

/// Rejection of an out-of-range input, naming the offending field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    field: &'static str,
    message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }

    pub fn field(&self) -> &'static str {
        self.field
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

pub fn validate_year(year: i32) -> Result<(), ValidationError> {
    if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
        return Err(ValidationError::new(
            "year",
            format!("{year} is outside the supported range {MIN_YEAR}-{MAX_YEAR}"),
        ));
    }
    Ok(())
}

/// Checks the 0=Monday..6=Sunday convention and hands back the chrono weekday.
pub fn validate_day_of_week(day_of_week: u8) -> Result<Weekday, ValidationError> {
    Weekday::try_from(day_of_week).map_err(|_| {
        ValidationError::new(
            "day_of_week",
            format!("{day_of_week} is not a weekday index (0=Monday..6=Sunday)"),
        )
    })
}

pub fn validate_day_of_month(day_of_month: u32) -> Result<(), ValidationError> {
    if !(1..=28).contains(&day_of_month) {
        return Err(ValidationError::new(
            "day_of_month",
            format!("{day_of_month} must be between 1 and 28 so the date exists in every month"),
        ));
    }
    Ok(())
}

pub fn validate_interval_days(interval_days: i64) -> Result<(), ValidationError> {
    if interval_days < 1 {
        return Err(ValidationError::new(
            "interval_days",
            format!("{interval_days} must be at least 1"),
        ));
    }
    Ok(())
}

pub fn validate_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::new("name", "must not be empty"));
    }
    if name.len() > MAX_NAME_LENGTH {
        return Err(ValidationError::new(
            "name",
            format!("must be at most {MAX_NAME_LENGTH} characters"),
        ));
    }
    Ok(())
}

pub fn validate_recurrence(recurrence: &Recurrence) -> Result<(), ValidationError> {
    match recurrence {
        Recurrence::Interval {
            interval_days,
            subtasks,
        } => {
            validate_interval_days(*interval_days)?;
            for subtask in subtasks {
                validate_name(subtask)?;
            }
            Ok(())
        }
        Recurrence::Weekly { day_of_week } => validate_day_of_week(*day_of_week).map(|_| ()),
        Recurrence::Monthly { day_of_month } => validate_day_of_month(*day_of_month),
    }
}

pub fn validate_scheduler(scheduler: &Scheduler) -> Result<(), ValidationError> {
    validate_name(&scheduler.name)?;
    validate_recurrence(&scheduler.recurrence)
}
