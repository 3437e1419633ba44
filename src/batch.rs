use crate::task::TaskInstance;
use chrono::NaiveDate;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchError {
    /// Cycling batch requested for an interval group with no sub-tasks.
    EmptyTaskCycle,
}

impl fmt::Display for BatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BatchError::EmptyTaskCycle => {
                write!(f, "cannot build a cycling batch from an empty sub-task list")
            }
        }
    }
}

impl std::error::Error for BatchError {}

/// One pending instance per date, all sharing `name` and `owner_id`, in the
/// same order as the input dates.
pub fn build_simple_batch(name: &str, owner_id: i64, dates: &[NaiveDate]) -> Vec<TaskInstance> {
    dates
        .iter()
        .map(|&date| TaskInstance::pending(name, date, owner_id))
        .collect()
}

/// Assigns sub-task `i mod N` to the i-th date, wrapping around the list.
///
/// Cycling through nothing is undefined, so an empty sub-task list with
/// dates to fill is rejected up front instead of indexing past the end.
pub fn build_cycling_batch(
    subtasks: &[String],
    owner_id: i64,
    dates: &[NaiveDate],
) -> Result<Vec<TaskInstance>, BatchError> {
    if subtasks.is_empty() {
        if dates.is_empty() {
            return Ok(Vec::new());
        }
        return Err(BatchError::EmptyTaskCycle);
    }

    Ok(dates
        .iter()
        .enumerate()
        .map(|(index, &date)| {
            let name = &subtasks[index % subtasks.len()];
            TaskInstance::pending(name, date, owner_id)
        })
        .collect())
}
