use serde::{Deserialize, Serialize};
use std::fmt;

pub const WEEKDAY_NAMES: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// Recurrence rule carried by a scheduler template.
///
/// `day_of_week` follows the 0=Monday..6=Sunday convention used across the
/// external interfaces. `day_of_month` is capped at 28 so the date exists in
/// every month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Recurrence {
    Interval {
        interval_days: i64,
        subtasks: Vec<String>,
    },
    Weekly {
        day_of_week: u8,
    },
    Monthly {
        day_of_month: u32,
    },
}

/// A named recurrence template owned by exactly one user profile.
///
/// Identity is stable: applications never mutate a scheduler, only
/// rename/delete of its own fields do.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scheduler {
    pub id: Option<i64>,
    pub name: String,
    pub owner_id: i64,
    pub recurrence: Recurrence,
}

impl Scheduler {
    pub fn new(name: impl Into<String>, owner_id: i64, recurrence: Recurrence) -> Self {
        Self {
            id: None,
            name: name.into(),
            owner_id,
            recurrence,
        }
    }

    /// Readable template label for selection forms.
    ///
    /// e.g. "Vacuum living room (every Sunday)", "Pay rent: 1st day of
    /// month", "Wipe surfaces (every 3 days)".
    pub fn selector_label(&self) -> String {
        match &self.recurrence {
            Recurrence::Interval { interval_days, .. } => {
                format!("{} (every {} days)", self.name, interval_days)
            }
            Recurrence::Weekly { day_of_week } => {
                format!("{} (every {})", self.name, weekday_name(*day_of_week))
            }
            Recurrence::Monthly { day_of_month } => format!(
                "{}: {}{} day of month",
                self.name,
                day_of_month,
                ordinal_suffix(*day_of_month)
            ),
        }
    }
}

impl fmt::Display for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [owner {}]", self.selector_label(), self.owner_id)
    }
}

/// Weekday name for a 0=Monday..6=Sunday index; out-of-range values are
/// rejected by validation before they reach display code.
pub fn weekday_name(day_of_week: u8) -> &'static str {
    WEEKDAY_NAMES
        .get(day_of_week as usize)
        .copied()
        .unwrap_or("invalid weekday")
}

pub fn ordinal_suffix(day_of_month: u32) -> &'static str {
    match day_of_month {
        1 | 21 => "st",
        2 | 22 => "nd",
        3 | 23 => "rd",
        _ => "th",
    }
}
