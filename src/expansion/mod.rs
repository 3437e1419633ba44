pub mod interval;
pub mod monthly;
pub mod weekly;

use crate::quarter::Quarter;
use crate::scheduler::Recurrence;
use crate::validation::{self, ValidationError};
use chrono::NaiveDate;
use rand::Rng;

/// Expands a recurrence rule into the dates it occupies in one quarter.
///
/// The random source only matters for interval rules, which randomize their
/// anchor; weekly and monthly expansion never touch it.
pub fn dates_for_recurrence<R: Rng + ?Sized>(
    rng: &mut R,
    recurrence: &Recurrence,
    year: i32,
    quarter: Quarter,
) -> Result<Vec<NaiveDate>, ValidationError> {
    validation::validate_year(year)?;
    match recurrence {
        Recurrence::Interval { interval_days, .. } => {
            validation::validate_interval_days(*interval_days)?;
            Ok(interval::all_occurrences(rng, *interval_days, year, quarter))
        }
        Recurrence::Weekly { day_of_week } => {
            let weekday = validation::validate_day_of_week(*day_of_week)?;
            Ok(weekly::all_occurrences(weekday, year, quarter))
        }
        Recurrence::Monthly { day_of_month } => {
            validation::validate_day_of_month(*day_of_month)?;
            Ok(monthly::all_occurrences(year, quarter, *day_of_month))
        }
    }
}
