use crate::quarter::Quarter;
use chrono::NaiveDate;

/// One date per month of the quarter, all on `day_of_month`.
///
/// `day_of_month` is constrained to 1..=28 upstream, which is legal in every
/// month, so no short-month branching is needed here.
pub fn all_occurrences(year: i32, quarter: Quarter, day_of_month: u32) -> Vec<NaiveDate> {
    quarter
        .months()
        .iter()
        .map(|&month| {
            NaiveDate::from_ymd_opt(year, month, day_of_month)
                .expect("day_of_month 1-28 exists in every month")
        })
        .collect()
}
