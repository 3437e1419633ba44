use crate::quarter::Quarter;
use chrono::{Datelike, Duration, NaiveDate, Weekday};

/// First occurrence of `weekday` on or after the quarter's first day.
///
/// The offset is `(target - start_weekday) mod 7` days forward from the
/// first of the quarter's first month. Should the mod-7 arithmetic ever
/// resolve into the period before the quarter (the previous month, or
/// December of the prior year for Q1), the date is pushed exactly one week
/// forward.
pub fn first_occurrence(weekday: Weekday, year: i32, quarter: Quarter) -> NaiveDate {
    let quarter_start = quarter.first_day(year);
    let days_until_target = (weekday.num_days_from_monday() + 7
        - quarter_start.weekday().num_days_from_monday())
        % 7;
    let mut target = quarter_start + Duration::days(i64::from(days_until_target));

    if !quarter.contains(target, year) {
        target += Duration::weeks(1);
    }

    target
}

/// All occurrences of `weekday` within the quarter, in order.
///
/// Steps by whole weeks from the first occurrence until the quarter's
/// termination rule cuts the sequence off. Every quarter holds between 12
/// and 14 of any given weekday.
pub fn all_occurrences(weekday: Weekday, year: i32, quarter: Quarter) -> Vec<NaiveDate> {
    let mut dates = Vec::new();
    let mut current = first_occurrence(weekday, year, quarter);

    while quarter.contains(current, year) {
        dates.push(current);
        current += Duration::weeks(1);
    }

    dates
}
