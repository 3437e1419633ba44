use super::weekly;
use crate::quarter::Quarter;
use chrono::{Duration, NaiveDate, Weekday};
use rand::Rng;

/// Candidate anchor weekdays, in the fixed Sunday-first order the anchor
/// index is drawn against.
pub const ANCHOR_WEEKDAYS: [Weekday; 7] = [
    Weekday::Sun,
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
];

/// Anchor weekday for a given candidate index.
///
/// Callers drawing the index themselves (tests pinning a fixed anchor) go
/// through here; `anchor_date` draws it from the random source.
pub fn anchor_weekday(index: usize) -> Weekday {
    ANCHOR_WEEKDAYS[index % ANCHOR_WEEKDAYS.len()]
}

/// Picks a randomized anchor date within the first week of the quarter.
///
/// With an interval of `n <= 7` days the candidate pool is the first `n`
/// weekdays of `ANCHOR_WEEKDAYS`; longer intervals draw from all seven. The
/// phase is randomized on purpose so distinct interval tasks do not all land
/// on the same days.
pub fn anchor_date<R: Rng + ?Sized>(
    rng: &mut R,
    interval_days: i64,
    year: i32,
    quarter: Quarter,
) -> NaiveDate {
    let pool = interval_days.clamp(1, 7) as usize;
    let index = rng.gen_range(0..pool);
    weekly::first_occurrence(anchor_weekday(index), year, quarter)
}

/// Deterministic stepping phase: every `interval_days`-th date from `anchor`
/// that the quarter still contains.
pub fn occurrences_from(
    anchor: NaiveDate,
    interval_days: i64,
    year: i32,
    quarter: Quarter,
) -> Vec<NaiveDate> {
    let mut dates = Vec::new();
    let mut current = anchor;

    while quarter.contains(current, year) {
        dates.push(current);
        current += Duration::days(interval_days);
    }

    dates
}

/// Random-anchor expansion of an interval rule over one quarter.
///
/// Sequence length depends on the interval and the drawn anchor, so callers
/// assert properties (spacing, quarter containment, anchor in the first
/// week) rather than exact output.
pub fn all_occurrences<R: Rng + ?Sized>(
    rng: &mut R,
    interval_days: i64,
    year: i32,
    quarter: Quarter,
) -> Vec<NaiveDate> {
    let anchor = anchor_date(rng, interval_days, year, quarter);
    occurrences_from(anchor, interval_days, year, quarter)
}
