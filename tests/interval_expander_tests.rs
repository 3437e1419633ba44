use chrono::{Datelike, Duration, NaiveDate, Weekday};
use quarterly_tasks::Quarter;
use quarterly_tasks::expansion::{interval, weekly};
use rand::SeedableRng;
use rand::rngs::StdRng;

#[test]
fn anchor_weekdays_start_from_sunday() {
    assert_eq!(interval::anchor_weekday(0), Weekday::Sun);
    assert_eq!(interval::anchor_weekday(1), Weekday::Mon);
    assert_eq!(interval::anchor_weekday(6), Weekday::Sat);
    // Index wraps around the seven candidates.
    assert_eq!(interval::anchor_weekday(7), Weekday::Sun);
}

#[test]
fn one_day_interval_always_anchors_on_sunday() {
    // With a pool of one candidate the draw is forced.
    let mut rng = rand::thread_rng();
    for _ in 0..20 {
        let anchor = interval::anchor_date(&mut rng, 1, 2024, Quarter::Q1);
        assert_eq!(anchor, NaiveDate::from_ymd_opt(2024, 1, 7).unwrap());
    }
}

#[test]
fn stepping_from_a_pinned_anchor_is_deterministic() {
    let anchor = NaiveDate::from_ymd_opt(2024, 1, 3).unwrap();
    let dates = interval::occurrences_from(anchor, 10, 2024, Quarter::Q1);
    assert_eq!(
        dates,
        vec![
            NaiveDate::from_ymd_opt(2024, 1, 3).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 13).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 23).unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 2).unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 12).unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 22).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 3).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 13).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 23).unwrap(),
        ]
    );
}

#[test]
fn q4_stepping_never_crosses_into_january() {
    let anchor = NaiveDate::from_ymd_opt(2024, 10, 5).unwrap();
    let dates = interval::occurrences_from(anchor, 30, 2024, Quarter::Q4);
    assert_eq!(dates.len(), 3);
    assert!(dates.iter().all(|d| d.year() == 2024));
}

#[test]
fn random_expansion_holds_spacing_and_containment() {
    let mut rng = rand::thread_rng();
    for interval_days in [2, 5, 7, 10, 45] {
        let dates = interval::all_occurrences(&mut rng, interval_days, 2025, Quarter::Q2);
        assert!(!dates.is_empty(), "interval {interval_days}");
        for pair in dates.windows(2) {
            assert_eq!(pair[1] - pair[0], Duration::days(interval_days));
        }
        for date in &dates {
            assert!(Quarter::Q2.contains(*date, 2025));
        }
        let start = Quarter::Q2.first_day(2025);
        let offset = (dates[0] - start).num_days();
        assert!((0..7).contains(&offset), "anchor outside the first week");
    }
}

#[test]
fn short_intervals_only_anchor_on_the_leading_candidates() {
    // interval 3 draws from [Sun, Mon, Tue] only.
    let mut rng = rand::thread_rng();
    for _ in 0..50 {
        let anchor = interval::anchor_date(&mut rng, 3, 2024, Quarter::Q3);
        assert!(matches!(
            anchor.weekday(),
            Weekday::Sun | Weekday::Mon | Weekday::Tue
        ));
    }
}

#[test]
fn seeded_expansion_is_reproducible() {
    let mut first_rng = StdRng::seed_from_u64(42);
    let mut second_rng = StdRng::seed_from_u64(42);
    let first = interval::all_occurrences(&mut first_rng, 4, 2024, Quarter::Q1);
    let second = interval::all_occurrences(&mut second_rng, 4, 2024, Quarter::Q1);
    assert_eq!(first, second);
}

#[test]
fn anchor_matches_the_weekly_first_occurrence() {
    let mut rng = StdRng::seed_from_u64(7);
    let anchor = interval::anchor_date(&mut rng, 14, 2025, Quarter::Q4);
    let expected = weekly::first_occurrence(anchor.weekday(), 2025, Quarter::Q4);
    assert_eq!(anchor, expected);
}
