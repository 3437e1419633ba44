use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One three-month span of a calendar year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Quarter {
    Q1,
    Q2,
    Q3,
    Q4,
}

impl Quarter {
    pub const ALL: [Quarter; 4] = [Quarter::Q1, Quarter::Q2, Quarter::Q3, Quarter::Q4];

    /// The three calendar months of the quarter, in order.
    pub fn months(self) -> [u32; 3] {
        match self {
            Quarter::Q1 => [1, 2, 3],
            Quarter::Q2 => [4, 5, 6],
            Quarter::Q3 => [7, 8, 9],
            Quarter::Q4 => [10, 11, 12],
        }
    }

    pub fn start_month(self) -> u32 {
        self.months()[0]
    }

    /// First calendar day of the quarter in the given year.
    pub fn first_day(self, year: i32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, self.start_month(), 1)
            .expect("month 1, 4, 7 or 10 always starts on a valid date")
    }

    /// Whether `date` falls inside this quarter of `year`.
    ///
    /// Q1-Q3 are bounded by month alone: the quarter ends as soon as the
    /// month after its span is reached. Q4 is instead bounded by the year
    /// rollover, since its month span ends the year. Expansion loops step
    /// past month boundaries by several days, so both bounds are checked
    /// exactly this way and must not be merged into a single rule.
    pub fn contains(self, date: NaiveDate, year: i32) -> bool {
        match self {
            Quarter::Q1 => (1..=3).contains(&date.month()),
            Quarter::Q2 => (4..=6).contains(&date.month()),
            Quarter::Q3 => (7..=9).contains(&date.month()),
            Quarter::Q4 => (10..=12).contains(&date.month()) && date.year() == year,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Quarter::Q1 => "Q1",
            Quarter::Q2 => "Q2",
            Quarter::Q3 => "Q3",
            Quarter::Q4 => "Q4",
        }
    }
}

impl fmt::Display for Quarter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseQuarterError {
    input: String,
}

impl fmt::Display for ParseQuarterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown quarter '{}' (expected Q1, Q2, Q3 or Q4)", self.input)
    }
}

impl std::error::Error for ParseQuarterError {}

impl FromStr for Quarter {
    type Err = ParseQuarterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Q1" | "q1" => Ok(Quarter::Q1),
            "Q2" | "q2" => Ok(Quarter::Q2),
            "Q3" | "q3" => Ok(Quarter::Q3),
            "Q4" | "q4" => Ok(Quarter::Q4),
            other => Err(ParseQuarterError {
                input: other.to_string(),
            }),
        }
    }
}
