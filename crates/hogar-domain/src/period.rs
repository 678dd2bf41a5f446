//! Calendar-month period keys (`YYYY-MM`) and the arithmetic over them.

use std::{fmt, str::FromStr};

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const KEY_LEN: usize = 7;

/// Reasons a string is rejected as a period key.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PeriodParseError {
    #[error("`{0}` is not a YYYY-MM period key")]
    Format(String),
    #[error("month {month} is out of range in `{input}`")]
    Month { input: String, month: u32 },
}

/// A calendar month, the unit of financial accounting.
///
/// Ordering follows calendar time. Serialized as its canonical `YYYY-MM` key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Period {
    year: i32,
    month: u32,
}

impl Period {
    pub fn new(year: i32, month: u32) -> Result<Self, PeriodParseError> {
        if !(1..=12).contains(&month) {
            return Err(PeriodParseError::Month {
                input: format!("{year:04}-{month:02}"),
                month,
            });
        }
        Ok(Self { year, month })
    }

    /// Period containing `date`.
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Parses a canonical `YYYY-MM` key.
    pub fn parse(value: &str) -> Result<Self, PeriodParseError> {
        if !has_key_shape(value) {
            return Err(PeriodParseError::Format(value.to_string()));
        }
        let year: i32 = value[..4]
            .parse()
            .map_err(|_| PeriodParseError::Format(value.to_string()))?;
        let month: u32 = value[5..]
            .parse()
            .map_err(|_| PeriodParseError::Format(value.to_string()))?;
        if !(1..=12).contains(&month) {
            return Err(PeriodParseError::Month {
                input: value.to_string(),
                month,
            });
        }
        Ok(Self { year, month })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// The following calendar month, rolling the year over after December.
    pub fn next(&self) -> Self {
        self.offset(1)
    }

    /// The preceding calendar month, rolling the year back before January.
    pub fn previous(&self) -> Self {
        self.offset(-1)
    }

    /// Shifts the period by `months` (negative values move backwards).
    pub fn offset(&self, months: i32) -> Self {
        let index = self.year * 12 + (self.month as i32 - 1) + months;
        Self {
            year: index.div_euclid(12),
            month: index.rem_euclid(12) as u32 + 1,
        }
    }

    pub fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    pub fn key(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for Period {
    type Err = PeriodParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Period {
    type Error = PeriodParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Period> for String {
    fn from(value: Period) -> Self {
        value.to_string()
    }
}

/// Adds one calendar month to `period`.
pub fn next_period(period: Period) -> Period {
    period.next()
}

/// Subtracts one calendar month from `period`.
pub fn previous_period(period: Period) -> Period {
    period.previous()
}

/// True iff `value` is `YYYY-MM` with the month in `01..=12`.
pub fn is_valid_period(value: &str) -> bool {
    Period::parse(value).is_ok()
}

/// Truncates an ISO date (`YYYY-MM-DD...`) to its period. Falls back to
/// `today` when no date is supplied.
pub fn period_of(date: Option<&str>, today: NaiveDate) -> Result<Period, PeriodParseError> {
    match date.map(str::trim).filter(|value| !value.is_empty()) {
        Some(value) => {
            let prefix = value
                .get(..KEY_LEN)
                .ok_or_else(|| PeriodParseError::Format(value.to_string()))?;
            Period::parse(prefix)
        }
        None => Ok(Period::from_date(today)),
    }
}

/// Ordered, de-duplicated periods from `back` months before `center` to
/// `forward` months after it, inclusive.
pub fn months_around(center: Period, back: u32, forward: u32) -> Vec<Period> {
    let mut periods: Vec<Period> = (-(back as i32)..=forward as i32)
        .map(|delta| center.offset(delta))
        .collect();
    periods.sort();
    periods.dedup();
    periods
}

fn has_key_shape(value: &str) -> bool {
    let bytes = value.as_bytes();
    bytes.len() == KEY_LEN
        && bytes[..4].iter().all(u8::is_ascii_digit)
        && bytes[4] == b'-'
        && bytes[5..].iter().all(u8::is_ascii_digit)
}
