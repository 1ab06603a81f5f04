use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Calendar month, rendered as `YYYY-MM` on the wire. Payment records are
/// keyed by (resident, month, kind), so ordering and succession live here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Month {
    year: i32,
    month: u32,
}

impl Month {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        if (1..=12).contains(&month) {
            Some(Self { year, month })
        } else {
            None
        }
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(self) -> i32 {
        self.year
    }

    pub fn month(self) -> u32 {
        self.month
    }

    pub fn succ(self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    pub fn first_day(self) -> NaiveDate {
        // month is validated at construction, so day 1 always exists
        NaiveDate::from_ymd_opt(self.year, self.month, 1).expect("month in 1..=12")
    }

    /// Whole calendar months from `self` through `last`, inclusive.
    /// Zero when `last` precedes `self`.
    pub fn months_through(self, last: Month) -> u32 {
        let span =
            i64::from(last.year - self.year) * 12 + i64::from(last.month) - i64::from(self.month)
                + 1;
        span.max(0) as u32
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthParseError(String);

impl fmt::Display for MonthParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid month (expected YYYY-MM): {}", self.0)
    }
}

impl std::error::Error for MonthParseError {}

impl FromStr for Month {
    type Err = MonthParseError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let (year_part, month_part) = raw
            .split_once('-')
            .ok_or_else(|| MonthParseError(raw.to_string()))?;
        let year = year_part
            .parse::<i32>()
            .map_err(|_| MonthParseError(raw.to_string()))?;
        let month = month_part
            .parse::<u32>()
            .map_err(|_| MonthParseError(raw.to_string()))?;

        Month::new(year, month).ok_or_else(|| MonthParseError(raw.to_string()))
    }
}

impl Serialize for Month {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Month {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse::<Month>().map_err(D::Error::custom)
    }
}
