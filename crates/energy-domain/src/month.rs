//! Calendar month symbols without an absolute year.

use std::{fmt, str::FromStr};

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::common::MONTHS_PER_YEAR;

/// One of the twelve calendar months, ordered January first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Month {
    January,
    February,
    March,
    April,
    May,
    June,
    July,
    August,
    September,
    October,
    November,
    December,
}

impl Month {
    pub const ALL: [Month; MONTHS_PER_YEAR] = [
        Month::January,
        Month::February,
        Month::March,
        Month::April,
        Month::May,
        Month::June,
        Month::July,
        Month::August,
        Month::September,
        Month::October,
        Month::November,
        Month::December,
    ];

    /// Zero-based position in the cycle (January = 0).
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Maps any index onto the cycle, so 12 is January again.
    pub fn wrapping_from_index(index: usize) -> Self {
        Self::ALL[index % MONTHS_PER_YEAR]
    }

    /// The following month; December wraps to January.
    pub fn succ(self) -> Self {
        Self::wrapping_from_index(self.index() + 1)
    }

    /// Month containing the supplied date.
    pub fn of(date: NaiveDate) -> Self {
        Self::wrapping_from_index(date.month0() as usize)
    }

    pub fn name(self) -> &'static str {
        match self {
            Month::January => "January",
            Month::February => "February",
            Month::March => "March",
            Month::April => "April",
            Month::May => "May",
            Month::June => "June",
            Month::July => "July",
            Month::August => "August",
            Month::September => "September",
            Month::October => "October",
            Month::November => "November",
            Month::December => "December",
        }
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<chrono::Month> for Month {
    fn from(value: chrono::Month) -> Self {
        Self::wrapping_from_index(value.number_from_month() as usize - 1)
    }
}

/// Raised when text cannot be read as a month.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseMonthError {
    input: String,
}

impl fmt::Display for ParseMonthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "`{}` is not a month (use a name such as `may` or a number 1-12)",
            self.input
        )
    }
}

impl std::error::Error for ParseMonthError {}

impl FromStr for Month {
    type Err = ParseMonthError;

    /// Accepts full names, unambiguous prefixes of at least three letters, or
    /// one-based month numbers.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        let error = || ParseMonthError {
            input: trimmed.to_string(),
        };
        if let Ok(number) = trimmed.parse::<usize>() {
            return number
                .checked_sub(1)
                .and_then(Month::from_index)
                .ok_or_else(error);
        }
        let needle = trimmed.to_ascii_lowercase();
        if needle.len() < 3 {
            return Err(error());
        }
        Month::ALL
            .iter()
            .copied()
            .find(|month| month.name().to_ascii_lowercase().starts_with(&needle))
            .ok_or_else(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn succ_wraps_around_the_year() {
        assert_eq!(Month::December.succ(), Month::January);
        assert_eq!(Month::May.succ(), Month::June);
    }

    #[test]
    fn parses_names_prefixes_and_numbers() {
        assert_eq!("may".parse::<Month>(), Ok(Month::May));
        assert_eq!("Sept".parse::<Month>(), Ok(Month::September));
        assert_eq!("12".parse::<Month>(), Ok(Month::December));
        assert!("0".parse::<Month>().is_err());
        assert!("13".parse::<Month>().is_err());
        assert!("ju".parse::<Month>().is_err());
        assert!("smarch".parse::<Month>().is_err());
    }

    #[test]
    fn serializes_as_lowercase_name() {
        let json = serde_json::to_string(&Month::October).unwrap();
        assert_eq!(json, "\"october\"");
        let back: Month = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Month::October);
    }

    #[test]
    fn converts_from_chrono_and_dates() {
        assert_eq!(Month::from(chrono::Month::March), Month::March);
        let date = NaiveDate::from_ymd_opt(2025, 11, 3).unwrap();
        assert_eq!(Month::of(date), Month::November);
    }
}
