//! Calendar helpers: the transaction date parser, weekday naming and the
//! monthly period used to bucket revenue.

use std::fmt;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Serialize, Serializer};

use crate::error::MalformedDateError;

const PRIMARY_FORMAT: &str = "%d-%m-%Y";
const FALLBACK_FORMAT: &str = "%d/%m/%Y";

/// Weekdays in chart order.
pub const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Parses a source date, trying `DD-MM-YYYY` first and `DD/MM/YYYY` second.
pub fn parse_transaction_date(value: &str) -> Result<NaiveDate, MalformedDateError> {
    let trimmed = value.trim();
    NaiveDate::parse_from_str(trimmed, PRIMARY_FORMAT)
        .or_else(|_| NaiveDate::parse_from_str(trimmed, FALLBACK_FORMAT))
        .map_err(|_| MalformedDateError {
            value: value.to_string(),
        })
}

/// Parses a user-supplied ISO date (`YYYY-MM-DD`).
pub fn parse_iso_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|err| format!("'{value}' is not a YYYY-MM-DD date: {err}"))
}

pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// A calendar month. Orders chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Month {
    pub year: i32,
    pub month: u32,
}

impl Month {
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl Serialize for Month {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
