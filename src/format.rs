// 🔤 Formatting Helpers - canonical string forms for dates and epiweeks
// Dates travel as YYYY-MM-DD, epiweeks as YYYYWW.

use crate::error::{EpiweekError, Result};
use chrono::{NaiveDate, Weekday};

const DATE_FORMAT: &str = "%Y-%m-%d";

const MONTH_NAMES: [&str; 12] = [
    "January", "February", "March", "April", "May", "June",
    "July", "August", "September", "October", "November", "December",
];

/// Format a date as `YYYY-MM-DD`.
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Parse a strict `YYYY-MM-DD` date string.
///
/// chrono alone accepts unpadded fields ("2024-1-5"), so the shape is
/// checked before handing the string to `parse_from_str`.
pub fn parse_date(input: &str) -> Result<NaiveDate> {
    let invalid = || EpiweekError::InvalidDate {
        input: input.to_string(),
    };

    let bytes = input.as_bytes();
    let shape_ok = bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        });

    if !shape_ok {
        return Err(invalid());
    }

    NaiveDate::parse_from_str(input, DATE_FORMAT).map_err(|_| invalid())
}

/// Format an epiweek as its six-digit `YYYYWW` string.
pub fn format_epiweek(year: i32, week: u32) -> String {
    format!("{:04}{:02}", year, week)
}

/// Full English name of a weekday.
pub fn day_of_week_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Sun => "Sunday",
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
    }
}

/// English month name for a 1-based month number.
pub fn month_name(month: u32) -> Option<&'static str> {
    let index = usize::try_from(month).ok()?.checked_sub(1)?;
    MONTH_NAMES.get(index).copied()
}

// ============================================================================
// TESTS
// ============================================================================
