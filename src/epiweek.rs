// 📅 Epiweek Converter - MMWR epidemiological weeks
//
// Weeks run Sunday through Saturday. Week 1 of an epiweek year is the first
// week with at least four days in January, i.e. the week that starts on the
// Sunday on or before January 4. Dates before that Sunday belong to the last
// week (52 or 53) of the previous epiweek year; late December dates can
// belong to week 1 of the next one.
//
// Arithmetic runs on chrono's day numbering (0001-01-01 == day 1) so the
// date -> epiweek direction never has to build intermediate dates.

use crate::error::{EpiweekError, Result};
use crate::format::format_epiweek;
use chrono::{Datelike, NaiveDate};
use serde::ser::{Serialize, SerializeStruct, Serializer};
use std::fmt;
use std::str::FromStr;

/// Lowest year accepted from external input.
pub const MIN_YEAR: i32 = 1900;
/// Highest year accepted from external input.
pub const MAX_YEAR: i32 = 2100;
/// Upper bound on week numbers in any epiweek year.
pub const MAX_WEEK: u32 = 53;

// ============================================================================
// DAY ARITHMETIC
// ============================================================================

/// Day number (chrono `num_days_from_ce`) of January 1 of `year`.
fn jan1_day(year: i32) -> i64 {
    let y = i64::from(year) - 1;
    365 * y + y.div_euclid(4) - y.div_euclid(100) + y.div_euclid(400) + 1
}

/// Days since the most recent Sunday (0 = Sunday).
fn days_from_sunday(day: i64) -> i64 {
    // Day 1 (0001-01-01) was a Monday
    day.rem_euclid(7)
}

/// Day number of the Sunday that starts week 1 of `year`.
fn week_one_start_day(year: i32) -> i64 {
    let jan4 = jan1_day(year) + 3;
    jan4 - days_from_sunday(jan4)
}

fn date_from_day(day: i64) -> Result<NaiveDate> {
    i32::try_from(day)
        .ok()
        .and_then(NaiveDate::from_num_days_from_ce_opt)
        .ok_or_else(|| EpiweekError::arithmetic(format!("day number {} is not a valid date", day)))
}

/// Number of epiweeks (52 or 53) in `year`.
pub fn weeks_in_epiweek_year(year: i32) -> u32 {
    let days = week_one_start_day(year + 1) - week_one_start_day(year);
    (days / 7) as u32
}

/// The Sunday that starts week 1 of `year`.
pub fn epiweek_year_start(year: i32) -> Result<NaiveDate> {
    date_from_day(week_one_start_day(year))
}

/// Reject years outside the supported input bound.
pub fn validate_year(year: i64) -> Result<i32> {
    match i32::try_from(year) {
        Ok(y) if (MIN_YEAR..=MAX_YEAR).contains(&y) => Ok(y),
        _ => Err(EpiweekError::InvalidYear {
            year: year.to_string(),
            min: MIN_YEAR,
            max: MAX_YEAR,
        }),
    }
}

// ============================================================================
// EPIWEEK
// ============================================================================

/// An epiweek: epiweek year plus week number.
///
/// Ordering is lexicographic on (year, week), which is also chronological.
/// The `YYYYWW` string is produced on demand by `Display` and serialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Epiweek {
    year: i32,
    week: u32,
}

impl Epiweek {
    /// Build an epiweek, rejecting week numbers the year does not have.
    pub fn new(year: i32, week: u32) -> Result<Self> {
        let max_week = weeks_in_epiweek_year(year);
        if week == 0 || week > max_week {
            return Err(EpiweekError::InvalidWeek {
                year,
                week: i64::from(week),
                max_week,
            });
        }
        Ok(Epiweek { year, week })
    }

    /// The epiweek a date falls in.
    pub fn containing(date: NaiveDate) -> Self {
        date_to_epiweek(date)
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn week(&self) -> u32 {
        self.week
    }

    fn start_day(&self) -> i64 {
        week_one_start_day(self.year) + 7 * (i64::from(self.week) - 1)
    }

    /// Sunday of this epiweek.
    pub fn start_date(&self) -> Result<NaiveDate> {
        date_from_day(self.start_day())
    }

    /// Saturday of this epiweek.
    pub fn end_date(&self) -> Result<NaiveDate> {
        date_from_day(self.start_day() + 6)
    }

    /// All seven dates, Sunday first.
    pub fn dates(&self) -> Result<EpiweekDates> {
        let start_day = self.start_day();
        let start = date_from_day(start_day)?;
        let mut days = [start; 7];
        for (offset, slot) in days.iter_mut().enumerate().skip(1) {
            *slot = date_from_day(start_day + offset as i64)?;
        }

        Ok(EpiweekDates {
            epiweek: *self,
            start,
            end: days[6],
            days,
        })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date_to_epiweek(date) == *self
    }

    /// The following epiweek, rolling into week 1 of the next year.
    pub fn next(&self) -> Epiweek {
        if self.week < weeks_in_epiweek_year(self.year) {
            Epiweek { year: self.year, week: self.week + 1 }
        } else {
            Epiweek { year: self.year + 1, week: 1 }
        }
    }

    /// The preceding epiweek, rolling back into the last week of the previous year.
    pub fn previous(&self) -> Epiweek {
        if self.week > 1 {
            Epiweek { year: self.year, week: self.week - 1 }
        } else {
            let year = self.year - 1;
            Epiweek { year, week: weeks_in_epiweek_year(year) }
        }
    }
}

impl fmt::Display for Epiweek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_epiweek(self.year, self.week))
    }
}

impl FromStr for Epiweek {
    type Err = EpiweekError;

    fn from_str(s: &str) -> Result<Self> {
        parse_epiweek(s)
    }
}

impl Serialize for Epiweek {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Epiweek", 3)?;
        state.serialize_field("year", &self.year)?;
        state.serialize_field("week", &self.week)?;
        state.serialize_field("epiweek", &self.to_string())?;
        state.end()
    }
}

/// The seven dates of one epiweek.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpiweekDates {
    pub epiweek: Epiweek,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub days: [NaiveDate; 7],
}

// ============================================================================
// CONVERSIONS
// ============================================================================

/// Map a calendar date to its epiweek. Total over every representable date.
pub fn date_to_epiweek(date: NaiveDate) -> Epiweek {
    let day = i64::from(date.num_days_from_ce());
    let mut year = date.year();

    if day >= week_one_start_day(year + 1) {
        year += 1;
    } else if day < week_one_start_day(year) {
        year -= 1;
    }

    let week = (day - week_one_start_day(year)) / 7 + 1;
    Epiweek { year, week: week as u32 }
}

/// Sunday-to-Saturday dates of `week` in epiweek year `year`.
///
/// Fails with `InvalidWeek` for week 0 or a week beyond the year's count
/// (week 53 of a 52-week year).
pub fn epiweek_to_date_range(year: i32, week: u32) -> Result<EpiweekDates> {
    Epiweek::new(year, week)?.dates()
}

/// Parse a six-digit `YYYYWW` epiweek string.
pub fn parse_epiweek(input: &str) -> Result<Epiweek> {
    if input.len() != 6 || !input.bytes().all(|b| b.is_ascii_digit()) {
        return Err(EpiweekError::InvalidEpiweekFormat {
            input: input.to_string(),
        });
    }

    let format_error = || EpiweekError::InvalidEpiweekFormat {
        input: input.to_string(),
    };
    let year: i64 = input[..4].parse().map_err(|_| format_error())?;
    let week: u32 = input[4..].parse().map_err(|_| format_error())?;

    let year = validate_year(year)?;
    Epiweek::new(year, week)
}

// ============================================================================
// TESTS
// ============================================================================
