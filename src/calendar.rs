// 🗓️ Calendar Grid Builder - year/month views annotated with epiweeks
//
// A month grid always starts on a Sunday and ends on a Saturday, so the
// first and last rows can spill into the neighbouring months. Each row is
// one epiweek; each day knows whether it belongs to the rendered month and
// whether it is "today" in the caller's timezone.

use crate::clock::{today_in_timezone, Clock, SystemClock};
use crate::epiweek::{date_to_epiweek, Epiweek};
use crate::error::{EpiweekError, Result};
use crate::format::{day_of_week_name, month_name};
use chrono::{Datelike, Days, NaiveDate};
use serde::Serialize;
use std::collections::HashSet;

// ============================================================================
// GRID TYPES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayCell {
    pub date: NaiveDate,
    pub day_of_week: &'static str,
    /// Day of the month, 1-31.
    pub day_number: u32,
    /// Relative to the month being rendered, not to the epiweek.
    pub is_current_month: bool,
    pub is_today: bool,
}

/// One Sunday-first row of seven days sharing a single epiweek.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeekRow {
    #[serde(flatten)]
    pub epiweek: Epiweek,
    pub days: [DayCell; 7],
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthGrid {
    /// 1-12
    pub month: u32,
    pub name: &'static str,
    pub weeks: Vec<WeekRow>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YearGrid {
    pub year: i32,
    /// Distinct epiweeks whose epiweek year equals `year`. Spillover rows from
    /// the neighbouring epiweek years are not counted.
    #[serde(rename = "totalWeeks")]
    pub total_distinct_epiweeks: usize,
    pub months: Vec<MonthGrid>,
}

impl MonthGrid {
    /// Iterate every day cell, row by row.
    pub fn days(&self) -> impl Iterator<Item = &DayCell> {
        self.weeks.iter().flat_map(|w| w.days.iter())
    }
}

impl YearGrid {
    pub fn month(&self, month: u32) -> Option<&MonthGrid> {
        self.months.iter().find(|m| m.month == month)
    }
}

// ============================================================================
// BUILDERS
// ============================================================================

/// Build the grid for `month_index` (0 = January .. 11 = December).
///
/// Callers validate year and month; a failure here means date arithmetic
/// left chrono's range.
pub fn build_month_grid(year: i32, month_index: u32, today: NaiveDate) -> Result<MonthGrid> {
    let month = month_index + 1;
    let name = month_name(month)
        .ok_or_else(|| EpiweekError::arithmetic(format!("month index {} out of range", month_index)))?;

    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| EpiweekError::arithmetic(format!("no first day for {}-{:02}", year, month)))?;
    let last = last_day_of_month(first)?;

    let grid_start = first
        .checked_sub_days(Days::new(u64::from(first.weekday().num_days_from_sunday())))
        .ok_or_else(|| EpiweekError::arithmetic(format!("grid start before {}", first)))?;
    let grid_end = last
        .checked_add_days(Days::new(6 - u64::from(last.weekday().num_days_from_sunday())))
        .ok_or_else(|| EpiweekError::arithmetic(format!("grid end after {}", last)))?;

    let mut weeks = Vec::with_capacity(6);
    let mut row_start = grid_start;
    while row_start <= grid_end {
        let mut days = Vec::with_capacity(7);
        for date in row_start.iter_days().take(7) {
            days.push(DayCell {
                date,
                day_of_week: day_of_week_name(date.weekday()),
                day_number: date.day(),
                is_current_month: date.month() == month && date.year() == year,
                is_today: date == today,
            });
        }
        let days: [DayCell; 7] = days
            .try_into()
            .map_err(|_| EpiweekError::arithmetic(format!("short week starting {}", row_start)))?;

        weeks.push(WeekRow {
            epiweek: date_to_epiweek(row_start),
            days,
        });

        row_start = row_start
            .checked_add_days(Days::new(7))
            .ok_or_else(|| EpiweekError::arithmetic(format!("week after {}", row_start)))?;
    }

    Ok(MonthGrid { month, name, weeks })
}

/// Build all twelve month grids of `year`.
pub fn build_year_grid(year: i32, today: NaiveDate) -> Result<YearGrid> {
    let months = (0..12)
        .map(|month_index| build_month_grid(year, month_index, today))
        .collect::<Result<Vec<_>>>()?;

    let distinct: HashSet<Epiweek> = months
        .iter()
        .flat_map(|m| m.weeks.iter())
        .map(|w| w.epiweek)
        .filter(|e| e.year() == year)
        .collect();

    Ok(YearGrid {
        year,
        total_distinct_epiweeks: distinct.len(),
        months,
    })
}

fn last_day_of_month(first: NaiveDate) -> Result<NaiveDate> {
    first
        .checked_add_months(chrono::Months::new(1))
        .and_then(|next| next.pred_opt())
        .ok_or_else(|| EpiweekError::arithmetic(format!("no month end after {}", first)))
}

// ============================================================================
// GENERATOR
// ============================================================================

/// Grid builder that resolves "today" through a clock and an IANA zone.
#[derive(Debug, Clone, Default)]
pub struct CalendarGenerator<C: Clock = SystemClock> {
    clock: C,
}

impl CalendarGenerator<SystemClock> {
    pub fn new() -> Self {
        CalendarGenerator { clock: SystemClock }
    }
}

impl<C: Clock> CalendarGenerator<C> {
    pub fn with_clock(clock: C) -> Self {
        CalendarGenerator { clock }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Month grid with `is_today` evaluated in `timezone`.
    pub fn month_grid(&self, year: i32, month_index: u32, timezone: &str) -> Result<MonthGrid> {
        let today = today_in_timezone(&self.clock, timezone)?;
        build_month_grid(year, month_index, today)
    }

    /// Year grid with `is_today` evaluated in `timezone`.
    pub fn year_grid(&self, year: i32, timezone: &str) -> Result<YearGrid> {
        let today = today_in_timezone(&self.clock, timezone)?;
        build_year_grid(year, today)
    }
}

// ============================================================================
// TESTS
// ============================================================================
