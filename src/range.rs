// 📏 Range Enumerator - distinct epiweeks touched by a date range
//
// Reference semantics: walk the range day by day and keep each epiweek the
// first time it is seen. `epiweeks_in_range` gets the same answer by jumping
// from one Sunday to the next.

use crate::epiweek::{date_to_epiweek, Epiweek};
use crate::error::{EpiweekError, Result};
use crate::format::format_date;
use chrono::{Datelike, Days, NaiveDate};
use std::collections::HashSet;

fn check_order(start: NaiveDate, end: NaiveDate) -> Result<()> {
    if start > end {
        return Err(EpiweekError::InvalidRange {
            start: format_date(start),
            end: format_date(end),
        });
    }
    Ok(())
}

/// Distinct epiweeks intersecting `start..=end`, in chronological order.
///
/// Partially covered edge weeks are included.
pub fn epiweeks_in_range(start: NaiveDate, end: NaiveDate) -> Result<Vec<Epiweek>> {
    check_order(start, end)?;

    let mut epiweeks = Vec::new();
    let mut cursor = start;
    loop {
        epiweeks.push(date_to_epiweek(cursor));

        let to_next_sunday = 7 - u64::from(cursor.weekday().num_days_from_sunday());
        match cursor.checked_add_days(Days::new(to_next_sunday)) {
            Some(next) if next <= end => cursor = next,
            _ => break,
        }
    }

    Ok(epiweeks)
}

/// Day-by-day enumeration with first-seen deduplication.
///
/// Slower than `epiweeks_in_range`; kept as the definition the fast path is
/// checked against.
pub fn epiweeks_in_range_by_day(start: NaiveDate, end: NaiveDate) -> Result<Vec<Epiweek>> {
    check_order(start, end)?;

    let mut seen: HashSet<Epiweek> = HashSet::new();
    let mut epiweeks = Vec::new();

    for date in start.iter_days().take_while(|d| *d <= end) {
        let epiweek = date_to_epiweek(date);
        if seen.insert(epiweek) {
            epiweeks.push(epiweek);
        }
    }

    Ok(epiweeks)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_single_day_range() {
        let weeks = epiweeks_in_range(ymd(2024, 12, 3), ymd(2024, 12, 3)).unwrap();
        assert_eq!(weeks.len(), 1);
        assert_eq!(weeks[0].to_string(), "202449");
    }

    #[test]
    fn test_first_quarter_2024() {
        let weeks = epiweeks_in_range(ymd(2024, 1, 1), ymd(2024, 3, 31)).unwrap();
        // 2024-03-31 is the Sunday that opens week 14
        assert_eq!(weeks.len(), 14);
        assert_eq!(weeks.first().unwrap().to_string(), "202401");
        assert_eq!(weeks.last().unwrap().to_string(), "202414");

        let through_saturday = epiweeks_in_range(ymd(2024, 1, 1), ymd(2024, 3, 30)).unwrap();
        assert_eq!(through_saturday.len(), 13);
    }

    #[test]
    fn test_range_across_year_boundary() {
        let weeks = epiweeks_in_range(ymd(2020, 12, 20), ymd(2021, 1, 10)).unwrap();
        let labels: Vec<String> = weeks.iter().map(|w| w.to_string()).collect();
        assert_eq!(labels, vec!["202052", "202053", "202101", "202102"]);
    }

    #[test]
    fn test_inverted_range_rejected() {
        let err = epiweeks_in_range(ymd(2024, 2, 1), ymd(2024, 1, 1)).unwrap_err();
        assert_eq!(err.kind(), "InvalidRange");
        assert!(epiweeks_in_range_by_day(ymd(2024, 2, 1), ymd(2024, 1, 1)).is_err());
    }

    #[test]
    fn test_matches_day_by_day_reference() {
        let start = ymd(2019, 12, 20);
        for offset in 0..40u64 {
            let from = start + Days::new(offset);
            for len in [0u64, 1, 5, 6, 7, 8, 13, 14, 60, 370] {
                let to = from + Days::new(len);
                assert_eq!(
                    epiweeks_in_range(from, to).unwrap(),
                    epiweeks_in_range_by_day(from, to).unwrap(),
                    "range {} .. {}",
                    from,
                    to
                );
            }
        }
    }

    #[test]
    fn test_results_are_strictly_increasing() {
        let weeks = epiweeks_in_range(ymd(2014, 1, 1), ymd(2016, 1, 1)).unwrap();
        for pair in weeks.windows(2) {
            assert_eq!(pair[0].next(), pair[1]);
        }
    }
}
