// 🕰️ Timezone-aware Clock - "now" as an injectable capability
// Everything that depends on the current instant takes a `Clock`, so tests
// pin time with `FixedClock` instead of reading the system clock.

use crate::error::{EpiweekError, Result};
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use chrono_tz::Tz;
use std::sync::Arc;

/// Zone used when a caller does not name one.
pub const DEFAULT_TIMEZONE: &str = "America/New_York";

// ============================================================================
// CLOCK
// ============================================================================

/// Source of the current instant.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Reads the operating system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Always returns the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}

/// Clock chosen at runtime and shared across threads.
pub type SharedClock = Arc<dyn Clock + Send + Sync>;

// ============================================================================
// TIMEZONE RESOLUTION
// ============================================================================

/// Resolve an IANA zone identifier such as `Europe/London` or `UTC`.
pub fn parse_timezone(timezone: &str) -> Result<Tz> {
    timezone
        .parse::<Tz>()
        .map_err(|_| EpiweekError::InvalidTimezone {
            timezone: timezone.to_string(),
        })
}

pub fn is_valid_timezone(timezone: &str) -> bool {
    parse_timezone(timezone).is_ok()
}

/// Current instant as civil time in `timezone`.
pub fn now_in_timezone<C: Clock>(clock: &C, timezone: &str) -> Result<DateTime<Tz>> {
    let tz = parse_timezone(timezone)?;
    Ok(clock.now().with_timezone(&tz))
}

/// Civil date of the current instant in `timezone`.
pub fn today_in_timezone<C: Clock>(clock: &C, timezone: &str) -> Result<NaiveDate> {
    Ok(now_in_timezone(clock, timezone)?.date_naive())
}

/// Civil date of `instant` in `timezone`, as `YYYY-MM-DD`.
pub fn format_in_timezone(instant: DateTime<Utc>, timezone: &str) -> Result<String> {
    let tz = parse_timezone(timezone)?;
    Ok(crate::format::format_date(
        instant.with_timezone(&tz).date_naive(),
    ))
}

/// `instant` in `timezone` as RFC 3339 with milliseconds and numeric offset,
/// e.g. `2024-12-03T10:30:00.000-05:00`.
pub fn format_iso_in_timezone(instant: DateTime<Utc>, timezone: &str) -> Result<String> {
    let tz = parse_timezone(timezone)?;
    Ok(format_iso(&instant.with_timezone(&tz)))
}

/// Civil time as RFC 3339 with milliseconds and numeric offset.
pub fn format_iso(local: &DateTime<Tz>) -> String {
    local.to_rfc3339_opts(SecondsFormat::Millis, false)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn instant(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).single().unwrap()
    }

    #[test]
    fn test_parse_timezone() {
        assert!(parse_timezone("America/New_York").is_ok());
        assert!(parse_timezone("UTC").is_ok());
        assert!(parse_timezone("America/Argentina/Buenos_Aires").is_ok());

        let err = parse_timezone("Mars/Olympus_Mons").unwrap_err();
        assert_eq!(err.kind(), "InvalidTimezone");
        assert!(!is_valid_timezone(""));
    }

    #[test]
    fn test_fixed_clock() {
        let now = instant(2024, 12, 3, 15, 30);
        let clock = FixedClock(now);
        assert_eq!(clock.now(), now);
        assert_eq!((&clock).now(), now);

        let shared: SharedClock = Arc::new(clock);
        assert_eq!(shared.now(), now);
        assert_eq!(today_in_timezone(&shared, "UTC").unwrap(), now.date_naive());
    }

    #[test]
    fn test_today_differs_across_day_boundary() {
        // 03:30 UTC is still the previous evening in New York
        let clock = FixedClock(instant(2024, 12, 4, 3, 30));

        assert_eq!(
            today_in_timezone(&clock, "UTC").unwrap(),
            NaiveDate::from_ymd_opt(2024, 12, 4).unwrap()
        );
        assert_eq!(
            today_in_timezone(&clock, "America/New_York").unwrap(),
            NaiveDate::from_ymd_opt(2024, 12, 3).unwrap()
        );
        assert_eq!(
            today_in_timezone(&clock, "Asia/Tokyo").unwrap(),
            NaiveDate::from_ymd_opt(2024, 12, 4).unwrap()
        );
    }

    #[test]
    fn test_now_in_timezone_invalid() {
        let clock = FixedClock(instant(2024, 1, 1, 0, 0));
        assert!(now_in_timezone(&clock, "Not/AZone").is_err());
    }

    #[test]
    fn test_format_in_timezone() {
        let at = instant(2024, 12, 4, 3, 30);
        assert_eq!(format_in_timezone(at, "UTC").unwrap(), "2024-12-04");
        assert_eq!(format_in_timezone(at, "America/New_York").unwrap(), "2024-12-03");
    }

    #[test]
    fn test_format_iso_in_timezone() {
        let at = instant(2024, 12, 3, 15, 30);
        assert_eq!(
            format_iso_in_timezone(at, "America/New_York").unwrap(),
            "2024-12-03T10:30:00.000-05:00"
        );
        assert_eq!(
            format_iso_in_timezone(at, "UTC").unwrap(),
            "2024-12-03T15:30:00.000+00:00"
        );
        assert!(format_iso_in_timezone(at, "Nowhere").is_err());

        let tokyo = at.with_timezone(&parse_timezone("Asia/Tokyo").unwrap());
        assert_eq!(format_iso(&tokyo), "2024-12-04T00:30:00.000+09:00");
    }
}
