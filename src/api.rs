// 🌐 API Service - request validation and response shapes
//
// Transport-agnostic: the axum server and the CLI both call into
// `ApiService` and serialize what it returns. Raw request strings are
// validated here so the engine only ever sees well-formed values.

use crate::calendar::{CalendarGenerator, WeekRow, YearGrid};
use crate::clock::{format_iso, now_in_timezone, parse_timezone, Clock, SystemClock};
use crate::epiweek::{
    date_to_epiweek, parse_epiweek, validate_year, Epiweek, EpiweekDates, MAX_WEEK, MAX_YEAR,
    MIN_YEAR,
};
use crate::error::{EpiweekError, Result};
use crate::format::{day_of_week_name, parse_date};
use crate::range::epiweeks_in_range;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Most dates accepted by one batch conversion.
pub const MAX_BATCH_SIZE: usize = 1000;

// ============================================================================
// REQUESTS
// ============================================================================

/// Query for the smart conversion endpoint. Exactly one of `date`,
/// `epiweek`, or `year` + `week` must be present.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EpiweekQuery {
    pub date: Option<String>,
    pub epiweek: Option<String>,
    pub year: Option<String>,
    pub week: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BatchConversionRequest {
    pub dates: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RangeQuery {
    pub start: String,
    pub end: String,
    pub timezone: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TimezoneQuery {
    pub timezone: Option<String>,
}

/// Which direction a conversion query asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionMode {
    FromDate { input: String, date: NaiveDate },
    FromEpiweek(Epiweek),
    FromYearWeek(Epiweek),
}

impl ConversionMode {
    pub fn resolve(query: &EpiweekQuery) -> Result<Self> {
        let has_date = query.date.is_some();
        let has_epiweek = query.epiweek.is_some();
        let has_year_week = query.year.is_some() && query.week.is_some();
        let has_partial_year_week = query.year.is_some() != query.week.is_some();

        let modes = [has_date, has_epiweek, has_year_week]
            .iter()
            .filter(|m| **m)
            .count();

        if modes > 1 {
            return Err(EpiweekError::AmbiguousParameters);
        }
        if has_partial_year_week {
            return Err(EpiweekError::InvalidParameters {
                message: "Both \"year\" and \"week\" parameters are required when using year+week format"
                    .to_string(),
            });
        }

        match (&query.date, &query.epiweek, &query.year, &query.week) {
            (Some(input), _, _, _) => Ok(ConversionMode::FromDate {
                input: input.clone(),
                date: parse_date(input)?,
            }),
            (_, Some(epiweek), _, _) => Ok(ConversionMode::FromEpiweek(parse_epiweek(epiweek)?)),
            (_, _, Some(year), Some(week)) => {
                Ok(ConversionMode::FromYearWeek(parse_year_week(year, week)?))
            }
            _ => Err(EpiweekError::InvalidParameters {
                message: "You must provide either \"date\" OR \"epiweek\" OR \"year+week\" parameters"
                    .to_string(),
            }),
        }
    }
}

/// Year must be four digits, week one or two.
fn parse_year_week(year: &str, week: &str) -> Result<Epiweek> {
    let year = parse_year(year)?;

    let week_number = if (1..=2).contains(&week.len()) && week.bytes().all(|b| b.is_ascii_digit()) {
        week.parse::<u32>().ok()
    } else {
        None
    };
    match week_number {
        Some(w) if w <= MAX_WEEK => Epiweek::new(year, w),
        _ => Err(EpiweekError::InvalidParameters {
            message: format!("Invalid week: {}. Must be a number between 1 and {}", week, MAX_WEEK),
        }),
    }
}

/// Parse and bound-check a year given as text.
pub fn parse_year(input: &str) -> Result<i32> {
    let invalid = || EpiweekError::InvalidYear {
        year: input.to_string(),
        min: MIN_YEAR,
        max: MAX_YEAR,
    };
    if input.len() != 4 || !input.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    let year: i64 = input.parse().map_err(|_| invalid())?;
    validate_year(year)
}

/// Parse a 1-12 month given as text.
pub fn parse_month(input: &str) -> Result<u32> {
    if !(1..=2).contains(&input.len()) || !input.bytes().all(|b| b.is_ascii_digit()) {
        return Err(EpiweekError::InvalidMonth {
            month: input.to_string(),
        });
    }
    match input.parse::<u32>() {
        Ok(m) if (1..=12).contains(&m) => Ok(m),
        _ => Err(EpiweekError::InvalidMonth {
            month: input.to_string(),
        }),
    }
}

// ============================================================================
// RESPONSES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayInfo {
    pub date: NaiveDate,
    pub day_of_week: &'static str,
    /// Position within the week, 1 = Sunday.
    pub day_number: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DateToEpiweekResponse {
    pub date: String,
    pub epiweek: Epiweek,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EpiweekDatesResponse {
    pub epiweek: Epiweek,
    pub date_range: DateRange,
    pub days: Vec<DayInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ConversionResponse {
    FromDate(DateToEpiweekResponse),
    FromEpiweek(EpiweekDatesResponse),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchConversionResponse {
    pub conversions: Vec<DateToEpiweekResponse>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekDetailsResponse {
    pub epiweek: String,
    pub year: i32,
    pub week: u32,
    pub date_range: DateRange,
    pub days: Vec<DayInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CurrentEpiweekResponse {
    /// Current instant, ISO 8601 with offset.
    pub date: String,
    pub timezone: String,
    pub epiweek: Epiweek,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeResponse {
    pub start: String,
    pub end: String,
    pub timezone: String,
    pub epiweeks: Vec<Epiweek>,
    pub total_weeks: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthCalendarResponse {
    pub year: i32,
    pub month: u32,
    pub month_name: &'static str,
    pub weeks: Vec<WeekRow>,
}

/// Body returned for every failed request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl From<&EpiweekError> for ErrorResponse {
    fn from(err: &EpiweekError) -> Self {
        ErrorResponse {
            error: err.kind().to_string(),
            message: err.to_string(),
        }
    }
}

fn day_infos(dates: &EpiweekDates) -> Vec<DayInfo> {
    dates
        .days
        .iter()
        .zip(1..)
        .map(|(date, position)| DayInfo {
            date: *date,
            day_of_week: day_of_week_name(date.weekday()),
            day_number: position,
        })
        .collect()
}

fn dates_response(epiweek: Epiweek) -> Result<EpiweekDatesResponse> {
    let dates = epiweek.dates()?;
    Ok(EpiweekDatesResponse {
        epiweek,
        date_range: DateRange {
            start: dates.start,
            end: dates.end,
        },
        days: day_infos(&dates),
    })
}

// ============================================================================
// SERVICE
// ============================================================================

/// Entry point for every API operation.
#[derive(Debug, Clone)]
pub struct ApiService<C: Clock = SystemClock> {
    generator: CalendarGenerator<C>,
    default_timezone: String,
}

impl ApiService<SystemClock> {
    pub fn new(default_timezone: &str) -> Result<Self> {
        ApiService::with_clock(SystemClock, default_timezone)
    }
}

impl<C: Clock> ApiService<C> {
    pub fn with_clock(clock: C, default_timezone: &str) -> Result<Self> {
        parse_timezone(default_timezone)?;
        Ok(ApiService {
            generator: CalendarGenerator::with_clock(clock),
            default_timezone: default_timezone.to_string(),
        })
    }

    pub fn default_timezone(&self) -> &str {
        &self.default_timezone
    }

    pub fn generator(&self) -> &CalendarGenerator<C> {
        &self.generator
    }

    fn resolve_timezone(&self, timezone: Option<&str>) -> Result<String> {
        let timezone = timezone.unwrap_or(&self.default_timezone);
        parse_timezone(timezone)?;
        Ok(timezone.to_string())
    }

    /// Date -> epiweek, or epiweek -> dates, depending on the query.
    pub fn convert(&self, query: &EpiweekQuery) -> Result<ConversionResponse> {
        match ConversionMode::resolve(query)? {
            ConversionMode::FromDate { input, date } => {
                Ok(ConversionResponse::FromDate(DateToEpiweekResponse {
                    date: input,
                    epiweek: date_to_epiweek(date),
                }))
            }
            ConversionMode::FromEpiweek(epiweek) | ConversionMode::FromYearWeek(epiweek) => {
                Ok(ConversionResponse::FromEpiweek(dates_response(epiweek)?))
            }
        }
    }

    /// Convert up to `MAX_BATCH_SIZE` dates. One bad date fails the batch.
    pub fn convert_batch(&self, request: &BatchConversionRequest) -> Result<BatchConversionResponse> {
        let count = request.dates.len();
        if count == 0 || count > MAX_BATCH_SIZE {
            return Err(EpiweekError::InvalidBatch {
                count,
                max: MAX_BATCH_SIZE,
            });
        }

        let conversions = request
            .dates
            .iter()
            .map(|input| {
                Ok(DateToEpiweekResponse {
                    date: input.clone(),
                    epiweek: date_to_epiweek(parse_date(input)?),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(BatchConversionResponse { conversions })
    }

    /// Details of one `YYYYWW` epiweek.
    pub fn week_details(&self, epiweek: &str) -> Result<WeekDetailsResponse> {
        let parsed = parse_epiweek(epiweek)?;
        let dates = parsed.dates()?;

        Ok(WeekDetailsResponse {
            epiweek: parsed.to_string(),
            year: parsed.year(),
            week: parsed.week(),
            date_range: DateRange {
                start: dates.start,
                end: dates.end,
            },
            days: day_infos(&dates),
        })
    }

    /// The epiweek containing "now" in `timezone`.
    pub fn current(&self, timezone: Option<&str>) -> Result<CurrentEpiweekResponse> {
        let timezone = self.resolve_timezone(timezone)?;
        // One clock reading feeds both the timestamp and the epiweek
        let local = now_in_timezone(self.generator.clock(), &timezone)?;

        Ok(CurrentEpiweekResponse {
            date: format_iso(&local),
            epiweek: date_to_epiweek(local.date_naive()),
            timezone,
        })
    }

    /// Every epiweek between two dates, inclusive.
    pub fn range(&self, query: &RangeQuery) -> Result<RangeResponse> {
        let timezone = self.resolve_timezone(query.timezone.as_deref())?;
        let start = parse_date(&query.start)?;
        let end = parse_date(&query.end)?;
        let epiweeks = epiweeks_in_range(start, end)?;

        Ok(RangeResponse {
            start: query.start.clone(),
            end: query.end.clone(),
            timezone,
            total_weeks: epiweeks.len(),
            epiweeks,
        })
    }

    pub fn year_calendar(&self, year: &str, timezone: Option<&str>) -> Result<YearGrid> {
        let year = parse_year(year)?;
        let timezone = self.resolve_timezone(timezone)?;
        self.generator.year_grid(year, &timezone)
    }

    pub fn month_calendar(
        &self,
        year: &str,
        month: &str,
        timezone: Option<&str>,
    ) -> Result<MonthCalendarResponse> {
        let year = parse_year(year)?;
        let month = parse_month(month)?;
        let timezone = self.resolve_timezone(timezone)?;
        let grid = self.generator.month_grid(year, month - 1, &timezone)?;

        Ok(MonthCalendarResponse {
            year,
            month,
            month_name: grid.name,
            weeks: grid.weeks,
        })
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use chrono::{TimeZone, Utc};

    fn service() -> ApiService<FixedClock> {
        let now = Utc.with_ymd_and_hms(2024, 12, 3, 15, 30, 0).single().unwrap();
        ApiService::with_clock(FixedClock(now), "America/New_York").unwrap()
    }

    fn query(date: Option<&str>, epiweek: Option<&str>, year: Option<&str>, week: Option<&str>) -> EpiweekQuery {
        EpiweekQuery {
            date: date.map(String::from),
            epiweek: epiweek.map(String::from),
            year: year.map(String::from),
            week: week.map(String::from),
        }
    }

    #[test]
    fn test_convert_date() {
        let response = service().convert(&query(Some("2024-12-03"), None, None, None)).unwrap();
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "date": "2024-12-03",
                "epiweek": {"year": 2024, "week": 49, "epiweek": "202449"}
            })
        );
    }

    #[test]
    fn test_convert_epiweek_string_and_year_week_agree() {
        let svc = service();
        let by_string = svc.convert(&query(None, Some("202449"), None, None)).unwrap();
        let by_parts = svc.convert(&query(None, None, Some("2024"), Some("49"))).unwrap();
        assert_eq!(by_string, by_parts);

        let json = serde_json::to_value(&by_string).unwrap();
        assert_eq!(json["dateRange"]["start"], "2024-12-01");
        assert_eq!(json["dateRange"]["end"], "2024-12-07");
        assert_eq!(json["days"][0]["dayOfWeek"], "Sunday");
        assert_eq!(json["days"][0]["dayNumber"], 1);
        assert_eq!(json["days"][6]["dayNumber"], 7);
    }

    #[test]
    fn test_convert_rejects_mode_combinations() {
        let svc = service();
        let err = svc
            .convert(&query(Some("2024-12-03"), Some("202449"), None, None))
            .unwrap_err();
        assert_eq!(err.kind(), "AmbiguousParameters");

        let err = svc
            .convert(&query(Some("2024-12-03"), None, Some("2024"), Some("49")))
            .unwrap_err();
        assert_eq!(err.kind(), "AmbiguousParameters");

        let err = svc.convert(&query(None, None, Some("2024"), None)).unwrap_err();
        assert_eq!(err.kind(), "InvalidParameters");

        let err = svc.convert(&query(None, None, None, None)).unwrap_err();
        assert_eq!(err.kind(), "InvalidParameters");
    }

    #[test]
    fn test_convert_year_week_validation() {
        let svc = service();
        assert_eq!(
            svc.convert(&query(None, None, Some("2023"), Some("53"))).unwrap_err().kind(),
            "InvalidWeek"
        );
        assert_eq!(
            svc.convert(&query(None, None, Some("1800"), Some("1"))).unwrap_err().kind(),
            "InvalidYear"
        );
        assert_eq!(
            svc.convert(&query(None, None, Some("24"), Some("1"))).unwrap_err().kind(),
            "InvalidYear"
        );
        assert_eq!(
            svc.convert(&query(None, None, Some("2024"), Some("123"))).unwrap_err().kind(),
            "InvalidParameters"
        );
        assert!(svc.convert(&query(None, None, Some("2024"), Some("1"))).is_ok());
    }

    #[test]
    fn test_batch() {
        let svc = service();
        let request = BatchConversionRequest {
            dates: vec!["2024-12-03".into(), "2024-01-15".into(), "2024-06-20".into()],
        };
        let response = svc.convert_batch(&request).unwrap();
        let labels: Vec<String> = response
            .conversions
            .iter()
            .map(|c| c.epiweek.to_string())
            .collect();
        assert_eq!(labels, vec!["202449", "202403", "202425"]);

        let empty = BatchConversionRequest { dates: vec![] };
        assert_eq!(svc.convert_batch(&empty).unwrap_err().kind(), "InvalidBatch");

        let too_many = BatchConversionRequest {
            dates: vec!["2024-01-01".to_string(); MAX_BATCH_SIZE + 1],
        };
        assert_eq!(svc.convert_batch(&too_many).unwrap_err().kind(), "InvalidBatch");

        let bad = BatchConversionRequest {
            dates: vec!["2024-01-01".into(), "nope".into()],
        };
        assert_eq!(svc.convert_batch(&bad).unwrap_err().kind(), "InvalidDate");
    }

    #[test]
    fn test_week_details() {
        let details = service().week_details("202001").unwrap();
        assert_eq!(details.epiweek, "202001");
        assert_eq!(details.year, 2020);
        assert_eq!(details.week, 1);
        assert_eq!(details.date_range.start, NaiveDate::from_ymd_opt(2019, 12, 29).unwrap());
        assert_eq!(details.days.len(), 7);

        assert_eq!(service().week_details("2020-1").unwrap_err().kind(), "InvalidEpiweekFormat");
    }

    #[test]
    fn test_current() {
        let svc = service();
        let current = svc.current(None).unwrap();
        assert_eq!(current.timezone, "America/New_York");
        assert_eq!(current.date, "2024-12-03T10:30:00.000-05:00");
        assert_eq!(current.epiweek.to_string(), "202449");

        let tokyo = svc.current(Some("Asia/Tokyo")).unwrap();
        assert_eq!(tokyo.date, "2024-12-04T00:30:00.000+09:00");

        assert_eq!(svc.current(Some("Bad/Zone")).unwrap_err().kind(), "InvalidTimezone");
    }

    /// Advances one second every time it is read.
    struct TickingClock {
        start: chrono::DateTime<Utc>,
        reads: std::sync::atomic::AtomicI64,
    }

    impl Clock for TickingClock {
        fn now(&self) -> chrono::DateTime<Utc> {
            let n = self.reads.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            self.start + chrono::Duration::seconds(n)
        }
    }

    #[test]
    fn test_current_reads_clock_once() {
        // One second before the Saturday -> Sunday epiweek boundary
        let clock = TickingClock {
            start: Utc.with_ymd_and_hms(2024, 12, 7, 23, 59, 59).single().unwrap(),
            reads: std::sync::atomic::AtomicI64::new(0),
        };
        let svc = ApiService::with_clock(clock, "UTC").unwrap();

        let current = svc.current(None).unwrap();
        assert_eq!(current.date, "2024-12-07T23:59:59.000+00:00");
        assert_eq!(current.epiweek.to_string(), "202449");
        assert_eq!(svc.generator().clock().reads.load(std::sync::atomic::Ordering::SeqCst), 1);
    }

    #[test]
    fn test_range() {
        let svc = service();
        let response = svc
            .range(&RangeQuery {
                start: "2024-01-01".into(),
                end: "2024-03-31".into(),
                timezone: None,
            })
            .unwrap();
        assert_eq!(response.total_weeks, response.epiweeks.len());
        assert_eq!(response.total_weeks, 14);
        assert_eq!(response.timezone, "America/New_York");

        let err = svc
            .range(&RangeQuery {
                start: "2024-03-31".into(),
                end: "2024-01-01".into(),
                timezone: Some("UTC".into()),
            })
            .unwrap_err();
        assert_eq!(err.kind(), "InvalidRange");
    }

    #[test]
    fn test_calendars() {
        let svc = service();
        let year = svc.year_calendar("2024", None).unwrap();
        assert_eq!(year.months.len(), 12);
        assert_eq!(year.total_distinct_epiweeks, 52);

        let month = svc.month_calendar("2024", "12", Some("UTC")).unwrap();
        assert_eq!(month.month, 12);
        assert_eq!(month.month_name, "December");
        let json = serde_json::to_value(&month).unwrap();
        assert_eq!(json["monthName"], "December");

        assert_eq!(svc.year_calendar("2101", None).unwrap_err().kind(), "InvalidYear");
        assert_eq!(svc.year_calendar("abc", None).unwrap_err().kind(), "InvalidYear");
        assert_eq!(svc.month_calendar("2024", "13", None).unwrap_err().kind(), "InvalidMonth");
        assert_eq!(svc.month_calendar("2024", "0", None).unwrap_err().kind(), "InvalidMonth");
        assert_eq!(svc.month_calendar("2024", "+5", None).unwrap_err().kind(), "InvalidMonth");
        assert_eq!(svc.month_calendar("2024", "005", None).unwrap_err().kind(), "InvalidMonth");
        assert_eq!(svc.month_calendar("2024", "05", None).unwrap().month, 5);
    }

    #[test]
    fn test_error_response() {
        let err = EpiweekError::AmbiguousParameters;
        let body = ErrorResponse::from(&err);
        assert_eq!(body.error, "AmbiguousParameters");
        assert!(body.message.starts_with("Ambiguous parameters"));
    }

    #[test]
    fn test_service_rejects_bad_default_timezone() {
        assert!(ApiService::new("Nowhere/Special").is_err());
        assert!(ApiService::new("UTC").is_ok());
    }
}
