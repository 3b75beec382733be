// ⚠️ Error Types - one kind per failure the engine or the API layer reports
// Every error is local and recoverable; callers map `kind()` to a response.

use thiserror::Error;

/// Error type for every fallible operation in the crate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EpiweekError {
    /// Malformed date string or a date that does not exist in the calendar.
    #[error("Invalid date: {input}. Expected YYYY-MM-DD format (e.g., 2024-12-03)")]
    InvalidDate { input: String },

    /// Epiweek string not made of exactly six digits.
    #[error("Invalid epiweek format: {input}. Expected YYYYWW format (e.g., 202449)")]
    InvalidEpiweekFormat { input: String },

    #[error("Invalid year: {year}. Must be between {min} and {max}")]
    InvalidYear { year: String, min: i32, max: i32 },

    /// Week outside 1-53, or beyond the number of weeks the year actually has.
    #[error("Invalid week: {week}. Epiweek year {year} has weeks 1 to {max_week}")]
    InvalidWeek { year: i32, week: i64, max_week: u32 },

    #[error("Invalid month: {month}. Must be between 1 and 12")]
    InvalidMonth { month: String },

    #[error("Invalid timezone: {timezone}")]
    InvalidTimezone { timezone: String },

    #[error("Invalid range: start date {start} must be before or equal to end date {end}")]
    InvalidRange { start: String, end: String },

    #[error("Ambiguous parameters: provide only ONE of \"date\", \"epiweek\", or \"year+week\" (not multiple)")]
    AmbiguousParameters,

    #[error("{message}")]
    InvalidParameters { message: String },

    #[error("Invalid batch: {count} dates supplied, expected between 1 and {max}")]
    InvalidBatch { count: usize, max: usize },

    /// A page template failed to render.
    #[error("failed to render page: {message}")]
    Render { message: String },

    /// Date arithmetic left chrono's representable range. Never user input.
    #[error("date arithmetic out of range: {context}")]
    DateArithmetic { context: String },
}

impl EpiweekError {
    /// Stable machine-readable code for this error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            EpiweekError::InvalidDate { .. } => "InvalidDate",
            EpiweekError::InvalidEpiweekFormat { .. } => "InvalidEpiweekFormat",
            EpiweekError::InvalidYear { .. } => "InvalidYear",
            EpiweekError::InvalidWeek { .. } => "InvalidWeek",
            EpiweekError::InvalidMonth { .. } => "InvalidMonth",
            EpiweekError::InvalidTimezone { .. } => "InvalidTimezone",
            EpiweekError::InvalidRange { .. } => "InvalidRange",
            EpiweekError::AmbiguousParameters => "AmbiguousParameters",
            EpiweekError::InvalidParameters { .. } => "InvalidParameters",
            EpiweekError::InvalidBatch { .. } => "InvalidBatch",
            EpiweekError::Render { .. } => "Render",
            EpiweekError::DateArithmetic { .. } => "DateArithmetic",
        }
    }

    pub(crate) fn arithmetic(context: impl Into<String>) -> Self {
        EpiweekError::DateArithmetic {
            context: context.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EpiweekError>;

// ============================================================================
// TESTS
// ============================================================================
