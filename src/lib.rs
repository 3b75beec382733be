// Epiweek Calendar - Core Library
// Exposes all modules for use in CLI, API server, and tests

pub mod error;
pub mod format;
pub mod clock;
pub mod epiweek;       // MMWR week arithmetic
pub mod range;         // Date range -> epiweek enumeration
pub mod calendar;      // Year/month grids
pub mod api;           // Request validation + response shaping
pub mod render;        // HTML and text views of the grids
pub mod static_site;   // Pre-rendered year pages
pub mod config;
pub mod logging;

// Re-export commonly used types
pub use error::{EpiweekError, Result};
pub use epiweek::{
    Epiweek, EpiweekDates,
    date_to_epiweek, epiweek_to_date_range, parse_epiweek,
    weeks_in_epiweek_year, epiweek_year_start,
    MIN_YEAR, MAX_YEAR, MAX_WEEK,
};
pub use range::{epiweeks_in_range, epiweeks_in_range_by_day};
pub use clock::{Clock, SystemClock, FixedClock, SharedClock, DEFAULT_TIMEZONE};
pub use calendar::{
    CalendarGenerator, DayCell, WeekRow, MonthGrid, YearGrid,
    build_month_grid, build_year_grid,
};
pub use api::{ApiService, ErrorResponse};
pub use config::AppConfig;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
