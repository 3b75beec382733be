// 🖼️ Rendering - HTML year pages and plain-text month tables
// Both read the grid flags directly; nothing here computes an epiweek.
// HTML lives in templates/ (year.html, month_card.html, client_script.html).

use askama::Template;

use crate::calendar::{MonthGrid, YearGrid};
use crate::epiweek::{MAX_YEAR, MIN_YEAR};
use crate::error::{EpiweekError, Result};
use std::fmt::Write;

const WEEKDAY_HEADERS: [&str; 8] = ["Wk", "Su", "Mo", "Tu", "We", "Th", "Fr", "Sa"];

/// Years offered by the header select on each side of the page year.
pub const YEAR_SELECT_SPAN: i32 = 10;

// ============================================================================
// HTML
// ============================================================================

/// Entry in the header year select.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearOption {
    pub year: i32,
    pub selected: bool,
}

/// Full year page: header navigation, twelve month cards, toast and the
/// client script.
#[derive(Template)]
#[template(path = "year.html")]
pub struct YearPageTemplate<'a> {
    grid: &'a YearGrid,
    year_options: Vec<YearOption>,
    prev_year: Option<i32>,
    next_year: Option<i32>,
    /// Set on the static index page only.
    redirect_year: Option<i32>,
}

impl<'a> YearPageTemplate<'a> {
    pub fn new(grid: &'a YearGrid) -> Self {
        let year = grid.year;
        Self {
            grid,
            year_options: year_options(year),
            prev_year: (year > MIN_YEAR).then_some(year - 1),
            next_year: (year < MAX_YEAR).then_some(year + 1),
            redirect_year: None,
        }
    }

    /// Send browsers whose current year differs from the page year to
    /// `/<current year>`.
    pub fn with_redirect(mut self) -> Self {
        self.redirect_year = Some(self.grid.year);
        self
    }
}

/// One month card: epiweek column followed by Sunday..Saturday.
#[derive(Template)]
#[template(path = "month_card.html")]
pub struct MonthCardTemplate<'a> {
    month: &'a MonthGrid,
}

/// `year - 10 ..= year + 10`, clamped to the supported range.
pub fn year_options(year: i32) -> Vec<YearOption> {
    let first = (year - YEAR_SELECT_SPAN).max(MIN_YEAR);
    let last = (year + YEAR_SELECT_SPAN).min(MAX_YEAR);
    (first..=last)
        .map(|y| YearOption {
            year: y,
            selected: y == year,
        })
        .collect()
}

fn render_template<T: Template>(template: &T) -> Result<String> {
    template.render().map_err(|e| EpiweekError::Render {
        message: e.to_string(),
    })
}

/// Complete HTML document for one year.
pub fn year_page_html(grid: &YearGrid) -> Result<String> {
    render_template(&YearPageTemplate::new(grid))
}

/// Year page that also redirects stale visitors to their current year.
pub fn index_page_html(grid: &YearGrid) -> Result<String> {
    render_template(&YearPageTemplate::new(grid).with_redirect())
}

pub fn month_card_html(month: &MonthGrid) -> Result<String> {
    render_template(&MonthCardTemplate { month })
}

// ============================================================================
// TEXT
// ============================================================================

/// Plain-text month table. Days outside the month are blank, today is
/// bracketed.
pub fn month_text(month: &MonthGrid) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "{:^36}", month.name);
    let _ = writeln!(out, " {}", WEEKDAY_HEADERS.map(|h| format!("{:>3}", h)).join(" "));

    for week in &month.weeks {
        let _ = write!(out, " {:>3}", week.epiweek.week());
        for day in &week.days {
            let cell = if !day.is_current_month {
                String::new()
            } else if day.is_today {
                format!("[{}]", day.day_number)
            } else {
                day.day_number.to_string()
            };
            let _ = write!(out, " {:>3}", cell);
        }
        out.push('\n');
    }

    out
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::{build_month_grid, build_year_grid};
    use chrono::NaiveDate;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_month_card_marks_cells() {
        let grid = build_month_grid(2024, 11, ymd(2024, 12, 3)).unwrap();
        let html = month_card_html(&grid).unwrap();

        assert!(html.contains("<h2>December</h2>"));
        assert!(html.contains("data-epiweek=\"202449\">49</td>"));
        assert!(html.contains("data-epiweek=\"202501\">1</td>"));
        assert!(html.contains("<td class=\"day-cell today\" data-date=\"2024-12-03\">3</td>"));
        assert!(html.contains("<td class=\"day-cell\" data-date=\"2024-12-04\">4</td>"));
        assert!(html.contains("<td class=\"day-cell outside\" data-date=\"2025-01-04\">4</td>"));
        assert_eq!(html.matches("<tr><td class=\"epiweek-cell\"").count(), grid.weeks.len());
    }

    #[test]
    fn test_year_page_has_all_months() {
        let grid = build_year_grid(2024, ymd(2024, 12, 3)).unwrap();
        let html = year_page_html(&grid).unwrap();

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>Epiweek Calendar 2024</title>"));
        assert_eq!(html.matches("<section class=\"month\">").count(), 12);
        assert_eq!(html.matches("class=\"day-cell today\"").count(), 1);
        assert!(html.contains("href=\"/2023\""));
        assert!(html.contains("href=\"/2025\""));
        assert!(html.contains("52 MMWR epiweeks in 2024"));
        assert!(!html.contains("var pageYear"));
    }

    #[test]
    fn test_year_page_carries_client_script() {
        let html = year_page_html(&build_year_grid(2024, ymd(2024, 12, 3)).unwrap()).unwrap();

        assert!(html.contains("highlightToday();"));
        assert!(html.contains("document.execCommand('copy')"));
        assert!(html.contains("<div id=\"toast\" class=\"toast\" hidden></div>"));
        assert!(html.contains("<select id=\"year-select\""));
        assert!(html.contains("<option value=\"2024\" selected>2024</option>"));
        assert!(html.contains("<option value=\"2014\">2014</option>"));
        assert!(html.contains("<option value=\"2034\">2034</option>"));
        assert!(!html.contains("<option value=\"2013\">"));
        assert!(!html.contains("<option value=\"2035\">"));
    }

    #[test]
    fn test_year_options_clamped() {
        let options = year_options(1905);
        assert_eq!(options.first().map(|o| o.year), Some(1900));
        assert_eq!(options.last().map(|o| o.year), Some(1915));
        assert_eq!(options.iter().filter(|o| o.selected).count(), 1);
        assert!(options.iter().any(|o| o.selected && o.year == 1905));

        assert_eq!(year_options(2024).len(), 21);
        assert_eq!(year_options(2100).last().map(|o| o.year), Some(2100));
    }

    #[test]
    fn test_index_page_redirect_precedes_content() {
        let grid = build_year_grid(2024, ymd(2024, 12, 3)).unwrap();
        let html = index_page_html(&grid).unwrap();

        let redirect = html.find("var pageYear = 2024;").unwrap();
        assert!(redirect < html.find("<title>").unwrap());
        assert!(html.contains("<head>\n<script>"));
        assert!(html.contains("highlightToday();"));
    }

    #[test]
    fn test_year_page_navigation_stops_at_bounds() {
        let html = year_page_html(&build_year_grid(2100, ymd(2024, 1, 1)).unwrap()).unwrap();
        assert!(!html.contains("id=\"next-year\""));
        assert!(html.contains("href=\"/2099\""));

        let html = year_page_html(&build_year_grid(1900, ymd(2024, 1, 1)).unwrap()).unwrap();
        assert!(!html.contains("id=\"prev-year\""));
        assert!(html.contains("id=\"next-year\""));
    }

    #[test]
    fn test_month_text() {
        let grid = build_month_grid(2024, 11, ymd(2024, 12, 3)).unwrap();
        let text = month_text(&grid);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0].trim(), "December");
        assert_eq!(lines[1], "  Wk  Su  Mo  Tu  We  Th  Fr  Sa");
        assert_eq!(lines[2], "  49   1   2 [3]   4   5   6   7");
        // Last row spills into January 2025
        assert_eq!(lines[6], "   1  29  30  31                ");
        assert_eq!(lines.len(), 2 + grid.weeks.len());
    }
}
