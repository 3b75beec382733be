// 📦 Static Site - pre-rendered year pages for hosting without a server
//
// Layout:
//   <output_dir>/index.html          center year, redirects when stale
//   <output_dir>/<year>/index.html   one page per year in the span

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::calendar::CalendarGenerator;
use crate::clock::Clock;
use crate::config::StaticSiteConfig;
use crate::epiweek::{validate_year, MAX_YEAR, MIN_YEAR};
use crate::render::{index_page_html, year_page_html};

/// Years to generate: `center - before ..= center + after`, clamped to the
/// supported range.
pub fn year_span(center_year: i32, years_before: u16, years_after: u16) -> std::ops::RangeInclusive<i32> {
    let first = (center_year - i32::from(years_before)).max(MIN_YEAR);
    let last = (center_year + i32::from(years_after)).min(MAX_YEAR);
    first..=last
}

/// Write the index page plus one page per year. Returns every file written,
/// index first.
pub fn build<C: Clock>(
    generator: &CalendarGenerator<C>,
    config: &StaticSiteConfig,
    center_year: i32,
    timezone: &str,
) -> Result<Vec<PathBuf>> {
    let center_year = validate_year(i64::from(center_year))?;
    let out_dir = config.output_dir.as_path();

    fs::create_dir_all(out_dir)
        .with_context(|| format!("failed to create output directory: {}", out_dir.display()))?;
    info!(dir = %out_dir.display(), center_year, "generating static calendar pages");

    let mut written = Vec::new();

    let center_grid = generator.year_grid(center_year, timezone)?;
    // The index redirects browsers once the generated site is out of date
    let index_html = index_page_html(&center_grid)?;
    let index_path = out_dir.join("index.html");
    write_page(&index_path, &index_html)?;
    info!(path = %index_path.display(), year = center_year, "generated /");
    written.push(index_path);

    for year in year_span(center_year, config.years_before, config.years_after) {
        let grid = generator.year_grid(year, timezone)?;
        let year_dir = out_dir.join(year.to_string());
        fs::create_dir_all(&year_dir)
            .with_context(|| format!("failed to create directory: {}", year_dir.display()))?;

        let path = year_dir.join("index.html");
        write_page(&path, &year_page_html(&grid)?)?;
        info!(path = %path.display(), "generated /{}", year);
        written.push(path);
    }

    info!(pages = written.len(), "static site complete");
    Ok(written)
}

fn write_page(path: &Path, html: &str) -> Result<()> {
    debug!(bytes = html.len(), path = %path.display(), "writing page");
    fs::write(path, html).with_context(|| format!("failed to write {}", path.display()))
}

// ============================================================================
// TESTS
// ============================================================================
