mod cli;

// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use std::process;

use anyhow::Result;
use chrono::Datelike;
use clap::Parser;
use serde::Serialize;
use tracing::{debug, info};

use epiweek_calendar::api::{ConversionResponse, EpiweekQuery, RangeQuery};
use epiweek_calendar::clock::today_in_timezone;
use epiweek_calendar::render::month_text;
use epiweek_calendar::{logging, static_site, AppConfig, ApiService, SystemClock};

use crate::cli::{
    BuildStaticArgs, CalendarArgs, Cli, Command, CurrentArgs, DateArgs, RangeArgs, UiArgs, WeekArgs,
};

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = AppConfig::load(cli.config.as_deref())?;
    debug!(?config, "configuration loaded");
    let service = ApiService::new(&config.server.default_timezone)?;

    match cli.command {
        Some(Command::Date(args)) => run_date(&service, args),
        Some(Command::Week(args)) => run_week(&service, args),
        Some(Command::Range(args)) => run_range(&service, args),
        Some(Command::Current(args)) => run_current(&service, args),
        Some(Command::Calendar(args)) => run_calendar(&service, args),
        Some(Command::BuildStatic(args)) => run_build_static(&service, &config, args),
        Some(Command::Ui(args)) => run_ui_mode(&service, args),
        None => run_ui_mode(&service, UiArgs::default()),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn run_date(service: &ApiService, args: DateArgs) -> Result<()> {
    let query = EpiweekQuery {
        date: Some(args.date),
        ..EpiweekQuery::default()
    };
    let response = service.convert(&query)?;
    if args.json {
        return print_json(&response);
    }

    if let ConversionResponse::FromDate(r) = response {
        println!(
            "{} -> epiweek {} (year {}, week {})",
            r.date,
            r.epiweek,
            r.epiweek.year(),
            r.epiweek.week()
        );
    }
    Ok(())
}

fn run_week(service: &ApiService, args: WeekArgs) -> Result<()> {
    let response = service.week_details(&args.epiweek)?;
    if args.json {
        return print_json(&response);
    }

    println!(
        "Epiweek {}: {} to {}",
        response.epiweek, response.date_range.start, response.date_range.end
    );
    for day in &response.days {
        println!("  {} {}", day.date, day.day_of_week);
    }
    Ok(())
}

fn run_range(service: &ApiService, args: RangeArgs) -> Result<()> {
    let query = RangeQuery {
        start: args.start,
        end: args.end,
        timezone: None,
    };
    let response = service.range(&query)?;
    if args.json {
        return print_json(&response);
    }

    println!(
        "{} to {}: {} epiweeks",
        response.start, response.end, response.total_weeks
    );
    for epiweek in &response.epiweeks {
        println!("  {}", epiweek);
    }
    Ok(())
}

fn run_current(service: &ApiService, args: CurrentArgs) -> Result<()> {
    let response = service.current(args.timezone.as_deref())?;
    if args.json {
        return print_json(&response);
    }

    println!(
        "Epiweek {} ({} in {})",
        response.epiweek, response.date, response.timezone
    );
    Ok(())
}

fn run_calendar(service: &ApiService, args: CalendarArgs) -> Result<()> {
    let timezone = args.timezone.as_deref();

    if let Some(month) = args.month.as_deref() {
        let response = service.month_calendar(&args.year, month, timezone)?;
        if args.json {
            return print_json(&response);
        }
        let month_grid = service.generator().month_grid(
            response.year,
            response.month - 1,
            timezone.unwrap_or(service.default_timezone()),
        )?;
        println!("{}", response.year);
        print!("{}", month_text(&month_grid));
        return Ok(());
    }

    let grid = service.year_calendar(&args.year, timezone)?;
    if args.json {
        return print_json(&grid);
    }

    println!("{} ({} epiweeks)", grid.year, grid.total_distinct_epiweeks);
    for month in &grid.months {
        println!();
        print!("{}", month_text(month));
    }
    Ok(())
}

fn run_build_static(service: &ApiService, config: &AppConfig, args: BuildStaticArgs) -> Result<()> {
    let timezone = args
        .timezone
        .unwrap_or_else(|| service.default_timezone().to_string());
    let center_year = match args.year {
        Some(year) => year,
        None => today_in_timezone(&SystemClock, &timezone)?.year(),
    };

    let mut site_config = config.static_site.clone();
    if let Some(out) = args.out {
        site_config.output_dir = out;
    }

    info!(center_year, %timezone, "building static site");
    println!("📦 Generating static calendar pages...");
    let written = static_site::build(service.generator(), &site_config, center_year, &timezone)?;
    println!(
        "✅ Generated {} pages in {}",
        written.len(),
        site_config.output_dir.display()
    );
    Ok(())
}

#[cfg(feature = "tui")]
fn run_ui_mode(service: &ApiService, args: UiArgs) -> Result<()> {
    let timezone = args
        .timezone
        .unwrap_or_else(|| service.default_timezone().to_string());
    let today = today_in_timezone(&SystemClock, &timezone)?;
    let year = args.year.unwrap_or_else(|| today.year());
    info!(year, %timezone, "opening terminal calendar");

    let mut app = ui::App::new(year, today, timezone)?;
    ui::run_ui(&mut app)
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(_service: &ApiService, _args: UiArgs) -> Result<()> {
    eprintln!("❌ TUI mode not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    eprintln!("   Or use the web calendar: cargo run --bin epiweek-server --features server");
    process::exit(1);
}
