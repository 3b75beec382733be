use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// MMWR epidemiological week calendar.
#[derive(Parser)]
#[command(
    name = "epiweek",
    version,
    about = "MMWR epidemiological week converter and calendar"
)]
pub struct Cli {
    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Path to TOML configuration file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Subcommand to run. Opens the terminal calendar when omitted.
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available subcommands.
#[derive(Subcommand)]
pub enum Command {
    /// Convert a date (YYYY-MM-DD) to its epiweek.
    Date(DateArgs),
    /// Show the seven dates of an epiweek (YYYYWW).
    Week(WeekArgs),
    /// List every epiweek touched by a date range.
    Range(RangeArgs),
    /// Show the current epiweek.
    Current(CurrentArgs),
    /// Print a year or month calendar with epiweek numbers.
    Calendar(CalendarArgs),
    /// Generate static HTML year pages.
    BuildStatic(BuildStaticArgs),
    /// Browse the calendar in the terminal.
    Ui(UiArgs),
}

#[derive(clap::Args)]
pub struct DateArgs {
    /// Date in YYYY-MM-DD format.
    pub date: String,

    /// Print the JSON response instead of text.
    #[arg(long)]
    pub json: bool,
}

#[derive(clap::Args)]
pub struct WeekArgs {
    /// Epiweek in YYYYWW format.
    pub epiweek: String,

    #[arg(long)]
    pub json: bool,
}

#[derive(clap::Args)]
pub struct RangeArgs {
    /// First date, YYYY-MM-DD.
    pub start: String,

    /// Last date (inclusive), YYYY-MM-DD.
    pub end: String,

    #[arg(long)]
    pub json: bool,
}

#[derive(clap::Args)]
pub struct CurrentArgs {
    /// IANA timezone; defaults to the configured one.
    #[arg(short, long)]
    pub timezone: Option<String>,

    #[arg(long)]
    pub json: bool,
}

#[derive(clap::Args)]
pub struct CalendarArgs {
    /// Four-digit year.
    pub year: String,

    /// Month 1-12. Prints the whole year when omitted.
    #[arg(short, long)]
    pub month: Option<String>,

    #[arg(short, long)]
    pub timezone: Option<String>,

    #[arg(long)]
    pub json: bool,
}

#[derive(clap::Args)]
pub struct BuildStaticArgs {
    /// Override the output directory from config.
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Center year. Defaults to the current year.
    #[arg(short, long)]
    pub year: Option<i32>,

    #[arg(short, long)]
    pub timezone: Option<String>,
}

#[derive(clap::Args, Default)]
pub struct UiArgs {
    /// Year to open. Defaults to the current year.
    #[arg(short, long)]
    pub year: Option<i32>,

    #[arg(short, long)]
    pub timezone: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand() {
        let cli = Cli::try_parse_from(["epiweek"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["epiweek", "date", "2024-12-03", "-vv", "--config", "e.toml"])
            .unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.config, Some(PathBuf::from("e.toml")));
        match cli.command {
            Some(Command::Date(args)) => {
                assert_eq!(args.date, "2024-12-03");
                assert!(!args.json);
            }
            _ => panic!("expected date subcommand"),
        }
    }

    #[test]
    fn test_calendar_args() {
        let cli =
            Cli::try_parse_from(["epiweek", "calendar", "2024", "--month", "12", "--json"]).unwrap();
        match cli.command {
            Some(Command::Calendar(args)) => {
                assert_eq!(args.year, "2024");
                assert_eq!(args.month.as_deref(), Some("12"));
                assert!(args.json);
            }
            _ => panic!("expected calendar subcommand"),
        }
    }

    #[test]
    fn test_build_static_args() {
        let cli = Cli::try_parse_from(["epiweek", "build-static", "--out", "site", "--year", "2030"])
            .unwrap();
        match cli.command {
            Some(Command::BuildStatic(args)) => {
                assert_eq!(args.out, Some(PathBuf::from("site")));
                assert_eq!(args.year, Some(2030));
            }
            _ => panic!("expected build-static subcommand"),
        }
    }
}
