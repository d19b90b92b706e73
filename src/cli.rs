//! Command-line interface definitions.
//!
//! Every option except the output directory can also be supplied through an
//! environment variable, so the build can run unattended from CI. The feed
//! URL has no default and must be given one way or the other.

use chrono::NaiveDate;
use clap::Parser;
use std::path::PathBuf;
use url::Url;

/// Year shown on the month-by-month calendar page.
///
/// Deliberately separate from "today": filtering follows the build date,
/// while the calendar page stays on this year until it is changed.
pub const DEFAULT_TARGET_YEAR: i32 = 2026;

/// Command-line arguments for the site build.
///
/// # Examples
///
/// ```sh
/// # Basic usage
/// railway_events -o ./public --source-url https://example.org/api/events.json
///
/// # Reproducible build against a local feed
/// railway_events -o ./public --source-url http://localhost:8000/events.json --today 2026-03-15
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Output directory for the generated site
    #[arg(short, long)]
    pub output_dir: PathBuf,

    /// URL of the JSON event feed
    #[arg(long, env = "EVENTS_SOURCE_URL")]
    pub source_url: Url,

    /// Year rendered on the month-by-month calendar page
    #[arg(long, env = "EVENTS_TARGET_YEAR", default_value_t = DEFAULT_TARGET_YEAR)]
    pub target_year: i32,

    /// Override today's date (YYYY-MM-DD); defaults to the local date
    #[arg(long, env = "EVENTS_TODAY")]
    pub today: Option<NaiveDate>,

    /// Title used in page headers
    #[arg(long, default_value = "Railway Modelling Events")]
    pub site_title: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::parse_from([
            "railway_events",
            "--output-dir",
            "./public",
            "--source-url",
            "https://example.org/api/events.json",
        ]);

        assert_eq!(cli.output_dir, PathBuf::from("./public"));
        assert_eq!(cli.source_url.host_str(), Some("example.org"));
        assert_eq!(cli.target_year, DEFAULT_TARGET_YEAR);
        assert_eq!(cli.site_title, "Railway Modelling Events");
        assert!(cli.today.is_none());
    }

    #[test]
    fn test_cli_overrides() {
        let cli = Cli::parse_from([
            "railway_events",
            "-o",
            "/tmp/site",
            "--source-url",
            "http://localhost:8000/events.json",
            "--target-year",
            "2027",
            "--today",
            "2026-03-15",
        ]);

        assert_eq!(cli.source_url.as_str(), "http://localhost:8000/events.json");
        assert_eq!(cli.target_year, 2027);
        assert_eq!(cli.today, NaiveDate::from_ymd_opt(2026, 3, 15));
    }

    #[test]
    fn test_cli_rejects_bad_date() {
        let res = Cli::try_parse_from([
            "railway_events",
            "-o",
            "x",
            "--source-url",
            "http://localhost:8000/events.json",
            "--today",
            "15/03/2026",
        ]);
        assert!(res.is_err());
    }

    #[test]
    fn test_cli_requires_source_url() {
        if std::env::var_os("EVENTS_SOURCE_URL").is_some() {
            return;
        }
        let res = Cli::try_parse_from(["railway_events", "-o", "x"]);
        assert_eq!(
            res.unwrap_err().kind(),
            clap::error::ErrorKind::MissingRequiredArgument
        );
    }

    #[test]
    fn test_cli_rejects_bad_url() {
        let res = Cli::try_parse_from(["railway_events", "-o", "x", "--source-url", "not a url"]);
        assert!(res.is_err());
    }
}
