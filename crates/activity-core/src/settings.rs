use clap::Parser;
use std::path::PathBuf;

use crate::error::{ActivityError, Result};
use crate::models::EventCategory;
use crate::time_utils::{parse_time_of_day, TimezoneHandler};

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Activity analytics over a day of GitHub Archive event files
#[derive(Parser, Debug, Clone)]
#[command(
    name = "gh-activity",
    about = "Activity analytics over a day of GitHub Archive event files",
    version
)]
pub struct Settings {
    /// Directory holding hourly `.json` archive files
    #[arg(long, env = "GH_ACTIVITY_DATA_DIR")]
    pub dir: Option<PathBuf>,

    /// Single archive file (resolved against --dir when both are given)
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Number of actors listed in each top-K report
    #[arg(long, default_value = "10")]
    pub top: usize,

    /// Add a top-K report for this category
    #[arg(long, value_enum)]
    pub category: Option<EventCategory>,

    /// Time of day (24-hour HH:MM:SS) for the exact-time check
    #[arg(long, default_value = "12:00:00")]
    pub at: String,

    /// Evaluate --at on this IANA timezone's wall clock instead of UTC
    #[arg(long)]
    pub timezone: Option<String>,

    /// Lower bound (inclusive) of distinct pushers per repository
    #[arg(long, default_value = "5")]
    pub min_contributors: usize,

    /// Upper bound (inclusive) of distinct pushers per repository
    #[arg(long, default_value = "10")]
    pub max_contributors: usize,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR"])]
    pub log_level: String,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Parse the process arguments and apply the `--debug` override.
    pub fn load() -> Self {
        Self::resolve(Settings::parse())
    }

    /// Same as [`Settings::load`] but accepts an explicit argument list,
    /// enabling unit-testing without spawning subprocesses.
    pub fn load_from_args<I, T>(args: I) -> std::result::Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Settings::try_parse_from(args).map(Self::resolve)
    }

    /// `--debug` overrides the log level.
    fn resolve(mut settings: Settings) -> Settings {
        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }
        settings
    }

    /// Check the cross-field constraints clap cannot express.
    ///
    /// Source selection itself (directory xor file) is checked by the reader
    /// so that library callers get the same error.
    pub fn validate(&self) -> Result<()> {
        if self.min_contributors > self.max_contributors {
            return Err(ActivityError::Config(format!(
                "--min-contributors ({}) exceeds --max-contributors ({})",
                self.min_contributors, self.max_contributors
            )));
        }
        parse_time_of_day(&self.at)?;
        if let Some(tz) = &self.timezone {
            if !TimezoneHandler::validate_timezone(tz) {
                return Err(ActivityError::Config(format!("unknown timezone \"{tz}\"")));
            }
        }
        Ok(())
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Settings {
        let mut full = vec!["gh-activity"];
        full.extend_from_slice(args);
        Settings::load_from_args(full).expect("valid arguments")
    }

    #[test]
    fn test_defaults() {
        let s = parse(&["--dir", "data"]);
        assert_eq!(s.dir, Some(PathBuf::from("data")));
        assert_eq!(s.file, None);
        assert_eq!(s.top, 10);
        assert_eq!(s.category, None);
        assert_eq!(s.at, "12:00:00");
        assert_eq!(s.min_contributors, 5);
        assert_eq!(s.max_contributors, 10);
        assert!(!s.json);
        assert_eq!(s.log_level, "INFO");
        s.validate().unwrap();
    }

    #[test]
    fn test_debug_overrides_log_level() {
        let s = parse(&["--log-level", "ERROR", "--debug"]);
        assert_eq!(s.log_level, "DEBUG");
    }

    #[test]
    fn test_category_value_enum() {
        let s = parse(&["--category", "pull-request"]);
        assert_eq!(s.category, Some(EventCategory::PullRequest));
    }

    #[test]
    fn test_unknown_category_rejected() {
        let res = Settings::load_from_args(["gh-activity", "--category", "pulls"]);
        assert!(res.is_err());
    }

    #[test]
    fn test_invalid_log_level_rejected() {
        let res = Settings::load_from_args(["gh-activity", "--log-level", "LOUD"]);
        assert!(res.is_err());
    }

    #[test]
    fn test_validate_inverted_range() {
        let s = parse(&["--min-contributors", "11", "--max-contributors", "10"]);
        assert!(matches!(s.validate(), Err(ActivityError::Config(_))));
    }

    #[test]
    fn test_validate_bad_time_of_day() {
        let s = parse(&["--at", "12pm"]);
        assert!(matches!(
            s.validate(),
            Err(ActivityError::InvalidTimeOfDay(_))
        ));
    }

    #[test]
    fn test_validate_timezone() {
        parse(&["--timezone", "America/Los_Angeles"])
            .validate()
            .unwrap();
        assert!(matches!(
            parse(&["--timezone", "Nowhere/Special"]).validate(),
            Err(ActivityError::Config(ref msg)) if msg.contains("Nowhere/Special")
        ));
    }
}
