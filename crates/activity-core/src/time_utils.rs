use chrono::{DateTime, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::error::{ActivityError, Result};

/// The only timestamp layout the archive uses for `created_at`.
pub const CREATED_AT_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Layout of a time-of-day query target.
pub const TIME_OF_DAY_FORMAT: &str = "%H:%M:%S";

// ── Strict parsing ────────────────────────────────────────────────────────────

/// Parse an archive `created_at` value (`YYYY-MM-DDTHH:MM:SSZ`) as UTC.
///
/// No alternative layouts are tried: anything else is a
/// [`ActivityError::TimestampFormat`].
pub fn parse_created_at(s: &str) -> Result<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(s, CREATED_AT_FORMAT)
        .map(|naive| Utc.from_utc_datetime(&naive))
        .map_err(|_| ActivityError::TimestampFormat(s.to_string()))
}

/// Parse a 24-hour `HH:MM:SS` time of day.
///
/// Every field must be exactly two digits; chrono alone would also take
/// `"12:0:0"`.
pub fn parse_time_of_day(s: &str) -> Result<NaiveTime> {
    let invalid = || ActivityError::InvalidTimeOfDay(s.to_string());
    if !is_two_digit_clock(s) {
        return Err(invalid());
    }
    NaiveTime::parse_from_str(s, TIME_OF_DAY_FORMAT).map_err(|_| invalid())
}

fn is_two_digit_clock(s: &str) -> bool {
    let b = s.as_bytes();
    b.len() == 8
        && b.iter().enumerate().all(|(i, c)| match i {
            2 | 5 => *c == b':',
            _ => c.is_ascii_digit(),
        })
}

// ── TimezoneHandler ───────────────────────────────────────────────────────────

/// Projects UTC archive timestamps onto the wall clock of a named timezone.
#[derive(Debug, Clone, Copy)]
pub struct TimezoneHandler {
    tz: Tz,
}

impl TimezoneHandler {
    /// Create a handler for an IANA timezone name such as
    /// `"America/Los_Angeles"`.
    ///
    /// Unlike display code, a query must not silently fall back to UTC, so an
    /// unknown name is a configuration error.
    pub fn new(tz_name: &str) -> Result<Self> {
        tz_name
            .parse::<Tz>()
            .map(|tz| Self { tz })
            .map_err(|_| ActivityError::Config(format!("unknown timezone \"{tz_name}\"")))
    }

    /// Validate that `tz_name` is a recognised IANA timezone identifier.
    pub fn validate_timezone(tz_name: &str) -> bool {
        tz_name.parse::<Tz>().is_ok()
    }

    /// Wall-clock time of day of `dt` in this timezone.
    pub fn time_of_day(&self, dt: DateTime<Utc>) -> NaiveTime {
        dt.with_timezone(&self.tz).time()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
