//! Shared utilities for CLI commands.

use std::sync::LazyLock;

use chrono::{Duration, NaiveDateTime, NaiveTime};
use regex::Regex;
use track_core::TrackError;

/// Pre-compiled regex for relative time parsing.
static RELATIVE_TIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\s+(minute|hour|day|week)s?\s+ago$").unwrap());

/// Conservative bounds for relative time parsing (~1000 years in minutes).
const MAX_RELATIVE_MINUTES: i64 = 1000 * 365 * 24 * 60;

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

const TIME_FORMATS: [&str; 2] = ["%H:%M:%S", "%H:%M"];

/// Parse an `--at` value relative to `now`.
///
/// Supports:
/// - Time of day (today): "14:30", "14:30:15"
/// - Local date and time: "2026-01-15 10:30", "2026-01-15T10:30:00"
/// - Relative: "2 hours ago", "30 minutes ago", "1 day ago", "1 week ago"
pub fn parse_at(s: &str, now: NaiveDateTime) -> Result<NaiveDateTime, TrackError> {
    let s = s.trim();

    if let Some(dt) = DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(s, format).ok())
    {
        return Ok(dt);
    }

    if let Some(time) = TIME_FORMATS
        .iter()
        .find_map(|format| NaiveTime::parse_from_str(s, format).ok())
    {
        return Ok(now.date().and_time(time));
    }

    let Some(caps) = RELATIVE_TIME_RE.captures(s) else {
        return Err(TrackError::InvalidInput(format!(
            "invalid time: {s}. Use HH:MM, YYYY-MM-DD HH:MM or relative (e.g., '20 minutes ago')"
        )));
    };

    let n: i64 = caps[1]
        .parse()
        .map_err(|_| TrackError::InvalidInput(format!("invalid number in relative time: {s}")))?;

    let (max_for_unit, minutes_per_unit) = match &caps[2] {
        "minute" => (MAX_RELATIVE_MINUTES, 1),
        "hour" => (MAX_RELATIVE_MINUTES / 60, 60),
        "day" => (MAX_RELATIVE_MINUTES / (60 * 24), 60 * 24),
        _ => (MAX_RELATIVE_MINUTES / (60 * 24 * 7), 60 * 24 * 7),
    };

    if n > max_for_unit {
        return Err(TrackError::InvalidInput(format!(
            "relative time value too large: {n} {}",
            &caps[2]
        )));
    }

    // Safe to create Duration now that we've validated the range
    Ok(now - Duration::minutes(n * minutes_per_unit))
}

/// Formats a duration as "Xh Ym" if >= 1 hour, "Xm" otherwise.
/// Seconds are floored; negative durations are treated as 0m.
pub fn format_duration(duration: Duration) -> String {
    let total_minutes = duration.num_minutes().max(0);
    let hours = total_minutes / 60;
    let minutes = total_minutes % 60;

    if hours >= 1 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m")
    }
}

/// Formats a duration as a `HH:MM:SS` clock.
pub fn format_clock(duration: Duration) -> String {
    let total = duration.num_seconds().max(0);
    format!(
        "{:02}:{:02}:{:02}",
        total / 3600,
        (total % 3600) / 60,
        total % 60
    )
}

/// Formats an instant for display, down to the minute.
pub fn format_instant(instant: NaiveDateTime) -> String {
    instant.format("%Y-%m-%d %H:%M").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 1, 15)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_parse_time_of_day_uses_today() {
        let parsed = parse_at("09:30", now()).unwrap();
        assert_eq!(parsed, now().date().and_hms_opt(9, 30, 0).unwrap());
    }

    #[test]
    fn test_parse_full_datetime() {
        let expected = NaiveDate::from_ymd_opt(2026, 1, 14)
            .unwrap()
            .and_hms_opt(22, 15, 0)
            .unwrap();
        assert_eq!(parse_at("2026-01-14 22:15", now()).unwrap(), expected);
        assert_eq!(parse_at("2026-01-14T22:15:00", now()).unwrap(), expected);
    }

    #[test]
    fn test_parse_relative() {
        assert_eq!(
            parse_at("2 hours ago", now()).unwrap(),
            now() - Duration::hours(2)
        );
        assert_eq!(
            parse_at("1 minute ago", now()).unwrap(),
            now() - Duration::minutes(1)
        );
        assert_eq!(
            parse_at("1 week ago", now()).unwrap(),
            now() - Duration::weeks(1)
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        let err = parse_at("lunchtime", now()).unwrap_err();
        assert!(matches!(err, TrackError::InvalidInput(_)));
        assert!(parse_at("99999999999 weeks ago", now()).is_err());
    }

    #[test]
    fn test_format_duration_hours_and_minutes() {
        assert_eq!(format_duration(Duration::minutes(150)), "2h 30m");
        assert_eq!(format_duration(Duration::hours(1)), "1h 0m");
        assert_eq!(format_duration(Duration::minutes(135)), "2h 15m");
    }

    #[test]
    fn test_format_duration_minutes_only() {
        assert_eq!(format_duration(Duration::minutes(45)), "45m");
        assert_eq!(format_duration(Duration::zero()), "0m");
        // 45.9 minutes floors to 45m
        assert_eq!(format_duration(Duration::seconds(2_754)), "45m");
    }

    #[test]
    fn test_format_duration_negative_is_zero() {
        assert_eq!(format_duration(Duration::seconds(-1)), "0m");
    }

    #[test]
    fn test_format_clock_pads() {
        assert_eq!(format_clock(Duration::seconds(3_725)), "01:02:05");
        assert_eq!(format_clock(Duration::hours(27)), "27:00:00");
    }
}
