//! Report periods and their resolved time windows.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// A named reporting window, resolved relative to "now".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Period {
    /// Local midnight to the next midnight.
    Today,
    /// Calendar week, Monday 00:00 to the following Monday 00:00.
    Week,
    /// First of the month to the first of the next month.
    Month,
    /// Unbounded.
    All,
}

impl Period {
    pub const ALL: [Self; 4] = [Self::Today, Self::Week, Self::Month, Self::All];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Today => "today",
            Self::Week => "week",
            Self::Month => "month",
            Self::All => "all",
        }
    }

    /// Resolves the period to a concrete window containing `at`.
    pub fn resolve(self, at: NaiveDateTime) -> Window {
        let today = at.date();
        match self {
            Self::Today => Window::bounded(midnight(today), midnight(today + Duration::days(1))),
            Self::Week => {
                let days_since_monday = today.weekday().num_days_from_monday();
                let monday = today - Duration::days(i64::from(days_since_monday));
                Window::bounded(midnight(monday), midnight(monday + Duration::days(7)))
            }
            Self::Month => {
                let first = today.with_day(1).unwrap_or(today);
                let next = first
                    .checked_add_months(chrono::Months::new(1))
                    .unwrap_or(NaiveDate::MAX);
                Window::bounded(midnight(first), midnight(next))
            }
            Self::All => Window::unbounded(),
        }
    }
}

fn midnight(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = UnknownPeriod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "today" | "day" => Ok(Self::Today),
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            "all" => Ok(Self::All),
            _ => Err(UnknownPeriod(s.to_string())),
        }
    }
}

impl Serialize for Period {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Period {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Error type for unknown period names.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown report period: {0} (expected today, week, month or all)")]
pub struct UnknownPeriod(String);

/// A half-open `[start, end)` range. A missing bound is unbounded on that side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Window {
    pub start: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
}

impl Window {
    pub const fn bounded(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    pub const fn unbounded() -> Self {
        Self {
            start: None,
            end: None,
        }
    }

    /// Clips `[start, end)` to this window.
    ///
    /// Returns `None` when the overlap is empty.
    pub fn clip(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Option<(NaiveDateTime, NaiveDateTime)> {
        let start = self.start.map_or(start, |bound| start.max(bound));
        let end = self.end.map_or(end, |bound| end.min(bound));
        (end > start).then_some((start, end))
    }
}
