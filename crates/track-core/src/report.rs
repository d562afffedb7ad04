//! Report aggregation over recorded sessions.
//!
//! # Algorithm
//!
//! 1. Resolve the [`Period`] to a half-open [`Window`] around the report instant.
//! 2. Keep sessions matching the category filter (exact, case-sensitive).
//! 3. Treat the open session as ending at the report instant.
//! 4. Clip every session to the window; sessions without overlap drop out.
//! 5. Sum clipped durations per group key and in total.
//!
//! Nothing here depends on the order sessions were stored in.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::period::{Period, Window};
use crate::session::Session;

/// What the report totals are keyed by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Grouping {
    #[default]
    Category,
    Activity,
}

impl Grouping {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Category => "category",
            Self::Activity => "activity",
        }
    }

    fn key(self, session: &Session) -> String {
        match self {
            Self::Category => session.category_label().to_string(),
            Self::Activity => session.name.to_string(),
        }
    }
}

impl fmt::Display for Grouping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Grouping {
    type Err = UnknownGrouping;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "category" => Ok(Self::Category),
            "activity" => Ok(Self::Activity),
            _ => Err(UnknownGrouping(s.to_string())),
        }
    }
}

/// Error type for unknown grouping names.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown grouping: {0} (expected category or activity)")]
pub struct UnknownGrouping(String);

/// The part of one session that falls inside the report window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSlice {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub duration: Duration,
    /// The session is still open; `end` is the report instant.
    pub active: bool,
}

/// Per-activity breakdown row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivitySummary {
    pub activity: String,
    pub category: Option<String>,
    /// Clipped sessions, most recent first.
    pub sessions: Vec<SessionSlice>,
    pub total: Duration,
}

/// Aggregated time for one window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    /// The named period, or `None` for an ad hoc window.
    pub period: Option<Period>,
    pub window: Window,
    pub generated_at: NaiveDateTime,
    pub category: Option<String>,
    pub grouping: Grouping,
    /// Total per group key.
    pub totals: BTreeMap<String, Duration>,
    /// Activities sorted by total, largest first.
    pub activities: Vec<ActivitySummary>,
    /// Sum of every included slice.
    pub total: Duration,
}

impl Report {
    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }

    /// Group totals sorted by duration (largest first), then by key.
    pub fn ranked_totals(&self) -> Vec<(&str, Duration)> {
        let mut ranked: Vec<_> = self
            .totals
            .iter()
            .map(|(key, duration)| (key.as_str(), *duration))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        ranked
    }
}

/// Builds the report for `period` as seen at `at`.
pub fn generate(
    sessions: &[Session],
    period: Period,
    category: Option<&str>,
    grouping: Grouping,
    at: NaiveDateTime,
) -> Report {
    Report {
        period: Some(period),
        ..summarize(sessions, period.resolve(at), category, grouping, at)
    }
}

/// Builds a report over an explicit window.
///
/// `at` is the instant the open session, if any, is counted up to.
pub fn summarize(
    sessions: &[Session],
    window: Window,
    category: Option<&str>,
    grouping: Grouping,
    at: NaiveDateTime,
) -> Report {
    let mut slices: Vec<(&Session, SessionSlice)> = sessions
        .iter()
        .filter(|session| {
            category.is_none_or(|wanted| {
                session
                    .category
                    .as_ref()
                    .is_some_and(|c| c.as_str() == wanted)
            })
        })
        .filter_map(|session| {
            let end = session.end.unwrap_or(at);
            let (start, end) = window.clip(session.start, end)?;
            Some((
                session,
                SessionSlice {
                    start,
                    end,
                    duration: end - start,
                    active: session.is_active(),
                },
            ))
        })
        .collect();
    slices.sort_by(|a, b| b.1.start.cmp(&a.1.start));

    let mut totals: BTreeMap<String, Duration> = BTreeMap::new();
    let mut by_activity: HashMap<(String, Option<String>), ActivitySummary> = HashMap::new();
    let mut total = Duration::zero();

    for (session, slice) in slices {
        total += slice.duration;
        *totals
            .entry(grouping.key(session))
            .or_insert_with(Duration::zero) += slice.duration;

        let session_category = session.category.as_ref().map(ToString::to_string);
        let summary = by_activity
            .entry((session.name.to_string(), session_category.clone()))
            .or_insert_with(|| ActivitySummary {
                activity: session.name.to_string(),
                category: session_category,
                sessions: Vec::new(),
                total: Duration::zero(),
            });
        summary.total += slice.duration;
        summary.sessions.push(slice);
    }

    let mut activities: Vec<ActivitySummary> = by_activity.into_values().collect();
    activities.sort_by(|a, b| {
        b.total
            .cmp(&a.total)
            .then_with(|| a.activity.cmp(&b.activity))
            .then_with(|| a.category.cmp(&b.category))
    });

    tracing::debug!(
        included = activities.iter().map(|a| a.sessions.len()).sum::<usize>(),
        total_seconds = total.num_seconds(),
        "summarized sessions"
    );

    Report {
        period: None,
        window,
        generated_at: at,
        category: category.map(str::to_string),
        grouping,
        totals,
        activities,
        total,
    }
}
