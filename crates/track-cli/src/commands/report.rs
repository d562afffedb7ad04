//! Report command for generating time reports.
//!
//! This module implements `track report` with period options
//! (today, week, month, all), an optional category filter, and output
//! formats (human-readable, JSON). Aggregation itself lives in
//! `track_core::report`; this module only renders.

use std::fmt::Write;

use anyhow::Result;
use chrono::NaiveDateTime;
use clap::Args;
use serde::Serialize;

use track_core::report::generate;
use track_core::{
    ActivitySummary, Clock, Grouping, Period, Report, SessionPersistence, SessionSlice,
    TrackingEngine,
};

use super::util::format_duration;

#[derive(Debug, Args)]
pub struct ReportArgs {
    /// Time period for the report: today, week, month or all.
    #[arg(short, long, default_value_t = Period::Today)]
    pub period: Period,

    /// Only include sessions in this category (case-sensitive).
    #[arg(short, long)]
    pub category: Option<String>,

    /// Group totals by category or activity.
    #[arg(long, default_value_t = Grouping::Category)]
    pub by: Grouping,

    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Longest activity name shown in the session table.
const ACTIVITY_WIDTH: usize = 20;

// ========== Progress Bar ==========

/// Generates a 10-character progress bar.
/// Values <5% of max get a single block for visibility.
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn progress_bar(value: i64, max: i64) -> String {
    if max <= 0 {
        return "░░░░░░░░░░".to_string();
    }

    let ratio = value as f64 / max as f64;
    let filled = if ratio < 0.05 && value > 0 {
        1
    } else {
        (ratio * 10.0).round().clamp(0.0, 10.0) as usize
    };

    let empty = 10 - filled;
    format!("{}{}", "█".repeat(filled), "░".repeat(empty))
}

// ========== Human-Readable Output ==========

/// Formats the period description for the report header.
fn format_period_description(report: &Report) -> String {
    let description = match (report.period, report.window.start, report.window.end) {
        (Some(Period::Today), Some(start), _) => {
            format!("Today, {}", start.date().format("%A, %b %-d, %Y"))
        }
        (Some(Period::Week), Some(start), _) => {
            format!("Week of {}", start.date().format("%b %-d, %Y"))
        }
        (Some(Period::Month), Some(start), _) => start.date().format("%B %Y").to_string(),
        (_, Some(start), Some(end)) => format!(
            "{} to {}",
            start.format("%Y-%m-%d %H:%M"),
            end.format("%Y-%m-%d %H:%M")
        ),
        _ => "All time".to_string(),
    };

    match &report.category {
        Some(category) => format!("{description} [category: {category}]"),
        None => description,
    }
}

/// Formats a session's time range. Same-day sessions inside a one-day
/// report only show clock times.
fn format_slice_time(report: &Report, slice: &SessionSlice) -> String {
    let end = if slice.active {
        "now".to_string()
    } else if slice.start.date() == slice.end.date() {
        slice.end.format("%H:%M").to_string()
    } else {
        slice.end.format("%Y-%m-%d %H:%M").to_string()
    };

    if report.period == Some(Period::Today) {
        format!("{} - {end}", slice.start.format("%H:%M"))
    } else {
        format!("{} - {end}", slice.start.format("%Y-%m-%d %H:%M"))
    }
}

fn truncate(value: &str, width: usize) -> String {
    value.chars().take(width).collect()
}

fn write_activity_rows(output: &mut String, report: &Report, activity: &ActivitySummary) {
    for (i, slice) in activity.sessions.iter().enumerate() {
        let (name, category) = if i == 0 {
            (
                truncate(&activity.activity, ACTIVITY_WIDTH),
                activity
                    .category
                    .as_deref()
                    .unwrap_or(track_core::Category::UNCATEGORIZED),
            )
        } else {
            (String::new(), "")
        };
        writeln!(
            output,
            "{name:<ACTIVITY_WIDTH$} {category:<14} {:<35} {:>7}",
            format_slice_time(report, slice),
            format_duration(slice.duration)
        )
        .unwrap();
    }
}

/// Formats the human-readable report output.
pub fn format_report(report: &Report) -> String {
    let mut output = String::new();

    writeln!(output, "TIME REPORT: {}", format_period_description(report)).unwrap();

    if report.is_empty() {
        writeln!(output).unwrap();
        writeln!(output, "No activity recorded for this period.").unwrap();
        writeln!(output).unwrap();
        writeln!(output, "Hint: Run 'track start <activity>' to begin tracking.").unwrap();
        return output;
    }

    // SESSIONS section
    writeln!(output).unwrap();
    writeln!(
        output,
        "{:<ACTIVITY_WIDTH$} {:<14} {:<35} {:>7}",
        "ACTIVITY", "CATEGORY", "TIME", "DURATION"
    )
    .unwrap();
    for (i, activity) in report.activities.iter().enumerate() {
        if i > 0 {
            writeln!(output).unwrap();
        }
        write_activity_rows(&mut output, report, activity);
    }

    // BY CATEGORY / BY ACTIVITY section
    let heading = format!("BY {}", report.grouping.as_str().to_uppercase());
    writeln!(output).unwrap();
    writeln!(output, "{heading}").unwrap();
    writeln!(output, "{}", "─".repeat(heading.chars().count())).unwrap();

    let ranked = report.ranked_totals();
    let max = ranked.first().map_or(0, |(_, d)| d.num_seconds());
    for (key, duration) in &ranked {
        writeln!(
            output,
            "{:<ACTIVITY_WIDTH$} {:>7}  {}",
            truncate(key, ACTIVITY_WIDTH),
            format_duration(*duration),
            progress_bar(duration.num_seconds(), max)
        )
        .unwrap();
    }

    // SUMMARY section
    writeln!(output).unwrap();
    writeln!(output, "SUMMARY").unwrap();
    writeln!(output, "───────").unwrap();
    writeln!(output, "Total tracked:  {}", format_duration(report.total)).unwrap();
    if let Some(running) = report
        .activities
        .iter()
        .find(|a| a.sessions.iter().any(|s| s.active))
    {
        writeln!(output, "Includes the running session '{}'.", running.activity).unwrap();
    }

    output
}

// ========== JSON Output ==========

/// JSON report structure.
#[derive(Debug, Serialize)]
pub struct JsonReport {
    pub generated_at: String,
    pub timezone: String,
    pub period: JsonPeriod,
    pub category: Option<String>,
    pub grouping: Grouping,
    pub totals: Vec<JsonTotal>,
    pub activities: Vec<JsonActivity>,
    pub total_seconds: i64,
}

#[derive(Debug, Serialize)]
pub struct JsonPeriod {
    #[serde(rename = "type")]
    pub period_type: Option<Period>,
    pub start: Option<String>,
    pub end: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct JsonTotal {
    pub key: String,
    pub seconds: i64,
}

#[derive(Debug, Serialize)]
pub struct JsonActivity {
    pub activity: String,
    pub category: Option<String>,
    pub total_seconds: i64,
    pub sessions: Vec<JsonSession>,
}

#[derive(Debug, Serialize)]
pub struct JsonSession {
    pub start: String,
    pub end: String,
    pub seconds: i64,
    pub active: bool,
}

fn iso(instant: NaiveDateTime) -> String {
    instant.format("%Y-%m-%dT%H:%M:%S").to_string()
}

/// Formats report data as JSON.
pub fn format_report_json(report: &Report, timezone: &str) -> Result<String> {
    let json = JsonReport {
        generated_at: iso(report.generated_at),
        timezone: timezone.to_string(),
        period: JsonPeriod {
            period_type: report.period,
            start: report.window.start.map(iso),
            end: report.window.end.map(iso),
        },
        category: report.category.clone(),
        grouping: report.grouping,
        totals: report
            .ranked_totals()
            .into_iter()
            .map(|(key, duration)| JsonTotal {
                key: key.to_string(),
                seconds: duration.num_seconds(),
            })
            .collect(),
        activities: report
            .activities
            .iter()
            .map(|activity| JsonActivity {
                activity: activity.activity.clone(),
                category: activity.category.clone(),
                total_seconds: activity.total.num_seconds(),
                sessions: activity
                    .sessions
                    .iter()
                    .map(|slice| JsonSession {
                        start: iso(slice.start),
                        end: iso(slice.end),
                        seconds: slice.duration.num_seconds(),
                        active: slice.active,
                    })
                    .collect(),
            })
            .collect(),
        total_seconds: report.total.num_seconds(),
    };

    Ok(serde_json::to_string_pretty(&json)?)
}

// ========== Public Interface ==========

/// Builds the report for `args` from the engine's sessions.
pub fn build_report<P, C>(engine: &TrackingEngine<P, C>, args: &ReportArgs) -> Result<Report>
where
    P: SessionPersistence,
    C: Clock,
{
    // Surfaces a store with several open sessions before summing it.
    engine.state()?;

    let category = args
        .category
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty());
    let now = engine.clock().now();
    Ok(generate(
        engine.store().sessions(),
        args.period,
        category,
        args.by,
        now,
    ))
}

/// Runs the report command.
pub fn run<W, P, C>(writer: &mut W, engine: &TrackingEngine<P, C>, args: &ReportArgs) -> Result<()>
where
    W: std::io::Write,
    P: SessionPersistence,
    C: Clock,
{
    let report = build_report(engine, args)?;

    if args.json {
        let timezone = iana_time_zone::get_timezone().unwrap_or_else(|_| "UTC".to_string());
        let mut output = format_report_json(&report, &timezone)?;
        output.push('\n');
        writer.write_all(output.as_bytes())?;
    } else {
        writer.write_all(format_report(&report).as_bytes())?;
    }

    Ok(())
}
