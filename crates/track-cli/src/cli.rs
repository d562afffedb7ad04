//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands::{clear::ClearArgs, report::ReportArgs, start::StartArgs, stop::StopArgs};

/// Personal activity and time tracker.
///
/// Start and stop named activities, optionally tagged with a category, and
/// report where the time went today, this week, this month or overall.
#[derive(Debug, Parser)]
#[command(name = "track", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start tracking an activity.
    Start(StartArgs),

    /// Stop tracking the current activity.
    Stop(StopArgs),

    /// Show the activity currently being tracked.
    Status {
        /// Keep redrawing the elapsed time every second (Ctrl+C to exit).
        #[arg(short, long)]
        watch: bool,
    },

    /// Generate a time tracking report.
    Report(ReportArgs),

    /// Delete all tracking data.
    Clear(ClearArgs),
}
