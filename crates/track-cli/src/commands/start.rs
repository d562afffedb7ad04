//! Start command: opens a new session.

use std::io::Write;

use anyhow::Result;
use clap::Args;

use track_core::{Clock, SessionPersistence, TrackingEngine};

use super::util::{format_instant, parse_at};
use crate::Config;

#[derive(Debug, Args)]
pub struct StartArgs {
    /// Name of the activity.
    pub activity: String,

    /// Category of the activity (e.g. work, study, personal).
    ///
    /// Defaults to `default_category` from the config; pass "" for none.
    #[arg(short, long)]
    pub category: Option<String>,

    /// Start time instead of now ("14:30", "2026-01-15 14:30", "20 minutes ago").
    #[arg(long)]
    pub at: Option<String>,
}

pub fn run<W, P, C>(
    writer: &mut W,
    engine: &mut TrackingEngine<P, C>,
    args: &StartArgs,
    config: &Config,
) -> Result<()>
where
    W: Write,
    P: SessionPersistence,
    C: Clock,
{
    let at = args
        .at
        .as_deref()
        .map(|raw| parse_at(raw, engine.clock().now()))
        .transpose()?;
    let category = args
        .category
        .as_deref()
        .or(config.default_category.as_deref());

    let session = engine.start(&args.activity, category, at)?;

    writeln!(
        writer,
        "Started tracking: {} ({}) at {}",
        session.name,
        session.category_label(),
        format_instant(session.start)
    )?;
    writeln!(
        writer,
        "Run 'track stop' when you're done, or 'track status --watch' for a live view."
    )?;
    Ok(())
}
