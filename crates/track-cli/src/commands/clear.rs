//! Clear command: deletes all tracking data after confirmation.

use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use clap::Args;

use track_core::{Clock, SessionPersistence, TrackingEngine};

#[derive(Debug, Args)]
pub struct ClearArgs {
    /// Skip the confirmation prompt.
    #[arg(short, long)]
    pub force: bool,
}

pub fn run<R, W, P, C>(
    input: &mut R,
    writer: &mut W,
    engine: &mut TrackingEngine<P, C>,
    args: &ClearArgs,
) -> Result<()>
where
    R: BufRead,
    W: Write,
    P: SessionPersistence,
    C: Clock,
{
    if !args.force && !confirm(input, writer)? {
        writeln!(writer, "Operation cancelled.")?;
        return Ok(());
    }

    let removed = engine.clear()?;
    writeln!(writer, "Cleared {removed} tracking records.")?;
    Ok(())
}

/// Asks for confirmation; anything but "y"/"yes" declines.
fn confirm<R: BufRead, W: Write>(input: &mut R, writer: &mut W) -> Result<bool> {
    write!(
        writer,
        "Warning: this will delete all tracking data. Are you sure? [y/N] "
    )?;
    writer.flush()?;

    let mut answer = String::new();
    input
        .read_line(&mut answer)
        .context("failed to read confirmation")?;
    let answer = answer.trim().to_ascii_lowercase();
    Ok(answer == "y" || answer == "yes")
}
