//! Status command: shows the session currently being tracked.

use std::io::Write;
use std::time::Duration as StdDuration;

use anyhow::Result;

use track_core::{Clock, SessionPersistence, Status, TrackingEngine};

use super::util::{format_clock, format_instant};

/// Clears the terminal and moves the cursor home.
const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

/// Prints the current tracking status once.
pub fn run<W, P, C>(writer: &mut W, engine: &TrackingEngine<P, C>) -> Result<()>
where
    W: Write,
    P: SessionPersistence,
    C: Clock,
{
    write_status(writer, engine.status()?.as_ref())
}

/// Redraws the status once per second until the process is interrupted.
///
/// Returns as soon as nothing is being tracked.
pub fn watch<W, P, C>(writer: &mut W, engine: &TrackingEngine<P, C>) -> Result<()>
where
    W: Write,
    P: SessionPersistence,
    C: Clock,
{
    loop {
        let status = engine.status()?;
        write!(writer, "{CLEAR_SCREEN}")?;
        write_status(writer, status.as_ref())?;
        writeln!(writer, "\nPress Ctrl+C to exit; the session keeps running.")?;
        writer.flush()?;
        if status.is_none() {
            return Ok(());
        }
        std::thread::sleep(StdDuration::from_secs(1));
    }
}

fn write_status<W: Write>(writer: &mut W, status: Option<&Status>) -> Result<()> {
    let Some(status) = status else {
        writeln!(writer, "Not tracking anything.")?;
        writeln!(writer, "Hint: Run 'track start <activity>' to begin.")?;
        return Ok(());
    };

    writeln!(writer, "Currently tracking")?;
    writeln!(writer, "Activity: {}", status.session.name)?;
    writeln!(writer, "Category: {}", status.session.category_label())?;
    writeln!(writer, "Started:  {}", format_instant(status.session.start))?;
    writeln!(writer, "Duration: {}", format_clock(status.elapsed))?;
    Ok(())
}
