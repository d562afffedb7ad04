//! Stop command: closes the active session.

use std::io::Write;

use anyhow::Result;
use chrono::Duration;
use clap::Args;

use track_core::{Clock, SessionPersistence, TrackingEngine};

use super::util::{format_duration, parse_at};

#[derive(Debug, Args)]
pub struct StopArgs {
    /// Stop time instead of now ("17:45", "2026-01-15 17:45", "10 minutes ago").
    #[arg(long)]
    pub at: Option<String>,
}

pub fn run<W, P, C>(
    writer: &mut W,
    engine: &mut TrackingEngine<P, C>,
    args: &StopArgs,
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

    let session = engine.stop(at)?;
    let duration = session.duration().unwrap_or_else(Duration::zero);

    writeln!(
        writer,
        "Stopped tracking: {} ({}) - duration {}",
        session.name,
        session.category_label(),
        format_duration(duration)
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::{NaiveDate, NaiveDateTime};
    use track_core::{FixedClock, MemoryPersistence, SessionStore, TrackError};

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, 29)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    fn engine() -> TrackingEngine<MemoryPersistence, FixedClock> {
        let store = SessionStore::load(MemoryPersistence::default()).unwrap();
        TrackingEngine::new(store, FixedClock::new(now()))
    }

    #[test]
    fn test_stop_reports_duration() {
        let mut engine = engine();
        engine.start("lecture", Some("study"), None).unwrap();
        engine.clock().advance(Duration::minutes(135));

        let mut output = Vec::new();
        run(&mut output, &mut engine, &StopArgs { at: None }).unwrap();
        assert_eq!(
            String::from_utf8(output).unwrap(),
            "Stopped tracking: lecture (study) - duration 2h 15m\n"
        );
    }

    #[test]
    fn test_stop_at_explicit_time() {
        let mut engine = engine();
        engine.start("lecture", Some("study"), None).unwrap();
        engine.clock().advance(Duration::hours(3));

        let mut output = Vec::new();
        let args = StopArgs {
            at: Some("10:30".to_string()),
        };
        run(&mut output, &mut engine, &args).unwrap();
        assert_eq!(
            engine.store().sessions()[0].duration(),
            Some(Duration::minutes(90))
        );
    }

    #[test]
    fn test_stop_while_idle_is_not_tracking() {
        let mut engine = engine();
        let mut output = Vec::new();
        let err = run(&mut output, &mut engine, &StopArgs { at: None }).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<TrackError>(),
            Some(TrackError::NotTracking)
        ));
        assert!(output.is_empty());
    }
}
