//! Start/stop/clear state machine.
//!
//! The engine has two states, [`TrackerState::Idle`] and
//! [`TrackerState::Tracking`], derived from whether the store holds an open
//! session. `start` is only valid while idle, `stop` only while tracking, and
//! `clear` in either state.

use chrono::{Duration, NaiveDateTime};
use serde::Serialize;

use crate::clock::Clock;
use crate::error::TrackError;
use crate::session::Session;
use crate::store::{SessionPersistence, SessionStore};
use crate::types::{ActivityName, Category};

/// Whether a session is currently open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackerState {
    Idle,
    Tracking,
}

/// Snapshot of the active session for live display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub session: Session,
    pub elapsed: Duration,
}

/// Tracking operations over a [`SessionStore`] and a [`Clock`].
#[derive(Debug)]
pub struct TrackingEngine<P, C> {
    store: SessionStore<P>,
    clock: C,
}

impl<P: SessionPersistence, C: Clock> TrackingEngine<P, C> {
    pub const fn new(store: SessionStore<P>, clock: C) -> Self {
        Self { store, clock }
    }

    /// Read access to the underlying store, e.g. for reporting.
    pub const fn store(&self) -> &SessionStore<P> {
        &self.store
    }

    pub const fn clock(&self) -> &C {
        &self.clock
    }

    pub fn into_store(self) -> SessionStore<P> {
        self.store
    }

    pub fn state(&self) -> Result<TrackerState, TrackError> {
        Ok(if self.store.active_session()?.is_some() {
            TrackerState::Tracking
        } else {
            TrackerState::Idle
        })
    }

    /// Opens a new session named `name`, starting at `at` (default: now).
    ///
    /// A blank category is recorded as uncategorized. The start may not lie
    /// in the future, nor before the end of an already recorded session.
    pub fn start(
        &mut self,
        name: &str,
        category: Option<&str>,
        at: Option<NaiveDateTime>,
    ) -> Result<Session, TrackError> {
        let name = ActivityName::new(name)?;
        let category = Category::parse_optional(category)?;
        let now = self.clock.now();
        let start = at.unwrap_or(now);

        if start > now {
            return Err(TrackError::InvalidInput(format!(
                "start {start} is in the future (now is {now})"
            )));
        }
        if let Some(active) = self.store.active_session()? {
            return Err(TrackError::AlreadyTracking {
                name: active.name.to_string(),
                since: active.start,
            });
        }
        if let Some(last_end) = self.store.last_end().filter(|&end| start < end) {
            return Err(TrackError::InvalidInput(format!(
                "start {start} overlaps a recorded session ending at {last_end}"
            )));
        }

        let session = self.store.append(Session::open(name, category, start))?;
        tracing::info!(
            name = %session.name,
            category = session.category_label(),
            %start,
            "started tracking"
        );
        Ok(session)
    }

    /// Closes the active session at `at` (default: now).
    pub fn stop(&mut self, at: Option<NaiveDateTime>) -> Result<Session, TrackError> {
        let end = at.unwrap_or_else(|| self.clock.now());
        let session = self.store.close_active(end)?;
        tracing::info!(
            name = %session.name,
            seconds = session.duration().map_or(0, |d| d.num_seconds()),
            "stopped tracking"
        );
        Ok(session)
    }

    /// Removes all recorded sessions. Returns how many were removed.
    ///
    /// Confirmation is the caller's job; this always clears.
    pub fn clear(&mut self) -> Result<usize, TrackError> {
        self.store.clear()
    }

    /// The active session and its elapsed time, if tracking.
    pub fn status(&self) -> Result<Option<Status>, TrackError> {
        let now = self.clock.now();
        Ok(self.store.active_session()?.map(|session| Status {
            elapsed: session.elapsed(now),
            session: session.clone(),
        }))
    }
}
