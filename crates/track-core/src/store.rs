//! The durable session collection and its invariants.
//!
//! [`SessionStore`] is the only owner of [`Session`] values. Raw reads and
//! writes go through a [`SessionPersistence`] collaborator; every mutation
//! writes the full updated collection before it becomes visible in memory, so
//! a failed save leaves the store exactly as it was.

use chrono::NaiveDateTime;

use crate::error::{StorageError, TrackError};
use crate::session::Session;

/// Raw load/save of the whole session collection.
pub trait SessionPersistence {
    /// Loads every stored session. An empty store yields an empty vector.
    fn load_all(&self) -> Result<Vec<Session>, StorageError>;

    /// Replaces the stored collection with `sessions`.
    fn save_all(&mut self, sessions: &[Session]) -> Result<(), StorageError>;
}

/// Persistence kept in memory, for tests and dry runs.
#[derive(Debug, Clone, Default)]
pub struct MemoryPersistence {
    sessions: Vec<Session>,
    saves: usize,
}

impl MemoryPersistence {
    pub const fn new(sessions: Vec<Session>) -> Self {
        Self { sessions, saves: 0 }
    }

    /// The currently "persisted" sessions.
    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    /// Number of completed `save_all` calls.
    pub const fn saves(&self) -> usize {
        self.saves
    }
}

impl SessionPersistence for MemoryPersistence {
    fn load_all(&self) -> Result<Vec<Session>, StorageError> {
        Ok(self.sessions.clone())
    }

    fn save_all(&mut self, sessions: &[Session]) -> Result<(), StorageError> {
        self.sessions = sessions.to_vec();
        self.saves += 1;
        Ok(())
    }
}

/// Owns the session collection for one invocation.
#[derive(Debug)]
pub struct SessionStore<P> {
    persistence: P,
    sessions: Vec<Session>,
}

impl<P: SessionPersistence> SessionStore<P> {
    /// Loads the stored sessions through `persistence`.
    ///
    /// Closed sessions whose end is not after their start are reported as
    /// corrupt rather than dropped.
    pub fn load(persistence: P) -> Result<Self, TrackError> {
        let sessions = persistence.load_all()?;
        if let Some(bad) = sessions
            .iter()
            .find(|s| s.end.is_some_and(|end| end <= s.start))
        {
            return Err(TrackError::StorageCorrupt(format!(
                "session '{}' ends at {} but starts at {}",
                bad.name,
                bad.end.unwrap_or(bad.start),
                bad.start
            )));
        }
        tracing::debug!(count = sessions.len(), "loaded sessions");
        Ok(Self {
            persistence,
            sessions,
        })
    }

    /// All sessions in stored order.
    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    /// The persistence collaborator.
    pub const fn persistence(&self) -> &P {
        &self.persistence
    }

    /// Returns the open session, if any.
    ///
    /// More than one open session means the stored data is inconsistent; this
    /// is reported instead of picking one.
    pub fn active_session(&self) -> Result<Option<&Session>, TrackError> {
        let mut open = self.sessions.iter().filter(|s| s.is_active());
        let first = open.next();
        let extra = open.count();
        if extra > 0 {
            tracing::warn!(open = extra + 1, "multiple open sessions in store");
            return Err(TrackError::InvariantViolation { open: extra + 1 });
        }
        Ok(first)
    }

    /// Latest end instant among closed sessions.
    pub fn last_end(&self) -> Option<NaiveDateTime> {
        self.sessions.iter().filter_map(|s| s.end).max()
    }

    /// Appends a new open session.
    pub fn append(&mut self, session: Session) -> Result<Session, TrackError> {
        if let Some(active) = self.active_session()? {
            return Err(TrackError::AlreadyTracking {
                name: active.name.to_string(),
                since: active.start,
            });
        }
        let mut updated = self.sessions.clone();
        updated.push(session.clone());
        self.commit(updated)?;
        tracing::debug!(name = %session.name, "appended session");
        Ok(session)
    }

    /// Closes the open session at `end` and returns it.
    pub fn close_active(&mut self, end: NaiveDateTime) -> Result<Session, TrackError> {
        self.active_session()?;
        let index = self
            .sessions
            .iter()
            .position(Session::is_active)
            .ok_or(TrackError::NotTracking)?;
        let start = self.sessions[index].start;
        if end <= start {
            return Err(TrackError::InvalidDuration { start, end });
        }

        let mut updated = self.sessions.clone();
        updated[index].end = Some(end);
        self.commit(updated)?;
        tracing::debug!(%end, "closed active session");
        Ok(self.sessions[index].clone())
    }

    /// Removes every session and returns how many were removed.
    pub fn clear(&mut self) -> Result<usize, TrackError> {
        let removed = self.sessions.len();
        self.commit(Vec::new())?;
        tracing::debug!(removed, "cleared sessions");
        Ok(removed)
    }

    fn commit(&mut self, sessions: Vec<Session>) -> Result<(), TrackError> {
        self.persistence.save_all(&sessions)?;
        self.sessions = sessions;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ActivityName, Category};
    use chrono::NaiveDate;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 12)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn session(name: &str, start: NaiveDateTime, end: Option<NaiveDateTime>) -> Session {
        Session {
            name: ActivityName::new(name).unwrap(),
            category: Some(Category::new("work").unwrap()),
            start,
            end,
        }
    }

    /// Persistence whose writes always fail.
    struct FailingPersistence;

    impl SessionPersistence for FailingPersistence {
        fn load_all(&self) -> Result<Vec<Session>, StorageError> {
            Ok(Vec::new())
        }

        fn save_all(&mut self, _sessions: &[Session]) -> Result<(), StorageError> {
            Err(StorageError::io("write failed", "read-only file system"))
        }
    }

    #[test]
    fn test_load_empty() {
        let store = SessionStore::load(MemoryPersistence::default()).unwrap();
        assert!(store.sessions().is_empty());
        assert!(store.active_session().unwrap().is_none());
    }

    #[test]
    fn test_load_rejects_non_positive_duration() {
        let persisted = MemoryPersistence::new(vec![session("a", at(10, 0), Some(at(10, 0)))]);
        let err = SessionStore::load(persisted).unwrap_err();
        assert!(matches!(err, TrackError::StorageCorrupt(_)));
    }

    #[test]
    fn test_multiple_open_sessions_is_invariant_violation() {
        let persisted = MemoryPersistence::new(vec![
            session("a", at(9, 0), None),
            session("b", at(10, 0), None),
        ]);
        let store = SessionStore::load(persisted).unwrap();
        let err = store.active_session().unwrap_err();
        assert!(matches!(err, TrackError::InvariantViolation { open: 2 }));
    }

    #[test]
    fn test_append_persists_before_returning() {
        let mut store = SessionStore::load(MemoryPersistence::default()).unwrap();
        let appended = store.append(session("a", at(9, 0), None)).unwrap();

        assert_eq!(appended, session("a", at(9, 0), None));
        assert_eq!(store.sessions(), std::slice::from_ref(&appended));
        assert_eq!(store.persistence().saves(), 1);
        assert_eq!(store.persistence().sessions(), store.sessions());
        assert_eq!(store.active_session().unwrap().unwrap().name.as_str(), "a");
    }

    #[test]
    fn test_append_while_active_is_rejected() {
        let mut store =
            SessionStore::load(MemoryPersistence::new(vec![session("a", at(9, 0), None)])).unwrap();
        let err = store.append(session("b", at(9, 30), None)).unwrap_err();
        assert!(matches!(err, TrackError::AlreadyTracking { ref name, .. } if name == "a"));
        assert_eq!(store.sessions().len(), 1);
        assert_eq!(store.persistence().saves(), 0);
    }

    #[test]
    fn test_close_active_sets_end() {
        let mut store = SessionStore::load(MemoryPersistence::new(vec![
            session("a", at(8, 0), Some(at(8, 30))),
            session("b", at(9, 0), None),
        ]))
        .unwrap();
        let closed = store.close_active(at(10, 0)).unwrap();
        assert_eq!(closed.name.as_str(), "b");
        assert_eq!(closed.end, Some(at(10, 0)));
        assert!(store.active_session().unwrap().is_none());
        assert_eq!(store.persistence().sessions()[1].end, Some(at(10, 0)));
    }

    #[test]
    fn test_close_without_active_is_not_tracking() {
        let mut store = SessionStore::load(MemoryPersistence::default()).unwrap();
        assert!(matches!(
            store.close_active(at(10, 0)),
            Err(TrackError::NotTracking)
        ));
    }

    #[test]
    fn test_close_at_or_before_start_is_invalid_duration() {
        let mut store =
            SessionStore::load(MemoryPersistence::new(vec![session("a", at(9, 0), None)])).unwrap();
        assert!(matches!(
            store.close_active(at(9, 0)),
            Err(TrackError::InvalidDuration { .. })
        ));
        assert!(matches!(
            store.close_active(at(8, 0)),
            Err(TrackError::InvalidDuration { .. })
        ));
        assert!(store.active_session().unwrap().is_some());
    }

    #[test]
    fn test_clear_returns_count_and_is_idempotent() {
        let mut store = SessionStore::load(MemoryPersistence::new(vec![
            session("a", at(8, 0), Some(at(8, 30))),
            session("b", at(9, 0), None),
        ]))
        .unwrap();
        assert_eq!(store.clear().unwrap(), 2);
        assert_eq!(store.clear().unwrap(), 0);
        assert!(store.sessions().is_empty());
        assert!(store.persistence().sessions().is_empty());
    }

    #[test]
    fn test_failed_save_leaves_memory_unchanged() {
        let mut store = SessionStore::load(FailingPersistence).unwrap();
        let err = store.append(session("a", at(9, 0), None)).unwrap_err();
        assert!(matches!(err, TrackError::StorageIo { .. }));
        assert!(store.sessions().is_empty());
    }

    #[test]
    fn test_last_end_ignores_insertion_order() {
        let store = SessionStore::load(MemoryPersistence::new(vec![
            session("late", at(14, 0), Some(at(15, 0))),
            session("early", at(8, 0), Some(at(9, 0))),
        ]))
        .unwrap();
        assert_eq!(store.last_end(), Some(at(15, 0)));
    }
}
