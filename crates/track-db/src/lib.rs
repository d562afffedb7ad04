//! Storage layer for the activity tracker.
//!
//! Provides persistence for tracked sessions using `rusqlite`. The
//! [`Database`] implements [`SessionPersistence`]: the whole collection is
//! loaded at once and replaced at once inside a single transaction.
//!
//! # Thread Safety
//!
//! The [`Database`] type wraps a `rusqlite::Connection`, which is `Send` but not `Sync`.
//! One invocation owns one connection; concurrent invocations are not coordinated.
//!
//! # Schema
//!
//! ## Timestamp Format
//!
//! Timestamps are timezone-naive local times stored as TEXT in the form
//! `YYYY-MM-DDTHH:MM:SS`. Lexicographic ordering matches chronological
//! ordering. Rows using a space separator or fractional seconds are accepted
//! when reading.
//!
//! ## Open Sessions
//!
//! An open session has a NULL `end_time`. At most one such row is expected;
//! the session store reports anything else.

use std::path::Path;

use chrono::{NaiveDateTime, Timelike};
use rusqlite::{Connection, params};
use thiserror::Error;

use track_core::{ActivityName, Category, Session, SessionPersistence, StorageError};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";
const ACCEPTED_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// A stored row could not be turned into a session.
    #[error("invalid session row {id}: {message}")]
    InvalidRow { id: i64, message: String },
}

impl From<DbError> for StorageError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Sqlite(source) => Self::io("sqlite operation failed", source),
            DbError::InvalidRow { id, message } => {
                Self::corrupt(format!("session row {id}: {message}"))
            }
        }
    }
}

/// Database connection wrapper.
///
/// See the [module documentation](self) for thread safety considerations.
pub struct Database {
    conn: Connection,
}

/// A session row exactly as stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    pub id: i64,
    pub activity: String,
    pub category: Option<String>,
    pub start_time: String,
    pub end_time: Option<String>,
}

impl SessionRecord {
    /// Validates the row into a [`Session`].
    pub fn into_session(self) -> Result<Session, DbError> {
        let id = self.id;
        let invalid = |message: String| DbError::InvalidRow { id, message };

        let name = ActivityName::new(&self.activity).map_err(|e| invalid(e.to_string()))?;
        let category = Category::parse_optional(self.category.as_deref())
            .map_err(|e| invalid(e.to_string()))?;
        let start = parse_timestamp(&self.start_time)
            .ok_or_else(|| invalid(format!("unparseable start_time {:?}", self.start_time)))?;
        let end = match self.end_time.as_deref() {
            None => None,
            Some(raw) => Some(
                parse_timestamp(raw)
                    .ok_or_else(|| invalid(format!("unparseable end_time {raw:?}")))?,
            ),
        };

        Ok(Session {
            name,
            category,
            start,
            end,
        })
    }
}

impl Database {
    /// Opens a database at the given path, creating it if necessary.
    ///
    /// The database schema is automatically initialized on first open.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Opens an in-memory database.
    ///
    /// Useful for testing. The database is destroyed when the connection closes.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initializes the database schema.
    ///
    /// This is idempotent - safe to call on an already-initialized database.
    fn init(&self) -> Result<(), DbError> {
        self.conn.execute_batch(
            "
            -- start_time/end_time: local time, 'YYYY-MM-DDTHH:MM:SS'
            -- end_time NULL marks the open session
            CREATE TABLE IF NOT EXISTS activities (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                activity TEXT NOT NULL,
                category TEXT,
                start_time TEXT NOT NULL,
                end_time TEXT
            );

            CREATE INDEX IF NOT EXISTS idx_activities_start ON activities(start_time);
            ",
        )?;
        Ok(())
    }

    /// Lists every stored row in insertion order.
    pub fn list_records(&self) -> Result<Vec<SessionRecord>, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT id, activity, category, start_time, end_time
            FROM activities
            ORDER BY id ASC
            ",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(SessionRecord {
                id: row.get(0)?,
                activity: row.get(1)?,
                category: row.get(2)?,
                start_time: row.get(3)?,
                end_time: row.get(4)?,
            })
        })?;
        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(records)
    }

    /// Loads and validates every stored session.
    pub fn load_sessions(&self) -> Result<Vec<Session>, DbError> {
        self.list_records()?
            .into_iter()
            .map(SessionRecord::into_session)
            .collect()
    }

    /// Replaces the stored sessions with `sessions` in one transaction.
    pub fn replace_sessions(&mut self, sessions: &[Session]) -> Result<(), DbError> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM activities", [])?;
        {
            let mut stmt = tx.prepare(
                "
                INSERT INTO activities (activity, category, start_time, end_time)
                VALUES (?, ?, ?, ?)
                ",
            )?;
            for session in sessions {
                stmt.execute(params![
                    session.name.as_str(),
                    session.category.as_ref().map(Category::as_str),
                    format_timestamp(session.start),
                    session.end.map(format_timestamp),
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }
}

impl SessionPersistence for Database {
    fn load_all(&self) -> Result<Vec<Session>, StorageError> {
        let sessions = self.load_sessions()?;
        tracing::debug!(count = sessions.len(), "read sessions from database");
        Ok(sessions)
    }

    fn save_all(&mut self, sessions: &[Session]) -> Result<(), StorageError> {
        self.replace_sessions(sessions)?;
        tracing::debug!(count = sessions.len(), "wrote sessions to database");
        Ok(())
    }
}

/// Formats a timestamp for storage.
pub fn format_timestamp(value: NaiveDateTime) -> String {
    value.format(TIMESTAMP_FORMAT).to_string()
}

/// Parses a stored timestamp, dropping any fractional seconds.
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    ACCEPTED_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(|dt| dt.with_nanosecond(0).unwrap_or(dt))
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::NaiveDate;
    use track_core::{MemoryPersistence, SessionStore, TrackError};

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, 29)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn session(
        name: &str,
        category: Option<&str>,
        start: NaiveDateTime,
        end: Option<NaiveDateTime>,
    ) -> Session {
        Session {
            name: ActivityName::new(name).unwrap(),
            category: category.map(|c| Category::new(c).unwrap()),
            start,
            end,
        }
    }

    fn insert_raw(db: &Database, activity: &str, start: &str, end: Option<&str>) {
        db.conn
            .execute(
                "INSERT INTO activities (activity, category, start_time, end_time)
                 VALUES (?, 'work', ?, ?)",
                params![activity, start, end],
            )
            .unwrap();
    }

    #[test]
    fn test_open_in_memory_database() {
        let db = Database::open_in_memory();
        assert!(db.is_ok());
    }

    #[test]
    fn test_empty_database_loads_nothing() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.load_all().unwrap().is_empty());
    }

    #[test]
    fn test_sessions_survive_reopen() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("track.db");
        let sessions = vec![
            session("code", Some("work"), at(9, 0), Some(at(10, 0))),
            session("walk", None, at(12, 0), Some(at(12, 20))),
            session("read", Some("study"), at(13, 0), None),
        ];

        {
            let mut db = Database::open(&path).unwrap();
            db.save_all(&sessions).unwrap();
        }

        let db = Database::open(&path).unwrap();
        assert_eq!(db.load_all().unwrap(), sessions);
    }

    #[test]
    fn test_save_replaces_previous_contents() {
        let mut db = Database::open_in_memory().unwrap();
        db.save_all(&[session("a", None, at(9, 0), Some(at(9, 30)))])
            .unwrap();
        db.save_all(&[]).unwrap();
        assert!(db.list_records().unwrap().is_empty());
    }

    #[test]
    fn test_timestamps_stored_as_iso_text() {
        let mut db = Database::open_in_memory().unwrap();
        db.save_all(&[session("a", Some("work"), at(9, 5), None)])
            .unwrap();
        let records = db.list_records().unwrap();
        assert_eq!(records[0].start_time, "2025-01-29T09:05:00");
        assert_eq!(records[0].end_time, None);
        assert_eq!(records[0].category.as_deref(), Some("work"));
    }

    #[test]
    fn test_accepts_space_separated_fractional_timestamps() {
        let db = Database::open_in_memory().unwrap();
        insert_raw(
            &db,
            "legacy",
            "2025-01-29 09:00:00.123456",
            Some("2025-01-29 10:00:00.5"),
        );
        let sessions = db.load_all().unwrap();
        assert_eq!(sessions[0].start, at(9, 0));
        assert_eq!(sessions[0].end, Some(at(10, 0)));
    }

    #[test]
    fn test_unparseable_timestamp_is_corrupt() {
        let db = Database::open_in_memory().unwrap();
        insert_raw(&db, "code", "yesterday-ish", None);
        let err = db.load_all().unwrap_err();
        assert!(matches!(err, StorageError::Corrupt { .. }));

        let err = SessionStore::load(db).err().unwrap();
        assert!(matches!(err, TrackError::StorageCorrupt(_)));
    }

    #[test]
    fn test_blank_activity_is_corrupt() {
        let db = Database::open_in_memory().unwrap();
        insert_raw(&db, "  ", "2025-01-29T09:00:00", None);
        assert!(matches!(
            db.load_all().unwrap_err(),
            StorageError::Corrupt { .. }
        ));
    }

    #[test]
    fn test_two_open_rows_surface_invariant_violation() {
        let db = Database::open_in_memory().unwrap();
        insert_raw(&db, "a", "2025-01-29T09:00:00", None);
        insert_raw(&db, "b", "2025-01-29T10:00:00", None);

        let store = SessionStore::load(db).unwrap();
        assert!(matches!(
            store.active_session(),
            Err(TrackError::InvariantViolation { open: 2 })
        ));
    }

    #[test]
    fn test_store_round_trip_matches_memory_persistence() {
        let sessions = vec![session("code", Some("work"), at(9, 0), Some(at(10, 0)))];
        let mut db = Database::open_in_memory().unwrap();
        db.save_all(&sessions).unwrap();

        let from_db = SessionStore::load(db).unwrap();
        let from_memory = SessionStore::load(MemoryPersistence::new(sessions)).unwrap();
        assert_eq!(from_db.sessions(), from_memory.sessions());
    }
}
