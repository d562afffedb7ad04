//! Tracked activity sessions.

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::types::{ActivityName, Category};

/// One tracked interval of activity, open or closed.
///
/// Instants are timezone-naive local times at second precision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// The activity label.
    pub name: ActivityName,

    /// Optional category; `None` means uncategorized.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,

    /// When the session started.
    pub start: NaiveDateTime,

    /// When the session ended. `None` while the session is still open.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<NaiveDateTime>,
}

impl Session {
    /// Creates a new open session.
    pub const fn open(
        name: ActivityName,
        category: Option<Category>,
        start: NaiveDateTime,
    ) -> Self {
        Self {
            name,
            category,
            start,
            end: None,
        }
    }

    /// Returns true if the session has no end yet.
    pub const fn is_active(&self) -> bool {
        self.end.is_none()
    }

    /// Duration of a closed session. `None` while open.
    pub fn duration(&self) -> Option<Duration> {
        self.end.map(|end| end - self.start)
    }

    /// Time elapsed since the start, as of `now`. Never negative.
    pub fn elapsed(&self, now: NaiveDateTime) -> Duration {
        (now - self.start).max(Duration::zero())
    }

    /// The category label, or `uncategorized` when none was given.
    pub fn category_label(&self) -> &str {
        self.category
            .as_ref()
            .map_or(Category::UNCATEGORIZED, Category::as_str)
    }
}
