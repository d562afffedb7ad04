//! Core domain logic for the activity tracker.
//!
//! This crate contains:
//! - Session model and validated labels
//! - `SessionStore`: the session collection and its single-active-session invariant
//! - `TrackingEngine`: the start/stop/clear state machine
//! - Report aggregation: period windows, clipping, per-category totals
//!
//! It performs no terminal or file I/O of its own; persistence and the clock
//! are supplied by the caller.

mod clock;
mod error;
pub mod period;
pub mod report;
mod session;
mod store;
mod tracking;
pub mod types;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{StorageError, TrackError};
pub use period::{Period, UnknownPeriod, Window};
pub use report::{ActivitySummary, Grouping, Report, SessionSlice, UnknownGrouping};
pub use session::Session;
pub use store::{MemoryPersistence, SessionPersistence, SessionStore};
pub use tracking::{Status, TrackerState, TrackingEngine};
pub use types::{ActivityName, Category, ValidationError};
