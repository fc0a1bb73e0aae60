use chrono::{DateTime, Local};

use crate::category::Category;
use crate::log::LogEntry;

/// An open, in-progress unit of tracked time for one category.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub category: Category,
    pub start: DateTime<Local>,
    pub comment: Option<String>,
}

impl Session {
    fn new(category: Category, start: DateTime<Local>) -> Self {
        Self {
            category,
            start,
            comment: None,
        }
    }

    fn close(self, end: DateTime<Local>) -> LogEntry {
        LogEntry {
            start: self.start,
            end,
            category: self.category,
            comment: self.comment,
        }
    }
}

/// Comment edits require an open session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("no session is currently open")]
pub struct NoOpenSession;

/// State machine deciding start/stop/switch transitions from
/// category-selection events.
///
/// Holds at most one open session. Transitions take the current time as a
/// parameter and return the completed entry (if any) for the caller to
/// persist; the tracker itself never touches storage.
#[derive(Debug, Default)]
pub struct Tracker {
    active: Option<Session>,
}

impl Tracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> Option<&Session> {
        self.active.as_ref()
    }

    pub fn is_tracking(&self) -> bool {
        self.active.is_some()
    }

    /// Applies a category selection.
    ///
    /// With no open session this starts one. Re-selecting the open session's
    /// category stops it. Selecting a different category stops the open
    /// session and starts the new one in the same step, so there is never a
    /// moment with two open sessions. At most one entry is returned per call.
    pub fn select(&mut self, category: Category, now: DateTime<Local>) -> Option<LogEntry> {
        match self.active.take() {
            None => {
                self.active = Some(Session::new(category, now));
                None
            }
            Some(open) if open.category == category => Some(open.close(now)),
            Some(open) => {
                self.active = Some(Session::new(category, now));
                Some(open.close(now))
            }
        }
    }

    /// Replaces the open session's comment; empty or absent text clears it.
    pub fn set_comment(&mut self, text: Option<String>) -> Result<(), NoOpenSession> {
        match self.active.as_mut() {
            Some(session) => {
                session.comment = text.filter(|t| !t.is_empty());
                Ok(())
            }
            None => Err(NoOpenSession),
        }
    }

    /// Closes the open session on orderly termination. Idempotent: with no
    /// open session nothing is produced.
    pub fn close_for_shutdown(&mut self, now: DateTime<Local>) -> Option<LogEntry> {
        self.active.take().map(|open| open.close(now))
    }
}
