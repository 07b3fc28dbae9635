//! Session-partitioned log buffer.
//!
//! Entries are filed under an identifier: first a provisional one (the
//! connection name), then the trainer label once the identity is known.
//! The book is process-wide state with an explicit install/reset lifecycle:
//!
//! - [`install_global`] at startup
//! - [`global`] to fetch the installed book
//! - [`reset_global`] to tear it down (tests)

mod session_log;

pub use session_log::SessionLog;

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, IntoStaticStr};

static GLOBAL_BOOK: Mutex<Option<Arc<LogBook>>> = Mutex::new(None);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, IntoStaticStr, Display)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    #[strum(serialize = "INFO")]
    Info,
    #[strum(serialize = "WARN")]
    Warn,
    #[strum(serialize = "ERROR")]
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub message: String,
}

impl LogEntry {
    pub fn new<S: Into<String>>(level: LogLevel, message: S) -> Self {
        Self {
            timestamp: Utc::now(),
            level,
            message: message.into(),
        }
    }
}

/// Buffered log entries keyed by session identifier
#[derive(Debug, Default)]
pub struct LogBook {
    buckets: Mutex<HashMap<String, Vec<LogEntry>>>,
}

impl LogBook {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Vec<LogEntry>>> {
        self.buckets.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn append(&self, id: &str, entry: LogEntry) {
        self.lock().entry(id.to_string()).or_default().push(entry);
    }

    /// Snapshot of the entries filed under `id`, oldest first
    pub fn entries(&self, id: &str) -> Vec<LogEntry> {
        self.lock().get(id).cloned().unwrap_or_default()
    }

    pub fn count(&self, id: &str) -> usize {
        self.lock().get(id).map_or(0, Vec::len)
    }

    pub fn identifiers(&self) -> Vec<String> {
        let mut ids: Vec<_> = self.lock().keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Move every entry filed under `old` to the end of `new`, keeping order.
    ///
    /// Returns the number of entries moved; an absent or empty `old` bucket
    /// (e.g. already migrated) moves nothing.
    pub fn flush_buffered(&self, old: &str, new: &str) -> usize {
        if old == new {
            return 0;
        }

        let mut buckets = self.lock();
        let Some(moved) = buckets.remove(old) else {
            return 0;
        };
        let count = moved.len();
        if count > 0 {
            buckets.entry(new.to_string()).or_default().extend(moved);
        }
        count
    }

    pub fn clear(&self) {
        self.lock().clear();
    }
}

/// Install the process-wide log book, returning the existing one if already installed
pub fn install_global() -> Arc<LogBook> {
    let mut slot = GLOBAL_BOOK.lock().unwrap_or_else(PoisonError::into_inner);
    Arc::clone(slot.get_or_insert_with(|| Arc::new(LogBook::new())))
}

/// The installed process-wide log book, if any
pub fn global() -> Option<Arc<LogBook>> {
    GLOBAL_BOOK
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

/// Drop the process-wide log book.
///
/// Sessions keep the book they were created with; only later
/// [`install_global`] calls see a fresh one.
pub fn reset_global() {
    GLOBAL_BOOK
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .take();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book_with(id: &str, messages: &[&str]) -> LogBook {
        let book = LogBook::new();
        for message in messages {
            book.append(id, LogEntry::new(LogLevel::Info, *message));
        }
        book
    }

    #[test]
    fn test_flush_moves_entries_in_order() {
        let book = book_with("192.168.0.106", &["connected", "reading", "parsed"]);

        let moved = book.flush_buffered("192.168.0.106", "Ash-483256");
        assert_eq!(moved, 3);
        assert_eq!(book.count("192.168.0.106"), 0);

        let messages: Vec<_> = book
            .entries("Ash-483256")
            .into_iter()
            .map(|e| e.message)
            .collect();
        assert_eq!(messages, vec!["connected", "reading", "parsed"]);
    }

    #[test]
    fn test_flush_twice_is_noop() {
        let book = book_with("192.168.0.106", &["a", "b", "c"]);

        assert_eq!(book.flush_buffered("192.168.0.106", "Ash-483256"), 3);
        assert_eq!(book.flush_buffered("192.168.0.106", "Ash-483256"), 0);
        assert_eq!(book.count("Ash-483256"), 3);
    }

    #[test]
    fn test_flush_appends_after_existing_entries() {
        let book = book_with("Ash-483256", &["earlier session"]);
        book.append("10.0.0.2", LogEntry::new(LogLevel::Warn, "new session"));

        book.flush_buffered("10.0.0.2", "Ash-483256");
        let entries = book.entries("Ash-483256");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].message, "earlier session");
        assert_eq!(entries[1].level, LogLevel::Warn);
    }

    #[test]
    fn test_flush_to_same_identifier() {
        let book = book_with("a", &["x"]);
        assert_eq!(book.flush_buffered("a", "a"), 0);
        assert_eq!(book.count("a"), 1);
    }

    #[test]
    fn test_other_buckets_untouched() {
        let book = book_with("a", &["1"]);
        book.append("b", LogEntry::new(LogLevel::Info, "2"));

        book.flush_buffered("a", "c");
        assert_eq!(book.count("b"), 1);
        assert_eq!(book.identifiers(), vec!["b".to_string(), "c".to_string()]);
    }

    #[test]
    fn test_global_lifecycle() {
        reset_global();
        assert!(global().is_none());

        let installed = install_global();
        installed.append("x", LogEntry::new(LogLevel::Info, "hello"));
        let again = install_global();
        assert!(Arc::ptr_eq(&installed, &again));
        assert_eq!(global().unwrap().count("x"), 1);

        reset_global();
        assert!(global().is_none());
        assert_eq!(install_global().count("x"), 0);
        reset_global();
    }
}
