use std::sync::{Arc, Mutex, PoisonError};

use tracing::{error, info, warn};

use super::{LogBook, LogEntry, LogLevel};

/// Per-session writer into a [`LogBook`].
///
/// Holds the identifier new entries are filed under. Writes and migration
/// both take the identifier lock first, so once [`SessionLog::migrate`]
/// returns no entry can land under the provisional identifier.
#[derive(Debug)]
pub struct SessionLog {
    book: Arc<LogBook>,
    active: Mutex<String>,
}

impl SessionLog {
    pub fn new<S: Into<String>>(book: Arc<LogBook>, provisional: S) -> Self {
        Self {
            book,
            active: Mutex::new(provisional.into()),
        }
    }

    /// Identifier entries are currently filed under
    pub fn active_id(&self) -> String {
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn book(&self) -> &Arc<LogBook> {
        &self.book
    }

    pub fn log<S: Into<String>>(&self, level: LogLevel, message: S) {
        let active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        let entry = LogEntry::new(level, message);

        let session = active.as_str();
        match level {
            LogLevel::Info => info!(target: "sysbot::session", session, "{}", entry.message),
            LogLevel::Warn => warn!(target: "sysbot::session", session, "{}", entry.message),
            LogLevel::Error => error!(target: "sysbot::session", session, "{}", entry.message),
        }

        self.book.append(&active, entry);
    }

    pub fn info<S: Into<String>>(&self, message: S) {
        self.log(LogLevel::Info, message);
    }

    pub fn warn<S: Into<String>>(&self, message: S) {
        self.log(LogLevel::Warn, message);
    }

    pub fn error<S: Into<String>>(&self, message: S) {
        self.log(LogLevel::Error, message);
    }

    /// Refile everything buffered under `provisional` to `resolved` and make
    /// `resolved` the active identifier.
    ///
    /// Repeating the call with the same arguments moves nothing. Returns the
    /// number of entries moved.
    pub fn migrate(&self, provisional: &str, resolved: &str) -> usize {
        let mut active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        let moved = self.book.flush_buffered(provisional, resolved);
        if *active != resolved {
            info!(
                "Log identifier {} -> {} ({} buffered entries moved)",
                active, resolved, moved
            );
            *active = resolved.to_string();
        }
        moved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_migrate_three_entries() {
        let book = Arc::new(LogBook::new());
        let log = SessionLog::new(Arc::clone(&book), "192.168.0.106");
        log.info("first");
        log.warn("second");
        log.info("third");

        assert_eq!(log.migrate("192.168.0.106", "Ash-483256"), 3);
        assert_eq!(book.count("192.168.0.106"), 0);

        let entries = book.entries("Ash-483256");
        let messages: Vec<_> = entries.iter().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, vec!["first", "second", "third"]);
        assert_eq!(log.active_id(), "Ash-483256");
    }

    #[test]
    fn test_migrate_is_idempotent() {
        let book = Arc::new(LogBook::new());
        let log = SessionLog::new(Arc::clone(&book), "192.168.0.106");
        log.info("a");
        log.info("b");
        log.info("c");

        log.migrate("192.168.0.106", "Ash-483256");
        assert_eq!(log.migrate("192.168.0.106", "Ash-483256"), 0);
        assert_eq!(book.count("Ash-483256"), 3);
    }

    #[test]
    fn test_entries_after_migration_go_to_resolved() {
        let book = Arc::new(LogBook::new());
        let log = SessionLog::new(Arc::clone(&book), "10.0.0.5");
        log.info("before");
        log.migrate("10.0.0.5", "Misty-000007");
        log.info("after");

        assert_eq!(book.count("10.0.0.5"), 0);
        let entries = book.entries("Misty-000007");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].message, "after");
    }

    #[test]
    fn test_concurrent_writes_during_migration() {
        let book = Arc::new(LogBook::new());
        let log = Arc::new(SessionLog::new(Arc::clone(&book), "10.0.0.9"));

        let writers: Vec<_> = (0..4)
            .map(|w| {
                let log = Arc::clone(&log);
                thread::spawn(move || {
                    for i in 0..250 {
                        log.info(format!("w{w}-{i}"));
                    }
                })
            })
            .collect();

        log.migrate("10.0.0.9", "Brock-123456");

        for writer in writers {
            writer.join().unwrap();
        }

        assert_eq!(book.count("10.0.0.9"), 0);
        assert_eq!(book.count("Brock-123456"), 1000);

        // Per-writer ordering survives the move
        let entries = book.entries("Brock-123456");
        for w in 0..4 {
            let prefix = format!("w{w}-");
            let seq: Vec<usize> = entries
                .iter()
                .filter_map(|e| e.message.strip_prefix(&prefix))
                .map(|n| n.parse().unwrap())
                .collect();
            assert_eq!(seq, (0..250).collect::<Vec<_>>());
        }
    }
}
