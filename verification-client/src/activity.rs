use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::Display;

/// Entries kept before the oldest ones are evicted
pub const DEFAULT_LOG_CAPACITY: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "UPPERCASE")]
pub enum Severity {
    Info,
    Error,
    Success,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub severity: Severity,
    pub message: String,
}

/// Chronological, append-only console log shown next to the verification result.
///
/// Bounded: past `capacity` entries the oldest one is dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "StoredLog")]
pub struct ActivityLog {
    capacity: usize,
    entries: VecDeque<LogEntry>,
}

/// Serialized form, normalised through [`ActivityLog::new`] on the way in
#[derive(Deserialize)]
struct StoredLog {
    capacity: usize,
    entries: VecDeque<LogEntry>,
}

impl From<StoredLog> for ActivityLog {
    fn from(stored: StoredLog) -> Self {
        let mut log = Self::new(stored.capacity);
        let skip = stored.entries.len().saturating_sub(log.capacity);
        log.entries.extend(stored.entries.into_iter().skip(skip));
        log
    }
}

impl Default for ActivityLog {
    fn default() -> Self {
        Self::new(DEFAULT_LOG_CAPACITY)
    }
}

impl ActivityLog {
    /// Creates an empty log holding at most `capacity` entries (at least one)
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            entries: VecDeque::with_capacity(capacity.min(DEFAULT_LOG_CAPACITY)),
        }
    }

    pub fn record(&mut self, timestamp: DateTime<Utc>, severity: Severity, message: impl Into<String>) {
        while self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(LogEntry {
            timestamp,
            severity,
            message: message.into(),
        });
    }

    pub fn entries(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    #[must_use]
    pub fn last(&self) -> Option<&LogEntry> {
        self.entries.back()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }
}
