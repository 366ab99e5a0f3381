//! Application error-log entries
//!
//! One [`LogEntry`] per log event. The canonical one-line `summary` is
//! derived from the message's first line at construction time and
//! memoized; deserialization funnels through a raw record so entries
//! loaded from JSON are classified exactly once, like freshly built ones.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::log_patterns;

/// A log event with its memoized classification.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "LogEntryRecord")]
pub struct LogEntry {
    pub date: DateTime<Utc>,
    pub host: String,
    pub service: String,
    pub status: String,
    pub message: String,
    #[serde(skip_serializing)]
    summary: String,
}

/// Wire shape of an entry: the five raw fields, no derived data.
#[derive(Debug, Deserialize)]
struct LogEntryRecord {
    date: DateTime<Utc>,
    #[serde(default)]
    host: String,
    #[serde(default)]
    service: String,
    #[serde(default)]
    status: String,
    #[serde(default)]
    message: String,
}

impl LogEntry {
    pub fn new(
        date: DateTime<Utc>,
        host: impl Into<String>,
        service: impl Into<String>,
        status: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        let message = message.into();
        let summary = log_patterns::create_summary(&message);
        Self {
            date,
            host: host.into(),
            service: service.into(),
            status: status.into(),
            message,
            summary,
        }
    }

    /// Canonical one-line description of the entry, without the stack
    /// trace. Computed once at construction.
    pub fn summary(&self) -> &str {
        &self.summary
    }
}

impl From<LogEntryRecord> for LogEntry {
    fn from(r: LogEntryRecord) -> Self {
        LogEntry::new(r.date, r.host, r.service, r.status, r.message)
    }
}

impl Ord for LogEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.date
            .cmp(&other.date)
            .then_with(|| self.host.cmp(&other.host))
            .then_with(|| self.message.cmp(&other.message))
            .then_with(|| self.service.cmp(&other.service))
            .then_with(|| self.status.cmp(&other.status))
    }
}

impl PartialOrd for LogEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
