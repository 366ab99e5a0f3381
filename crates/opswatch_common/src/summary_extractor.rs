//! Frequency ranking of classified entries
//!
//! Groups entries by their memoized summary and ranks the groups by
//! descending count. Ties break on ascending description so the ranking
//! is deterministic.

use std::collections::HashMap;

use crate::log_entry::LogEntry;

/// A `(count, description)` projection of one summary group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSummary {
    pub count: usize,
    pub description: String,
}

pub struct SummaryExtractor<'a> {
    entries: &'a [LogEntry],
}

impl<'a> SummaryExtractor<'a> {
    pub fn new(entries: &'a [LogEntry]) -> Self {
        Self { entries }
    }

    /// The `n` most frequent summaries. `top(0)` is empty; an `n` beyond
    /// the number of distinct summaries yields all of them, fully ranked.
    pub fn top(&self, n: usize) -> Vec<LogSummary> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for entry in self.entries {
            *counts.entry(entry.summary()).or_insert(0) += 1;
        }
        let mut groups: Vec<LogSummary> = counts
            .into_iter()
            .map(|(description, count)| LogSummary {
                count,
                description: description.to_string(),
            })
            .collect();
        groups.sort_by(|a, b| {
            b.count
                .cmp(&a.count)
                .then_with(|| a.description.cmp(&b.description))
        });
        groups.truncate(n);
        groups
    }
}
