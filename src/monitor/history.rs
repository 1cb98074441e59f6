//! Bounded per-target history of recent probe outcomes.

use std::collections::VecDeque;
use std::fmt;

use chrono::{DateTime, Utc};

use crate::probe::{format_timestamp, ProbeStatus};

/// One recorded observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryEntry {
    pub timestamp: DateTime<Utc>,
    pub status: ProbeStatus,
}

impl fmt::Display for HistoryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let marker = match self.status {
            ProbeStatus::Up => "🟢",
            ProbeStatus::Down => "🔴",
        };
        write!(f, "{} {} {}", format_timestamp(self.timestamp), marker, self.status)
    }
}

/// A bounded ring of history entries, most recent first.
///
/// When capacity is exceeded the oldest entry is dropped.
#[derive(Debug, Clone)]
pub struct HistoryRing {
    capacity: usize,
    entries: VecDeque<HistoryEntry>,
}

impl HistoryRing {
    /// Create a ring holding at most `capacity` entries (clamped to at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            entries: VecDeque::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, entry: HistoryEntry) {
        if self.entries.len() == self.capacity {
            self.entries.pop_back();
        }
        self.entries.push_front(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Most recent entry, if any.
    pub fn latest(&self) -> Option<&HistoryEntry> {
        self.entries.front()
    }

    /// Entries from newest to oldest.
    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    /// Render all entries as a single ` | `-separated line.
    pub fn summary(&self) -> String {
        self.iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" | ")
    }
}
