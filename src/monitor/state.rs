//! Per-target classification state and the aggregate that owns it.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use super::history::{HistoryEntry, HistoryRing};
use crate::probe::ProbeStatus;

/// Classification of a target between probes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TargetStatus {
    /// No outcome observed yet
    #[default]
    Uninitialized,
    Up,
    Down,
}

impl From<ProbeStatus> for TargetStatus {
    fn from(status: ProbeStatus) -> Self {
        match status {
            ProbeStatus::Up => TargetStatus::Up,
            ProbeStatus::Down => TargetStatus::Down,
        }
    }
}

/// Mutable state tracked for one target.
///
/// `down_since` is set exactly while `status` is `Down`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TargetState {
    pub status: TargetStatus,
    pub down_since: Option<DateTime<Utc>>,
    /// Last SLOW notification; `None` stands for "never"
    pub last_slow_notified_at: Option<DateTime<Utc>>,
    /// Last repeated DOWN notification in the current outage
    pub last_down_notified_at: Option<DateTime<Utc>>,
}

impl TargetState {
    /// Seconds since `since`, or `None` when never set. Clock skew yields 0.
    pub fn elapsed_secs(since: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Option<u64> {
        since.map(|t| (now - t).num_seconds().max(0) as u64)
    }
}

/// Owned aggregate of all per-target state and history.
///
/// Entries are created lazily on the first observation of a target.
#[derive(Debug, Clone)]
pub struct MonitorContext {
    history_size: usize,
    states: HashMap<String, TargetState>,
    history: HashMap<String, HistoryRing>,
}

impl MonitorContext {
    pub fn new(history_size: usize) -> Self {
        Self {
            history_size,
            states: HashMap::new(),
            history: HashMap::new(),
        }
    }

    pub fn state(&self, target: &str) -> Option<&TargetState> {
        self.states.get(target)
    }

    /// State for `target`, created uninitialized if absent.
    pub fn state_mut(&mut self, target: &str) -> &mut TargetState {
        self.states.entry(target.to_string()).or_default()
    }

    pub fn history(&self, target: &str) -> Option<&HistoryRing> {
        self.history.get(target)
    }

    /// Append an observation to the target's history ring.
    pub fn record(&mut self, target: &str, timestamp: DateTime<Utc>, status: ProbeStatus) {
        let size = self.history_size;
        self.history
            .entry(target.to_string())
            .or_insert_with(|| HistoryRing::new(size))
            .push(HistoryEntry { timestamp, status });
    }

    /// Number of targets observed so far.
    pub fn len(&self) -> usize {
        self.states.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_lazy_creation() {
        let mut ctx = MonitorContext::new(3);
        assert!(ctx.state("a").is_none());
        assert!(ctx.history("a").is_none());

        assert_eq!(ctx.state_mut("a").status, TargetStatus::Uninitialized);
        assert_eq!(ctx.len(), 1);

        let ts = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        ctx.record("a", ts, ProbeStatus::Up);
        let ring = ctx.history("a").unwrap();
        assert_eq!(ring.capacity(), 3);
        assert_eq!(ring.len(), 1);
    }

    #[test]
    fn test_targets_are_isolated() {
        let mut ctx = MonitorContext::new(2);
        ctx.state_mut("a").status = TargetStatus::Down;
        assert_eq!(ctx.state_mut("b").status, TargetStatus::Uninitialized);
        assert_eq!(ctx.state("a").unwrap().status, TargetStatus::Down);
    }

    #[test]
    fn test_elapsed_secs() {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let t1 = t0 + chrono::Duration::seconds(90);
        assert_eq!(TargetState::elapsed_secs(Some(t0), t1), Some(90));
        assert_eq!(TargetState::elapsed_secs(Some(t1), t0), Some(0));
        assert_eq!(TargetState::elapsed_secs(None, t1), None);
    }
}
