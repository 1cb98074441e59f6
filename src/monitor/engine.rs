//! Transition engine: turns probe outcomes into classified events.
//!
//! Rules, first match wins:
//! 1. first observation of a target initializes its state and emits `Started`
//! 2. a status change emits `WentDown` or `Recovered`
//! 3. an unchanged UP status emits `Slow` when the response time crosses the
//!    threshold and the cooldown since the last `Slow` has elapsed
//! 4. an unchanged DOWN status is silent unless repeat notifications are enabled
//!
//! The slow cooldown is not reset by an outage, so a slow response right after
//! recovery is still gated by the `Slow` sent before the outage.

use chrono::{DateTime, Utc};

use super::state::{MonitorContext, TargetState, TargetStatus};
use crate::probe::{Outcome, ProbeStatus};

/// Thresholds controlling when events fire.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlertPolicy {
    pub slow_threshold_secs: f64,
    pub slow_cooldown_secs: u64,
    /// 0 disables repeated DOWN notifications
    pub down_repeat_interval_secs: u64,
}

impl Default for AlertPolicy {
    fn default() -> Self {
        Self {
            slow_threshold_secs: 2.5,
            slow_cooldown_secs: 600,
            down_repeat_interval_secs: 0,
        }
    }
}

/// A classified event for one target.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Started {
        target: String,
    },
    WentDown {
        target: String,
        outcome: Outcome,
    },
    Recovered {
        target: String,
        outcome: Outcome,
        downtime_secs: u64,
    },
    Slow {
        target: String,
        outcome: Outcome,
        threshold_secs: f64,
    },
    StillDown {
        target: String,
        outcome: Outcome,
        down_for_secs: u64,
    },
}

impl Event {
    pub fn target(&self) -> &str {
        match self {
            Event::Started { target }
            | Event::WentDown { target, .. }
            | Event::Recovered { target, .. }
            | Event::Slow { target, .. }
            | Event::StillDown { target, .. } => target,
        }
    }

    /// Short uppercase name, used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Event::Started { .. } => "STARTED",
            Event::WentDown { .. } => "WENT_DOWN",
            Event::Recovered { .. } => "RECOVERED",
            Event::Slow { .. } => "SLOW",
            Event::StillDown { .. } => "STILL_DOWN",
        }
    }

    /// Whether the event marks an UP/DOWN transition.
    pub fn is_status_change(&self) -> bool {
        matches!(self, Event::WentDown { .. } | Event::Recovered { .. })
    }
}

/// Stateless decision logic over a [`MonitorContext`].
#[derive(Debug, Clone, Default)]
pub struct TransitionEngine {
    policy: AlertPolicy,
}

impl TransitionEngine {
    pub fn new(policy: AlertPolicy) -> Self {
        Self { policy }
    }

    /// Apply one outcome for `target`, updating `ctx` and returning the event
    /// that fired, if any. The outcome's timestamp is taken as the current time.
    pub fn evaluate(&self, ctx: &mut MonitorContext, target: &str, outcome: &Outcome) -> Option<Event> {
        let now = outcome.timestamp;
        ctx.record(target, now, outcome.status);

        let state = ctx.state_mut(target);
        let observed = TargetStatus::from(outcome.status);

        if state.status == TargetStatus::Uninitialized {
            *state = TargetState {
                status: observed,
                down_since: (observed == TargetStatus::Down).then_some(now),
                last_slow_notified_at: None,
                last_down_notified_at: None,
            };
            return Some(Event::Started {
                target: target.to_string(),
            });
        }

        if state.status != observed {
            state.status = observed;
            return Some(match outcome.status {
                ProbeStatus::Down => {
                    state.down_since = Some(now);
                    Event::WentDown {
                        target: target.to_string(),
                        outcome: outcome.clone(),
                    }
                }
                ProbeStatus::Up => {
                    let downtime_secs =
                        TargetState::elapsed_secs(state.down_since.take(), now).unwrap_or(0);
                    state.last_down_notified_at = None;
                    Event::Recovered {
                        target: target.to_string(),
                        outcome: outcome.clone(),
                        downtime_secs,
                    }
                }
            });
        }

        match outcome.status {
            ProbeStatus::Up => self.check_slow(state, target, outcome, now),
            ProbeStatus::Down => self.check_still_down(state, target, outcome, now),
        }
    }

    fn check_slow(
        &self,
        state: &mut TargetState,
        target: &str,
        outcome: &Outcome,
        now: DateTime<Utc>,
    ) -> Option<Event> {
        let response_time = outcome.response_time_secs?;
        if response_time < self.policy.slow_threshold_secs {
            return None;
        }
        if let Some(since_last) = TargetState::elapsed_secs(state.last_slow_notified_at, now) {
            if since_last < self.policy.slow_cooldown_secs {
                return None;
            }
        }

        state.last_slow_notified_at = Some(now);
        Some(Event::Slow {
            target: target.to_string(),
            outcome: outcome.clone(),
            threshold_secs: self.policy.slow_threshold_secs,
        })
    }

    fn check_still_down(
        &self,
        state: &mut TargetState,
        target: &str,
        outcome: &Outcome,
        now: DateTime<Utc>,
    ) -> Option<Event> {
        let interval = self.policy.down_repeat_interval_secs;
        if interval == 0 {
            return None;
        }

        let reference = state.last_down_notified_at.or(state.down_since);
        let since_last = TargetState::elapsed_secs(reference, now)?;
        if since_last < interval {
            return None;
        }

        state.last_down_notified_at = Some(now);
        Some(Event::StillDown {
            target: target.to_string(),
            outcome: outcome.clone(),
            down_for_secs: TargetState::elapsed_secs(state.down_since, now).unwrap_or(0),
        })
    }
}
