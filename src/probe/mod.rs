//! Probe module for reachability monitoring.
//!
//! A probe never fails from the caller's point of view: transport errors are
//! folded into a DOWN [`Outcome`].

mod http;

pub use http::*;

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, SubsecRound, Utc};
use thiserror::Error;

/// Probe error types.
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("probe timed out after {0:?}")]
    Timeout(Duration),
    #[error("network error: {0}")]
    Network(String),
    #[error("failed to read response body: {0}")]
    Body(String),
}

/// Reachability of a target as seen by one probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeStatus {
    Up,
    Down,
}

impl fmt::Display for ProbeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeStatus::Up => f.write_str("UP"),
            ProbeStatus::Down => f.write_str("DOWN"),
        }
    }
}

/// Response code of a probe, or the error sentinel when no response arrived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    Http(u16),
    Error,
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusCode::Http(code) => write!(f, "{}", code),
            StatusCode::Error => f.write_str("ERROR"),
        }
    }
}

/// Normalized result of a single probe.
///
/// A response time is present exactly when a response was received, i.e. when
/// `status_code` is not [`StatusCode::Error`].
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub status: ProbeStatus,
    /// Seconds, rounded to two decimals
    pub response_time_secs: Option<f64>,
    pub status_code: StatusCode,
    pub error_detail: Option<String>,
    /// Capture time, second resolution
    pub timestamp: DateTime<Utc>,
}

impl Outcome {
    /// Build an outcome for a response that arrived with `code`.
    pub fn responded(
        code: u16,
        elapsed: Duration,
        failure_threshold: u16,
        timestamp: DateTime<Utc>,
    ) -> Self {
        let status = if code >= failure_threshold {
            ProbeStatus::Down
        } else {
            ProbeStatus::Up
        };
        Self {
            status,
            response_time_secs: Some(round_secs(elapsed)),
            status_code: StatusCode::Http(code),
            error_detail: None,
            timestamp: timestamp.trunc_subsecs(0),
        }
    }

    /// Build an outcome for a probe that produced no response.
    pub fn failed(detail: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            status: ProbeStatus::Down,
            response_time_secs: None,
            status_code: StatusCode::Error,
            error_detail: Some(detail.into()),
            timestamp: timestamp.trunc_subsecs(0),
        }
    }

    pub fn is_up(&self) -> bool {
        self.status == ProbeStatus::Up
    }

    /// Render the uptime log line for this outcome:
    /// `<timestamp> | <target> | <status> | <response time or empty> | <code>`.
    pub fn log_line(&self, target: &str) -> String {
        let response_time = self
            .response_time_secs
            .map(|rt| format!("{:.2}", rt))
            .unwrap_or_default();
        format!(
            "{} | {} | {} | {} | {}",
            format_timestamp(self.timestamp),
            target,
            self.status,
            response_time,
            self.status_code
        )
    }
}

/// Render a timestamp the way log lines and messages show it.
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M:%S").to_string()
}

fn round_secs(elapsed: Duration) -> f64 {
    (elapsed.as_secs_f64() * 100.0).round() / 100.0
}

/// A reachability probe.
#[async_trait]
pub trait Prober: Send + Sync {
    /// Probe `target` once, giving up after `timeout`.
    async fn probe(&self, target: &str, timeout: Duration) -> Outcome;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_responded_classification() {
        let up = Outcome::responded(204, Duration::from_millis(1234), 400, ts());
        assert_eq!(up.status, ProbeStatus::Up);
        assert_eq!(up.response_time_secs, Some(1.23));
        assert_eq!(up.status_code, StatusCode::Http(204));

        let down = Outcome::responded(404, Duration::from_millis(80), 400, ts());
        assert_eq!(down.status, ProbeStatus::Down);
        assert!(down.response_time_secs.is_some());

        let custom = Outcome::responded(404, Duration::from_millis(80), 500, ts());
        assert!(custom.is_up());
    }

    #[test]
    fn test_failed_has_no_response_time() {
        let failed = Outcome::failed("connection refused", ts());
        assert_eq!(failed.status, ProbeStatus::Down);
        assert_eq!(failed.response_time_secs, None);
        assert_eq!(failed.status_code, StatusCode::Error);
        assert_eq!(failed.error_detail.as_deref(), Some("connection refused"));
    }

    #[test]
    fn test_timestamp_is_truncated_to_seconds() {
        let precise = ts() + chrono::Duration::milliseconds(750);
        let outcome = Outcome::failed("boom", precise);
        assert_eq!(outcome.timestamp, ts());
    }

    #[test]
    fn test_log_line_format() {
        let up = Outcome::responded(200, Duration::from_millis(350), 400, ts());
        assert_eq!(
            up.log_line("https://example.com"),
            "2024-01-01 12:00:00 | https://example.com | UP | 0.35 | 200"
        );

        let down = Outcome::failed("dns error", ts());
        assert_eq!(
            down.log_line("https://example.com"),
            "2024-01-01 12:00:00 | https://example.com | DOWN |  | ERROR"
        );
    }
}
