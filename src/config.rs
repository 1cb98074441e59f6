//! Configuration module for upwatch.
//!
//! Loads configuration from environment variables with sensible defaults.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Configuration error types.
#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("no URLS configured (set URLS to a comma-separated list)")]
    NoTargets,
    #[error("invalid value {value:?} for {key}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Monitor configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Targets in probe order
    pub targets: Vec<String>,
    /// Pause between two probe cycles (default: 60s)
    pub check_interval: Duration,
    /// Per-probe timeout (default: 10s)
    pub probe_timeout: Duration,
    /// Response time in seconds at or above which an UP target counts as slow (default: 2.5)
    pub slow_threshold_secs: f64,
    /// Minimum seconds between two SLOW notifications for one target (default: 600)
    pub slow_cooldown_secs: u64,
    /// Entries kept per target in the history ring (default: 5)
    pub history_size: usize,
    /// HTTP codes at or above this are DOWN (default: 400)
    pub failure_status_threshold: u16,
    /// Seconds between repeated DOWN notifications, 0 disables them (default: 0)
    pub down_repeat_interval_secs: u64,
    /// Probes allowed in flight within one cycle (default: 1)
    pub probe_concurrency: usize,
    /// Uptime log file (default: "logs/uptime.log")
    pub log_path: PathBuf,
    pub telegram_bot_token: Option<String>,
    pub telegram_chat_id: Option<String>,
    /// Alternative Bot API host, e.g. a self-hosted server
    pub telegram_api_base: Option<String>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            targets: vec!["https://github.com".to_string()],
            check_interval: Duration::from_secs(60),
            probe_timeout: Duration::from_secs(10),
            slow_threshold_secs: 2.5,
            slow_cooldown_secs: 600,
            history_size: 5,
            failure_status_threshold: 400,
            down_repeat_interval_secs: 0,
            probe_concurrency: 1,
            log_path: PathBuf::from("logs/uptime.log"),
            telegram_bot_token: None,
            telegram_chat_id: None,
            telegram_api_base: None,
        }
    }
}

impl MonitorConfig {
    /// Load configuration from the process environment.
    ///
    /// Environment variables:
    /// - `URLS`: comma-separated targets (default: "https://github.com")
    /// - `CHECK_INTERVAL`, `TIMEOUT`, `SLOW_COOLDOWN`, `DOWN_REPEAT_INTERVAL`: seconds
    /// - `SLOW_THRESHOLD`: seconds, fractional allowed
    /// - `HISTORY_SIZE`, `PROBE_CONCURRENCY`, `FAILURE_STATUS_THRESHOLD`
    /// - `LOG_PATH`, `TELEGRAM_BOT_TOKEN`, `TELEGRAM_CHAT_ID`, `TELEGRAM_API_BASE`
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();

        if let Some(raw) = lookup("URLS") {
            cfg.targets = parse_targets(&raw);
        }
        if cfg.targets.is_empty() {
            return Err(ConfigError::NoTargets);
        }

        if let Some(secs) = parse_var::<u64, _>(&lookup, "CHECK_INTERVAL")? {
            cfg.check_interval = Duration::from_secs(positive("CHECK_INTERVAL", secs)?);
        }
        if let Some(secs) = parse_var::<u64, _>(&lookup, "TIMEOUT")? {
            cfg.probe_timeout = Duration::from_secs(positive("TIMEOUT", secs)?);
        }
        if let Some(threshold) = parse_var::<f64, _>(&lookup, "SLOW_THRESHOLD")? {
            if !threshold.is_finite() || threshold < 0.0 {
                return Err(invalid("SLOW_THRESHOLD", threshold, "must be a non-negative number"));
            }
            cfg.slow_threshold_secs = threshold;
        }
        if let Some(cooldown) = parse_var::<u64, _>(&lookup, "SLOW_COOLDOWN")? {
            cfg.slow_cooldown_secs = cooldown;
        }
        if let Some(size) = parse_var::<usize, _>(&lookup, "HISTORY_SIZE")? {
            cfg.history_size = positive("HISTORY_SIZE", size)?;
        }
        if let Some(code) = parse_var::<u16, _>(&lookup, "FAILURE_STATUS_THRESHOLD")? {
            if !(100..=599).contains(&code) {
                return Err(invalid("FAILURE_STATUS_THRESHOLD", code, "must be an HTTP status code"));
            }
            cfg.failure_status_threshold = code;
        }
        if let Some(interval) = parse_var::<u64, _>(&lookup, "DOWN_REPEAT_INTERVAL")? {
            cfg.down_repeat_interval_secs = interval;
        }
        if let Some(limit) = parse_var::<usize, _>(&lookup, "PROBE_CONCURRENCY")? {
            cfg.probe_concurrency = positive("PROBE_CONCURRENCY", limit)?;
        }

        if let Some(path) = lookup("LOG_PATH").filter(|p| !p.trim().is_empty()) {
            cfg.log_path = PathBuf::from(path.trim());
        }

        cfg.telegram_bot_token = non_empty(lookup("TELEGRAM_BOT_TOKEN"));
        cfg.telegram_chat_id = non_empty(lookup("TELEGRAM_CHAT_ID"));
        cfg.telegram_api_base = non_empty(lookup("TELEGRAM_API_BASE"));

        Ok(cfg)
    }
}

/// Split a comma-separated target list, dropping blanks and keeping order.
fn parse_targets(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_var<T, F>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse()
        .map(Some)
        .map_err(|e: T::Err| invalid(key, trimmed, e))
}

fn positive<T>(key: &'static str, value: T) -> Result<T, ConfigError>
where
    T: Default + PartialEq + std::fmt::Display,
{
    if value == T::default() {
        return Err(invalid(key, value, "must be greater than zero"));
    }
    Ok(value)
}

fn invalid(key: &'static str, value: impl ToString, reason: impl ToString) -> ConfigError {
    ConfigError::Invalid {
        key,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
