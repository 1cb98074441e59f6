//! Rendering of events into notification text.

use crate::monitor::Event;
use crate::probe::{format_timestamp, Outcome};

/// Render an event as a human-readable notification message.
pub fn render(event: &Event) -> String {
    match event {
        Event::Started { target } => format!("🚀 Uptime Monitor Started\nMonitoring: {}", target),
        Event::WentDown { target, outcome } => {
            let mut extra = format!("Code: {}", outcome.status_code);
            if let Some(err) = &outcome.error_detail {
                extra.push_str(&format!("\nError: {}", err));
            }
            format!(
                "❌ DOWN\n{}\n{}\n🕒 {}",
                target,
                extra,
                format_timestamp(outcome.timestamp)
            )
        }
        Event::Recovered {
            target,
            outcome,
            downtime_secs,
        } => format!(
            "✅ RECOVERED\n{}\n⏱ Response: {}\n📉 Downtime: {}\n🕒 {}",
            target,
            response_time(outcome),
            format_duration(*downtime_secs),
            format_timestamp(outcome.timestamp)
        ),
        Event::Slow {
            target,
            outcome,
            threshold_secs,
        } => format!(
            "⚠️ SLOW\n{}\n⏱ Response: {} (threshold {}s)\n🕒 {}",
            target,
            response_time(outcome),
            threshold_secs,
            format_timestamp(outcome.timestamp)
        ),
        Event::StillDown {
            target,
            outcome,
            down_for_secs,
        } => format!(
            "❌ STILL DOWN\n{}\nDown for: {}\nCode: {}\n🕒 {}",
            target,
            format_duration(*down_for_secs),
            outcome.status_code,
            format_timestamp(outcome.timestamp)
        ),
    }
}

fn response_time(outcome: &Outcome) -> String {
    outcome
        .response_time_secs
        .map(|rt| format!("{:.2}s", rt))
        .unwrap_or_else(|| "N/A".to_string())
}

/// Format a duration as `45s`, `12m` or `3h 5m`.
pub fn format_duration(secs: u64) -> String {
    if secs < 60 {
        return format!("{}s", secs);
    }
    let mins = secs / 60;
    if mins < 60 {
        return format!("{}m", mins);
    }
    format!("{}h {}m", mins / 60, mins % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use std::time::Duration;

    fn outcome_up(rt_ms: u64) -> Outcome {
        Outcome::responded(
            200,
            Duration::from_millis(rt_ms),
            400,
            Utc.with_ymd_and_hms(2024, 3, 1, 8, 30, 0).unwrap(),
        )
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0), "0s");
        assert_eq!(format_duration(59), "59s");
        assert_eq!(format_duration(60), "1m");
        assert_eq!(format_duration(3599), "59m");
        assert_eq!(format_duration(3600), "1h 0m");
        assert_eq!(format_duration(7500), "2h 5m");
    }

    #[test]
    fn test_render_started() {
        let event = Event::Started {
            target: "https://example.com".to_string(),
        };
        assert_eq!(
            render(&event),
            "🚀 Uptime Monitor Started\nMonitoring: https://example.com"
        );
    }

    #[test]
    fn test_render_down_includes_error() {
        let outcome = Outcome::failed(
            "network error: connection refused",
            Utc.with_ymd_and_hms(2024, 3, 1, 8, 30, 0).unwrap(),
        );
        let event = Event::WentDown {
            target: "https://example.com".to_string(),
            outcome,
        };
        assert_eq!(
            render(&event),
            "❌ DOWN\nhttps://example.com\nCode: ERROR\nError: network error: connection refused\n🕒 2024-03-01 08:30:00"
        );
    }

    #[test]
    fn test_render_recovered() {
        let event = Event::Recovered {
            target: "https://example.com".to_string(),
            outcome: outcome_up(420),
            downtime_secs: 125,
        };
        assert_eq!(
            render(&event),
            "✅ RECOVERED\nhttps://example.com\n⏱ Response: 0.42s\n📉 Downtime: 2m\n🕒 2024-03-01 08:30:00"
        );
    }

    #[test]
    fn test_render_slow() {
        let event = Event::Slow {
            target: "https://example.com".to_string(),
            outcome: outcome_up(3100),
            threshold_secs: 2.5,
        };
        assert_eq!(
            render(&event),
            "⚠️ SLOW\nhttps://example.com\n⏱ Response: 3.10s (threshold 2.5s)\n🕒 2024-03-01 08:30:00"
        );
    }
}
