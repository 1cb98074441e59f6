//! HTTP probe implementation.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::Utc;

use super::{Outcome, ProbeError, Prober};

/// Prober that issues a GET request and classifies the response code.
#[derive(Debug, Clone)]
pub struct HttpProber {
    client: reqwest::Client,
    failure_threshold: u16,
}

impl HttpProber {
    /// Create a prober treating codes at or above `failure_threshold` as DOWN.
    pub fn new(failure_threshold: u16) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("upwatch/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            failure_threshold,
        })
    }
}

#[async_trait]
impl Prober for HttpProber {
    async fn probe(&self, target: &str, timeout: Duration) -> Outcome {
        let timestamp = Utc::now();
        match run_http_probe(&self.client, target, timeout).await {
            Ok((code, elapsed)) => {
                tracing::debug!("HTTP probe to {} returned {} in {:?}", target, code, elapsed);
                Outcome::responded(code, elapsed, self.failure_threshold, timestamp)
            }
            Err(e) => {
                tracing::debug!("HTTP probe to {} failed: {}", target, e);
                Outcome::failed(e.to_string(), timestamp)
            }
        }
    }
}

/// Run an HTTP probe against the given address.
///
/// Returns the status code and the time spent on the request and body transfer.
pub async fn run_http_probe(
    client: &reqwest::Client,
    address: &str,
    timeout: Duration,
) -> Result<(u16, Duration), ProbeError> {
    let url = if address.starts_with("http://") || address.starts_with("https://") {
        address.to_string()
    } else {
        format!("http://{}", address)
    };

    let start = Instant::now();

    let response = client
        .get(&url)
        .timeout(timeout)
        .send()
        .await
        .map_err(|e| classify(e, timeout))?;

    let code = response.status().as_u16();

    // Read the full body to measure complete transfer time
    let _body = response.bytes().await.map_err(|e| {
        if e.is_timeout() {
            ProbeError::Timeout(timeout)
        } else {
            ProbeError::Body(e.to_string())
        }
    })?;

    Ok((code, start.elapsed()))
}

fn classify(e: reqwest::Error, timeout: Duration) -> ProbeError {
    if e.is_timeout() {
        ProbeError::Timeout(timeout)
    } else {
        ProbeError::Network(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::{ProbeStatus, StatusCode};

    #[tokio::test]
    async fn test_http_probe_invalid_url() {
        let client = reqwest::Client::new();
        let result = run_http_probe(&client, "http://256.256.256.256", Duration::from_millis(100)).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_probe_up() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/")
            .with_status(200)
            .with_body("ok")
            .create_async()
            .await;

        let prober = HttpProber::new(400).unwrap();
        let outcome = prober.probe(&server.url(), Duration::from_secs(5)).await;

        assert_eq!(outcome.status, ProbeStatus::Up);
        assert_eq!(outcome.status_code, StatusCode::Http(200));
        assert!(outcome.response_time_secs.is_some());
        assert!(outcome.error_detail.is_none());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_probe_error_status_is_down() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/health")
            .with_status(503)
            .create_async()
            .await;

        let prober = HttpProber::new(400).unwrap();
        let outcome = prober
            .probe(&format!("{}/health", server.url()), Duration::from_secs(5))
            .await;

        assert_eq!(outcome.status, ProbeStatus::Down);
        assert_eq!(outcome.status_code, StatusCode::Http(503));
        assert!(outcome.response_time_secs.is_some());
    }

    #[tokio::test]
    async fn test_probe_without_scheme_defaults_to_http() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server.mock("GET", "/").with_status(200).create_async().await;

        let prober = HttpProber::new(400).unwrap();
        let outcome = prober.probe(&server.host_with_port(), Duration::from_secs(5)).await;

        assert!(outcome.is_up());
    }

    #[tokio::test]
    async fn test_probe_connection_refused_is_down() {
        // Bind then drop to get a port with nothing listening
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let prober = HttpProber::new(400).unwrap();
        let outcome = prober
            .probe(&format!("http://{}", addr), Duration::from_secs(2))
            .await;

        assert_eq!(outcome.status, ProbeStatus::Down);
        assert_eq!(outcome.status_code, StatusCode::Error);
        assert!(outcome.response_time_secs.is_none());
        assert!(outcome.error_detail.is_some());
    }
}
