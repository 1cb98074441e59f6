//! Notification delivery.
//!
//! Transports implement [`Notifier`]; the [`NotifierGateway`] in front of them
//! turns every delivery failure into a logged `false` so that the monitor loop
//! never stops because of a notification.

mod message;
mod telegram;

pub use message::*;
pub use telegram::*;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

/// Notification error types.
#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("missing credentials: {0}")]
    MissingCredentials(String),
    #[error("request error: {0}")]
    Request(#[from] reqwest::Error),
    #[error("notification rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// A notification transport.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, text: &str) -> Result<(), NotifyError>;
}

/// Front door for notifications; delivery failures are logged and swallowed.
#[derive(Clone)]
pub struct NotifierGateway {
    transport: Arc<dyn Notifier>,
}

impl NotifierGateway {
    pub fn new(transport: Arc<dyn Notifier>) -> Self {
        Self { transport }
    }

    /// Deliver `message`, returning whether delivery succeeded.
    pub async fn notify(&self, message: &str) -> bool {
        match self.transport.send(message).await {
            Ok(()) => true,
            Err(NotifyError::MissingCredentials(reason)) => {
                tracing::warn!("Notification skipped ({}), message follows:\n{}", reason, message);
                false
            }
            Err(e) => {
                tracing::warn!("Failed to deliver notification: {}", e);
                false
            }
        }
    }
}
