//! Test doubles for the webhook transport.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::transport::{TransportError, WebhookTransport};

/// Records every POST instead of sending it.
#[derive(Debug, Clone, Default)]
pub struct RecordingTransport {
    sent: Arc<Mutex<Vec<(String, Value)>>>,
    fail_with_status: Option<u16>,
}

impl RecordingTransport {
    /// A transport that accepts every request.
    pub fn new() -> Self {
        Self::default()
    }

    /// A transport that records, then answers every request with `status`.
    pub fn failing(status: u16) -> Self {
        Self {
            sent: Arc::default(),
            fail_with_status: Some(status),
        }
    }

    /// Everything posted so far, as `(url, body)` pairs.
    pub async fn sent(&self) -> Vec<(String, Value)> {
        self.sent.lock().await.clone()
    }

    /// Wait until at least `count` requests were posted, or `timeout` passes.
    pub async fn wait_for(&self, count: usize, timeout: Duration) -> Vec<(String, Value)> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let sent = self.sent().await;
            if sent.len() >= count || tokio::time::Instant::now() >= deadline {
                return sent;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }
}

#[async_trait]
impl WebhookTransport for RecordingTransport {
    async fn post_json(&self, url: &str, body: &Value) -> Result<(), TransportError> {
        self.sent.lock().await.push((url.to_string(), body.clone()));
        match self.fail_with_status {
            Some(status) => Err(TransportError::Status {
                status,
                body: String::new(),
            }),
            None => Ok(()),
        }
    }
}
