//! HTTP transport for webhook notifications.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use reliefhub_core::error::{AppError, ErrorKind};

/// Failure to deliver one webhook POST.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The endpoint is not an http(s) URL.
    #[error("Invalid webhook URL: '{0}'")]
    InvalidUrl(String),

    /// The request could not be sent or timed out.
    #[error("Webhook request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The endpoint answered with a non-success status.
    #[error("Webhook returned status {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, for the log line.
        body: String,
    },
}

/// Sends a JSON body to a URL.
#[async_trait]
pub trait WebhookTransport: Send + Sync + std::fmt::Debug {
    /// POST `body` to `url`. Success means a 2xx response.
    async fn post_json(&self, url: &str, body: &Value) -> Result<(), TransportError>;
}

/// [`WebhookTransport`] backed by a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Build a client whose requests give up after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Configuration,
                    "Failed to build webhook HTTP client",
                    e,
                )
            })?;
        Ok(Self { client })
    }
}

#[async_trait]
impl WebhookTransport for HttpTransport {
    async fn post_json(&self, url: &str, body: &Value) -> Result<(), TransportError> {
        if !url.starts_with("http") {
            return Err(TransportError::InvalidUrl(url.to_string()));
        }

        let response = self.client.post(url).json(body).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(TransportError::Status {
            status: status.as_u16(),
            body,
        })
    }
}
