//! Inbound webhook authentication configuration.

use serde::{Deserialize, Serialize};

/// Shared secret expected from upstream automation callers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WebhookConfig {
    /// When set, `/webhook/*` and `/import/*` require a matching
    /// `X-Webhook-Secret` header.
    #[serde(default)]
    pub secret: Option<String>,
}
