//! Delivery tracking configuration.

use serde::{Deserialize, Serialize};

/// Settings used when building public delivery links.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryConfig {
    /// Scheme and host prefixed to `/delivery/{key}` links, without a trailing slash.
    #[serde(default = "default_tracking_domain")]
    pub tracking_domain: String,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            tracking_domain: default_tracking_domain(),
        }
    }
}

fn default_tracking_domain() -> String {
    "http://localhost:8080".to_string()
}
