//! Outbound notification webhook configuration.

use serde::{Deserialize, Serialize};

use crate::events::EventKind;

/// Notification dispatcher configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// Master switch. When false, every notification is dropped silently.
    #[serde(default)]
    pub enabled: bool,
    /// Maximum number of notifications waiting for a worker slot.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
    /// Maximum number of concurrent outbound POSTs.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
    /// One endpoint per event kind.
    #[serde(default)]
    pub endpoints: NotificationEndpoints,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            queue_capacity: default_queue_capacity(),
            concurrency: default_concurrency(),
            timeout_seconds: default_timeout(),
            endpoints: NotificationEndpoints::default(),
        }
    }
}

/// Endpoint URLs keyed by event kind. A missing URL disables that kind.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotificationEndpoints {
    /// Receives `{ "item-name": … }` when a new item is created.
    #[serde(default)]
    pub new_item: Option<String>,
    /// Receives inventory status changes.
    #[serde(default)]
    pub inventory_changed: Option<String>,
    /// Receives site flag changes.
    #[serde(default)]
    pub site_upserted: Option<String>,
    /// Receives computed needs matches for a delivery.
    #[serde(default)]
    pub needs_matched: Option<String>,
    /// Receives delivery status changes with confirmation links.
    #[serde(default)]
    pub delivery_status: Option<String>,
}

impl NotificationEndpoints {
    /// Endpoint configured for the given event kind, if any.
    pub fn for_kind(&self, kind: EventKind) -> Option<&str> {
        let url = match kind {
            EventKind::NewItem => &self.new_item,
            EventKind::InventoryChanged => &self.inventory_changed,
            EventKind::SiteUpserted => &self.site_upserted,
            EventKind::NeedsMatched => &self.needs_matched,
            EventKind::DeliveryStatusChanged => &self.delivery_status,
        };
        url.as_deref().filter(|u| !u.trim().is_empty())
    }
}

fn default_queue_capacity() -> usize {
    256
}

fn default_concurrency() -> usize {
    4
}

fn default_timeout() -> u64 {
    10
}
