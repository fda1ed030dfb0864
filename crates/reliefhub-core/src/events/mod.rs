//! Notification events emitted by ReliefHub operations.
//!
//! Events are handed to the notification dispatcher, which serializes the
//! payload and POSTs it to the endpoint configured for the event kind.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{DeliveryRef, SiteId};

/// Discriminant of a [`NotificationEvent`], used for endpoint lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// A new item was added to the catalogue.
    NewItem,
    /// An item was activated, deactivated, or changed status at a site.
    InventoryChanged,
    /// A site's flags were updated.
    SiteUpserted,
    /// A needs match was computed for a delivery.
    NeedsMatched,
    /// A delivery was created or its status changed.
    DeliveryStatusChanged,
}

impl EventKind {
    /// Return the kind as a snake_case string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NewItem => "new_item",
            Self::InventoryChanged => "inventory_changed",
            Self::SiteUpserted => "site_upserted",
            Self::NeedsMatched => "needs_matched",
            Self::DeliveryStatusChanged => "delivery_status_changed",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Payload for [`EventKind::NewItem`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewItemPayload {
    /// Display name of the created item.
    #[serde(rename = "item-name")]
    pub item_name: String,
}

/// Payload for [`EventKind::InventoryChanged`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryChangedPayload {
    /// Internal site id.
    pub site_id: SiteId,
    /// External site reference, if the site has been synced upstream.
    pub site_wss_id: Option<i64>,
    /// Item display name.
    pub item_name: String,
    /// Whether the item is carried at the site after the change.
    pub active: bool,
    /// Status text after the change; absent when deactivated.
    pub item_status: Option<String>,
}

/// Payload for [`EventKind::SiteUpserted`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteUpsertedPayload {
    /// Internal site id.
    pub site_id: SiteId,
    /// External site reference.
    pub site_wss_id: Option<i64>,
    /// Site role text.
    pub site_type: String,
    /// Whether the site is active.
    pub active: bool,
    /// Whether the site accepts donations.
    pub accepting_donations: bool,
}

/// Payload for [`EventKind::NeedsMatched`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NeedsMatchedPayload {
    /// Delivery reference supplied by the caller.
    pub delivery_id: DeliveryRef,
    /// Matched item names, ascending.
    pub item_list: Vec<String>,
}

/// Payload for [`EventKind::DeliveryStatusChanged`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryStatusPayload {
    /// Delivery reference.
    pub airtable_id: DeliveryRef,
    /// Status text in upstream spelling.
    pub delivery_status: String,
    /// Link the pickup site uses to confirm.
    pub pickup_confirm_link: String,
    /// Link the drop-off site uses to confirm.
    pub drop_off_confirm_link: String,
    /// Link the driver uses to confirm.
    pub driver_confirm_link: String,
}

/// Union of all notification event types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "payload", rename_all = "snake_case")]
pub enum NotificationEvent {
    /// A new item was created.
    NewItem(NewItemPayload),
    /// Inventory at a site changed.
    InventoryChanged(InventoryChangedPayload),
    /// A site was updated.
    SiteUpserted(SiteUpsertedPayload),
    /// A needs match was computed.
    NeedsMatched(NeedsMatchedPayload),
    /// A delivery status changed.
    DeliveryStatusChanged(DeliveryStatusPayload),
}

impl NotificationEvent {
    /// The kind of this event.
    pub fn kind(&self) -> EventKind {
        match self {
            Self::NewItem(_) => EventKind::NewItem,
            Self::InventoryChanged(_) => EventKind::InventoryChanged,
            Self::SiteUpserted(_) => EventKind::SiteUpserted,
            Self::NeedsMatched(_) => EventKind::NeedsMatched,
            Self::DeliveryStatusChanged(_) => EventKind::DeliveryStatusChanged,
        }
    }

    /// Serialize the wire body sent to the webhook (the payload only, untagged).
    pub fn payload(&self) -> Result<serde_json::Value, serde_json::Error> {
        match self {
            Self::NewItem(p) => serde_json::to_value(p),
            Self::InventoryChanged(p) => serde_json::to_value(p),
            Self::SiteUpserted(p) => serde_json::to_value(p),
            Self::NeedsMatched(p) => serde_json::to_value(p),
            Self::DeliveryStatusChanged(p) => serde_json::to_value(p),
        }
    }
}

/// An event together with dispatch metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    /// Unique notification ID, for correlating log lines.
    pub id: Uuid,
    /// When the triggering operation emitted the event.
    pub timestamp: DateTime<Utc>,
    /// The event.
    pub event: NotificationEvent,
}

impl Notification {
    /// Wrap an event with a fresh id and timestamp.
    pub fn new(event: NotificationEvent) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            event,
        }
    }
}
