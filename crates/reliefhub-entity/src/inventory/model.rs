//! Item and inventory entry models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use reliefhub_core::types::{ItemId, SiteId};

use super::ItemStatus;

/// A catalogue item. Names are globally unique.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Item {
    /// Internal identifier.
    pub id: ItemId,
    /// Display name.
    pub name: String,
    /// External reference from the upstream scheduling tool.
    pub wss_id: Option<i64>,
    /// Last modification time.
    pub last_updated: DateTime<Utc>,
}

/// The status of one item at one site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct InventoryEntry {
    /// The site holding the entry.
    pub site_id: SiteId,
    /// The item.
    pub item_id: ItemId,
    /// Display name of the item.
    pub item_name: String,
    /// Current status.
    pub status: ItemStatus,
}
