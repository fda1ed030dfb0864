//! Response DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use reliefhub_core::types::SiteId;
use reliefhub_entity::delivery::ConfirmRole;
use reliefhub_entity::site::{Site, SiteRole};

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Liveness response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `ok` or `degraded`.
    pub status: String,
    /// Crate version.
    pub version: String,
    /// `connected`, `unreachable`, or `memory`.
    pub database: String,
    /// Whether outbound notifications are enabled.
    pub notifications: bool,
}

/// A confirmation link for one role.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfirmLinkResponse {
    pub role: ConfirmRole,
    pub link: String,
}

/// Result of adding a catalogue item.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddItemResponse {
    pub item_name: String,
    /// False when the item already existed.
    pub created: bool,
}

/// Site summary returned after a flag update.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteResponse {
    pub id: SiteId,
    pub wss_id: Option<i64>,
    pub name: String,
    pub site_type: Option<SiteRole>,
    pub active: bool,
    pub accepting_donations: bool,
    pub last_updated: DateTime<Utc>,
}

impl From<Site> for SiteResponse {
    fn from(site: Site) -> Self {
        Self {
            id: site.id,
            wss_id: site.wss_id,
            name: site.name,
            site_type: site.site_type,
            active: site.active,
            accepting_donations: site.accepting_donations,
            last_updated: site.last_updated,
        }
    }
}
