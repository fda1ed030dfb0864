//! Site entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use reliefhub_core::types::SiteId;

use super::SiteRole;

/// A site in the supply network.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Site {
    /// Internal identifier.
    pub id: SiteId,
    /// External reference from the upstream scheduling tool. Sites that
    /// have not been synced yet have none.
    pub wss_id: Option<i64>,
    /// Display name.
    pub name: String,
    /// Role; sites without one never offer supply.
    pub site_type: Option<SiteRole>,
    /// Whether the site is active.
    pub active: bool,
    /// Whether the site accepts donations.
    pub accepting_donations: bool,
    /// Street address.
    pub address: Option<String>,
    /// City.
    pub city: Option<String>,
    /// State.
    pub state: Option<String>,
    /// Contact person.
    pub contact_name: Option<String>,
    /// Contact phone number.
    pub contact_number: Option<String>,
    /// Opening hours, free text.
    pub hours: Option<String>,
    /// Last modification of the site row.
    pub last_updated: DateTime<Utc>,
    /// Last modification of the site's inventory.
    pub inventory_last_updated: Option<DateTime<Utc>>,
}

impl Site {
    /// Project the fields a delivery shows for one of its parties.
    pub fn details(&self) -> SiteDetails {
        SiteDetails {
            id: self.id,
            name: self.name.clone(),
            address: self.address.clone(),
            city: self.city.clone(),
            state: self.state.clone(),
            contact_name: self.contact_name.clone(),
            contact_number: self.contact_number.clone(),
            hours: self.hours.clone(),
        }
    }
}

/// Site fields joined onto a delivery at read time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteDetails {
    /// Internal identifier.
    pub id: SiteId,
    /// Display name.
    pub name: String,
    /// Street address.
    pub address: Option<String>,
    /// City.
    pub city: Option<String>,
    /// State.
    pub state: Option<String>,
    /// Contact person.
    pub contact_name: Option<String>,
    /// Contact phone number.
    pub contact_number: Option<String>,
    /// Opening hours.
    pub hours: Option<String>,
}
