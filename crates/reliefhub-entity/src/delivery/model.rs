//! Delivery entity model.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use reliefhub_core::types::DeliveryRef;

use super::{ConfirmRole, DeliveryConfirmation, DeliveryStatus};
use crate::site::SiteDetails;

/// A point-to-point delivery between two sites.
///
/// Identity is the externally-issued [`DeliveryRef`]; both parties are
/// joined with their contact details at read time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Delivery {
    /// External reference, the natural key.
    #[serde(rename = "deliveryId")]
    pub delivery_ref: DeliveryRef,
    /// Pickup party.
    pub from_site: SiteDetails,
    /// Drop-off party.
    pub to_site: SiteDetails,
    /// Status text as stored.
    pub status: Option<String>,
    /// Planned delivery day.
    pub target_delivery_date: Option<NaiveDate>,
    pub dispatcher_name: Option<String>,
    pub dispatcher_number: Option<String>,
    pub driver_name: Option<String>,
    pub driver_number: Option<String>,
    pub license_plate_numbers: Option<String>,
    pub dispatcher_notes: Option<String>,
    /// Opaque key used in unauthenticated tracking links.
    pub public_url_key: String,
    /// Item names, ascending.
    pub item_list: Vec<String>,
    /// One slot per [`ConfirmRole`].
    pub confirmations: Vec<DeliveryConfirmation>,
}

impl Delivery {
    /// Whether the delivery has reached a terminal status.
    pub fn is_complete(&self) -> bool {
        super::is_complete(self.status.as_deref())
    }

    /// The confirmation slot for `role`, if one was issued.
    pub fn confirmation(&self, role: ConfirmRole) -> Option<&DeliveryConfirmation> {
        self.confirmations.iter().find(|c| c.role == role)
    }
}

/// Input for creating or updating a delivery.
///
/// Optional scalar fields that arrive upstream as zero-or-one element
/// lists are already collapsed here: `None` clears the stored value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryUpsert {
    pub delivery_ref: DeliveryRef,
    /// External reference of the pickup site.
    pub from_site_wss_id: i64,
    /// External reference of the drop-off site.
    pub to_site_wss_id: i64,
    pub status: Option<DeliveryStatus>,
    pub target_delivery_date: Option<NaiveDate>,
    pub dispatcher_name: Option<String>,
    pub dispatcher_number: Option<String>,
    pub driver_name: Option<String>,
    pub driver_number: Option<String>,
    pub license_plate_numbers: Option<String>,
    pub dispatcher_notes: Option<String>,
    /// External references of the items carried.
    pub item_wss_ids: Vec<i64>,
    /// Key to assign on creation. Ignored on update.
    pub public_url_key: Option<String>,
}

impl DeliveryUpsert {
    /// Item references with duplicates removed, first occurrence kept.
    pub fn distinct_item_wss_ids(&self) -> Vec<i64> {
        let mut seen = std::collections::HashSet::new();
        self.item_wss_ids
            .iter()
            .copied()
            .filter(|id| seen.insert(*id))
            .collect()
    }
}
