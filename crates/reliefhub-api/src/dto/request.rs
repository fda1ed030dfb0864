//! Request DTOs with validation.
//!
//! Webhook bodies use the field names and shapes the upstream scheduling
//! tool sends: linked records arrive as lists, and optional text fields as
//! zero-or-one element lists.

use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use reliefhub_core::error::AppError;
use reliefhub_core::result::AppResult;
use reliefhub_core::types::DeliveryRef;
use reliefhub_entity::delivery::{DeliveryStatus, DeliveryUpsert};
use reliefhub_entity::inventory::ItemStatus;
use reliefhub_service::{ImportItem, InventoryUpdate, MatchRequest, SiteFlags};

/// Body of `POST /webhook/add-supplies-to-delivery`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MatchRequestDto {
    /// Delivery to fill.
    pub delivery_id: i64,
    /// Supplying site; empty when the site is not synced.
    pub from_site_wss_id: Vec<i64>,
    /// Receiving site; empty when the site is not synced.
    pub to_site_wss_id: Vec<i64>,
}

impl From<MatchRequestDto> for MatchRequest {
    fn from(dto: MatchRequestDto) -> Self {
        Self {
            delivery_id: DeliveryRef(dto.delivery_id),
            from_site_wss_ids: dto.from_site_wss_id,
            to_site_wss_ids: dto.to_site_wss_id,
        }
    }
}

/// Body of `POST /webhook/update-delivery`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryUpdateDto {
    pub delivery_id: i64,
    pub delivery_status: Option<String>,
    pub dispatcher_name: Option<Vec<String>>,
    pub dispatcher_number: Option<Vec<String>>,
    pub driver_name: Option<Vec<String>>,
    pub driver_number: Option<Vec<String>>,
    #[validate(length(min = 1, message = "dropOffSiteWssId must name a site"))]
    pub drop_off_site_wss_id: Option<Vec<i64>>,
    #[validate(length(min = 1, message = "pickupSiteWssId must name a site"))]
    pub pickup_site_wss_id: Option<Vec<i64>>,
    pub item_list_wss_ids: Option<Vec<i64>>,
    pub license_plate_numbers: Option<Vec<String>>,
    /// `YYYY-MM-DD`; anything else is stored as no date.
    pub target_delivery_date: Option<String>,
    #[validate(length(max = 4000))]
    pub dispatcher_notes: Option<String>,
    #[validate(length(max = 64))]
    pub public_url_key: Option<String>,
}

impl DeliveryUpdateDto {
    /// Normalize into a store upsert.
    ///
    /// Fails when either site list is missing or empty, or the status is not
    /// a recognized delivery status.
    pub fn into_upsert(self) -> AppResult<DeliveryUpsert> {
        let from_site_wss_id = first_site(self.pickup_site_wss_id, "pickupSiteWssId")?;
        let to_site_wss_id = first_site(self.drop_off_site_wss_id, "dropOffSiteWssId")?;

        let status = self
            .delivery_status
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(DeliveryStatus::from_str)
            .transpose()?;

        Ok(DeliveryUpsert {
            delivery_ref: DeliveryRef(self.delivery_id),
            from_site_wss_id,
            to_site_wss_id,
            status,
            target_delivery_date: parse_date(self.target_delivery_date.as_deref()),
            dispatcher_name: first_value(self.dispatcher_name),
            dispatcher_number: first_value(self.dispatcher_number),
            driver_name: first_value(self.driver_name),
            driver_number: first_value(self.driver_number),
            license_plate_numbers: first_value(self.license_plate_numbers),
            dispatcher_notes: non_blank(self.dispatcher_notes),
            item_wss_ids: self.item_list_wss_ids.unwrap_or_default(),
            public_url_key: non_blank(self.public_url_key),
        })
    }
}

fn first_site(ids: Option<Vec<i64>>, field: &str) -> AppResult<i64> {
    ids.and_then(|ids| ids.first().copied())
        .ok_or_else(|| AppError::validation(format!("{field} is required")))
}

fn first_value(values: Option<Vec<String>>) -> Option<String> {
    values.and_then(|v| v.into_iter().next()).and_then(|v| non_blank(Some(v)))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_date(value: Option<&str>) -> Option<NaiveDate> {
    let value = value?.trim();
    if value.is_empty() {
        return None;
    }
    match NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        Ok(date) => Some(date),
        Err(_) => {
            tracing::warn!(target_delivery_date = %value, "Ignoring unparseable delivery date");
            None
        }
    }
}

/// Body of `POST /import/update/inventory-item`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ImportItemDto {
    pub airtable_id: Option<i64>,
    pub item_name: Option<String>,
}

impl From<ImportItemDto> for ImportItem {
    fn from(dto: ImportItemDto) -> Self {
        Self {
            airtable_id: dto.airtable_id,
            item_name: dto.item_name,
        }
    }
}

/// Body of `POST /api/items`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AddItemDto {
    #[validate(length(min = 1, max = 255, message = "itemName is required"))]
    pub item_name: String,
}

/// Body of `PUT /api/sites/{siteId}/inventory`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct InventoryUpdateDto {
    #[validate(length(min = 1, message = "itemName is required"))]
    pub item_name: String,
    /// One of `Available`, `Needed`, `Urgently Needed`, `Oversupply`.
    pub status: String,
}

impl TryFrom<InventoryUpdateDto> for InventoryUpdate {
    type Error = AppError;

    fn try_from(dto: InventoryUpdateDto) -> Result<Self, Self::Error> {
        Ok(Self {
            status: ItemStatus::from_str(&dto.status)?,
            item_name: dto.item_name,
        })
    }
}

/// Body of `PUT /api/sites/{siteId}/flags`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SiteFlagsDto {
    pub active: Option<bool>,
    pub accepting_donations: Option<bool>,
}

impl From<SiteFlagsDto> for SiteFlags {
    fn from(dto: SiteFlagsDto) -> Self {
        Self {
            active: dto.active,
            accepting_donations: dto.accepting_donations,
        }
    }
}
