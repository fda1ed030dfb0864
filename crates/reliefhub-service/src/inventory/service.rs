//! Catalogue and per-site inventory operations.

use std::sync::Arc;

use tracing::{debug, info};

use reliefhub_core::error::AppError;
use reliefhub_core::events::{InventoryChangedPayload, NewItemPayload, NotificationEvent};
use reliefhub_core::result::AppResult;
use reliefhub_core::types::SiteId;
use reliefhub_database::{ImportOutcome, InventoryStore, ItemStore, SiteStore};
use reliefhub_entity::inventory::{Item, ItemStatus};
use reliefhub_entity::site::Site;
use reliefhub_worker::NotificationDispatcher;

/// A status to set for an item at a site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryUpdate {
    /// Catalogue item name.
    pub item_name: String,
    /// New status.
    pub status: ItemStatus,
}

/// An item pushed by the upstream item table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportItem {
    /// Upstream record id.
    pub airtable_id: Option<i64>,
    /// Item display name.
    pub item_name: Option<String>,
}

/// Inventory management.
#[derive(Debug, Clone)]
pub struct InventoryService {
    sites: Arc<dyn SiteStore>,
    items: Arc<dyn ItemStore>,
    inventory: Arc<dyn InventoryStore>,
    dispatcher: NotificationDispatcher,
}

impl InventoryService {
    /// Creates a new inventory service.
    pub fn new(
        sites: Arc<dyn SiteStore>,
        items: Arc<dyn ItemStore>,
        inventory: Arc<dyn InventoryStore>,
        dispatcher: NotificationDispatcher,
    ) -> Self {
        Self {
            sites,
            items,
            inventory,
            dispatcher,
        }
    }

    /// Add an item to the catalogue. Returns whether it was created.
    pub async fn add_new_item(&self, name: &str) -> AppResult<bool> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::validation("Item name must not be empty"));
        }
        if self.items.find_by_name(name).await?.is_some() {
            debug!(item_name = %name, "Item already exists");
            return Ok(false);
        }

        let created = self.items.insert(name).await?;
        if created {
            info!(item_name = %name, "Item created");
            self.dispatcher
                .notify(NotificationEvent::NewItem(NewItemPayload {
                    item_name: name.to_string(),
                }));
        }
        Ok(created)
    }

    /// Set an item's status at a site, carrying it there if it was not yet.
    pub async fn set_item_status(&self, site_id: SiteId, update: InventoryUpdate) -> AppResult<()> {
        let (site, item) = self.resolve(site_id, &update.item_name).await?;
        let inserted = self.inventory.find_entry(site.id, item.id).await?.is_none()
            && self
                .inventory
                .insert_entry(site.id, item.id, update.status)
                .await?;
        if !inserted {
            self.inventory
                .update_status(site.id, item.id, update.status)
                .await?;
        }
        self.changed(&site, &item, Some(update.status));
        Ok(())
    }

    /// Start carrying an item at a site.
    ///
    /// An entry that already exists is left as is; a concurrent activation is
    /// reported by the store and not treated as an error.
    pub async fn activate_item(
        &self,
        site_id: SiteId,
        item_name: &str,
        status: ItemStatus,
    ) -> AppResult<()> {
        let (site, item) = self.resolve(site_id, item_name).await?;
        if self.inventory.insert_entry(site.id, item.id, status).await? {
            self.changed(&site, &item, Some(status));
        }
        Ok(())
    }

    /// Stop carrying an item at a site. Absent entries are a no-op.
    pub async fn deactivate_item(&self, site_id: SiteId, item_name: &str) -> AppResult<bool> {
        let (site, item) = self.resolve(site_id, item_name).await?;
        let removed = self.inventory.delete_entry(site.id, item.id).await?;
        if removed {
            self.changed(&site, &item, None);
        }
        Ok(removed)
    }

    /// Change the status of an item the site already carries.
    pub async fn update_item_status(
        &self,
        site_id: SiteId,
        item_name: &str,
        status: ItemStatus,
    ) -> AppResult<()> {
        let (site, item) = self.resolve(site_id, item_name).await?;
        if !self.inventory.update_status(site.id, item.id, status).await? {
            return Err(AppError::not_found(format!(
                "Item '{}' is not carried at site {}",
                item.name, site.id
            )));
        }
        self.changed(&site, &item, Some(status));
        Ok(())
    }

    /// Reconcile one item from the upstream item table.
    pub async fn import_item(&self, input: ImportItem) -> AppResult<ImportOutcome> {
        let Some(wss_id) = input.airtable_id else {
            return Err(AppError::validation("Missing airtableId"));
        };
        let name = input
            .item_name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .ok_or_else(|| AppError::validation("Missing itemName"))?;

        let outcome = self.items.import(wss_id, name).await?;
        info!(wss_id, item_name = %name, outcome = ?outcome, "Imported item");
        Ok(outcome)
    }

    async fn resolve(&self, site_id: SiteId, item_name: &str) -> AppResult<(Site, Item)> {
        let site = self
            .sites
            .find_by_id(site_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Site not found: {site_id}")))?;
        let item = self
            .items
            .find_by_name(item_name.trim())
            .await?
            .ok_or_else(|| AppError::not_found(format!("Item not found: {item_name}")))?;
        Ok((site, item))
    }

    fn changed(&self, site: &Site, item: &Item, status: Option<ItemStatus>) {
        info!(
            site_id = %site.id,
            item_name = %item.name,
            status = ?status,
            "Inventory changed"
        );
        self.dispatcher
            .notify(NotificationEvent::InventoryChanged(InventoryChangedPayload {
                site_id: site.id,
                site_wss_id: site.wss_id,
                item_name: item.name.clone(),
                active: status.is_some(),
                item_status: status.map(|s| s.as_str().to_string()),
            }));
    }
}
