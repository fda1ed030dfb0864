//! Process-local implementation of every store trait.
//!
//! Backs `database.provider = "memory"` and the service and HTTP tests.
//! All state sits behind a single `RwLock`, so each trait call is atomic.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use tokio::sync::RwLock;
use tracing::warn;

use reliefhub_core::error::AppError;
use reliefhub_core::result::AppResult;
use reliefhub_core::types::{DeliveryRef, ItemId, SiteId};
use reliefhub_entity::delivery::{Delivery, DeliveryConfirmation, DeliveryUpsert};
use reliefhub_entity::inventory::{InventoryEntry, Item, ItemStatus};
use reliefhub_entity::site::{Site, SiteRole};

use crate::store::{
    DeliveryStore, ImportOutcome, InventoryStore, IssuedCredentials, ItemStore, SiteStore,
    UpsertOutcome,
};

#[derive(Debug, Clone)]
struct DeliveryRecord {
    from_site: SiteId,
    to_site: SiteId,
    status: Option<String>,
    target_delivery_date: Option<NaiveDate>,
    dispatcher_name: Option<String>,
    dispatcher_number: Option<String>,
    driver_name: Option<String>,
    driver_number: Option<String>,
    license_plate_numbers: Option<String>,
    dispatcher_notes: Option<String>,
    public_url_key: String,
    item_ids: Vec<ItemId>,
    confirmations: Vec<DeliveryConfirmation>,
}

#[derive(Debug, Default)]
struct MemoryState {
    next_site_id: i64,
    next_item_id: i64,
    sites: BTreeMap<SiteId, Site>,
    items: BTreeMap<ItemId, Item>,
    inventory: BTreeMap<(SiteId, ItemId), ItemStatus>,
    deliveries: BTreeMap<DeliveryRef, DeliveryRecord>,
}

impl MemoryState {
    fn insert_item(&mut self, name: &str, wss_id: Option<i64>) -> Item {
        self.next_item_id += 1;
        let item = Item {
            id: ItemId(self.next_item_id),
            name: name.to_string(),
            wss_id,
            last_updated: Utc::now(),
        };
        self.items.insert(item.id, item.clone());
        item
    }

    fn site_by_wss_id(&self, wss_id: i64) -> Option<&Site> {
        self.sites.values().find(|s| s.wss_id == Some(wss_id))
    }

    fn touch_site(&mut self, site_id: SiteId) {
        if let Some(site) = self.sites.get_mut(&site_id) {
            site.inventory_last_updated = Some(Utc::now());
        }
    }

    fn materialize(&self, delivery_ref: DeliveryRef, record: &DeliveryRecord) -> Option<Delivery> {
        let from_site = self.sites.get(&record.from_site)?.details();
        let to_site = self.sites.get(&record.to_site)?.details();
        let mut item_list: Vec<String> = record
            .item_ids
            .iter()
            .filter_map(|id| self.items.get(id))
            .map(|item| item.name.clone())
            .collect();
        item_list.sort();

        Some(Delivery {
            delivery_ref,
            from_site,
            to_site,
            status: record.status.clone(),
            target_delivery_date: record.target_delivery_date,
            dispatcher_name: record.dispatcher_name.clone(),
            dispatcher_number: record.dispatcher_number.clone(),
            driver_name: record.driver_name.clone(),
            driver_number: record.driver_number.clone(),
            license_plate_numbers: record.license_plate_numbers.clone(),
            dispatcher_notes: record.dispatcher_notes.clone(),
            public_url_key: record.public_url_key.clone(),
            item_list,
            confirmations: record.confirmations.clone(),
        })
    }
}

/// Shared-state store; clones observe the same data.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<MemoryState>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a site. Sites are managed outside this service, so this is
    /// only used for seeding.
    pub async fn add_site(
        &self,
        name: &str,
        wss_id: Option<i64>,
        site_type: Option<SiteRole>,
    ) -> Site {
        let mut state = self.state.write().await;
        state.next_site_id += 1;
        let site = Site {
            id: SiteId(state.next_site_id),
            wss_id,
            name: name.to_string(),
            site_type,
            active: true,
            accepting_donations: true,
            address: None,
            city: None,
            state: None,
            contact_name: None,
            contact_number: None,
            hours: None,
            last_updated: Utc::now(),
            inventory_last_updated: None,
        };
        state.sites.insert(site.id, site.clone());
        site
    }

    /// Register a catalogue item with an optional external reference.
    pub async fn add_item(&self, name: &str, wss_id: Option<i64>) -> Item {
        self.state.write().await.insert_item(name, wss_id)
    }

    /// Set an inventory entry directly, creating it if needed.
    pub async fn set_inventory(&self, site_id: SiteId, item_id: ItemId, status: ItemStatus) {
        self.state
            .write()
            .await
            .inventory
            .insert((site_id, item_id), status);
    }
}

#[async_trait]
impl SiteStore for MemoryStore {
    async fn find_by_id(&self, id: SiteId) -> AppResult<Option<Site>> {
        Ok(self.state.read().await.sites.get(&id).cloned())
    }

    async fn find_by_wss_id(&self, wss_id: i64) -> AppResult<Option<Site>> {
        Ok(self.state.read().await.site_by_wss_id(wss_id).cloned())
    }

    async fn update_flags(
        &self,
        id: SiteId,
        active: Option<bool>,
        accepting_donations: Option<bool>,
    ) -> AppResult<Option<Site>> {
        let mut state = self.state.write().await;
        let Some(site) = state.sites.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(active) = active {
            site.active = active;
        }
        if let Some(accepting) = accepting_donations {
            site.accepting_donations = accepting;
        }
        site.last_updated = Utc::now();
        Ok(Some(site.clone()))
    }
}

#[async_trait]
impl ItemStore for MemoryStore {
    async fn find_by_name(&self, name: &str) -> AppResult<Option<Item>> {
        let state = self.state.read().await;
        Ok(state.items.values().find(|i| i.name == name).cloned())
    }

    async fn insert(&self, name: &str) -> AppResult<bool> {
        let mut state = self.state.write().await;
        if state.items.values().any(|i| i.name == name) {
            return Ok(false);
        }
        state.insert_item(name, None);
        Ok(true)
    }

    async fn import(&self, wss_id: i64, name: &str) -> AppResult<ImportOutcome> {
        let mut state = self.state.write().await;
        let now = Utc::now();

        if let Some(item) = state.items.values_mut().find(|i| i.wss_id == Some(wss_id)) {
            item.name = name.to_string();
            item.last_updated = now;
            return Ok(ImportOutcome::UpdatedByRef);
        }
        if let Some(item) = state.items.values_mut().find(|i| i.name == name) {
            item.wss_id = Some(wss_id);
            item.last_updated = now;
            return Ok(ImportOutcome::LinkedByName);
        }
        state.insert_item(name, Some(wss_id));
        Ok(ImportOutcome::Created)
    }
}

#[async_trait]
impl InventoryStore for MemoryStore {
    async fn site_inventory(&self, site_id: SiteId) -> AppResult<Vec<InventoryEntry>> {
        let state = self.state.read().await;
        let mut entries: Vec<InventoryEntry> = state
            .inventory
            .range((site_id, ItemId(i64::MIN))..=(site_id, ItemId(i64::MAX)))
            .filter_map(|(&(site_id, item_id), &status)| {
                state.items.get(&item_id).map(|item| InventoryEntry {
                    site_id,
                    item_id,
                    item_name: item.name.clone(),
                    status,
                })
            })
            .collect();
        entries.sort_by(|a, b| a.item_name.cmp(&b.item_name));
        Ok(entries)
    }

    async fn find_entry(
        &self,
        site_id: SiteId,
        item_id: ItemId,
    ) -> AppResult<Option<InventoryEntry>> {
        let state = self.state.read().await;
        let entry = state.inventory.get(&(site_id, item_id)).and_then(|&status| {
            state.items.get(&item_id).map(|item| InventoryEntry {
                site_id,
                item_id,
                item_name: item.name.clone(),
                status,
            })
        });
        Ok(entry)
    }

    async fn insert_entry(
        &self,
        site_id: SiteId,
        item_id: ItemId,
        status: ItemStatus,
    ) -> AppResult<bool> {
        let mut state = self.state.write().await;
        if state.inventory.contains_key(&(site_id, item_id)) {
            warn!(
                site_id = %site_id,
                item_id = %item_id,
                "Inventory entry already exists, concurrent activation ignored"
            );
            return Ok(false);
        }
        state.inventory.insert((site_id, item_id), status);
        state.touch_site(site_id);
        Ok(true)
    }

    async fn delete_entry(&self, site_id: SiteId, item_id: ItemId) -> AppResult<bool> {
        let mut state = self.state.write().await;
        let removed = state.inventory.remove(&(site_id, item_id)).is_some();
        if removed {
            state.touch_site(site_id);
        }
        Ok(removed)
    }

    async fn update_status(
        &self,
        site_id: SiteId,
        item_id: ItemId,
        status: ItemStatus,
    ) -> AppResult<bool> {
        let mut state = self.state.write().await;
        let Some(current) = state.inventory.get_mut(&(site_id, item_id)) else {
            return Ok(false);
        };
        *current = status;
        state.touch_site(site_id);
        Ok(true)
    }
}

#[async_trait]
impl DeliveryStore for MemoryStore {
    async fn upsert(
        &self,
        input: &DeliveryUpsert,
        issued: &IssuedCredentials,
    ) -> AppResult<UpsertOutcome> {
        let mut state = self.state.write().await;

        let from_site = state
            .site_by_wss_id(input.from_site_wss_id)
            .map(|s| s.id)
            .ok_or_else(|| {
                AppError::validation(format!("Unknown pickup site: {}", input.from_site_wss_id))
            })?;
        let to_site = state
            .site_by_wss_id(input.to_site_wss_id)
            .map(|s| s.id)
            .ok_or_else(|| {
                AppError::validation(format!("Unknown drop-off site: {}", input.to_site_wss_id))
            })?;
        if from_site == to_site {
            return Err(AppError::validation(
                "Pickup and drop-off sites must be different",
            ));
        }

        let wanted: HashSet<i64> = input.distinct_item_wss_ids().into_iter().collect();
        let item_ids: Vec<ItemId> = state
            .items
            .values()
            .filter(|item| item.wss_id.is_some_and(|w| wanted.contains(&w)))
            .map(|item| item.id)
            .collect();
        if item_ids.len() != wanted.len() {
            warn!(
                delivery_id = %input.delivery_ref,
                requested = wanted.len(),
                linked = item_ids.len(),
                "Some delivery items did not resolve to known items"
            );
        }

        let status = input.status.map(|s| s.as_str().to_string());
        let previous = state.deliveries.get(&input.delivery_ref).cloned();
        let created = previous.is_none();

        let (public_url_key, mut confirmations) = match &previous {
            Some(record) => (record.public_url_key.clone(), record.confirmations.clone()),
            None => {
                let key = input
                    .public_url_key
                    .clone()
                    .unwrap_or_else(|| issued.public_url_key.clone());
                if state.deliveries.values().any(|d| d.public_url_key == key) {
                    return Err(AppError::conflict(format!(
                        "Public URL key already in use: {key}"
                    )));
                }
                (key, Vec::new())
            }
        };
        for (role, code) in &issued.codes {
            if !confirmations.iter().any(|c| c.role == *role) {
                confirmations.push(DeliveryConfirmation {
                    role: *role,
                    code: code.clone(),
                    confirmed: false,
                    date_confirmed: None,
                });
            }
        }

        let record = DeliveryRecord {
            from_site,
            to_site,
            status,
            target_delivery_date: input.target_delivery_date,
            dispatcher_name: input.dispatcher_name.clone(),
            dispatcher_number: input.dispatcher_number.clone(),
            driver_name: input.driver_name.clone(),
            driver_number: input.driver_number.clone(),
            license_plate_numbers: input.license_plate_numbers.clone(),
            dispatcher_notes: input.dispatcher_notes.clone(),
            public_url_key,
            item_ids,
            confirmations,
        };
        let delivery = state
            .materialize(input.delivery_ref, &record)
            .ok_or_else(|| AppError::internal("Delivery sites vanished during upsert"))?;
        state.deliveries.insert(input.delivery_ref, record);

        Ok(UpsertOutcome {
            created,
            previous_status: previous.and_then(|r| r.status),
            delivery,
        })
    }

    async fn find_by_public_key(&self, key: &str) -> AppResult<Option<Delivery>> {
        let state = self.state.read().await;
        Ok(state
            .deliveries
            .iter()
            .find(|(_, record)| record.public_url_key == key)
            .and_then(|(delivery_ref, record)| state.materialize(*delivery_ref, record)))
    }

    async fn find_by_ref(&self, delivery_ref: DeliveryRef) -> AppResult<Option<Delivery>> {
        let state = self.state.read().await;
        Ok(state
            .deliveries
            .get(&delivery_ref)
            .and_then(|record| state.materialize(delivery_ref, record)))
    }

    async fn find_by_site(&self, site_id: SiteId) -> AppResult<Vec<Delivery>> {
        let state = self.state.read().await;
        let mut deliveries: Vec<Delivery> = state
            .deliveries
            .iter()
            .filter(|(_, record)| record.from_site == site_id || record.to_site == site_id)
            .filter_map(|(delivery_ref, record)| state.materialize(*delivery_ref, record))
            .collect();
        // Latest target date first, undated last, ties by reference.
        deliveries.sort_by(|a, b| {
            let by_date = match (a.target_delivery_date, b.target_delivery_date) {
                (Some(x), Some(y)) => y.cmp(&x),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            };
            by_date.then(a.delivery_ref.cmp(&b.delivery_ref))
        });
        Ok(deliveries)
    }

    async fn delete(&self, delivery_ref: DeliveryRef) -> AppResult<bool> {
        Ok(self
            .state
            .write()
            .await
            .deliveries
            .remove(&delivery_ref)
            .is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reliefhub_entity::delivery::{ConfirmRole, DeliveryStatus};

    fn issued() -> IssuedCredentials {
        IssuedCredentials {
            public_url_key: "KEYKEYKEYKEY".to_string(),
            codes: ConfirmRole::ALL
                .iter()
                .map(|r| (*r, format!("{}-CODE", r.as_str())))
                .collect(),
        }
    }

    fn upsert(items: Vec<i64>, status: DeliveryStatus) -> DeliveryUpsert {
        DeliveryUpsert {
            delivery_ref: DeliveryRef(68),
            from_site_wss_id: 100,
            to_site_wss_id: 200,
            status: Some(status),
            target_delivery_date: NaiveDate::from_ymd_opt(2024, 12, 13),
            dispatcher_name: Some("Dana".to_string()),
            dispatcher_number: None,
            driver_name: Some("Riley".to_string()),
            driver_number: None,
            license_plate_numbers: Some("ABC-123".to_string()),
            dispatcher_notes: None,
            item_wss_ids: items,
            public_url_key: None,
        }
    }

    async fn seeded() -> MemoryStore {
        let store = MemoryStore::new();
        store.add_site("Hub", Some(100), Some(SiteRole::SupplyHub)).await;
        store
            .add_site("Center", Some(200), Some(SiteRole::DistributionCenter))
            .await;
        store.add_item("Water", Some(161)).await;
        store.add_item("Tarps", Some(191)).await;
        store
    }

    #[tokio::test]
    async fn test_upsert_replaces_items_and_keeps_key() {
        let store = seeded().await;
        let first = store
            .upsert(&upsert(vec![161, 191], DeliveryStatus::CreatingDispatch), &issued())
            .await
            .unwrap();
        assert!(first.created);
        assert_eq!(first.delivery.item_list, vec!["Tarps", "Water"]);

        let mut other_key = issued();
        other_key.public_url_key = "SHOULDNOTUSE".to_string();
        let mut second_input = upsert(vec![191], DeliveryStatus::InProgress);
        second_input.driver_name = None;
        let second = store.upsert(&second_input, &other_key).await.unwrap();

        assert!(!second.created);
        assert_eq!(second.previous_status.as_deref(), Some("Creating Dispatch"));
        assert_eq!(second.delivery.item_list, vec!["Tarps"]);
        assert_eq!(second.delivery.status.as_deref(), Some("In Progress"));
        assert_eq!(second.delivery.public_url_key, "KEYKEYKEYKEY");
        assert!(second.delivery.driver_name.is_none());
        assert_eq!(second.delivery.confirmations.len(), 3);
    }

    #[tokio::test]
    async fn test_upsert_rejects_unknown_or_identical_sites() {
        let store = seeded().await;
        let mut input = upsert(vec![], DeliveryStatus::InProgress);
        input.to_site_wss_id = 999;
        assert!(store.upsert(&input, &issued()).await.is_err());

        input.to_site_wss_id = 100;
        let err = store.upsert(&input, &issued()).await.unwrap_err();
        assert!(err.is_client_error());
    }

    #[tokio::test]
    async fn test_inventory_entry_lifecycle_stamps_site() {
        let store = seeded().await;
        let hub = store.find_by_wss_id(100).await.unwrap().unwrap();
        let water = ItemStore::find_by_name(&store, "Water").await.unwrap().unwrap();

        assert!(store
            .insert_entry(hub.id, water.id, ItemStatus::Available)
            .await
            .unwrap());
        assert!(!store
            .insert_entry(hub.id, water.id, ItemStatus::Needed)
            .await
            .unwrap());
        let stamped = SiteStore::find_by_id(&store, hub.id).await.unwrap().unwrap();
        assert!(stamped.inventory_last_updated.is_some());

        assert!(store
            .update_status(hub.id, water.id, ItemStatus::Oversupply)
            .await
            .unwrap());
        let entry = store.find_entry(hub.id, water.id).await.unwrap().unwrap();
        assert_eq!(entry.status, ItemStatus::Oversupply);

        assert!(store.delete_entry(hub.id, water.id).await.unwrap());
        assert!(!store.delete_entry(hub.id, water.id).await.unwrap());
        assert!(!store
            .update_status(hub.id, water.id, ItemStatus::Needed)
            .await
            .unwrap());
    }
}
