//! Store traits the services are written against.
//!
//! Each trait has a PostgreSQL implementation in [`crate::repositories`]
//! and a process-local one in [`crate::memory`]. Correctness under
//! concurrent writers relies on storage uniqueness constraints, not on
//! application-level locks.

use async_trait::async_trait;

use reliefhub_core::result::AppResult;
use reliefhub_core::types::{DeliveryRef, ItemId, SiteId};
use reliefhub_entity::delivery::{ConfirmRole, Delivery, DeliveryUpsert};
use reliefhub_entity::inventory::{InventoryEntry, Item, ItemStatus};
use reliefhub_entity::site::Site;

/// Read and flag access to sites.
#[async_trait]
pub trait SiteStore: Send + Sync + std::fmt::Debug {
    /// Find a site by internal id.
    async fn find_by_id(&self, id: SiteId) -> AppResult<Option<Site>>;

    /// Find a site by its external reference.
    async fn find_by_wss_id(&self, wss_id: i64) -> AppResult<Option<Site>>;

    /// Update the given flags; `None` leaves a flag unchanged. Returns the
    /// updated site, or `None` if it does not exist.
    async fn update_flags(
        &self,
        id: SiteId,
        active: Option<bool>,
        accepting_donations: Option<bool>,
    ) -> AppResult<Option<Site>>;
}

/// How an imported item was reconciled with the catalogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportOutcome {
    /// An item with the external reference existed and was renamed.
    UpdatedByRef,
    /// An item with the name existed and received the external reference.
    LinkedByName,
    /// A new item was inserted.
    Created,
}

/// Catalogue access.
#[async_trait]
pub trait ItemStore: Send + Sync + std::fmt::Debug {
    /// Find an item by exact name.
    async fn find_by_name(&self, name: &str) -> AppResult<Option<Item>>;

    /// Insert an item. Returns `false` if the name is already taken,
    /// including when a concurrent insert won the race.
    async fn insert(&self, name: &str) -> AppResult<bool>;

    /// Reconcile an upstream item: by external reference, then by name,
    /// then insert.
    async fn import(&self, wss_id: i64, name: &str) -> AppResult<ImportOutcome>;
}

/// Per-site inventory entries. Every mutation also stamps the site's
/// `inventory_last_updated`.
#[async_trait]
pub trait InventoryStore: Send + Sync + std::fmt::Debug {
    /// All entries at a site.
    async fn site_inventory(&self, site_id: SiteId) -> AppResult<Vec<InventoryEntry>>;

    /// The entry for one site and item.
    async fn find_entry(&self, site_id: SiteId, item_id: ItemId)
    -> AppResult<Option<InventoryEntry>>;

    /// Create an entry. Returns `false` when the entry already exists; a
    /// duplicate key from a concurrent activation is treated the same way.
    async fn insert_entry(
        &self,
        site_id: SiteId,
        item_id: ItemId,
        status: ItemStatus,
    ) -> AppResult<bool>;

    /// Delete an entry. Returns whether one was removed.
    async fn delete_entry(&self, site_id: SiteId, item_id: ItemId) -> AppResult<bool>;

    /// Change an entry's status in place. Returns `false` if no entry exists.
    async fn update_status(
        &self,
        site_id: SiteId,
        item_id: ItemId,
        status: ItemStatus,
    ) -> AppResult<bool>;
}

/// Values assigned to a delivery only when an upsert creates it.
#[derive(Debug, Clone)]
pub struct IssuedCredentials {
    /// Public key to use when the caller supplied none.
    pub public_url_key: String,
    /// One code per role.
    pub codes: Vec<(ConfirmRole, String)>,
}

/// Result of [`DeliveryStore::upsert`].
#[derive(Debug, Clone)]
pub struct UpsertOutcome {
    /// Whether the upsert inserted the delivery.
    pub created: bool,
    /// Stored status text before the upsert, if the delivery existed.
    pub previous_status: Option<String>,
    /// The delivery as stored after the upsert.
    pub delivery: Delivery,
}

impl UpsertOutcome {
    /// Whether the stored status differs from what it was before.
    pub fn status_changed(&self) -> bool {
        self.created || self.previous_status != self.delivery.status
    }
}

/// Delivery records.
#[async_trait]
pub trait DeliveryStore: Send + Sync + std::fmt::Debug {
    /// Insert or update a delivery by external reference, replace its item
    /// list, and issue confirmation codes if it is new. Runs as one
    /// transaction. Fails with a validation error if either site reference
    /// does not resolve or both resolve to the same site.
    async fn upsert(
        &self,
        input: &DeliveryUpsert,
        issued: &IssuedCredentials,
    ) -> AppResult<UpsertOutcome>;

    /// Find a delivery by public URL key.
    async fn find_by_public_key(&self, key: &str) -> AppResult<Option<Delivery>>;

    /// Find a delivery by external reference.
    async fn find_by_ref(&self, delivery_ref: DeliveryRef) -> AppResult<Option<Delivery>>;

    /// All deliveries where the site is either party, latest target date first.
    async fn find_by_site(&self, site_id: SiteId) -> AppResult<Vec<Delivery>>;

    /// Delete a delivery and its item links. Returns whether it existed.
    async fn delete(&self, delivery_ref: DeliveryRef) -> AppResult<bool>;
}
