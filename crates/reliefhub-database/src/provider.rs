//! Store bundle that dispatches to the configured provider.

use std::sync::Arc;

use tracing::info;

use reliefhub_core::config::{DatabaseConfig, DatabaseProvider};
use reliefhub_core::result::AppResult;

use crate::connection::DatabasePool;
use crate::memory::MemoryStore;
use crate::migration::run_migrations;
use crate::repositories::{
    DeliveryRepository, InventoryRepository, ItemRepository, SiteRepository,
};
use crate::store::{DeliveryStore, InventoryStore, ItemStore, SiteStore};

/// One handle per store trait, all backed by the same provider.
#[derive(Debug, Clone)]
pub struct Stores {
    pub sites: Arc<dyn SiteStore>,
    pub items: Arc<dyn ItemStore>,
    pub inventory: Arc<dyn InventoryStore>,
    pub deliveries: Arc<dyn DeliveryStore>,
    /// Present only for the PostgreSQL provider.
    pub pool: Option<DatabasePool>,
}

impl Stores {
    /// Build the stores selected by `config.provider`.
    pub async fn connect(config: &DatabaseConfig) -> AppResult<Self> {
        match config.provider {
            DatabaseProvider::Postgres => {
                info!("Initializing PostgreSQL stores");
                let pool = DatabasePool::connect(config).await?;
                if config.run_migrations {
                    run_migrations(pool.pool()).await?;
                }
                Ok(Self::postgres(pool))
            }
            DatabaseProvider::Memory => {
                info!("Initializing in-memory stores");
                Ok(Self::memory(MemoryStore::new()))
            }
        }
    }

    /// Stores over an open PostgreSQL pool.
    pub fn postgres(pool: DatabasePool) -> Self {
        let pg = pool.pool().clone();
        Self {
            sites: Arc::new(SiteRepository::new(pg.clone())),
            items: Arc::new(ItemRepository::new(pg.clone())),
            inventory: Arc::new(InventoryRepository::new(pg.clone())),
            deliveries: Arc::new(DeliveryRepository::new(pg)),
            pool: Some(pool),
        }
    }

    /// Stores sharing one in-memory state.
    pub fn memory(store: MemoryStore) -> Self {
        Self {
            sites: Arc::new(store.clone()),
            items: Arc::new(store.clone()),
            inventory: Arc::new(store.clone()),
            deliveries: Arc::new(store),
            pool: None,
        }
    }

    /// Check the backing store is reachable.
    pub async fn ping(&self) -> AppResult<()> {
        match &self.pool {
            Some(pool) => pool.ping().await,
            None => Ok(()),
        }
    }
}
