//! Site inventory repository implementation.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::warn;

use reliefhub_core::error::{AppError, ErrorKind};
use reliefhub_core::result::AppResult;
use reliefhub_core::types::{ItemId, SiteId};
use reliefhub_entity::inventory::{InventoryEntry, ItemStatus};

use super::{db_error, is_unique_violation};
use crate::store::InventoryStore;

/// Repository for `site_item` rows.
#[derive(Debug, Clone)]
pub struct InventoryRepository {
    pool: PgPool,
}

impl InventoryRepository {
    /// Create a new inventory repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn touch_site(tx: &mut Transaction<'_, Postgres>, site_id: SiteId) -> AppResult<()> {
        sqlx::query("UPDATE site SET inventory_last_updated = NOW() WHERE id = $1")
            .bind(site_id)
            .execute(&mut **tx)
            .await
            .map(|_| ())
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Database,
                    "Failed to stamp site inventory update",
                    e,
                )
            })
    }
}

#[async_trait]
impl InventoryStore for InventoryRepository {
    async fn site_inventory(&self, site_id: SiteId) -> AppResult<Vec<InventoryEntry>> {
        sqlx::query_as::<_, InventoryEntry>(
            "SELECT si.site_id, si.item_id, i.name AS item_name, si.item_status AS status \
             FROM site_item si JOIN item i ON i.id = si.item_id \
             WHERE si.site_id = $1 ORDER BY i.name",
        )
        .bind(site_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list site inventory"))
    }

    async fn find_entry(
        &self,
        site_id: SiteId,
        item_id: ItemId,
    ) -> AppResult<Option<InventoryEntry>> {
        sqlx::query_as::<_, InventoryEntry>(
            "SELECT si.site_id, si.item_id, i.name AS item_name, si.item_status AS status \
             FROM site_item si JOIN item i ON i.id = si.item_id \
             WHERE si.site_id = $1 AND si.item_id = $2",
        )
        .bind(site_id)
        .bind(item_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to find inventory entry"))
    }

    async fn insert_entry(
        &self,
        site_id: SiteId,
        item_id: ItemId,
        status: ItemStatus,
    ) -> AppResult<bool> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        let inserted = sqlx::query(
            "INSERT INTO site_item (site_id, item_id, item_status) VALUES ($1, $2, $3)",
        )
        .bind(site_id)
        .bind(item_id)
        .bind(status)
        .execute(&mut *tx)
        .await;

        match inserted {
            Ok(_) => {}
            Err(e) if is_unique_violation(&e) => {
                warn!(
                    site_id = %site_id,
                    item_id = %item_id,
                    "Inventory entry already exists, concurrent activation ignored"
                );
                return Ok(false);
            }
            Err(e) => {
                return Err(AppError::with_source(
                    ErrorKind::Database,
                    "Failed to insert inventory entry",
                    e,
                ));
            }
        }

        Self::touch_site(&mut tx, site_id).await?;
        tx.commit()
            .await
            .map_err(db_error("Failed to commit inventory entry"))?;
        Ok(true)
    }

    async fn delete_entry(&self, site_id: SiteId, item_id: ItemId) -> AppResult<bool> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        let deleted = sqlx::query("DELETE FROM site_item WHERE site_id = $1 AND item_id = $2")
            .bind(site_id)
            .bind(item_id)
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to delete inventory entry"))?
            .rows_affected();

        if deleted > 0 {
            Self::touch_site(&mut tx, site_id).await?;
        }
        tx.commit()
            .await
            .map_err(db_error("Failed to commit inventory removal"))?;
        Ok(deleted > 0)
    }

    async fn update_status(
        &self,
        site_id: SiteId,
        item_id: ItemId,
        status: ItemStatus,
    ) -> AppResult<bool> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        let updated = sqlx::query(
            "UPDATE site_item SET item_status = $3, last_updated = NOW() \
             WHERE site_id = $1 AND item_id = $2",
        )
        .bind(site_id)
        .bind(item_id)
        .bind(status)
        .execute(&mut *tx)
        .await
        .map_err(db_error("Failed to update inventory status"))?
        .rows_affected();

        if updated != 1 {
            return Ok(false);
        }
        Self::touch_site(&mut tx, site_id).await?;
        tx.commit()
            .await
            .map_err(db_error("Failed to commit inventory status"))?;
        Ok(true)
    }
}
