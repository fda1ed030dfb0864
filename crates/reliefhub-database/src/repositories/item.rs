//! Item catalogue repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{info, warn};

use reliefhub_core::error::{AppError, ErrorKind};
use reliefhub_core::result::AppResult;
use reliefhub_entity::inventory::Item;

use super::is_unique_violation;
use crate::store::{ImportOutcome, ItemStore};

/// Repository for catalogue items.
#[derive(Debug, Clone)]
pub struct ItemRepository {
    pool: PgPool,
}

impl ItemRepository {
    /// Create a new item repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ItemStore for ItemRepository {
    async fn find_by_name(&self, name: &str) -> AppResult<Option<Item>> {
        sqlx::query_as::<_, Item>(
            "SELECT id, name, wss_id, last_updated FROM item WHERE name = $1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find item", e))
    }

    async fn insert(&self, name: &str) -> AppResult<bool> {
        match sqlx::query("INSERT INTO item (name) VALUES ($1)")
            .bind(name)
            .execute(&self.pool)
            .await
        {
            Ok(_) => Ok(true),
            Err(e) if is_unique_violation(&e) => {
                warn!(item_name = %name, "Item was created concurrently, treating as existing");
                Ok(false)
            }
            Err(e) => Err(AppError::with_source(
                ErrorKind::Database,
                "Failed to insert item",
                e,
            )),
        }
    }

    async fn import(&self, wss_id: i64, name: &str) -> AppResult<ImportOutcome> {
        let map_err = |e: sqlx::Error| {
            AppError::with_source(ErrorKind::Database, "Failed to import item", e)
        };

        let mut tx = self.pool.begin().await.map_err(map_err)?;

        let by_ref = sqlx::query(
            "UPDATE item SET name = $2, last_updated = NOW() WHERE wss_id = $1",
        )
        .bind(wss_id)
        .bind(name)
        .execute(&mut *tx)
        .await
        .map_err(map_err)?;

        let outcome = if by_ref.rows_affected() > 0 {
            ImportOutcome::UpdatedByRef
        } else {
            let by_name = sqlx::query(
                "UPDATE item SET wss_id = $1, last_updated = NOW() WHERE name = $2",
            )
            .bind(wss_id)
            .bind(name)
            .execute(&mut *tx)
            .await
            .map_err(map_err)?;

            if by_name.rows_affected() > 0 {
                ImportOutcome::LinkedByName
            } else {
                sqlx::query("INSERT INTO item (name, wss_id) VALUES ($1, $2)")
                    .bind(name)
                    .bind(wss_id)
                    .execute(&mut *tx)
                    .await
                    .map_err(map_err)?;
                ImportOutcome::Created
            }
        };

        tx.commit().await.map_err(map_err)?;
        info!(wss_id, item_name = %name, outcome = ?outcome, "Imported item");
        Ok(outcome)
    }
}
