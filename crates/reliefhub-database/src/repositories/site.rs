//! Site repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;

use reliefhub_core::error::{AppError, ErrorKind};
use reliefhub_core::result::AppResult;
use reliefhub_core::types::SiteId;
use reliefhub_entity::site::Site;

use crate::store::SiteStore;

const SITE_COLUMNS: &str = "id, wss_id, name, site_type, active, accepting_donations, \
     address, city, state, contact_name, contact_number, hours, \
     last_updated, inventory_last_updated";

/// Repository for site lookup and flag updates.
#[derive(Debug, Clone)]
pub struct SiteRepository {
    pool: PgPool,
}

impl SiteRepository {
    /// Create a new site repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SiteStore for SiteRepository {
    async fn find_by_id(&self, id: SiteId) -> AppResult<Option<Site>> {
        sqlx::query_as::<_, Site>(&format!("SELECT {SITE_COLUMNS} FROM site WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find site", e))
    }

    async fn find_by_wss_id(&self, wss_id: i64) -> AppResult<Option<Site>> {
        sqlx::query_as::<_, Site>(&format!(
            "SELECT {SITE_COLUMNS} FROM site WHERE wss_id = $1"
        ))
        .bind(wss_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to find site by wss id", e)
        })
    }

    async fn update_flags(
        &self,
        id: SiteId,
        active: Option<bool>,
        accepting_donations: Option<bool>,
    ) -> AppResult<Option<Site>> {
        sqlx::query_as::<_, Site>(&format!(
            "UPDATE site SET \
                 active = COALESCE($2, active), \
                 accepting_donations = COALESCE($3, accepting_donations), \
                 last_updated = NOW() \
             WHERE id = $1 RETURNING {SITE_COLUMNS}"
        ))
        .bind(id)
        .bind(active)
        .bind(accepting_donations)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update site flags", e))
    }
}
