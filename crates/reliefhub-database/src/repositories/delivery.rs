//! Delivery repository implementation.

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use tracing::{debug, warn};

use reliefhub_core::error::{AppError, ErrorKind};
use reliefhub_core::result::AppResult;
use reliefhub_core::types::{DeliveryRef, SiteId};
use reliefhub_entity::delivery::{Delivery, DeliveryConfirmation, DeliveryUpsert};
use reliefhub_entity::site::SiteDetails;

use super::{db_error, is_unique_violation};
use crate::store::{DeliveryStore, IssuedCredentials, UpsertOutcome};

const DELIVERY_SELECT: &str = "SELECT \
        d.id, d.airtable_id, d.public_url_key, d.delivery_status, d.target_delivery_date, \
        d.dispatcher_name, d.dispatcher_number, d.dispatcher_notes, \
        d.driver_name, d.driver_number, d.driver_license_plates, \
        fs.id AS from_site_id, fs.name AS from_name, fs.address AS from_address, \
        fs.city AS from_city, fs.state AS from_state, fs.contact_name AS from_contact_name, \
        fs.contact_number AS from_contact_number, fs.hours AS from_hours, \
        ts.id AS to_site_id, ts.name AS to_name, ts.address AS to_address, \
        ts.city AS to_city, ts.state AS to_state, ts.contact_name AS to_contact_name, \
        ts.contact_number AS to_contact_number, ts.hours AS to_hours \
    FROM delivery d \
    JOIN site fs ON fs.id = d.from_site_id \
    JOIN site ts ON ts.id = d.to_site_id";

// `previous` is evaluated against the snapshot taken before the insert, so
// it yields the status as it was. `xmax = 0` holds only for freshly
// inserted tuples.
const UPSERT_SQL: &str = "WITH previous AS ( \
        SELECT delivery_status FROM delivery WHERE airtable_id = $1 \
    ) \
    INSERT INTO delivery ( \
        airtable_id, from_site_id, to_site_id, delivery_status, target_delivery_date, \
        dispatcher_name, dispatcher_number, driver_name, driver_number, \
        driver_license_plates, dispatcher_notes, public_url_key \
    ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) \
    ON CONFLICT (airtable_id) DO UPDATE SET \
        from_site_id = EXCLUDED.from_site_id, \
        to_site_id = EXCLUDED.to_site_id, \
        delivery_status = EXCLUDED.delivery_status, \
        target_delivery_date = EXCLUDED.target_delivery_date, \
        dispatcher_name = EXCLUDED.dispatcher_name, \
        dispatcher_number = EXCLUDED.dispatcher_number, \
        driver_name = EXCLUDED.driver_name, \
        driver_number = EXCLUDED.driver_number, \
        driver_license_plates = EXCLUDED.driver_license_plates, \
        dispatcher_notes = EXCLUDED.dispatcher_notes, \
        last_updated = NOW() \
    RETURNING id, (xmax = 0) AS created, (SELECT delivery_status FROM previous) AS previous_status";

/// Flat row produced by [`DELIVERY_SELECT`].
#[derive(Debug, FromRow)]
struct DeliveryRow {
    id: i64,
    airtable_id: DeliveryRef,
    public_url_key: String,
    delivery_status: Option<String>,
    target_delivery_date: Option<NaiveDate>,
    dispatcher_name: Option<String>,
    dispatcher_number: Option<String>,
    dispatcher_notes: Option<String>,
    driver_name: Option<String>,
    driver_number: Option<String>,
    driver_license_plates: Option<String>,
    from_site_id: SiteId,
    from_name: String,
    from_address: Option<String>,
    from_city: Option<String>,
    from_state: Option<String>,
    from_contact_name: Option<String>,
    from_contact_number: Option<String>,
    from_hours: Option<String>,
    to_site_id: SiteId,
    to_name: String,
    to_address: Option<String>,
    to_city: Option<String>,
    to_state: Option<String>,
    to_contact_name: Option<String>,
    to_contact_number: Option<String>,
    to_hours: Option<String>,
}

impl DeliveryRow {
    fn into_delivery(
        self,
        item_list: Vec<String>,
        confirmations: Vec<DeliveryConfirmation>,
    ) -> Delivery {
        Delivery {
            delivery_ref: self.airtable_id,
            from_site: SiteDetails {
                id: self.from_site_id,
                name: self.from_name,
                address: self.from_address,
                city: self.from_city,
                state: self.from_state,
                contact_name: self.from_contact_name,
                contact_number: self.from_contact_number,
                hours: self.from_hours,
            },
            to_site: SiteDetails {
                id: self.to_site_id,
                name: self.to_name,
                address: self.to_address,
                city: self.to_city,
                state: self.to_state,
                contact_name: self.to_contact_name,
                contact_number: self.to_contact_number,
                hours: self.to_hours,
            },
            status: self.delivery_status,
            target_delivery_date: self.target_delivery_date,
            dispatcher_name: self.dispatcher_name,
            dispatcher_number: self.dispatcher_number,
            driver_name: self.driver_name,
            driver_number: self.driver_number,
            license_plate_numbers: self.driver_license_plates,
            dispatcher_notes: self.dispatcher_notes,
            public_url_key: self.public_url_key,
            item_list,
            confirmations,
        }
    }
}

enum Filter<'a> {
    PublicKey(&'a str),
    Ref(DeliveryRef),
    Site(SiteId),
}

/// Repository for deliveries, their item links, and confirmation slots.
#[derive(Debug, Clone)]
pub struct DeliveryRepository {
    pool: PgPool,
}

impl DeliveryRepository {
    /// Create a new delivery repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch(&self, filter: Filter<'_>) -> AppResult<Vec<Delivery>> {
        let clause = match filter {
            Filter::PublicKey(_) => "d.public_url_key = $1",
            Filter::Ref(_) => "d.airtable_id = $1",
            Filter::Site(_) => "d.from_site_id = $1 OR d.to_site_id = $1",
        };
        let sql = format!(
            "{DELIVERY_SELECT} WHERE ({clause}) \
             ORDER BY d.target_delivery_date DESC NULLS LAST, d.airtable_id"
        );

        let query = sqlx::query_as::<_, DeliveryRow>(&sql);
        let query = match filter {
            Filter::PublicKey(key) => query.bind(key),
            Filter::Ref(delivery_ref) => query.bind(delivery_ref),
            Filter::Site(site_id) => query.bind(site_id),
        };
        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("Failed to fetch deliveries"))?;

        let mut deliveries = Vec::with_capacity(rows.len());
        for row in rows {
            let items = self.item_names(row.id).await?;
            let confirmations = self.confirmations(row.id).await?;
            deliveries.push(row.into_delivery(items, confirmations));
        }
        Ok(deliveries)
    }

    async fn item_names(&self, delivery_id: i64) -> AppResult<Vec<String>> {
        sqlx::query_scalar::<_, String>(
            "SELECT i.name FROM delivery_item di JOIN item i ON i.id = di.item_id \
             WHERE di.delivery_id = $1 ORDER BY i.name",
        )
        .bind(delivery_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to fetch delivery items"))
    }

    async fn confirmations(&self, delivery_id: i64) -> AppResult<Vec<DeliveryConfirmation>> {
        sqlx::query_as::<_, DeliveryConfirmation>(
            "SELECT confirm_role AS role, code, confirmed, date_confirmed \
             FROM delivery_confirmation WHERE delivery_id = $1 ORDER BY confirm_role",
        )
        .bind(delivery_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to fetch delivery confirmations"))
    }

    async fn resolve_site(
        tx: &mut Transaction<'_, Postgres>,
        wss_id: i64,
        party: &str,
    ) -> AppResult<SiteId> {
        sqlx::query_scalar::<_, SiteId>("SELECT id FROM site WHERE wss_id = $1")
            .bind(wss_id)
            .fetch_optional(&mut **tx)
            .await
            .map_err(db_error("Failed to resolve delivery site"))?
            .ok_or_else(|| AppError::validation(format!("Unknown {party} site: {wss_id}")))
    }
}

#[async_trait]
impl DeliveryStore for DeliveryRepository {
    async fn upsert(
        &self,
        input: &DeliveryUpsert,
        issued: &IssuedCredentials,
    ) -> AppResult<UpsertOutcome> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        let from_site = Self::resolve_site(&mut tx, input.from_site_wss_id, "pickup").await?;
        let to_site = Self::resolve_site(&mut tx, input.to_site_wss_id, "drop-off").await?;
        if from_site == to_site {
            return Err(AppError::validation(
                "Pickup and drop-off sites must be different",
            ));
        }

        let public_url_key = input
            .public_url_key
            .as_deref()
            .unwrap_or(&issued.public_url_key);

        let (delivery_id, created, previous_status): (i64, bool, Option<String>) =
            sqlx::query_as(UPSERT_SQL)
                .bind(input.delivery_ref)
                .bind(from_site)
                .bind(to_site)
                .bind(input.status.map(|s| s.as_str()))
                .bind(input.target_delivery_date)
                .bind(input.dispatcher_name.as_deref())
                .bind(input.dispatcher_number.as_deref())
                .bind(input.driver_name.as_deref())
                .bind(input.driver_number.as_deref())
                .bind(input.license_plate_numbers.as_deref())
                .bind(input.dispatcher_notes.as_deref())
                .bind(public_url_key)
                .fetch_one(&mut *tx)
                .await
                .map_err(|e| {
                    if is_unique_violation(&e) {
                        AppError::with_source(
                            ErrorKind::Conflict,
                            format!("Public URL key already in use: {public_url_key}"),
                            e,
                        )
                    } else {
                        AppError::with_source(ErrorKind::Database, "Failed to upsert delivery", e)
                    }
                })?;

        // Existing slots are kept, so codes never rotate.
        for (role, code) in &issued.codes {
            sqlx::query(
                "INSERT INTO delivery_confirmation (delivery_id, confirm_role, code) \
                 VALUES ($1, $2, $3) ON CONFLICT (delivery_id, confirm_role) DO NOTHING",
            )
            .bind(delivery_id)
            .bind(role)
            .bind(code)
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to issue confirmation code"))?;
        }

        sqlx::query("DELETE FROM delivery_item WHERE delivery_id = $1")
            .bind(delivery_id)
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to clear delivery items"))?;

        let item_refs = input.distinct_item_wss_ids();
        let linked = sqlx::query(
            "INSERT INTO delivery_item (delivery_id, item_id) \
             SELECT $1, id FROM item WHERE wss_id = ANY($2) \
             ON CONFLICT DO NOTHING",
        )
        .bind(delivery_id)
        .bind(&item_refs)
        .execute(&mut *tx)
        .await
        .map_err(db_error("Failed to link delivery items"))?
        .rows_affected();

        if linked as usize != item_refs.len() {
            warn!(
                delivery_id = %input.delivery_ref,
                requested = item_refs.len(),
                linked,
                "Some delivery items did not resolve to known items"
            );
        }

        tx.commit()
            .await
            .map_err(db_error("Failed to commit delivery upsert"))?;
        debug!(delivery_id = %input.delivery_ref, created, "Delivery upserted");

        let delivery = self.find_by_ref(input.delivery_ref).await?.ok_or_else(|| {
            AppError::internal(format!(
                "Delivery {} vanished after upsert",
                input.delivery_ref
            ))
        })?;

        Ok(UpsertOutcome {
            created,
            previous_status,
            delivery,
        })
    }

    async fn find_by_public_key(&self, key: &str) -> AppResult<Option<Delivery>> {
        Ok(self.fetch(Filter::PublicKey(key)).await?.into_iter().next())
    }

    async fn find_by_ref(&self, delivery_ref: DeliveryRef) -> AppResult<Option<Delivery>> {
        Ok(self.fetch(Filter::Ref(delivery_ref)).await?.into_iter().next())
    }

    async fn find_by_site(&self, site_id: SiteId) -> AppResult<Vec<Delivery>> {
        self.fetch(Filter::Site(site_id)).await
    }

    async fn delete(&self, delivery_ref: DeliveryRef) -> AppResult<bool> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        let Some(delivery_id) =
            sqlx::query_scalar::<_, i64>("SELECT id FROM delivery WHERE airtable_id = $1")
                .bind(delivery_ref)
                .fetch_optional(&mut *tx)
                .await
                .map_err(db_error("Failed to find delivery"))?
        else {
            return Ok(false);
        };

        sqlx::query("DELETE FROM delivery_item WHERE delivery_id = $1")
            .bind(delivery_id)
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to delete delivery items"))?;
        sqlx::query("DELETE FROM delivery WHERE id = $1")
            .bind(delivery_id)
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to delete delivery"))?;

        tx.commit()
            .await
            .map_err(db_error("Failed to commit delivery delete"))?;
        Ok(true)
    }
}
