//! Delivery record lifecycle.

use std::sync::Arc;

use tracing::{info, warn};

use reliefhub_core::error::AppError;
use reliefhub_core::events::{DeliveryStatusPayload, NotificationEvent};
use reliefhub_core::result::AppResult;
use reliefhub_core::types::{DeliveryRef, SiteId};
use reliefhub_database::{DeliveryStore, SiteStore};
use reliefhub_entity::delivery::{ConfirmRole, Delivery, DeliveryUpsert};
use reliefhub_worker::NotificationDispatcher;

use super::confirmation::ConfirmationService;

/// Upserts, reads, and deletes deliveries.
#[derive(Debug, Clone)]
pub struct DeliveryService {
    deliveries: Arc<dyn DeliveryStore>,
    sites: Arc<dyn SiteStore>,
    confirmations: Arc<ConfirmationService>,
    dispatcher: NotificationDispatcher,
}

impl DeliveryService {
    /// Creates a new delivery service.
    pub fn new(
        deliveries: Arc<dyn DeliveryStore>,
        sites: Arc<dyn SiteStore>,
        confirmations: Arc<ConfirmationService>,
        dispatcher: NotificationDispatcher,
    ) -> Self {
        Self {
            deliveries,
            sites,
            confirmations,
            dispatcher,
        }
    }

    /// Create or update a delivery by external reference.
    ///
    /// The item list is replaced wholesale. A new delivery receives a public
    /// key (unless the caller supplied one) and one confirmation code per
    /// role. When the delivery is new or its status changed, a status
    /// notification carrying the three confirmation links is dispatched.
    pub async fn upsert(&self, mut input: DeliveryUpsert) -> AppResult<Delivery> {
        input.public_url_key = input
            .public_url_key
            .take()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());

        let issued = self.confirmations.issue();
        let outcome = self.deliveries.upsert(&input, &issued).await?;

        info!(
            delivery_id = %input.delivery_ref,
            created = outcome.created,
            status = ?outcome.delivery.status,
            items = outcome.delivery.item_list.len(),
            "Delivery upserted"
        );

        if outcome.status_changed() {
            match self.status_event(&outcome.delivery) {
                Ok(event) => self.dispatcher.notify(event),
                Err(e) => warn!(
                    delivery_id = %input.delivery_ref,
                    error = %e,
                    "Cannot build delivery status notification"
                ),
            }
        }

        Ok(outcome.delivery)
    }

    /// The delivery behind a public tracking key.
    pub async fn fetch_by_public_key(&self, key: &str) -> AppResult<Delivery> {
        match self.deliveries.find_by_public_key(key).await? {
            Some(delivery) => Ok(delivery),
            None => {
                warn!(public_url_key = %key, "Failed to fetch delivery by key (record not found)");
                Err(AppError::not_found(format!("Invalid delivery ID: {key}")))
            }
        }
    }

    /// Deliveries where the site is either party, latest target date first.
    pub async fn fetch_by_site(&self, site_id: SiteId) -> AppResult<Vec<Delivery>> {
        if self.sites.find_by_id(site_id).await?.is_none() {
            return Err(AppError::not_found(format!("Site not found: {site_id}")));
        }
        self.deliveries.find_by_site(site_id).await
    }

    /// Delete a delivery and its item links. Unknown references are a no-op.
    pub async fn delete(&self, delivery_ref: DeliveryRef) -> AppResult<bool> {
        let deleted = self.deliveries.delete(delivery_ref).await?;
        if deleted {
            info!(delivery_id = %delivery_ref, "Delivery deleted");
        }
        Ok(deleted)
    }

    /// The confirmation link for one role of the delivery behind `key`.
    pub async fn confirmation_link(&self, key: &str, role: ConfirmRole) -> AppResult<String> {
        let delivery = self.fetch_by_public_key(key).await?;
        self.confirmations.confirmation_link(&delivery, role)
    }

    fn status_event(&self, delivery: &Delivery) -> AppResult<NotificationEvent> {
        Ok(NotificationEvent::DeliveryStatusChanged(DeliveryStatusPayload {
            airtable_id: delivery.delivery_ref,
            delivery_status: delivery.status.clone().unwrap_or_default(),
            pickup_confirm_link: self
                .confirmations
                .confirmation_link(delivery, ConfirmRole::PickupSite)?,
            drop_off_confirm_link: self
                .confirmations
                .confirmation_link(delivery, ConfirmRole::DropoffSite)?,
            driver_confirm_link: self
                .confirmations
                .confirmation_link(delivery, ConfirmRole::Driver)?,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{Harness, TRACKING_DOMAIN};
    use chrono::NaiveDate;
    use reliefhub_core::error::ErrorKind;
    use reliefhub_entity::delivery::DeliveryStatus;
    use reliefhub_entity::site::SiteRole;

    async fn seeded() -> (Harness, DeliveryService) {
        let harness = Harness::new();
        harness
            .memory
            .add_site("Hub", Some(100), Some(SiteRole::SupplyHub))
            .await;
        harness
            .memory
            .add_site("Center", Some(200), Some(SiteRole::DistributionCenter))
            .await;
        harness.memory.add_item("Water", Some(161)).await;
        harness.memory.add_item("Tarps", Some(191)).await;

        let service = DeliveryService::new(
            harness.stores.deliveries.clone(),
            harness.stores.sites.clone(),
            Arc::new(ConfirmationService::new(TRACKING_DOMAIN)),
            harness.dispatcher.clone(),
        );
        (harness, service)
    }

    fn input(items: Vec<i64>, status: Option<DeliveryStatus>) -> DeliveryUpsert {
        DeliveryUpsert {
            delivery_ref: DeliveryRef(68),
            from_site_wss_id: 100,
            to_site_wss_id: 200,
            status,
            target_delivery_date: NaiveDate::from_ymd_opt(2024, 12, 13),
            dispatcher_name: Some("Dana".to_string()),
            dispatcher_number: Some("555-0100".to_string()),
            driver_name: Some("Riley".to_string()),
            driver_number: Some("555-0199".to_string()),
            license_plate_numbers: Some("ABC-123".to_string()),
            dispatcher_notes: Some("Side door".to_string()),
            item_wss_ids: items,
            public_url_key: Some("QWER".to_string()),
        }
    }

    #[tokio::test]
    async fn test_reupsert_replaces_items_and_status() {
        let (_harness, service) = seeded().await;

        service
            .upsert(input(vec![161, 191], Some(DeliveryStatus::CreatingDispatch)))
            .await
            .unwrap();
        service
            .upsert(input(vec![191], Some(DeliveryStatus::InProgress)))
            .await
            .unwrap();

        let fetched = service.fetch_by_public_key("QWER").await.unwrap();
        assert_eq!(fetched.item_list, vec!["Tarps"]);
        assert_eq!(fetched.status.as_deref(), Some("In Progress"));
        assert_eq!(fetched.from_site.name, "Hub");
        assert_eq!(fetched.to_site.name, "Center");
    }

    #[tokio::test]
    async fn test_empty_optional_fields_clear_stored_values() {
        let (_harness, service) = seeded().await;
        service
            .upsert(input(vec![161], Some(DeliveryStatus::InProgress)))
            .await
            .unwrap();

        let mut cleared = input(vec![161], Some(DeliveryStatus::InProgress));
        cleared.dispatcher_name = None;
        cleared.dispatcher_number = None;
        cleared.driver_name = None;
        cleared.driver_number = None;
        cleared.license_plate_numbers = None;
        let delivery = service.upsert(cleared).await.unwrap();

        assert!(delivery.dispatcher_name.is_none());
        assert!(delivery.dispatcher_number.is_none());
        assert!(delivery.driver_name.is_none());
        assert!(delivery.driver_number.is_none());
        assert!(delivery.license_plate_numbers.is_none());
    }

    #[tokio::test]
    async fn test_status_notification_on_create_and_change_only() {
        let (harness, service) = seeded().await;

        let created = service
            .upsert(input(vec![161], Some(DeliveryStatus::CreatingDispatch)))
            .await
            .unwrap();
        service
            .upsert(input(vec![191], Some(DeliveryStatus::CreatingDispatch)))
            .await
            .unwrap();
        service
            .upsert(input(vec![191], Some(DeliveryStatus::Completed)))
            .await
            .unwrap();

        let sent = harness.sent_to("/delivery", 2).await;
        assert_eq!(harness.settle().await.len(), 2);
        assert!(sent.iter().all(|body| body["airtableId"] == 68));

        let mut statuses: Vec<&str> = sent
            .iter()
            .filter_map(|body| body["deliveryStatus"].as_str())
            .collect();
        statuses.sort_unstable();
        assert_eq!(statuses, vec!["Creating Dispatch", "Delivery Completed"]);

        let driver = created.confirmation(ConfirmRole::Driver).unwrap();
        let expected = format!("{TRACKING_DOMAIN}/delivery/QWER?code={}", driver.code);
        assert!(sent.iter().all(|body| body["driverConfirmLink"] == expected.as_str()));
    }

    #[tokio::test]
    async fn test_codes_are_issued_once() {
        let (_harness, service) = seeded().await;
        let first = service
            .upsert(input(vec![], Some(DeliveryStatus::InProgress)))
            .await
            .unwrap();
        let second = service
            .upsert(input(vec![], Some(DeliveryStatus::Completed)))
            .await
            .unwrap();
        assert_eq!(first.confirmations, second.confirmations);
        assert!(second.is_complete());
    }

    #[tokio::test]
    async fn test_generated_public_key_when_omitted() {
        let (_harness, service) = seeded().await;
        let mut without_key = input(vec![], None);
        without_key.public_url_key = Some("  ".to_string());
        let delivery = service.upsert(without_key).await.unwrap();
        assert_eq!(delivery.public_url_key.len(), 12);
        assert!(service
            .fetch_by_public_key(&delivery.public_url_key)
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_unknown_key_and_site_are_not_found() {
        let (_harness, service) = seeded().await;
        let err = service.fetch_by_public_key("NOPE").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
        assert_eq!(err.message, "Invalid delivery ID: NOPE");

        let err = service.fetch_by_site(SiteId(999)).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_delete_removes_delivery_and_is_idempotent() {
        let (harness, service) = seeded().await;
        service
            .upsert(input(vec![161, 191], Some(DeliveryStatus::InProgress)))
            .await
            .unwrap();

        assert!(service.delete(DeliveryRef(68)).await.unwrap());
        assert!(!service.delete(DeliveryRef(68)).await.unwrap());
        assert!(service.fetch_by_public_key("QWER").await.is_err());

        let hub = harness.stores.sites.find_by_wss_id(100).await.unwrap().unwrap();
        assert!(service.fetch_by_site(hub.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_by_site_orders_latest_first() {
        let (harness, service) = seeded().await;
        let mut early = input(vec![], None);
        early.delivery_ref = DeliveryRef(1);
        early.public_url_key = Some("EARLY".to_string());
        early.target_delivery_date = NaiveDate::from_ymd_opt(2024, 10, 1);
        let mut late = input(vec![], None);
        late.delivery_ref = DeliveryRef(2);
        late.public_url_key = Some("LATE".to_string());
        late.target_delivery_date = NaiveDate::from_ymd_opt(2024, 11, 1);
        service.upsert(early).await.unwrap();
        service.upsert(late).await.unwrap();

        let center = harness.stores.sites.find_by_wss_id(200).await.unwrap().unwrap();
        let refs: Vec<DeliveryRef> = service
            .fetch_by_site(center.id)
            .await
            .unwrap()
            .into_iter()
            .map(|d| d.delivery_ref)
            .collect();
        assert_eq!(refs, vec![DeliveryRef(2), DeliveryRef(1)]);
    }

    #[tokio::test]
    async fn test_confirmation_link_by_public_key() {
        let (_harness, service) = seeded().await;
        let delivery = service
            .upsert(input(vec![], Some(DeliveryStatus::InProgress)))
            .await
            .unwrap();
        let pickup = delivery.confirmation(ConfirmRole::PickupSite).unwrap();

        let link = service
            .confirmation_link("QWER", ConfirmRole::PickupSite)
            .await
            .unwrap();
        assert_eq!(
            link,
            format!("{TRACKING_DOMAIN}/delivery/QWER?code={}", pickup.code)
        );
    }
}
