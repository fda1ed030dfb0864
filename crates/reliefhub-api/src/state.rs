//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use reliefhub_core::config::AppConfig;
use reliefhub_database::Stores;
use reliefhub_service::{
    ConfirmationService, DeliveryService, InventoryService, NeedsMatchService, SiteService,
};
use reliefhub_worker::NotificationDispatcher;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    // ── Configuration ────────────────────────────────────────
    /// Application configuration
    pub config: Arc<AppConfig>,

    // ── Infrastructure ───────────────────────────────────────
    /// Store handles (PostgreSQL or in-memory)
    pub stores: Stores,
    /// Outbound notification queue
    pub dispatcher: NotificationDispatcher,

    // ── Services ─────────────────────────────────────────────
    /// Needs matching
    pub match_service: Arc<NeedsMatchService>,
    /// Delivery lifecycle
    pub delivery_service: Arc<DeliveryService>,
    /// Catalogue and per-site inventory
    pub inventory_service: Arc<InventoryService>,
    /// Site flags
    pub site_service: Arc<SiteService>,
}

impl AppState {
    /// Wire every service over `stores`, dispatching through `dispatcher`.
    pub fn new(config: AppConfig, stores: Stores, dispatcher: NotificationDispatcher) -> Self {
        let confirmations = Arc::new(ConfirmationService::new(
            config.delivery.tracking_domain.clone(),
        ));

        let match_service = Arc::new(NeedsMatchService::new(
            Arc::clone(&stores.sites),
            Arc::clone(&stores.inventory),
            dispatcher.clone(),
        ));
        let delivery_service = Arc::new(DeliveryService::new(
            Arc::clone(&stores.deliveries),
            Arc::clone(&stores.sites),
            confirmations,
            dispatcher.clone(),
        ));
        let inventory_service = Arc::new(InventoryService::new(
            Arc::clone(&stores.sites),
            Arc::clone(&stores.items),
            Arc::clone(&stores.inventory),
            dispatcher.clone(),
        ));
        let site_service = Arc::new(SiteService::new(
            Arc::clone(&stores.sites),
            dispatcher.clone(),
        ));

        Self {
            config: Arc::new(config),
            stores,
            dispatcher,
            match_service,
            delivery_service,
            inventory_service,
            site_service,
        }
    }
}
