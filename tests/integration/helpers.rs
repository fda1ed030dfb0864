//! Shared test helpers for integration tests.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tokio::sync::watch;
use tower::ServiceExt;

use reliefhub_api::{AppState, build_app};
use reliefhub_core::config::AppConfig;
use reliefhub_database::{MemoryStore, Stores};
use reliefhub_entity::inventory::ItemStatus;
use reliefhub_entity::site::{Site, SiteRole};
use reliefhub_worker::notification_channel;
use reliefhub_worker::testing::RecordingTransport;

pub const TRACKING_DOMAIN: &str = "https://supplies.test";
pub const WEBHOOK_SECRET: &str = "s3cret";

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Backing store, for seeding and direct assertions
    pub memory: MemoryStore,
    /// Records outbound notifications
    pub transport: RecordingTransport,
    _shutdown: watch::Sender<bool>,
}

impl TestApp {
    /// Create a test application with notifications enabled for every kind.
    pub fn new() -> Self {
        Self::with_config(|_| {})
    }

    /// Create a test application that requires [`WEBHOOK_SECRET`].
    pub fn with_secret() -> Self {
        Self::with_config(|config| {
            config.webhook.secret = Some(WEBHOOK_SECRET.to_string());
        })
    }

    /// Create a test application, adjusting the configuration first.
    pub fn with_config(adjust: impl FnOnce(&mut AppConfig)) -> Self {
        let mut config = AppConfig::default();
        config.delivery.tracking_domain = TRACKING_DOMAIN.to_string();
        config.notifications.enabled = true;
        let endpoints = &mut config.notifications.endpoints;
        endpoints.new_item = Some("http://hooks.test/new-item".to_string());
        endpoints.inventory_changed = Some("http://hooks.test/inventory".to_string());
        endpoints.site_upserted = Some("http://hooks.test/site".to_string());
        endpoints.needs_matched = Some("http://hooks.test/add-to-delivery".to_string());
        endpoints.delivery_status = Some("http://hooks.test/delivery".to_string());
        adjust(&mut config);

        let transport = RecordingTransport::new();
        let (dispatcher, runner) =
            notification_channel(&config.notifications, Arc::new(transport.clone()));
        let (shutdown, shutdown_rx) = watch::channel(false);
        if let Some(runner) = runner {
            tokio::spawn(runner.run(shutdown_rx));
        }

        let memory = MemoryStore::new();
        let state = AppState::new(config, Stores::memory(memory.clone()), dispatcher);

        Self {
            router: build_app(state),
            memory,
            transport,
            _shutdown: shutdown,
        }
    }

    /// Seed a supply hub (wss 100) with Water available and Tarps needed,
    /// and a distribution center (wss 200) that urgently needs Water.
    pub async fn seed_match_scenario(&self) -> (Site, Site) {
        let hub = self
            .memory
            .add_site("Hub", Some(100), Some(SiteRole::SupplyHub))
            .await;
        let center = self
            .memory
            .add_site("Center", Some(200), Some(SiteRole::DistributionCenter))
            .await;
        let water = self.memory.add_item("Water", Some(161)).await;
        let tarps = self.memory.add_item("Tarps", Some(191)).await;

        self.memory.set_inventory(hub.id, water.id, ItemStatus::Available).await;
        self.memory.set_inventory(hub.id, tarps.id, ItemStatus::Needed).await;
        self.memory
            .set_inventory(center.id, water.id, ItemStatus::UrgentlyNeeded)
            .await;
        (hub, center)
    }

    /// Bodies posted to URLs ending in `url_suffix`, once `count` requests
    /// have been sent in total.
    pub async fn sent_to(&self, url_suffix: &str, count: usize) -> Vec<Value> {
        self.transport
            .wait_for(count, Duration::from_secs(2))
            .await
            .into_iter()
            .filter(|(url, _)| url.ends_with(url_suffix))
            .map(|(_, body)| body)
            .collect()
    }

    /// Make a request to the test app.
    pub async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        self.request_with_headers(method, path, body, &[]).await
    }

    /// Make a request with extra headers.
    pub async fn request_with_headers(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        headers: &[(&str, &str)],
    ) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json");
        for (name, value) in headers {
            req = req.header(*name, *value);
        }

        let req = req
            .body(Body::from(body_str))
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let text = String::from_utf8_lossy(&body_bytes).into_owned();
        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse { status, body, text }
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Parsed JSON body, or `Null` for non-JSON bodies
    pub body: Value,
    /// Raw body text
    pub text: String,
}

/// A delivery update body in the shape the scheduling tool sends.
pub fn delivery_update(delivery_id: i64, items: &[i64], status: &str) -> Value {
    serde_json::json!({
        "deliveryId": delivery_id,
        "deliveryStatus": status,
        "dispatcherName": ["Dana"],
        "dispatcherNumber": ["555-0100"],
        "driverName": ["Riley"],
        "driverNumber": ["555-0199"],
        "pickupSiteWssId": [100],
        "dropOffSiteWssId": [200],
        "itemListWssIds": items,
        "licensePlateNumbers": ["ABC-123"],
        "targetDeliveryDate": "2024-12-13",
        "dispatcherNotes": "Side door",
        "publicUrlKey": "QWER"
    })
}
