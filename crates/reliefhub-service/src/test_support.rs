//! Shared fixtures for service tests.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use reliefhub_core::config::NotificationConfig;
use reliefhub_database::{MemoryStore, Stores};
use reliefhub_worker::testing::RecordingTransport;
use reliefhub_worker::{NotificationDispatcher, notification_channel};

pub const TRACKING_DOMAIN: &str = "https://supplies.test";

/// Memory-backed stores with a live notification runner.
pub struct Harness {
    pub memory: MemoryStore,
    pub stores: Stores,
    pub transport: RecordingTransport,
    pub dispatcher: NotificationDispatcher,
    _cancel: watch::Sender<bool>,
}

impl Harness {
    pub fn new() -> Self {
        let mut config = NotificationConfig {
            enabled: true,
            ..Default::default()
        };
        config.endpoints.new_item = Some("http://hooks.test/new-item".to_string());
        config.endpoints.inventory_changed = Some("http://hooks.test/inventory".to_string());
        config.endpoints.site_upserted = Some("http://hooks.test/site".to_string());
        config.endpoints.needs_matched = Some("http://hooks.test/add-to-delivery".to_string());
        config.endpoints.delivery_status = Some("http://hooks.test/delivery".to_string());

        let transport = RecordingTransport::new();
        let (dispatcher, runner) = notification_channel(&config, Arc::new(transport.clone()));
        let (cancel, cancel_rx) = watch::channel(false);
        if let Some(runner) = runner {
            tokio::spawn(runner.run(cancel_rx));
        }

        let memory = MemoryStore::new();
        Self {
            stores: Stores::memory(memory.clone()),
            memory,
            transport,
            dispatcher,
            _cancel: cancel,
        }
    }

    /// Bodies posted to URLs ending in `url_suffix`, once `count` requests
    /// have been sent in total.
    pub async fn sent_to(&self, url_suffix: &str, count: usize) -> Vec<serde_json::Value> {
        self.transport
            .wait_for(count, Duration::from_secs(2))
            .await
            .into_iter()
            .filter(|(url, _)| url.ends_with(url_suffix))
            .map(|(_, body)| body)
            .collect()
    }

    /// Give the runner a moment, then return everything sent.
    pub async fn settle(&self) -> Vec<(String, serde_json::Value)> {
        tokio::time::sleep(Duration::from_millis(50)).await;
        self.transport.sent().await
    }
}
