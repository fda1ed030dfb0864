//! Notification runner: drains the queue and POSTs each payload.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Semaphore, mpsc, watch};

use reliefhub_core::config::NotificationEndpoints;
use reliefhub_core::events::Notification;

use crate::transport::WebhookTransport;

/// How long shutdown waits for in-flight deliveries.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

/// Delivers queued notifications with bounded concurrency.
///
/// No retry and no dead-lettering: a failed POST is logged and dropped.
#[derive(Debug)]
pub struct NotificationRunner {
    receiver: mpsc::Receiver<Notification>,
    transport: Arc<dyn WebhookTransport>,
    endpoints: Arc<NotificationEndpoints>,
    concurrency: usize,
    timeout: Duration,
}

impl NotificationRunner {
    /// Create a runner over the receiving half of the queue.
    pub fn new(
        receiver: mpsc::Receiver<Notification>,
        transport: Arc<dyn WebhookTransport>,
        endpoints: Arc<NotificationEndpoints>,
        concurrency: usize,
        timeout: Duration,
    ) -> Self {
        Self {
            receiver,
            transport,
            endpoints,
            concurrency,
            timeout,
        }
    }

    /// Run until the cancel signal flips to `true` or every dispatcher is gone.
    pub async fn run(mut self, mut cancel: watch::Receiver<bool>) {
        tracing::info!(
            concurrency = self.concurrency,
            timeout_seconds = self.timeout.as_secs(),
            "Notification runner started"
        );

        let semaphore = Arc::new(Semaphore::new(self.concurrency));

        loop {
            tokio::select! {
                changed = cancel.changed() => {
                    if changed.is_err() || *cancel.borrow() {
                        tracing::info!("Notification runner received shutdown signal");
                        break;
                    }
                }
                next = self.receiver.recv() => {
                    let Some(notification) = next else {
                        tracing::info!("All dispatchers dropped, notification runner stopping");
                        break;
                    };
                    // Stay responsive to shutdown while every permit is taken.
                    let permit = loop {
                        tokio::select! {
                            permit = Arc::clone(&semaphore).acquire_owned() => break permit.ok(),
                            changed = cancel.changed() => {
                                if changed.is_err() || *cancel.borrow() {
                                    break None;
                                }
                            }
                        }
                    };
                    let Some(permit) = permit else {
                        tracing::warn!(
                            kind = %notification.event.kind(),
                            notification_id = %notification.id,
                            "Notification runner stopping while saturated, dropping event"
                        );
                        break;
                    };
                    let task = self.delivery(notification);
                    tokio::spawn(async move {
                        let _permit = permit;
                        task.await;
                    });
                }
            }
        }

        // Deliver what was already queued, then wait for in-flight sends.
        self.receiver.close();
        let permits = u32::try_from(self.concurrency).unwrap_or(u32::MAX);
        let drain = async {
            while let Some(notification) = self.receiver.recv().await {
                let Ok(permit) = Arc::clone(&semaphore).acquire_owned().await else {
                    break;
                };
                let task = self.delivery(notification);
                tokio::spawn(async move {
                    let _permit = permit;
                    task.await;
                });
            }
            tracing::info!("Notification runner waiting for in-flight deliveries...");
            let _ = semaphore.acquire_many(permits).await;
        };
        if tokio::time::timeout(DRAIN_TIMEOUT, drain).await.is_err() {
            tracing::warn!(
                drain_timeout_seconds = DRAIN_TIMEOUT.as_secs(),
                "Notification drain timed out, abandoning remaining deliveries"
            );
        }
        tracing::info!("Notification runner shut down complete");
    }

    fn delivery(&self, notification: Notification) -> impl Future<Output = ()> + Send + 'static {
        let transport = Arc::clone(&self.transport);
        let endpoints = Arc::clone(&self.endpoints);
        let timeout = self.timeout;
        async move { deliver(transport.as_ref(), &endpoints, timeout, notification).await }
    }
}

async fn deliver(
    transport: &dyn WebhookTransport,
    endpoints: &NotificationEndpoints,
    timeout: Duration,
    notification: Notification,
) {
    let kind = notification.event.kind();
    let id = notification.id;

    let Some(url) = endpoints.for_kind(kind) else {
        tracing::debug!(kind = %kind, notification_id = %id, "No endpoint configured, dropping");
        return;
    };
    let body = match notification.event.payload() {
        Ok(body) => body,
        Err(e) => {
            tracing::error!(kind = %kind, notification_id = %id, error = %e, "Failed to serialize notification");
            return;
        }
    };

    match tokio::time::timeout(timeout, transport.post_json(url, &body)).await {
        Ok(Ok(())) => {
            tracing::info!(kind = %kind, notification_id = %id, url = %url, "Notification delivered");
        }
        Ok(Err(e)) => {
            tracing::warn!(kind = %kind, notification_id = %id, url = %url, error = %e, "Notification delivery failed");
        }
        Err(_) => {
            tracing::warn!(
                kind = %kind,
                notification_id = %id,
                url = %url,
                timeout_seconds = timeout.as_secs(),
                "Notification delivery timed out"
            );
        }
    }
}
