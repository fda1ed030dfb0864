//! Non-blocking entry point for notifications.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, warn};

use reliefhub_core::config::{NotificationConfig, NotificationEndpoints};
use reliefhub_core::events::{Notification, NotificationEvent};

use crate::runner::NotificationRunner;
use crate::transport::WebhookTransport;

/// Hands events to the notification runner without waiting.
///
/// `notify` never blocks and never fails: events for disabled kinds, or
/// events that find the queue full, are logged and dropped.
#[derive(Debug, Clone)]
pub struct NotificationDispatcher {
    sender: Option<mpsc::Sender<Notification>>,
    endpoints: Arc<NotificationEndpoints>,
}

impl NotificationDispatcher {
    /// A dispatcher that drops every event.
    pub fn disabled() -> Self {
        Self {
            sender: None,
            endpoints: Arc::new(NotificationEndpoints::default()),
        }
    }

    /// Whether any event can be delivered at all.
    pub fn is_enabled(&self) -> bool {
        self.sender.is_some()
    }

    /// Queue an event for delivery.
    pub fn notify(&self, event: NotificationEvent) {
        let kind = event.kind();
        let Some(sender) = &self.sender else {
            debug!(kind = %kind, "Notifications disabled, dropping event");
            return;
        };
        if self.endpoints.for_kind(kind).is_none() {
            debug!(kind = %kind, "No endpoint configured, dropping event");
            return;
        }

        let notification = Notification::new(event);
        let id = notification.id;
        match sender.try_send(notification) {
            Ok(()) => debug!(kind = %kind, notification_id = %id, "Notification queued"),
            Err(TrySendError::Full(_)) => {
                warn!(kind = %kind, notification_id = %id, "Notification queue full, dropping event");
            }
            Err(TrySendError::Closed(_)) => {
                warn!(kind = %kind, notification_id = %id, "Notification runner stopped, dropping event");
            }
        }
    }
}

/// Build the dispatcher and the runner that serves it.
///
/// Returns no runner when notifications are disabled; the dispatcher then
/// drops everything.
pub fn notification_channel(
    config: &NotificationConfig,
    transport: Arc<dyn WebhookTransport>,
) -> (NotificationDispatcher, Option<NotificationRunner>) {
    if !config.enabled {
        return (NotificationDispatcher::disabled(), None);
    }

    let endpoints = Arc::new(config.endpoints.clone());
    let (sender, receiver) = mpsc::channel(config.queue_capacity.max(1));
    let runner = NotificationRunner::new(
        receiver,
        transport,
        Arc::clone(&endpoints),
        config.concurrency.max(1),
        Duration::from_secs(config.timeout_seconds),
    );

    (
        NotificationDispatcher {
            sender: Some(sender),
            endpoints,
        },
        Some(runner),
    )
}
