//! Outbound notification dispatch for ReliefHub.
//!
//! This crate provides:
//! - A [`NotificationDispatcher`] that callers hand events to without waiting
//! - A [`NotificationRunner`] that drains the bounded queue with a fixed
//!   number of concurrent POSTs, each under a timeout
//! - The HTTP [`WebhookTransport`] used to deliver payloads

pub mod dispatcher;
pub mod runner;
#[cfg(any(test, feature = "test-util"))]
pub mod testing;
pub mod transport;

pub use dispatcher::{NotificationDispatcher, notification_channel};
pub use runner::NotificationRunner;
pub use transport::{HttpTransport, TransportError, WebhookTransport};
