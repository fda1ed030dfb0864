//! Delivery lifecycle: upsert, lookup, deletion, and confirmation links.

pub mod confirmation;
pub mod service;

pub use confirmation::ConfirmationService;
pub use service::DeliveryService;
