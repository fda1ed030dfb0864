//! Delivery records, their status vocabulary, and confirmation slots.

pub mod confirmation;
pub mod model;
pub mod status;

pub use confirmation::{ConfirmRole, DeliveryConfirmation};
pub use model::{Delivery, DeliveryUpsert};
pub use status::{DeliveryStatus, is_complete};
