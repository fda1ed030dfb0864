//! # reliefhub-service
//!
//! Business logic service layer for ReliefHub. Services operate on the
//! store traits from `reliefhub-database` and hand notifications to the
//! dispatcher from `reliefhub-worker`; none of them waits on a webhook.
//!
//! Services follow constructor injection: all dependencies are provided
//! at construction time via `Arc` references.

pub mod delivery;
pub mod inventory;
pub mod matching;
pub mod site;

#[cfg(test)]
mod test_support;

pub use delivery::{ConfirmationService, DeliveryService};
pub use inventory::{ImportItem, InventoryService, InventoryUpdate};
pub use matching::{MatchOutcome, MatchRequest, NeedsMatchService};
pub use site::{SiteFlags, SiteService};
