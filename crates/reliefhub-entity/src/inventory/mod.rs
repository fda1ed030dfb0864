//! Items and per-site inventory entries.

pub mod model;
pub mod status;

pub use model::{InventoryEntry, Item};
pub use status::ItemStatus;
