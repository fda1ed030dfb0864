//! Catalogue and per-site inventory management.

pub mod service;

pub use service::{ImportItem, InventoryService, InventoryUpdate};
