//! # reliefhub-database
//!
//! Store traits over which the services operate, their PostgreSQL
//! implementations, and a process-local implementation used for
//! development and tests.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod provider;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use memory::MemoryStore;
pub use provider::Stores;
pub use store::{
    DeliveryStore, ImportOutcome, InventoryStore, IssuedCredentials, ItemStore, SiteStore,
    UpsertOutcome,
};
