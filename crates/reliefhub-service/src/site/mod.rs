//! Site flag management.

pub mod service;

pub use service::{SiteFlags, SiteService};
