//! Site domain entities.

pub mod model;
pub mod role;

pub use model::{Site, SiteDetails};
pub use role::SiteRole;
