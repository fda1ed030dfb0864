//! Route handlers organized by domain.

pub mod delivery;
pub mod health;
pub mod inventory;
pub mod site;
pub mod webhook;
