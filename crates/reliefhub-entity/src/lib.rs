//! # reliefhub-entity
//!
//! Domain entity models for ReliefHub. Every struct in this crate
//! represents a database table row or a domain value object. Status and
//! role vocabularies are closed enums with explicit text mappings so that
//! unrecognized values are rejected at the boundary.

pub mod delivery;
pub mod inventory;
pub mod site;
