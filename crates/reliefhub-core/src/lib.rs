//! # reliefhub-core
//!
//! Core crate for ReliefHub. Contains configuration schemas, typed
//! identifiers, notification events, and the unified error system.
//!
//! This crate has **no** internal dependencies on other ReliefHub crates.

pub mod config;
pub mod error;
pub mod events;
pub mod result;
pub mod types;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
