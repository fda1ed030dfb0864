//! # reliefhub-api
//!
//! HTTP API layer for ReliefHub built on Axum.
//!
//! Provides the inbound webhook endpoints used by the upstream scheduling
//! tool, the public delivery tracking endpoints, the site inventory API,
//! middleware (webhook secret, request logging, CORS), DTOs, and error
//! mapping.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{build_app, run_server};
pub use error::ApiError;
pub use state::AppState;
