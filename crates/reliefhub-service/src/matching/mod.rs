//! Needs matching between a supplying and a receiving site.

pub mod matcher;
pub mod service;

pub use matcher::{eligible_supply, matched_names};
pub use service::{MatchOutcome, MatchRequest, NeedsMatchService};
