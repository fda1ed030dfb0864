//! Delivery status vocabulary and the completion predicate.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Status of a delivery.
///
/// Any status may follow any other; only [`is_complete`] is enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeliveryStatus {
    /// The dispatcher is still assembling the delivery.
    #[serde(rename = "Creating Dispatch")]
    CreatingDispatch,
    /// The delivery has been scheduled or is on the road.
    #[serde(rename = "In Progress")]
    InProgress,
    /// The delivery has arrived.
    #[serde(rename = "Delivery Completed")]
    Completed,
}

impl DeliveryStatus {
    /// Whether the status is terminal.
    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Completed)
    }

    /// Return the canonical text that is stored and sent upstream.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CreatingDispatch => "Creating Dispatch",
            Self::InProgress => "In Progress",
            Self::Completed => "Delivery Completed",
        }
    }
}

impl fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for DeliveryStatus {
    type Err = reliefhub_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "creating dispatch" => Ok(Self::CreatingDispatch),
            "in progress" => Ok(Self::InProgress),
            "delivery completed" | "complete" => Ok(Self::Completed),
            _ => Err(reliefhub_core::AppError::validation(format!(
                "Invalid delivery status: '{s}'. Expected one of: Creating Dispatch, In Progress, Delivery Completed"
            ))),
        }
    }
}

/// Completion predicate over stored status text.
///
/// True iff the text case-insensitively equals `"Delivery Completed"` or
/// `"complete"`. Absent text is never complete.
pub fn is_complete(status: Option<&str>) -> bool {
    status.is_some_and(|s| {
        s.eq_ignore_ascii_case("Delivery Completed") || s.eq_ignore_ascii_case("complete")
    })
}
