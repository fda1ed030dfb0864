//! Item status enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Status of an item at a site.
///
/// `Available` and `Oversupply` describe supply the site can give away;
/// `Needed` and `UrgentlyNeeded` describe demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "item_status")]
pub enum ItemStatus {
    /// The site has the item on hand.
    Available,
    /// The site is asking for the item.
    Needed,
    /// The site is asking for the item with priority.
    #[sqlx(rename = "Urgently Needed")]
    #[serde(rename = "Urgently Needed")]
    UrgentlyNeeded,
    /// The site has more than it can use.
    Oversupply,
}

impl ItemStatus {
    /// All statuses, in display order.
    pub const ALL: [ItemStatus; 4] = [
        Self::Available,
        Self::Needed,
        Self::UrgentlyNeeded,
        Self::Oversupply,
    ];

    /// Whether the status represents demand at the site.
    pub fn is_need(&self) -> bool {
        matches!(self, Self::Needed | Self::UrgentlyNeeded)
    }

    /// Return the status in its upstream spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "Available",
            Self::Needed => "Needed",
            Self::UrgentlyNeeded => "Urgently Needed",
            Self::Oversupply => "Oversupply",
        }
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ItemStatus {
    type Err = reliefhub_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, ' ' | '_' | '-'))
            .collect::<String>()
            .to_lowercase();
        match normalized.as_str() {
            "available" => Ok(Self::Available),
            "needed" => Ok(Self::Needed),
            "urgentlyneeded" => Ok(Self::UrgentlyNeeded),
            "oversupply" => Ok(Self::Oversupply),
            _ => Err(reliefhub_core::AppError::validation(format!(
                "Invalid item status: '{s}'. Expected one of: Available, Needed, Urgently Needed, Oversupply"
            ))),
        }
    }
}
