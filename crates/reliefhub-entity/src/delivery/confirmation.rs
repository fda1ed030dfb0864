//! Per-role delivery confirmations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;

/// A party that confirms a delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "confirm_role", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ConfirmRole {
    /// The site the goods leave from.
    PickupSite,
    /// The site the goods arrive at.
    DropoffSite,
    /// The driver carrying the goods.
    Driver,
}

impl ConfirmRole {
    /// All roles; every delivery carries one confirmation slot per role.
    pub const ALL: [ConfirmRole; 3] = [Self::PickupSite, Self::DropoffSite, Self::Driver];

    /// Return the role as a snake_case string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PickupSite => "pickup_site",
            Self::DropoffSite => "dropoff_site",
            Self::Driver => "driver",
        }
    }
}

impl fmt::Display for ConfirmRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ConfirmRole {
    type Err = reliefhub_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "pickup_site" | "pickup" => Ok(Self::PickupSite),
            "dropoff_site" | "dropoff" | "drop_off" => Ok(Self::DropoffSite),
            "driver" => Ok(Self::Driver),
            _ => Err(reliefhub_core::AppError::validation(format!(
                "Invalid confirmation role: '{s}'. Expected one of: pickup_site, dropoff_site, driver"
            ))),
        }
    }
}

/// The confirmation slot for one role on one delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryConfirmation {
    /// Which party this slot belongs to.
    pub role: ConfirmRole,
    /// The code embedded in the party's link. Generated once, never rotated.
    #[serde(skip_serializing)]
    pub code: String,
    /// Whether the party has confirmed.
    pub confirmed: bool,
    /// When the party confirmed.
    pub date_confirmed: Option<DateTime<Utc>>,
}
