//! Site role enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::inventory::ItemStatus;

/// The role a site plays in the supply network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "site_type")]
pub enum SiteRole {
    /// Collects donations and hands them out to other sites.
    #[sqlx(rename = "Supply Hub")]
    #[serde(rename = "Supply Hub")]
    SupplyHub,
    /// Serves the public directly; only surplus leaves it.
    #[sqlx(rename = "Distribution Center")]
    #[serde(rename = "Distribution Center")]
    DistributionCenter,
}

impl SiteRole {
    /// Whether an item with `status` at a site of this role may be sent elsewhere.
    pub fn supplies(&self, status: ItemStatus) -> bool {
        match self {
            Self::SupplyHub => matches!(status, ItemStatus::Available | ItemStatus::Oversupply),
            Self::DistributionCenter => status == ItemStatus::Oversupply,
        }
    }

    /// Return the role in its upstream spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SupplyHub => "Supply Hub",
            Self::DistributionCenter => "Distribution Center",
        }
    }
}

impl fmt::Display for SiteRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SiteRole {
    type Err = reliefhub_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', " ").as_str() {
            "supply hub" => Ok(Self::SupplyHub),
            "distribution center" => Ok(Self::DistributionCenter),
            _ => Err(reliefhub_core::AppError::validation(format!(
                "Invalid site type: '{s}'. Expected one of: Supply Hub, Distribution Center"
            ))),
        }
    }
}
