//! Needs match requests from the upstream scheduling tool.

use std::sync::Arc;

use tracing::{info, warn};

use reliefhub_core::events::{NeedsMatchedPayload, NotificationEvent};
use reliefhub_core::result::AppResult;
use reliefhub_core::types::DeliveryRef;
use reliefhub_database::{InventoryStore, SiteStore};
use reliefhub_worker::NotificationDispatcher;

use super::matcher::{eligible_supply, matched_names};

/// A request to fill a delivery with what one site can give another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchRequest {
    /// Delivery the matched items are for.
    pub delivery_id: DeliveryRef,
    /// External references of the supplying site; only the first is used.
    pub from_site_wss_ids: Vec<i64>,
    /// External references of the receiving site; only the first is used.
    pub to_site_wss_ids: Vec<i64>,
}

/// Result of a [`MatchRequest`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchOutcome {
    /// One of the site lists was empty.
    SitesNotSynced,
    /// Matched item names, ascending.
    Matched(Vec<String>),
}

impl MatchOutcome {
    /// Plain-text response for the caller.
    pub fn message(&self) -> String {
        match self {
            Self::SitesNotSynced => "No matches, sites are not in WSS".to_string(),
            Self::Matched(items) => format!("Matches: {}", items.len()),
        }
    }
}

/// Computes which items may flow from one site to another.
#[derive(Debug, Clone)]
pub struct NeedsMatchService {
    sites: Arc<dyn SiteStore>,
    inventory: Arc<dyn InventoryStore>,
    dispatcher: NotificationDispatcher,
}

impl NeedsMatchService {
    /// Creates a new needs match service.
    pub fn new(
        sites: Arc<dyn SiteStore>,
        inventory: Arc<dyn InventoryStore>,
        dispatcher: NotificationDispatcher,
    ) -> Self {
        Self {
            sites,
            inventory,
            dispatcher,
        }
    }

    /// Item names the from-site can send that the to-site needs.
    ///
    /// Site references that do not resolve yield an empty match.
    pub async fn compute_match(&self, from_wss_id: i64, to_wss_id: i64) -> AppResult<Vec<String>> {
        let Some(from_site) = self.sites.find_by_wss_id(from_wss_id).await? else {
            warn!(from_wss_id, "Supplying site is not synced, no match");
            return Ok(Vec::new());
        };

        let supply = eligible_supply(
            from_site.site_type,
            &self.inventory.site_inventory(from_site.id).await?,
        );
        if supply.is_empty() {
            return Ok(Vec::new());
        }

        let Some(to_site) = self.sites.find_by_wss_id(to_wss_id).await? else {
            warn!(to_wss_id, "Receiving site is not synced, no match");
            return Ok(Vec::new());
        };
        let demand = self.inventory.site_inventory(to_site.id).await?;

        Ok(matched_names(&supply, &demand))
    }

    /// Compute the match for a delivery and, when anything matched, push
    /// the item list to the configured automation endpoint.
    pub async fn request_match(&self, request: &MatchRequest) -> AppResult<MatchOutcome> {
        let (Some(&from), Some(&to)) = (
            request.from_site_wss_ids.first(),
            request.to_site_wss_ids.first(),
        ) else {
            warn!(
                delivery_id = %request.delivery_id,
                "Match requested for sites that are not in WSS, returning no results"
            );
            return Ok(MatchOutcome::SitesNotSynced);
        };

        let items = self.compute_match(from, to).await?;
        info!(
            delivery_id = %request.delivery_id,
            from_wss_id = from,
            to_wss_id = to,
            matched = items.len(),
            "Computed needs match"
        );

        if !items.is_empty() {
            self.dispatcher
                .notify(NotificationEvent::NeedsMatched(NeedsMatchedPayload {
                    delivery_id: request.delivery_id,
                    item_list: items.clone(),
                }));
        }
        Ok(MatchOutcome::Matched(items))
    }
}
