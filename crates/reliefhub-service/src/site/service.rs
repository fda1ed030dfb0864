use std::sync::Arc;

use tracing::info;

use reliefhub_core::error::AppError;
use reliefhub_core::events::{NotificationEvent, SiteUpsertedPayload};
use reliefhub_core::result::AppResult;
use reliefhub_core::types::SiteId;
use reliefhub_database::SiteStore;
use reliefhub_entity::site::Site;
use reliefhub_worker::NotificationDispatcher;

/// Flags to change on a site; `None` leaves a flag as it is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SiteFlags {
    pub active: Option<bool>,
    pub accepting_donations: Option<bool>,
}

/// Site flag management.
#[derive(Debug, Clone)]
pub struct SiteService {
    sites: Arc<dyn SiteStore>,
    dispatcher: NotificationDispatcher,
}

impl SiteService {
    /// Creates a new site service.
    pub fn new(sites: Arc<dyn SiteStore>, dispatcher: NotificationDispatcher) -> Self {
        Self { sites, dispatcher }
    }

    /// Update a site's flags and announce the new state.
    pub async fn set_flags(&self, site_id: SiteId, flags: SiteFlags) -> AppResult<Site> {
        let site = self
            .sites
            .update_flags(site_id, flags.active, flags.accepting_donations)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Site not found: {site_id}")))?;

        info!(
            site_id = %site.id,
            active = site.active,
            accepting_donations = site.accepting_donations,
            "Site flags updated"
        );

        self.dispatcher
            .notify(NotificationEvent::SiteUpserted(SiteUpsertedPayload {
                site_id: site.id,
                site_wss_id: site.wss_id,
                site_type: site
                    .site_type
                    .map(|role| role.as_str().to_string())
                    .unwrap_or_default(),
                active: site.active,
                accepting_donations: site.accepting_donations,
            }));
        Ok(site)
    }
}
