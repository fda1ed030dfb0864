//! Site handlers.

use axum::Json;
use axum::extract::{Path, State};

use reliefhub_core::types::SiteId;

use crate::dto::request::SiteFlagsDto;
use crate::dto::response::{ApiResponse, SiteResponse};
use crate::error::ApiError;
use crate::extractors::ValidatedJson;
use crate::state::AppState;

/// PUT /api/sites/{siteId}/flags
pub async fn set_flags(
    State(state): State<AppState>,
    Path(site_id): Path<SiteId>,
    ValidatedJson(req): ValidatedJson<SiteFlagsDto>,
) -> Result<Json<ApiResponse<SiteResponse>>, ApiError> {
    let site = state.site_service.set_flags(site_id, req.into()).await?;
    Ok(Json(ApiResponse::ok(site.into())))
}
