//! Delivery tracking handlers.

use std::str::FromStr;

use axum::Json;
use axum::extract::{Path, State};

use reliefhub_core::types::SiteId;
use reliefhub_entity::delivery::{ConfirmRole, Delivery};

use crate::dto::response::{ApiResponse, ConfirmLinkResponse};
use crate::error::ApiError;
use crate::state::AppState;

/// GET /delivery/{publicUrlKey}
pub async fn get_delivery(
    State(state): State<AppState>,
    Path(public_url_key): Path<String>,
) -> Result<Json<ApiResponse<Delivery>>, ApiError> {
    let delivery = state
        .delivery_service
        .fetch_by_public_key(&public_url_key)
        .await?;
    Ok(Json(ApiResponse::ok(delivery)))
}

/// GET /webhook/confirm-link/{publicUrlKey}/{role}
pub async fn confirm_link(
    State(state): State<AppState>,
    Path((public_url_key, role)): Path<(String, String)>,
) -> Result<Json<ApiResponse<ConfirmLinkResponse>>, ApiError> {
    let role = ConfirmRole::from_str(&role)?;
    let link = state
        .delivery_service
        .confirmation_link(&public_url_key, role)
        .await?;
    Ok(Json(ApiResponse::ok(ConfirmLinkResponse { role, link })))
}

/// GET /api/sites/{siteId}/deliveries
pub async fn site_deliveries(
    State(state): State<AppState>,
    Path(site_id): Path<SiteId>,
) -> Result<Json<ApiResponse<Vec<Delivery>>>, ApiError> {
    let deliveries = state.delivery_service.fetch_by_site(site_id).await?;
    Ok(Json(ApiResponse::ok(deliveries)))
}
