//! Inbound webhooks from the upstream scheduling tool.
//!
//! The match webhook answers in plain text, which the automation caller logs.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use tracing::info;

use reliefhub_core::types::DeliveryRef;
use reliefhub_entity::delivery::Delivery;

use crate::dto::request::{DeliveryUpdateDto, ImportItemDto, MatchRequestDto};
use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::ValidatedJson;
use crate::state::AppState;

/// POST /webhook/add-supplies-to-delivery
pub async fn add_supplies_to_delivery(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<MatchRequestDto>,
) -> Result<String, ApiError> {
    info!(
        delivery_id = req.delivery_id,
        from = ?req.from_site_wss_id,
        to = ?req.to_site_wss_id,
        "Received needs match request"
    );
    let outcome = state.match_service.request_match(&req.into()).await?;
    Ok(outcome.message())
}

/// POST /webhook/update-delivery
pub async fn update_delivery(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<DeliveryUpdateDto>,
) -> Result<Json<ApiResponse<Delivery>>, ApiError> {
    info!(delivery_id = req.delivery_id, "Received delivery update");
    let delivery = state.delivery_service.upsert(req.into_upsert()?).await?;
    Ok(Json(ApiResponse::ok(delivery)))
}

/// DELETE /webhook/delivery/{deliveryId}
pub async fn delete_delivery(
    State(state): State<AppState>,
    Path(delivery_ref): Path<DeliveryRef>,
) -> Result<StatusCode, ApiError> {
    state.delivery_service.delete(delivery_ref).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /import/update/inventory-item
pub async fn import_inventory_item(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<ImportItemDto>,
) -> Result<StatusCode, ApiError> {
    state.inventory_service.import_item(req.into()).await?;
    Ok(StatusCode::OK)
}
