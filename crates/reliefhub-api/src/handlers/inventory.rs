//! Catalogue and site inventory handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use reliefhub_core::types::SiteId;
use reliefhub_service::InventoryUpdate;

use crate::dto::request::{AddItemDto, InventoryUpdateDto};
use crate::dto::response::{AddItemResponse, ApiResponse};
use crate::error::ApiError;
use crate::extractors::ValidatedJson;
use crate::state::AppState;

/// POST /api/items
pub async fn add_item(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<AddItemDto>,
) -> Result<(StatusCode, Json<ApiResponse<AddItemResponse>>), ApiError> {
    let created = state.inventory_service.add_new_item(&req.item_name).await?;
    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((
        status,
        Json(ApiResponse::ok(AddItemResponse {
            item_name: req.item_name.trim().to_string(),
            created,
        })),
    ))
}

/// PUT /api/sites/{siteId}/inventory
pub async fn set_inventory(
    State(state): State<AppState>,
    Path(site_id): Path<SiteId>,
    ValidatedJson(req): ValidatedJson<InventoryUpdateDto>,
) -> Result<StatusCode, ApiError> {
    let update = InventoryUpdate::try_from(req)?;
    state
        .inventory_service
        .set_item_status(site_id, update)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/sites/{siteId}/inventory/{itemName}
pub async fn deactivate_inventory(
    State(state): State<AppState>,
    Path((site_id, item_name)): Path<(SiteId, String)>,
) -> Result<StatusCode, ApiError> {
    state
        .inventory_service
        .deactivate_item(site_id, &item_name)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
