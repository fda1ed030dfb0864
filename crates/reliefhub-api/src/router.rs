//! Route definitions for the ReliefHub HTTP API.
//!
//! Automation webhooks live under `/webhook` and `/import` behind the
//! shared-secret check. Confirmation links are served only when a secret is
//! configured. Public tracking is under `/delivery` and the site inventory
//! API under `/api`.

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{delete, get, post, put},
};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
///
/// Receives the fully-constructed `AppState` and threads it through
/// every route via `.with_state(state)`.
pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.server.body_limit_bytes;

    let webhook_routes = Router::new()
        .merge(webhook_routes())
        .merge(import_routes())
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::webhook_secret::require_webhook_secret,
        ));

    let confirmation_routes = confirmation_routes().route_layer(
        axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::webhook_secret::require_configured_secret,
        ),
    );

    let api_routes = Router::new()
        .merge(site_routes())
        .merge(item_routes())
        .merge(health_routes());

    let cors = middleware::cors::build_cors_layer(&state.config.server);

    Router::new()
        .merge(webhook_routes)
        .merge(confirmation_routes)
        .merge(tracking_routes())
        .nest("/api", api_routes)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(axum_middleware::from_fn(
            middleware::logging::request_logging,
        ))
        .with_state(state)
}

/// Upstream scheduling tool webhooks
fn webhook_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/webhook/add-supplies-to-delivery",
            post(handlers::webhook::add_supplies_to_delivery),
        )
        .route(
            "/webhook/update-delivery",
            post(handlers::webhook::update_delivery),
        )
        .route(
            "/webhook/delivery/{delivery_id}",
            delete(handlers::webhook::delete_delivery),
        )
}

/// Upstream data imports
fn import_routes() -> Router<AppState> {
    Router::new().route(
        "/import/update/inventory-item",
        post(handlers::webhook::import_inventory_item),
    )
}

/// Per-role confirmation links for the scheduling tool
fn confirmation_routes() -> Router<AppState> {
    Router::new().route(
        "/webhook/confirm-link/{public_url_key}/{role}",
        get(handlers::delivery::confirm_link),
    )
}

/// Public delivery tracking, keyed by the unguessable public URL key
fn tracking_routes() -> Router<AppState> {
    Router::new().route(
        "/delivery/{public_url_key}",
        get(handlers::delivery::get_delivery),
    )
}

/// Per-site deliveries, inventory, and flags
fn site_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/sites/{site_id}/deliveries",
            get(handlers::delivery::site_deliveries),
        )
        .route(
            "/sites/{site_id}/inventory",
            put(handlers::inventory::set_inventory),
        )
        .route(
            "/sites/{site_id}/inventory/{item_name}",
            delete(handlers::inventory::deactivate_inventory),
        )
        .route("/sites/{site_id}/flags", put(handlers::site::set_flags))
}

/// Catalogue
fn item_routes() -> Router<AppState> {
    Router::new().route("/items", post(handlers::inventory::add_item))
}

/// Liveness
fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}
