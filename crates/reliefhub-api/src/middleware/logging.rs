//! Request logging middleware.
//!
//! Logs the route template rather than the raw path: tracking paths carry
//! the public URL key, which grants access to a delivery.

use std::time::Instant;

use axum::extract::{MatchedPath, Request};
use axum::middleware::Next;
use axum::response::Response;
use tracing::{error, info, warn};

/// Which caller a route serves.
fn surface(route: &str) -> &'static str {
    if route.starts_with("/webhook") || route.starts_with("/import") {
        "automation"
    } else if route.starts_with("/delivery") {
        "tracking"
    } else if route.starts_with("/api") {
        "api"
    } else {
        "other"
    }
}

/// Logs method, route, surface, status, and duration.
///
/// 5xx responses log at error, 4xx at warn.
pub async fn request_logging(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());
    let start = Instant::now();

    let response = next.run(request).await;

    let status = response.status().as_u16();
    let duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
    let surface = surface(&route);

    if response.status().is_server_error() {
        error!(%method, %route, surface, status, duration_ms, "HTTP request failed");
    } else if response.status().is_client_error() {
        warn!(%method, %route, surface, status, duration_ms, "HTTP request rejected");
    } else {
        info!(%method, %route, surface, status, duration_ms, "HTTP request");
    }

    response
}
