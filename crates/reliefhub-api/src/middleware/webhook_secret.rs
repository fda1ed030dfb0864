//! Shared-secret check for inbound automation webhooks.

use axum::extract::{Request, State};
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;
use tracing::warn;

use reliefhub_core::error::AppError;

use crate::error::ApiError;
use crate::state::AppState;

/// Header carrying the shared secret.
pub const WEBHOOK_SECRET_HEADER: &str = "x-webhook-secret";

/// Rejects requests whose `X-Webhook-Secret` does not match the configured
/// secret. Passes everything through when no secret is configured.
pub async fn require_webhook_secret(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if let Some(expected) = configured_secret(&state) {
        check_secret(expected, &request)?;
    }
    Ok(next.run(request).await)
}

/// Like [`require_webhook_secret`], but closed when no secret is configured.
///
/// Guards routes that hand out confirmation codes.
pub async fn require_configured_secret(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(expected) = configured_secret(&state) else {
        warn!(
            path = %request.uri().path(),
            "Confirmation link requested but no webhook secret is configured"
        );
        return Err(ApiError(AppError::authentication(
            "Webhook secret is not configured",
        )));
    };
    check_secret(expected, &request)?;
    Ok(next.run(request).await)
}

fn configured_secret(state: &AppState) -> Option<&str> {
    state
        .config
        .webhook
        .secret
        .as_deref()
        .filter(|s| !s.is_empty())
}

fn check_secret(expected: &str, request: &Request) -> Result<(), ApiError> {
    let presented = presented_secret(request.headers());
    let valid = presented.is_some_and(|p| secrets_match(p.as_bytes(), expected.as_bytes()));
    if !valid {
        warn!(
            path = %request.uri().path(),
            header_present = presented.is_some(),
            "Invalid webhook secret was attempted"
        );
        return Err(ApiError(AppError::authentication("Invalid webhook secret")));
    }
    Ok(())
}

fn presented_secret(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(WEBHOOK_SECRET_HEADER)
        .and_then(|v| v.to_str().ok())
}

/// Compares in time independent of where the inputs first differ.
fn secrets_match(presented: &[u8], expected: &[u8]) -> bool {
    if presented.len() != expected.len() {
        return false;
    }
    presented
        .iter()
        .zip(expected)
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}
