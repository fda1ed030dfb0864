//! `ValidatedJson` extractor: deserializes a JSON body and runs `validator` rules.

use axum::Json;
use axum::extract::{FromRequest, Request};
use serde::de::DeserializeOwned;
use validator::Validate;

use reliefhub_core::error::AppError;

use crate::error::ApiError;

/// A JSON body that passed its validation rules.
///
/// Malformed bodies and failed rules are both rejected with 400 before the
/// handler runs.
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await.map_err(|rejection| {
            tracing::warn!(error = %rejection.body_text(), "Rejected request body");
            ApiError(AppError::validation(rejection.body_text()))
        })?;
        value.validate()?;
        Ok(Self(value))
    }
}
