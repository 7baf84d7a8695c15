use axum::extract::{FromRequest, Request};
use axum::Json;
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::error::ApiError;

/// JSON body extractor that also runs the payload's `Validate` rules
///
/// Rejects with `ApiError::InvalidBody` when the body cannot be decoded into
/// `T` and with `ApiError::Validation` when a field constraint fails, so the
/// handler only ever sees a checked payload.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(payload) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::InvalidBody(rejection.body_text()))?;

        payload.validate()?;

        Ok(ValidatedJson(payload))
    }
}
