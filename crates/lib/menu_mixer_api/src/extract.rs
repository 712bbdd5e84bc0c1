//! Request extractors.

use axum::body::Bytes;
use axum::extract::{FromRequest, Request};
use serde::de::DeserializeOwned;

use crate::error::AppError;

/// JSON body extractor whose rejection is an [`AppError`].
///
/// The `Content-Type` header is not required. A body that is not valid JSON
/// for `T` is an internal failure (500); missing required values are checked
/// by the handlers and reported as validation errors (400).
#[derive(Debug)]
pub struct AppJson<T>(pub T);

impl<T, S> FromRequest<S> for AppJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| AppError::Internal(format!("unreadable request body: {e}")))?;
        let value = serde_json::from_slice(&bytes)
            .map_err(|e| AppError::Internal(format!("malformed request body: {e}")))?;
        Ok(AppJson(value))
    }
}
