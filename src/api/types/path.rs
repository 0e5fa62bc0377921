//! Path extractor for document identifiers that rejects with API errors

use axum::{
    extract::{FromRequestParts, Path},
    http::request::Parts,
};

use super::error::ApiError;
use crate::domain::DocumentId;

/// `{id}` path segment parsed as a [`DocumentId`].
///
/// Non-numeric or zero ids become a 400 in the API error format.
#[derive(Debug, Clone, Copy)]
pub struct DocumentIdPath(pub DocumentId);

impl<S> FromRequestParts<S> for DocumentIdPath
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;

        let id = raw.parse::<DocumentId>().map_err(ApiError::from)?;
        Ok(Self(id))
    }
}
