/**
 * Request Validation Extractors
 *
 * Axum's own `Json` and `Query` rejections answer with plain-text 4xx
 * responses. These wrappers turn every rejection into a `ValidationError`
 * so malformed requests get the same envelope as everything else.
 */

use axum::{
    extract::{FromRequest, FromRequestParts, Query, Request},
    http::request::Parts,
    Json,
};
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::backend::error::BackendError;
use crate::backend::server::config::PaginationConfig;
use crate::shared::messaging::PageQuery;

/// JSON body extractor whose rejection is a `ValidationError`
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = BackendError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| BackendError::validation(rejection.body_text()))?;
        Ok(Self(value))
    }
}

/// Query string extractor whose rejection is a `ValidationError`
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for ValidQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = BackendError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| BackendError::validation(rejection.body_text()))?;
        Ok(Self(value))
    }
}

/// Parse a path segment as a UUID, naming the field on failure
pub fn parse_uuid(field: &str, raw: &str) -> Result<Uuid, BackendError> {
    Uuid::parse_str(raw).map_err(|_| BackendError::validation(format!("Invalid {}", field)))
}

/// Resolve `?page&page_size` against the configured defaults and bounds.
///
/// Pages are 1-based. Zero values are rejected; a page size above the
/// configured maximum is rejected rather than clamped.
pub fn resolve_page(query: PageQuery, limits: &PaginationConfig) -> Result<(u32, u32), BackendError> {
    let page = query.page.unwrap_or(1);
    let page_size = query.page_size.unwrap_or(limits.default_page_size);

    if page == 0 {
        return Err(BackendError::validation("page must be at least 1"));
    }
    if page_size == 0 || page_size > limits.max_page_size {
        return Err(BackendError::validation(format!(
            "page_size must be between 1 and {}",
            limits.max_page_size
        )));
    }
    Ok((page, page_size))
}
