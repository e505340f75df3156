//! `Caller` extractor: reads the optional bearer token and builds the
//! request context.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use medianest_core::error::AppError;
use medianest_core::types::Principal;
use medianest_service::RequestContext;

use crate::error::ApiError;
use crate::state::AppState;

/// The caller of the current request.
///
/// A missing `Authorization` header yields an anonymous principal; whether
/// that principal may mutate folders is decided by the service.
#[derive(Debug, Clone)]
pub struct Caller(pub RequestContext);

impl Caller {
    /// Returns the inner `RequestContext`.
    pub fn context(&self) -> &RequestContext {
        &self.0
    }
}

impl std::ops::Deref for Caller {
    type Target = RequestContext;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequestParts<AppState> for Caller {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let principal = match parts.headers.get(AUTHORIZATION) {
            None => Principal::Anonymous,
            Some(value) => {
                let header = value
                    .to_str()
                    .map_err(|_| AppError::validation("Authorization header is not valid text"))?;
                principal_from_header(header)?
            }
        };
        Ok(Caller(RequestContext::new(principal)))
    }
}

/// Parse an `Authorization` header value.
pub fn principal_from_header(header: &str) -> Result<Principal, AppError> {
    let token = header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::validation("Invalid Authorization header format"))?
        .trim();
    if token.is_empty() {
        return Err(AppError::validation("Empty bearer token"));
    }
    Ok(Principal::Bearer(token.to_string()))
}
