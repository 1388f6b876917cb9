use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use schoolgate_core::{GateError, Principal};

use crate::http::error::ApiError;

/// Principal attached by the authorization gateway.
/// Rejects with 401 when the request did not pass through an authorized decision.
pub struct RequirePrincipal(pub Principal);

#[async_trait]
impl<S> FromRequestParts<S> for RequirePrincipal
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Principal>()
            .cloned()
            .map(RequirePrincipal)
            .ok_or(ApiError(GateError::Unauthenticated))
    }
}
