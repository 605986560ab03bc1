//! Request identity extraction.
//!
//! The session layer lives upstream of this service; it forwards the
//! authenticated user as `x-user-id` / `x-user-role` headers. The
//! extractor turns those into a typed [`Actor`] exactly once per
//! request, and handlers narrow it to the capability they need.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use common::UserId;
use domain::{Actor, Role};

use crate::error::ApiError;

/// The authenticated caller of a request.
pub struct Identity(pub Actor);

impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = |name: &str| {
            parts
                .headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .ok_or_else(|| ApiError::Unauthorized(format!("missing {name} header")))
        };

        let id = header("x-user-id")?
            .parse::<UserId>()
            .map_err(|e| ApiError::Unauthorized(e.to_string()))?;
        let role = header("x-user-role")?
            .parse::<Role>()
            .map_err(ApiError::Unauthorized)?;

        Ok(Identity(Actor::new(id, role)))
    }
}
