//! Authentication extractor
//!
//! Rejects the request with 401 unless it carries a valid identity token.

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use codenames_common::{AppError, Identity};

use super::bearer_token;
use crate::response::ApiError;
use crate::server::GatewayState;

/// Member identity verified from the request's token
#[derive(Debug, Clone)]
pub struct Authenticated(pub Identity);

#[async_trait]
impl<S> FromRequestParts<S> for Authenticated
where
    S: Send + Sync,
    GatewayState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or(AppError::MissingAuth)?;

        let state = GatewayState::from_ref(state);
        let identity = state.verifier().verify(&token).map_err(|e| {
            tracing::warn!(error = %e, "Rejected identity token");
            e
        })?;

        Ok(Self(identity))
    }
}
