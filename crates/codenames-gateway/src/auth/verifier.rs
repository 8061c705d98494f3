//! Identity verification
//!
//! The gateway never authenticates members itself. It only checks a token
//! issued elsewhere and reads back who the bearer is.

use axum::extract::Query;
use axum::http::{header, request::Parts};
use codenames_common::{AppResult, Identity, JwtService};
use serde::Deserialize;

/// Turns a bearer token into a verified identity
pub trait IdentityVerifier: Send + Sync {
    fn verify(&self, token: &str) -> AppResult<Identity>;
}

/// Verifies HS256 tokens signed with the shared secret
#[derive(Clone)]
pub struct JwtIdentityVerifier {
    jwt: JwtService,
}

impl JwtIdentityVerifier {
    pub fn new(jwt: JwtService) -> Self {
        Self { jwt }
    }
}

impl IdentityVerifier for JwtIdentityVerifier {
    fn verify(&self, token: &str) -> AppResult<Identity> {
        self.jwt.verify(token)
    }
}

impl std::fmt::Debug for JwtIdentityVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtIdentityVerifier").finish_non_exhaustive()
    }
}

#[derive(Debug, Deserialize)]
struct TokenQuery {
    token: Option<String>,
}

/// Read the bearer token from `Authorization`, falling back to `?token=`.
///
/// Browsers cannot set headers on a WebSocket upgrade, hence the query
/// parameter.
pub fn bearer_token(parts: &Parts) -> Option<String> {
    let from_header = parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty());
    if let Some(token) = from_header {
        return Some(token.to_string());
    }

    Query::<TokenQuery>::try_from_uri(&parts.uri)
        .ok()
        .and_then(|Query(query)| query.token)
        .filter(|token| !token.is_empty())
}
