//! Member admission
//!
//! Identity is verified before the WebSocket upgrade; unauthenticated
//! requests never reach a session.

mod extractor;
mod verifier;

pub use extractor::Authenticated;
pub use verifier::{bearer_token, IdentityVerifier, JwtIdentityVerifier};
