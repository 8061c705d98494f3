//! Path-addressed access to the per-session game-state document.
//!
//! One JSON document is kept per session under `game:<session_id>`. Callers
//! address parts of it with a [`JsonPath`]; every operation works on the
//! current stored value with no local caching.

mod memory_store;
mod redis_store;

pub use memory_store::MemoryStateStore;
pub use redis_store::RedisStateStore;

use async_trait::async_trait;
use codenames_common::AppError;
use codenames_core::{JsonPath, SessionId};
use serde_json::Value;

use crate::pool::RedisPoolError;

/// Errors raised by state store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Document not found: {0}")]
    NotFound(String),

    #[error("Path {path} does not address an array in {key}")]
    NotAnArray { key: String, path: String },

    #[error(transparent)]
    Pool(#[from] RedisPoolError),

    #[error("Redis command error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    pub(crate) fn not_found(session_id: SessionId) -> Self {
        Self::NotFound(session_id.document_key())
    }

    pub(crate) fn not_an_array(session_id: SessionId, path: &JsonPath) -> Self {
        Self::NotAnArray {
            key: session_id.document_key(),
            path: path.to_string(),
        }
    }

    /// Check if the document itself is missing
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(key) => AppError::NotFound(key),
            other => AppError::Store(other.to_string()),
        }
    }
}

/// Result type for state store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Storage backend for game-state documents
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Every value `path` selects. An empty vector means the path matched
    /// nothing; a missing document is `StoreError::NotFound`.
    async fn read_path(&self, session_id: SessionId, path: &JsonPath) -> StoreResult<Vec<Value>>;

    /// Push `value` onto the array at `path`
    async fn append_to_array(
        &self,
        session_id: SessionId,
        path: &JsonPath,
        value: Value,
    ) -> StoreResult<()>;

    /// Remove every value `path` selects, returning how many were removed
    async fn delete_path(&self, session_id: SessionId, path: &JsonPath) -> StoreResult<usize>;

    /// Replace the whole document
    async fn write_document(&self, session_id: SessionId, document: &Value) -> StoreResult<()>;
}
