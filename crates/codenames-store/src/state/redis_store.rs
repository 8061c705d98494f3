//! RedisJSON-backed state store.
//!
//! Uses `JSON.GET`, `JSON.ARRAPPEND`, `JSON.DEL` and `JSON.SET` with
//! `$`-style paths, which always reply with one entry per match.

use async_trait::async_trait;
use codenames_core::{JsonPath, SessionId};
use serde_json::Value;

use super::{StateStore, StoreError, StoreResult};
use crate::pool::SharedRedisPool;

#[derive(Debug, Clone)]
pub struct RedisStateStore {
    pool: SharedRedisPool,
    ttl_seconds: Option<u64>,
}

impl RedisStateStore {
    pub fn new(pool: SharedRedisPool) -> Self {
        Self {
            pool,
            ttl_seconds: None,
        }
    }

    /// Expire documents `ttl_seconds` after they are written
    #[must_use]
    pub fn with_ttl(mut self, ttl_seconds: Option<u64>) -> Self {
        self.ttl_seconds = ttl_seconds;
        self
    }
}

/// Decode a `JSON.GET` reply. `nil` means the key does not exist.
fn decode_matches(session_id: SessionId, reply: Option<String>) -> StoreResult<Vec<Value>> {
    let raw = reply.ok_or_else(|| StoreError::not_found(session_id))?;
    match serde_json::from_str(&raw)? {
        Value::Array(matches) => Ok(matches),
        Value::Null => Ok(Vec::new()),
        single => Ok(vec![single]),
    }
}

#[async_trait]
impl StateStore for RedisStateStore {
    async fn read_path(&self, session_id: SessionId, path: &JsonPath) -> StoreResult<Vec<Value>> {
        let mut conn = self.pool.get().await?;
        let reply: Option<String> = redis::cmd("JSON.GET")
            .arg(session_id.document_key())
            .arg(path.to_string())
            .query_async(&mut conn)
            .await?;

        tracing::trace!(session_id = %session_id, path = %path, "JSON.GET");
        decode_matches(session_id, reply)
    }

    async fn append_to_array(
        &self,
        session_id: SessionId,
        path: &JsonPath,
        value: Value,
    ) -> StoreResult<()> {
        let key = session_id.document_key();
        let mut conn = self.pool.get().await?;

        let exists: bool = redis::cmd("EXISTS")
            .arg(&key)
            .query_async(&mut conn)
            .await?;
        if !exists {
            return Err(StoreError::not_found(session_id));
        }

        // One length per match; nil where the match is not an array
        let lengths: Vec<Option<i64>> = redis::cmd("JSON.ARRAPPEND")
            .arg(&key)
            .arg(path.to_string())
            .arg(serde_json::to_string(&value)?)
            .query_async(&mut conn)
            .await?;

        if lengths.iter().any(Option::is_some) {
            tracing::debug!(session_id = %session_id, path = %path, "Appended to array");
            Ok(())
        } else {
            Err(StoreError::not_an_array(session_id, path))
        }
    }

    async fn delete_path(&self, session_id: SessionId, path: &JsonPath) -> StoreResult<usize> {
        let mut conn = self.pool.get().await?;
        let removed: usize = redis::cmd("JSON.DEL")
            .arg(session_id.document_key())
            .arg(path.to_string())
            .query_async(&mut conn)
            .await?;
        Ok(removed)
    }

    async fn write_document(&self, session_id: SessionId, document: &Value) -> StoreResult<()> {
        let key = session_id.document_key();
        let mut conn = self.pool.get().await?;

        let mut pipe = redis::pipe();
        pipe.atomic()
            .cmd("JSON.SET")
            .arg(&key)
            .arg(JsonPath::root().to_string())
            .arg(serde_json::to_string(document)?)
            .ignore();
        if let Some(ttl) = self.ttl_seconds {
            pipe.cmd("EXPIRE").arg(&key).arg(ttl).ignore();
        }
        pipe.query_async::<()>(&mut conn).await?;

        tracing::debug!(session_id = %session_id, ttl = ?self.ttl_seconds, "Game state written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_missing_key() {
        let err = decode_matches(SessionId::new(), None).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_decode_empty_matches() {
        let id = SessionId::new();
        assert!(decode_matches(id, Some("[]".to_string())).unwrap().is_empty());
        assert!(decode_matches(id, Some("null".to_string())).unwrap().is_empty());
    }

    #[test]
    fn test_decode_matches() {
        let reply = r#"[{"id":"a","name":"Ann"}]"#.to_string();
        let matches = decode_matches(SessionId::new(), Some(reply)).unwrap();
        assert_eq!(matches, vec![json!({"id": "a", "name": "Ann"})]);
    }

    #[test]
    fn test_decode_garbage() {
        let err = decode_matches(SessionId::new(), Some("{not json".to_string())).unwrap_err();
        assert!(matches!(err, StoreError::Serialization(_)));
    }
}
