//! In-process state store.
//!
//! Evaluates paths directly against `serde_json::Value` documents. Used for
//! single-node development and by tests.

use async_trait::async_trait;
use codenames_core::{JsonPath, SessionId};
use dashmap::DashMap;
use serde_json::Value;

use super::{StateStore, StoreError, StoreResult};

#[derive(Debug, Default)]
pub struct MemoryStateStore {
    documents: DashMap<SessionId, Value>,
}

impl MemoryStateStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of a stored document
    pub fn document(&self, session_id: SessionId) -> Option<Value> {
        self.documents.get(&session_id).map(|doc| doc.clone())
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

#[async_trait]
impl StateStore for MemoryStateStore {
    async fn read_path(&self, session_id: SessionId, path: &JsonPath) -> StoreResult<Vec<Value>> {
        let doc = self
            .documents
            .get(&session_id)
            .ok_or_else(|| StoreError::not_found(session_id))?;
        Ok(path.select(&doc).into_iter().cloned().collect())
    }

    async fn append_to_array(
        &self,
        session_id: SessionId,
        path: &JsonPath,
        value: Value,
    ) -> StoreResult<()> {
        let mut doc = self
            .documents
            .get_mut(&session_id)
            .ok_or_else(|| StoreError::not_found(session_id))?;
        if path.append(&mut doc, value) {
            Ok(())
        } else {
            Err(StoreError::not_an_array(session_id, path))
        }
    }

    async fn delete_path(&self, session_id: SessionId, path: &JsonPath) -> StoreResult<usize> {
        if path.is_root() {
            return Ok(usize::from(self.documents.remove(&session_id).is_some()));
        }
        Ok(self
            .documents
            .get_mut(&session_id)
            .map_or(0, |mut doc| path.delete(&mut doc)))
    }

    async fn write_document(&self, session_id: SessionId, document: &Value) -> StoreResult<()> {
        self.documents.insert(session_id, document.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    async fn seeded() -> (MemoryStateStore, SessionId) {
        let store = MemoryStateStore::new();
        let id = SessionId::new();
        store
            .write_document(
                id,
                &json!({"spectators": [], "teams": {"red": {"players": []}}, "board": {}}),
            )
            .await
            .unwrap();
        (store, id)
    }

    #[tokio::test]
    async fn test_read_missing_document() {
        let store = MemoryStateStore::new();
        let err = store
            .read_path(SessionId::new(), &JsonPath::root())
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_append_then_filter() {
        let (store, id) = seeded().await;
        let path = JsonPath::at("spectators");

        store
            .append_to_array(id, &path, json!({"id": "m1", "name": "Ann"}))
            .await
            .unwrap();

        let hits = store
            .read_path(id, &path.clone().where_eq("id", "m1"))
            .await
            .unwrap();
        assert_eq!(hits, vec![json!({"id": "m1", "name": "Ann"})]);

        let misses = store.read_path(id, &path.where_eq("id", "m2")).await.unwrap();
        assert!(misses.is_empty());
    }

    #[tokio::test]
    async fn test_append_rejects_non_array() {
        let (store, id) = seeded().await;

        let err = store
            .append_to_array(id, &JsonPath::at("board"), json!(1))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotAnArray { .. }));

        let err = store
            .append_to_array(SessionId::new(), &JsonPath::at("spectators"), json!(1))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_delete_path() {
        let (store, id) = seeded().await;
        let path = JsonPath::at("spectators");
        store.append_to_array(id, &path, json!({"id": "a"})).await.unwrap();
        store.append_to_array(id, &path, json!({"id": "b"})).await.unwrap();

        let removed = store
            .delete_path(id, &path.clone().where_eq("id", "a"))
            .await
            .unwrap();
        assert_eq!(removed, 1);
        assert_eq!(store.read_path(id, &path).await.unwrap(), vec![json!([{"id": "b"}])]);

        assert_eq!(store.delete_path(SessionId::new(), &path).await.unwrap(), 0);
        assert_eq!(store.delete_path(id, &JsonPath::root()).await.unwrap(), 1);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_write_replaces_document() {
        let (store, id) = seeded().await;
        store.write_document(id, &json!({"spectators": [1]})).await.unwrap();

        assert_eq!(store.document(id), Some(json!({"spectators": [1]})));
        assert_eq!(store.len(), 1);
    }
}
