//! In-memory dedup store for testing and offline mode

use async_trait::async_trait;
use komori_domain::{DedupStore, PostId, StorageError};
use std::collections::HashSet;
use std::sync::RwLock;

/// In-memory dedup store implementation
pub struct InMemoryDedupStore {
    ids: RwLock<HashSet<PostId>>,
}

impl InMemoryDedupStore {
    pub fn new() -> Self {
        Self {
            ids: RwLock::new(HashSet::new()),
        }
    }

    /// Pre-populate with already-handled ids
    pub fn with_ids<I>(ids: I) -> Self
    where
        I: IntoIterator<Item = PostId>,
    {
        Self {
            ids: RwLock::new(ids.into_iter().collect()),
        }
    }
}

impl Default for InMemoryDedupStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DedupStore for InMemoryDedupStore {
    async fn ensure_schema(&self) -> Result<(), StorageError> {
        Ok(())
    }

    async fn load_all(&self) -> Result<HashSet<PostId>, StorageError> {
        let ids = self
            .ids
            .read()
            .map_err(|e| StorageError::Database(e.to_string()))?;
        Ok(ids.clone())
    }

    async fn record(&self, id: &PostId) -> Result<(), StorageError> {
        let mut ids = self
            .ids
            .write()
            .map_err(|e| StorageError::Database(e.to_string()))?;
        ids.insert(id.clone());
        Ok(())
    }

    async fn close(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_record_then_load_roundtrip() {
        let store = InMemoryDedupStore::new();

        store.record(&PostId::from("post123")).await.unwrap();

        let ids = store.load_all().await.unwrap();
        assert!(ids.contains(&PostId::from("post123")));
    }

    #[tokio::test]
    async fn test_empty_store_loads_nothing() {
        let store = InMemoryDedupStore::default();
        assert!(store.load_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_seeded_ids_are_loaded() {
        let store = InMemoryDedupStore::with_ids([PostId::from("a"), PostId::from("b")]);

        let ids = store.load_all().await.unwrap();
        assert_eq!(ids.len(), 2);
    }
}
