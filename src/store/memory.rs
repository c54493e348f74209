//! In-memory key-value store

use std::collections::HashMap;

use bytes::Bytes;
use tokio::sync::RwLock;

use super::error::StoreError;
use super::KvStore;

/// Volatile store backed by a `HashMap`
///
/// Values are `Bytes`, so reads hand out reference-counted views of the
/// last written value without copying.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: RwLock<HashMap<String, Bytes>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently held
    pub async fn len(&self) -> usize {
        self.values.read().await.len()
    }

    /// Check if the store holds no keys
    pub async fn is_empty(&self) -> bool {
        self.values.read().await.is_empty()
    }
}

impl KvStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Bytes>, StoreError> {
        Ok(self.values.read().await.get(key).cloned())
    }

    async fn put(&self, key: &str, value: Bytes) -> Result<(), StoreError> {
        self.values.write().await.insert(key.to_string(), value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_missing() {
        let store = MemoryStore::new();
        assert!(store.get("scores").await.unwrap().is_none());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_put_overwrites() {
        let store = MemoryStore::new();
        store.put("scores", Bytes::from_static(b"{}")).await.unwrap();
        store
            .put("scores", Bytes::from_static(b"{\"a\":1}"))
            .await
            .unwrap();

        let value = store.get("scores").await.unwrap().unwrap();
        assert_eq!(&value[..], b"{\"a\":1}");
        assert_eq!(store.len().await, 1);
    }
}
