//! Store trait, error types and the in-memory backend

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use std::fmt::Debug;

/// Store error types
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("query error: {0}")]
    Query(String),
}

/// Key/value store shared by the queue, the bulk feed updater and any
/// status frontends. Values are JSON on the wire, so every consumer sees
/// the same shapes regardless of backend. (Object safe.)
#[async_trait]
pub trait SharedStore: Send + Sync + Debug {
    /// Backend name for logging
    fn name(&self) -> &str;

    /// Check if the backend is reachable
    async fn is_healthy(&self) -> bool;

    /// Store a JSON value under a key
    async fn set_value(&self, key: &str, value: serde_json::Value) -> Result<(), StoreError>;

    /// Get a JSON value by key
    async fn get_value(&self, key: &str) -> Result<Option<serde_json::Value>, StoreError>;

    /// Delete a value by key, returning whether it existed
    async fn delete(&self, key: &str) -> Result<bool, StoreError>;

    /// Check if a key exists
    async fn exists(&self, key: &str) -> Result<bool, StoreError>;
}

/// Extension trait for typed access
#[async_trait]
pub trait StoreExt {
    async fn set<T: Serialize + Send + Sync>(&self, key: &str, value: &T)
        -> Result<(), StoreError>;
    async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError>;
}

#[async_trait]
impl<S: SharedStore + ?Sized> StoreExt for S {
    async fn set<T: Serialize + Send + Sync>(
        &self,
        key: &str,
        value: &T,
    ) -> Result<(), StoreError> {
        let json =
            serde_json::to_value(value).map_err(|e| StoreError::Serialization(e.to_string()))?;
        self.set_value(key, json).await
    }

    async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        match self.get_value(key).await? {
            Some(json) => {
                let value = serde_json::from_value(json)
                    .map_err(|e| StoreError::Serialization(e.to_string()))?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }
}

/// In-memory store. Single process only; used by tests and by runs that
/// do not share state with anything else.
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: tokio::sync::RwLock<std::collections::HashMap<String, serde_json::Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SharedStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn is_healthy(&self) -> bool {
        true
    }

    async fn set_value(&self, key: &str, value: serde_json::Value) -> Result<(), StoreError> {
        self.data.write().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn get_value(&self, key: &str) -> Result<Option<serde_json::Value>, StoreError> {
        let data = self.data.read().await;
        Ok(data.get(key).cloned())
    }

    async fn delete(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.data.write().await.remove(key).is_some())
    }

    async fn exists(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.data.read().await.contains_key(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct PriceRow {
        price: f64,
        currency: String,
    }

    #[tokio::test]
    async fn memory_store_roundtrip() {
        let store = MemoryStore::new();

        let row = PriceRow {
            price: 12.34,
            currency: "USD".to_string(),
        };

        store.set("prices:test", &row).await.unwrap();

        let back: Option<PriceRow> = store.get("prices:test").await.unwrap();
        assert_eq!(back, Some(row));

        assert!(store.exists("prices:test").await.unwrap());
        assert!(!store.exists("prices:other").await.unwrap());

        assert!(store.delete("prices:test").await.unwrap());
        assert!(!store.exists("prices:test").await.unwrap());
        assert!(!store.delete("prices:test").await.unwrap());
    }

    #[tokio::test]
    async fn typed_get_rejects_wrong_shape() {
        let store = MemoryStore::new();
        store
            .set_value("prices:test", serde_json::json!("not a row"))
            .await
            .unwrap();

        let back: Result<Option<PriceRow>, _> = store.get("prices:test").await;
        assert!(matches!(back, Err(StoreError::Serialization(_))));
    }
}
