//! In-memory store

use super::{validate_key, Store};
use crate::error::Result;
use crate::types::JsonValue;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Store backed by a shared map. Clones share the same records.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: Arc<RwLock<BTreeMap<String, JsonValue>>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records held
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Whether the store holds no records
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn save(&self, key: &str, value: &JsonValue) -> Result<()> {
        validate_key(key)?;
        self.records
            .write()
            .await
            .insert(key.to_string(), value.clone());
        Ok(())
    }

    async fn load(&self, key: &str) -> Result<Option<JsonValue>> {
        validate_key(key)?;
        Ok(self.records.read().await.get(key).cloned())
    }

    async fn keys(&self) -> Result<Vec<String>> {
        Ok(self.records.read().await.keys().cloned().collect())
    }
}
