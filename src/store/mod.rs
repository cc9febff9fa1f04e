//! Result store module
//!
//! Persists collection records as JSON documents under string keys.
//!
//! # Overview
//!
//! The store module provides:
//! - `Store` - async persistence seam used by the collector output
//! - `MemoryStore` - process-local store for tests and embedding
//! - `JsonFileStore` - one `<key>.json` file per record, written atomically

mod file;
mod memory;

pub use file::JsonFileStore;
pub use memory::MemoryStore;

use crate::error::{Error, Result};
use crate::types::JsonValue;
use async_trait::async_trait;

/// Key/value persistence for collection records
#[async_trait]
pub trait Store: Send + Sync {
    /// Save `value` under `key`, replacing any previous record
    async fn save(&self, key: &str, value: &JsonValue) -> Result<()>;

    /// Load the record under `key`, if any
    async fn load(&self, key: &str) -> Result<Option<JsonValue>>;

    /// Keys currently stored, sorted
    async fn keys(&self) -> Result<Vec<String>>;
}

/// Reject keys that would escape the store or are empty
pub(crate) fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(Error::store("key must not be empty"));
    }
    if key == "." || key == ".." || key.contains(['/', '\\']) {
        return Err(Error::store(format!("invalid key '{key}'")));
    }
    Ok(())
}

#[cfg(test)]
mod tests;
