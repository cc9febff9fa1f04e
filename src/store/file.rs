//! JSON file store
//!
//! Each record lives in `<dir>/<key>.json`. Writes go to a temp file that is
//! then renamed over the target, so readers never see a half-written record.

use super::{validate_key, Store};
use crate::error::{Error, Result};
use crate::types::JsonValue;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::debug;

const EXTENSION: &str = "json";

/// Store writing one pretty-printed JSON file per key
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    /// Create a store rooted at `dir`. The directory is created on first save.
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Root directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File path for `key`
    pub fn path_for(&self, key: &str) -> Result<PathBuf> {
        validate_key(key)?;
        Ok(self.dir.join(format!("{key}.{EXTENSION}")))
    }
}

#[async_trait]
impl Store for JsonFileStore {
    async fn save(&self, key: &str, value: &JsonValue) -> Result<()> {
        let path = self.path_for(key)?;
        let contents = serde_json::to_string_pretty(value).map_err(|e| {
            Error::store(format!("Failed to serialize record '{key}': {e}"))
        })?;

        tokio::fs::create_dir_all(&self.dir).await.map_err(|e| {
            Error::store(format!(
                "Failed to create store directory {}: {e}",
                self.dir.display()
            ))
        })?;

        let temp_path = path.with_extension("tmp");
        tokio::fs::write(&temp_path, &contents)
            .await
            .map_err(|e| Error::store(format!("Failed to write record '{key}': {e}")))?;
        tokio::fs::rename(&temp_path, &path)
            .await
            .map_err(|e| Error::store(format!("Failed to rename record '{key}': {e}")))?;

        debug!(key, path = %path.display(), bytes = contents.len(), "Saved record");
        Ok(())
    }

    async fn load(&self, key: &str) -> Result<Option<JsonValue>> {
        let path = self.path_for(key)?;
        let contents = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(Error::store(format!("Failed to read record '{key}': {e}")));
            }
        };
        serde_json::from_str(&contents)
            .map(Some)
            .map_err(|e| Error::store(format!("Failed to parse record '{key}': {e}")))
    }

    async fn keys(&self) -> Result<Vec<String>> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut keys = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                keys.push(stem.to_string());
            }
        }
        keys.sort();
        Ok(keys)
    }
}
