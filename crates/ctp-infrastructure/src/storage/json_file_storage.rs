//! JSON file backed key-value storage.
//!
//! All keys live in a single JSON object (`{"key": "value", ...}`). Writes
//! go to a temporary sibling file which is then renamed over the original,
//! so a crash mid-write leaves either the old or the new contents.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use ctp_core::error::{DashboardError, Result};
use ctp_core::storage::KeyValueStorage;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

/// Key-value storage persisted as one JSON file.
///
/// The file is read lazily on first access and cached in memory. A missing
/// file is an empty store; an unreadable or malformed file is logged and
/// also treated as empty, so a corrupt store never blocks startup.
pub struct JsonFileStorage {
    path: PathBuf,
    /// Cached contents. `None` until first loaded.
    values: Mutex<Option<HashMap<String, String>>>,
}

impl JsonFileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            values: Mutex::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_file(&self) -> HashMap<String, String> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(
                    "[JsonFileStorage] No store at {}, starting empty",
                    self.path.display()
                );
                return HashMap::new();
            }
            Err(e) => {
                tracing::warn!(
                    "[JsonFileStorage] Failed to read {}: {}",
                    self.path.display(),
                    e
                );
                return HashMap::new();
            }
        };

        match serde_json::from_str(&content) {
            Ok(values) => values,
            Err(e) => {
                tracing::warn!(
                    "[JsonFileStorage] Ignoring malformed store {}: {}",
                    self.path.display(),
                    e
                );
                HashMap::new()
            }
        }
    }

    async fn write_file(&self, values: &HashMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let content = serde_json::to_string_pretty(values)?;
        let tmp_path = self.tmp_path();

        let mut file = fs::File::create(&tmp_path).await?;
        file.write_all(content.as_bytes()).await?;
        file.sync_all().await?;
        drop(file);

        fs::rename(&tmp_path, &self.path).await.map_err(|e| {
            DashboardError::storage(format!(
                "Failed to replace {}: {}",
                self.path.display(),
                e
            ))
        })
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "store".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl KeyValueStorage for JsonFileStorage {
    async fn multi_get(&self, keys: &[&str]) -> Result<Vec<(String, Option<String>)>> {
        let mut guard = self.values.lock().await;
        if guard.is_none() {
            *guard = Some(self.read_file().await);
        }
        let values = guard.as_ref();

        Ok(keys
            .iter()
            .map(|key| {
                let value = values.and_then(|v| v.get(*key).cloned());
                (key.to_string(), value)
            })
            .collect())
    }

    async fn multi_set(&self, pairs: Vec<(String, String)>) -> Result<()> {
        let mut guard = self.values.lock().await;
        let mut values = match guard.take() {
            Some(values) => values,
            None => self.read_file().await,
        };
        values.extend(pairs);

        let result = self.write_file(&values).await;
        // The in-memory view follows the write even if the disk write failed.
        *guard = Some(values);

        if let Err(e) = &result {
            tracing::error!("[JsonFileStorage] Failed to persist: {}", e);
        }
        result
    }
}
