//! In-memory key-value storage.

use std::collections::HashMap;

use async_trait::async_trait;
use ctp_core::error::Result;
use ctp_core::storage::KeyValueStorage;
use tokio::sync::Mutex;

/// Volatile storage, used for tests and `--ephemeral` runs.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    values: Mutex<HashMap<String, String>>,
    writes: Mutex<usize>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a storage pre-filled with `pairs`.
    pub fn with_values<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: Mutex::new(
                pairs
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
            writes: Mutex::new(0),
        }
    }

    /// Returns the raw value stored under `key`.
    pub async fn get(&self, key: &str) -> Option<String> {
        self.values.lock().await.get(key).cloned()
    }

    /// Number of `multi_set` batches applied so far.
    pub async fn write_count(&self) -> usize {
        *self.writes.lock().await
    }
}

#[async_trait]
impl KeyValueStorage for MemoryStorage {
    async fn multi_get(&self, keys: &[&str]) -> Result<Vec<(String, Option<String>)>> {
        let values = self.values.lock().await;
        Ok(keys
            .iter()
            .map(|key| (key.to_string(), values.get(*key).cloned()))
            .collect())
    }

    async fn multi_set(&self, pairs: Vec<(String, String)>) -> Result<()> {
        let mut values = self.values.lock().await;
        values.extend(pairs);
        *self.writes.lock().await += 1;
        Ok(())
    }
}
