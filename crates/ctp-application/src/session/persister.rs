//! Session persistence step.
//!
//! Kept apart from the state transitions so those can be exercised without
//! any storage. The store calls `persist` after every mutation.

use std::sync::Arc;

use ctp_core::error::Result;
use ctp_core::session::{PERSISTED_KEYS, PersistedRecord, SessionState};
use ctp_core::storage::KeyValueStorage;

/// Reads and writes the persisted subset of the session.
#[derive(Clone)]
pub struct SessionPersister {
    storage: Arc<dyn KeyValueStorage>,
}

impl SessionPersister {
    pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
        Self { storage }
    }

    /// Loads the persisted record.
    ///
    /// Never fails: a storage read error yields an empty record, so the
    /// session starts from defaults.
    pub async fn load(&self) -> PersistedRecord {
        match self.storage.multi_get(&PERSISTED_KEYS).await {
            Ok(entries) => PersistedRecord::from_entries(entries),
            Err(e) => {
                tracing::warn!("[SessionPersister] Failed to load session, using defaults: {}", e);
                PersistedRecord::new()
            }
        }
    }

    /// Writes the persisted subset of `state`.
    pub async fn persist(&self, state: &SessionState) -> Result<()> {
        let pairs = PersistedRecord::from_state(state)?.into_pairs();
        self.storage.multi_set(pairs).await
    }
}
