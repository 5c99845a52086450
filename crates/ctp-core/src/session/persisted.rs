//! Persisted session record.
//!
//! The session is stored as one JSON-encoded value per key in a key-value
//! store. Only the fields below are persisted; the user profile, the login
//! error and the selected tab live in memory only.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::model::SessionState;
use crate::error::Result;
use crate::project::{Project, partition_projects, sort_by_name};

pub const TOKEN_KEY: &str = "token";
pub const USER_ID_KEY: &str = "userId";
pub const PROJECTS_KEY: &str = "projects";
pub const SELECTED_PROJECT_ID_KEY: &str = "selectedProjectId";
pub const ACTIVE_PROJECT_IDS_KEY: &str = "activeProjectIds";
pub const INACTIVE_PROJECT_IDS_KEY: &str = "inactiveProjectIds";

/// Every key the session reads and writes, in write order.
pub const PERSISTED_KEYS: [&str; 6] = [
    TOKEN_KEY,
    USER_ID_KEY,
    PROJECTS_KEY,
    SELECTED_PROJECT_ID_KEY,
    ACTIVE_PROJECT_IDS_KEY,
    INACTIVE_PROJECT_IDS_KEY,
];

/// Raw persisted values, keyed by storage key.
///
/// Values are JSON text exactly as read from storage; any of them may be
/// missing or malformed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersistedRecord {
    values: HashMap<String, String>,
}

impl PersistedRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a record from `multi_get` output. `None` values are dropped.
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (String, Option<String>)>,
    {
        Self {
            values: entries
                .into_iter()
                .filter_map(|(key, value)| value.map(|value| (key, value)))
                .collect(),
        }
    }

    /// Encodes the persisted subset of `state`.
    pub fn from_state(state: &SessionState) -> Result<Self> {
        let mut record = Self::new();
        record.encode(TOKEN_KEY, &state.token)?;
        record.encode(USER_ID_KEY, &state.user_id)?;
        record.encode(PROJECTS_KEY, &state.projects)?;
        record.encode(SELECTED_PROJECT_ID_KEY, &state.selected_project_id)?;
        record.encode(ACTIVE_PROJECT_IDS_KEY, &state.active_project_ids)?;
        record.encode(INACTIVE_PROJECT_IDS_KEY, &state.inactive_project_ids)?;
        Ok(record)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Key/value pairs for `multi_set`, in [`PERSISTED_KEYS`] order.
    pub fn into_pairs(mut self) -> Vec<(String, String)> {
        PERSISTED_KEYS
            .iter()
            .filter_map(|key| {
                self.values
                    .remove(*key)
                    .map(|value| (key.to_string(), value))
            })
            .collect()
    }

    fn encode<T: Serialize>(&mut self, key: &str, value: &T) -> Result<()> {
        self.values
            .insert(key.to_string(), serde_json::to_string(value)?);
        Ok(())
    }

    /// Decodes one field. Missing, malformed and JSON `null` values all
    /// come back as `None`.
    fn decode<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.get(key)?;
        match serde_json::from_str::<Option<T>>(raw) {
            Ok(value) => value,
            Err(e) => {
                tracing::debug!("[PersistedRecord] Ignoring malformed '{}': {}", key, e);
                None
            }
        }
    }

    fn decode_string(&self, key: &str) -> Option<String> {
        self.decode::<String>(key).filter(|value| !value.is_empty())
    }
}

impl SessionState {
    /// Rebuilds a session from a persisted record, using the current time
    /// for any partition repair.
    pub fn hydrate(record: &PersistedRecord) -> Self {
        Self::hydrate_at(record, Utc::now())
    }

    /// Rebuilds a session from a persisted record.
    ///
    /// Never fails: each recognized field that is present and parses
    /// overwrites the default, anything else keeps it. Empty strings count
    /// as absent. `can_start` is always false.
    ///
    /// If the stored active/inactive lists do not partition the stored
    /// projects (partial writes, hand-edited storage), they are re-derived
    /// from the projects at `now`. A selection that names no stored project
    /// falls back to the first active project, if any.
    pub fn hydrate_at(record: &PersistedRecord, now: DateTime<Utc>) -> Self {
        let mut state = Self::new();

        if let Some(token) = record.decode_string(TOKEN_KEY) {
            state.token = Some(token);
        }
        if let Some(user_id) = record.decode_string(USER_ID_KEY) {
            state.user_id = Some(user_id);
        }
        if let Some(projects) = record.decode::<HashMap<String, Project>>(PROJECTS_KEY) {
            state.projects = projects;
        }
        if let Some(selected) = record.decode_string(SELECTED_PROJECT_ID_KEY) {
            state.selected_project_id = Some(selected);
        }
        if let Some(active) = record.decode::<Vec<String>>(ACTIVE_PROJECT_IDS_KEY) {
            state.active_project_ids = active;
        }
        if let Some(inactive) = record.decode::<Vec<String>>(INACTIVE_PROJECT_IDS_KEY) {
            state.inactive_project_ids = inactive;
        }

        if !state.partition_is_consistent() {
            tracing::warn!(
                "[PersistedRecord] Stored project partition is inconsistent, re-deriving from {} projects",
                state.projects.len()
            );
            let mut projects: Vec<Project> = state.projects.values().cloned().collect();
            // HashMap order is arbitrary; fall back to id order for equal names.
            projects.sort_by(|a, b| a.id.cmp(&b.id));
            sort_by_name(&mut projects);
            let partition = partition_projects(&projects, now);
            state.active_project_ids = partition.active;
            state.inactive_project_ids = partition.inactive;
        }

        if state.selected_project().is_none()
            && let Some(stale) = state.selected_project_id.take()
        {
            state.selected_project_id = state.active_project_ids.first().cloned();
            tracing::warn!(
                "[PersistedRecord] Selected project '{}' is not stored, selecting {:?}",
                stale,
                state.selected_project_id
            );
        }

        state
    }
}
