//! Dashboard configuration model.
//!
//! Loaded from `config.toml` by the infrastructure layer. Every field has a
//! default so an empty or missing file is valid.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const DEFAULT_API_HOST: &str = "https://mc.commercetools.com";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CLASSIFIER_CACHE_SECS: u64 = 60;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DashboardConfig {
    /// Base URL of the Merchant Center API.
    pub api_host: String,
    /// Upper bound for a refresh or login round-trip.
    pub request_timeout_secs: u64,
    /// How long a project partition may be reused. 0 disables caching.
    pub classifier_cache_secs: u64,
    /// Overrides the session file location.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_file: Option<PathBuf>,
}

impl DashboardConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn classifier_cache(&self) -> Duration {
        Duration::from_secs(self.classifier_cache_secs)
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            api_host: DEFAULT_API_HOST.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            classifier_cache_secs: DEFAULT_CLASSIFIER_CACHE_SECS,
            storage_file: None,
        }
    }
}
