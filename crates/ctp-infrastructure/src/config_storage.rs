//! Configuration file loading.
//!
//! Reads `DashboardConfig` from `config.toml`. A missing file yields the
//! defaults; a present but invalid file is an error so typos do not pass
//! silently.

use std::path::{Path, PathBuf};

use ctp_core::config::DashboardConfig;
use ctp_core::error::Result;

use crate::paths::DashboardPaths;

/// Environment variable overriding `api_host`.
pub const API_HOST_ENV: &str = "CTP_API_HOST";

/// Loader for `config.toml`.
pub struct ConfigStorage {
    path: PathBuf,
}

impl ConfigStorage {
    /// Uses the default path (`~/.config/ctp-dashboard/config.toml`).
    pub fn new() -> Result<Self> {
        Ok(Self {
            path: DashboardPaths::config_file()?,
        })
    }

    /// Uses a custom path (for testing or `--config`).
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the configuration, then applies environment overrides.
    pub fn load(&self) -> Result<DashboardConfig> {
        let mut config = self.load_file()?;
        if let Ok(api_host) = std::env::var(API_HOST_ENV)
            && !api_host.trim().is_empty()
        {
            tracing::debug!("[ConfigStorage] api_host overridden by {}", API_HOST_ENV);
            config.api_host = api_host;
        }
        Ok(config)
    }

    fn load_file(&self) -> Result<DashboardConfig> {
        if !self.path.exists() {
            tracing::debug!(
                "[ConfigStorage] No config at {}, using defaults",
                self.path.display()
            );
            return Ok(DashboardConfig::default());
        }

        let content = std::fs::read_to_string(&self.path)?;
        let config = toml::from_str(&content)?;
        Ok(config)
    }
}
