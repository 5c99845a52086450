//! Unified path management for dashboard files.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/ctp-dashboard/       # Config directory
//! └── config.toml                # Application configuration
//!
//! ~/.local/share/ctp-dashboard/  # Data directory
//! └── session.json               # Persisted session key-value store
//! ```

use std::path::PathBuf;

use ctp_core::error::{DashboardError, Result};

const APP_DIR: &str = "ctp-dashboard";
const CONFIG_FILE: &str = "config.toml";
const SESSION_FILE: &str = "session.json";

/// Resolves platform directories for the dashboard.
pub struct DashboardPaths;

impl DashboardPaths {
    /// Returns the configuration directory (e.g. `~/.config/ctp-dashboard/`).
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or_else(|| DashboardError::config("Cannot find config directory"))
    }

    /// Returns the data directory (e.g. `~/.local/share/ctp-dashboard/`).
    pub fn data_dir() -> Result<PathBuf> {
        dirs::data_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or_else(|| DashboardError::config("Cannot find data directory"))
    }

    /// Returns the path to `config.toml`.
    pub fn config_file() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE))
    }

    /// Returns the path to the persisted session store.
    pub fn session_file() -> Result<PathBuf> {
        Ok(Self::data_dir()?.join(SESSION_FILE))
    }
}
