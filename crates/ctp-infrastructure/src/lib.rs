//! Storage and configuration backends for the CTP dashboard.

pub mod config_storage;
pub mod paths;
pub mod storage;

pub use crate::config_storage::ConfigStorage;
pub use crate::paths::DashboardPaths;
pub use crate::storage::{JsonFileStorage, MemoryStorage};
