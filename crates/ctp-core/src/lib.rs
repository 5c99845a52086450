//! Domain core of the CTP dashboard.
//!
//! Holds the session and project models, the pure state transitions and the
//! traits for the collaborators the session store talks to (key-value
//! storage, the dashboard API, error reporting).

pub mod api;
pub mod config;
pub mod error;
pub mod project;
pub mod reporter;
pub mod session;
pub mod statistics;
pub mod storage;
pub mod user;

// Re-export common error type
pub use error::DashboardError;
