//! Application layer of the CTP dashboard.
//!
//! Wires the pure session transitions from `ctp-core` to storage, the
//! dashboard API and error reporting.

pub mod reporter;
pub mod session;

pub use reporter::TracingErrorReporter;
pub use session::{SessionPersister, SessionStore};
