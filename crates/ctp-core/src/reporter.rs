//! Out-of-band error reporting.

use crate::error::DashboardError;

/// Receives errors that are recovered from but should not go unnoticed,
/// such as a failed background refresh.
///
/// Implementations must not panic.
pub trait ErrorReporter: Send + Sync {
    fn report(&self, error: &DashboardError);
}
