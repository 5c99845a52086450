//! Error reporter backed by `tracing`.

use ctp_core::error::DashboardError;
use ctp_core::reporter::ErrorReporter;

/// Reports errors as `tracing` error events.
#[derive(Debug, Clone, Default)]
pub struct TracingErrorReporter;

impl ErrorReporter for TracingErrorReporter {
    fn report(&self, error: &DashboardError) {
        tracing::error!(error = ?error, "[ErrorReporter] {}", error);
    }
}
