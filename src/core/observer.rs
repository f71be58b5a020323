//! Reporting of soft failures
//!
//! Controllers swallow some failures on purpose (a locale that cannot be
//! resolved while reading a relationship, a related value that is missing).
//! Those are reported through an [`Observer`] handed to the controller.

use std::error::Error;

pub trait Observer: Send + Sync {
    /// A collaborator failure that was caught and converted
    fn log_exception(&self, error: &(dyn Error + 'static));

    /// Inconsistent data which was skipped
    fn data_quality(&self, resource_type: &str, id: &str, message: &str);
}

/// Observer emitting `tracing` events
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl Observer for TracingObserver {
    fn log_exception(&self, error: &(dyn Error + 'static)) {
        tracing::warn!(error = %error, "caught collaborator failure");
    }

    fn data_quality(&self, resource_type: &str, id: &str, message: &str) {
        tracing::warn!(resource_type, id, "data quality: {}", message);
    }
}
