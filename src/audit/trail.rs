//! Best-effort audit recording
//!
//! Reveal, edit and export operations must succeed even when the audit log
//! cannot be written. Failures are reported through `tracing` and dropped.

use tracing::warn;

use super::entry::AuditEntry;
use super::logger::AuditLogger;

/// Wraps an [`AuditLogger`] so that recording never fails the caller
pub struct AuditTrail {
    logger: AuditLogger,
}

impl AuditTrail {
    pub fn new(logger: AuditLogger) -> Self {
        Self { logger }
    }

    /// Record an entry, logging and swallowing any write failure
    pub fn record(&self, entry: AuditEntry) {
        if let Err(e) = self.logger.log(&entry) {
            warn!(
                action = %entry.action,
                user = %entry.user_id,
                error = %e,
                "Failed to write audit entry"
            );
        }
    }

    /// Access the underlying logger for reads
    pub fn logger(&self) -> &AuditLogger {
        &self.logger
    }
}
