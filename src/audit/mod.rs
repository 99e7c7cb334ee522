//! Audit logging for sensitive-data access
//!
//! Records reveal, edit, export and verification events in an append-only
//! JSONL log.
//!
//! # Architecture
//!
//! - `AuditEntry`: one event with timestamp, action, user, record and field
//!   names. Never field values.
//! - `AuditLogger`: reads and appends the JSONL file.
//! - `AuditTrail`: best-effort wrapper used by the services; a failed write
//!   is logged and does not fail the operation being audited.
//! - `changed_fields`: names of the columns an edit touched.
//!
//! # Example
//!
//! ```rust,ignore
//! use weldmatch::audit::{AuditEntry, AuditLogger, AuditTrail};
//!
//! let trail = AuditTrail::new(AuditLogger::new(paths.audit_log()));
//! trail.record(AuditEntry::reveal(viewer.user_id, entity, record.id, "ssn"));
//! ```

mod diff;
mod entry;
mod logger;
mod trail;

pub use diff::changed_fields;
pub use entry::{AuditAction, AuditEntry};
pub use logger::AuditLogger;
pub use trail::AuditTrail;
