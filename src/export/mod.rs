//! Export module for WeldMatch
//!
//! Provides data-portability exports of a single decrypted record and an
//! audit log export for compliance review:
//! - JSON/YAML: one record with every column in plaintext
//! - CSV: audit entries (spreadsheet-compatible)

pub mod audit_csv;
pub mod record;

pub use audit_csv::export_audit_csv;
pub use record::{export_record, ExportFormat, RecordExport, EXPORT_SCHEMA_VERSION};
