//! Audit log CSV export
//!
//! Flattens audit entries into one row each for spreadsheet review.

use std::io::Write;

use serde::Serialize;

use crate::audit::AuditEntry;
use crate::error::WeldMatchResult;

#[derive(Serialize)]
struct AuditRow<'a> {
    timestamp: String,
    action: String,
    user_id: String,
    entity: &'a str,
    record_id: String,
    field: &'a str,
    success: bool,
    details: &'a str,
}

impl<'a> From<&'a AuditEntry> for AuditRow<'a> {
    fn from(entry: &'a AuditEntry) -> Self {
        Self {
            timestamp: entry.timestamp.to_rfc3339(),
            action: entry.action.to_string(),
            user_id: entry.user_id.to_string(),
            entity: entry.entity.map(|e| e.table_name()).unwrap_or(""),
            record_id: entry.record_id.map(|r| r.to_string()).unwrap_or_default(),
            field: entry.field.as_deref().unwrap_or(""),
            success: entry.success,
            details: entry.details.as_deref().unwrap_or(""),
        }
    }
}

/// Write audit entries as CSV with a header row
///
/// Returns the number of rows written.
pub fn export_audit_csv<W: Write>(entries: &[AuditEntry], writer: W) -> WeldMatchResult<usize> {
    let mut out = csv::Writer::from_writer(writer);

    if entries.is_empty() {
        out.write_record([
            "timestamp",
            "action",
            "user_id",
            "entity",
            "record_id",
            "field",
            "success",
            "details",
        ])?;
    }

    for entry in entries {
        out.serialize(AuditRow::from(entry))?;
    }

    out.flush()?;
    Ok(entries.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::EntityKind;
    use crate::models::{RecordId, UserId};

    #[test]
    fn test_export_rows() {
        let entries = vec![
            AuditEntry::reveal(UserId::new(), EntityKind::WelderProfile, RecordId::new(), "ssn"),
            AuditEntry::edit(
                UserId::new(),
                EntityKind::WelderProfile,
                RecordId::new(),
                &["phone".to_string(), "ssn".to_string()],
                "update",
            ),
            AuditEntry::verification(UserId::new(), false, Some("attempt 1".into())),
        ];

        let mut out = Vec::new();
        assert_eq!(export_audit_csv(&entries, &mut out).unwrap(), 3);

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("timestamp,action,user_id"));
        assert!(lines[1].contains(",REVEAL,"));
        assert!(lines[2].contains("\"phone,ssn\""));
        assert!(lines[3].contains(",VERIFY_FAIL,"));
        assert!(lines[3].ends_with(",false,attempt 1"));
    }

    #[test]
    fn test_export_empty_has_header() {
        let mut out = Vec::new();
        assert_eq!(export_audit_csv(&[], &mut out).unwrap(), 0);
        assert_eq!(
            String::from_utf8(out).unwrap().trim(),
            "timestamp,action,user_id,entity,record_id,field,success,details"
        );
    }
}
