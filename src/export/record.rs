//! Record export
//!
//! Writes one record with every column decrypted. Exports leave the system
//! in plaintext, so they need owner/admin access plus a recent step-up
//! verification, and every export is audited.

use std::fmt;
use std::io::Write;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::audit::AuditEntry;
use crate::error::{WeldMatchError, WeldMatchResult};
use crate::fields::EntityKind;
use crate::models::{FieldMap, RecordId, UserId, Viewer};
use crate::services::{EncryptedDataService, StepUpGate};

/// Current export schema version
pub const EXPORT_SCHEMA_VERSION: &str = "1.0.0";

/// Output format for a record export
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ExportFormat {
    Json,
    #[value(alias = "yml")]
    Yaml,
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportFormat::Json => write!(f, "json"),
            ExportFormat::Yaml => write!(f, "yaml"),
        }
    }
}

/// Exported record structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordExport {
    /// Schema version for compatibility checking
    pub schema_version: String,

    /// Export timestamp
    pub exported_at: DateTime<Utc>,

    pub entity: EntityKind,
    pub record_id: RecordId,
    pub owner_id: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    /// Every column in plaintext
    pub fields: FieldMap,
}

/// Write a decrypted record to `writer`
#[allow(clippy::too_many_arguments)]
pub fn export_record<W: Write>(
    service: &EncryptedDataService<'_>,
    entity: EntityKind,
    id: RecordId,
    viewer: Viewer,
    gate: &StepUpGate,
    format: ExportFormat,
    now: DateTime<Utc>,
    writer: &mut W,
) -> WeldMatchResult<()> {
    if gate.user_id() != viewer.user_id {
        return Err(WeldMatchError::AccessDenied(
            "verification belongs to a different user".into(),
        ));
    }

    let record = service.get(entity, id, viewer)?;
    let attempt = AuditEntry::export(viewer.user_id, entity, id, &format.to_string());

    if !gate.is_verified(now) {
        service.audit().record(attempt.failed("verification required"));
        return Err(WeldMatchError::VerificationRequired {
            field: "export".into(),
        });
    }

    let export = RecordExport {
        schema_version: EXPORT_SCHEMA_VERSION.to_string(),
        exported_at: now,
        entity,
        record_id: record.id,
        owner_id: record.owner_id,
        created_at: record.created_at,
        updated_at: record.updated_at,
        fields: record.fields,
    };

    match format {
        ExportFormat::Json => {
            serde_json::to_writer_pretty(&mut *writer, &export)
                .map_err(|e| WeldMatchError::Export(e.to_string()))?;
            writeln!(writer).map_err(|e| WeldMatchError::Export(e.to_string()))?;
        }
        ExportFormat::Yaml => {
            writeln!(writer, "# WeldMatch record export")
                .map_err(|e| WeldMatchError::Export(e.to_string()))?;
            writeln!(writer, "# Contains decrypted personal data. Keep it secure.")
                .map_err(|e| WeldMatchError::Export(e.to_string()))?;
            serde_yaml::to_writer(&mut *writer, &export)?;
        }
    }

    service.audit().record(attempt);
    Ok(())
}
