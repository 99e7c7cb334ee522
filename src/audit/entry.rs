//! Audit entry data structures
//!
//! An entry records who touched which sensitive field and how. Entries
//! carry field names only, never field values.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::fields::EntityKind;
use crate::models::{RecordId, UserId};

/// Kinds of events recorded in the audit trail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// A sensitive field was decrypted for display
    Reveal,
    /// Sensitive fields were created, changed or deleted
    Edit,
    /// A decrypted record left the system
    Export,
    /// Step-up verification succeeded
    VerificationSucceeded,
    /// Step-up verification failed
    VerificationFailed,
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuditAction::Reveal => write!(f, "REVEAL"),
            AuditAction::Edit => write!(f, "EDIT"),
            AuditAction::Export => write!(f, "EXPORT"),
            AuditAction::VerificationSucceeded => write!(f, "VERIFY_OK"),
            AuditAction::VerificationFailed => write!(f, "VERIFY_FAIL"),
        }
    }
}

/// A single audit log entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// When the event occurred (UTC)
    pub timestamp: DateTime<Utc>,

    /// What happened
    pub action: AuditAction,

    /// Who did it
    pub user_id: UserId,

    /// Table of the affected record
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity: Option<EntityKind>,

    /// Affected record
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_id: Option<RecordId>,

    /// Affected field, or a comma-separated list for edits
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,

    /// Whether the operation succeeded
    pub success: bool,

    /// Free-form context (operation name, format, reason)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl AuditEntry {
    fn base(action: AuditAction, user_id: UserId) -> Self {
        Self {
            timestamp: Utc::now(),
            action,
            user_id,
            entity: None,
            record_id: None,
            field: None,
            success: true,
            details: None,
        }
    }

    /// A field was revealed
    pub fn reveal(
        user_id: UserId,
        entity: EntityKind,
        record_id: RecordId,
        field: impl Into<String>,
    ) -> Self {
        Self {
            entity: Some(entity),
            record_id: Some(record_id),
            field: Some(field.into()),
            ..Self::base(AuditAction::Reveal, user_id)
        }
    }

    /// Sensitive fields were edited; `operation` is create, update or delete
    pub fn edit(
        user_id: UserId,
        entity: EntityKind,
        record_id: RecordId,
        fields: &[String],
        operation: &str,
    ) -> Self {
        Self {
            entity: Some(entity),
            record_id: Some(record_id),
            field: (!fields.is_empty()).then(|| fields.join(",")),
            details: Some(operation.to_string()),
            ..Self::base(AuditAction::Edit, user_id)
        }
    }

    /// A record was exported in decrypted form
    pub fn export(user_id: UserId, entity: EntityKind, record_id: RecordId, format: &str) -> Self {
        Self {
            entity: Some(entity),
            record_id: Some(record_id),
            details: Some(format.to_string()),
            ..Self::base(AuditAction::Export, user_id)
        }
    }

    /// A step-up verification attempt
    pub fn verification(user_id: UserId, success: bool, details: Option<String>) -> Self {
        let action = if success {
            AuditAction::VerificationSucceeded
        } else {
            AuditAction::VerificationFailed
        };
        Self {
            success,
            details,
            ..Self::base(action, user_id)
        }
    }

    /// Stamp the entry with the time the event happened
    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Mark the entry as a failed attempt
    pub fn failed(mut self, reason: impl Into<String>) -> Self {
        self.success = false;
        self.details = Some(reason.into());
        self
    }

    /// Format the entry for human-readable output
    pub fn format_human_readable(&self) -> String {
        let mut output = format!(
            "[{}] {} {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
            self.action,
            self.user_id
        );

        if let (Some(entity), Some(record_id)) = (self.entity, self.record_id) {
            output.push_str(&format!(" {}/{}", entity, record_id));
        }

        if let Some(field) = &self.field {
            output.push_str(&format!(" [{}]", field));
        }

        if !self.success {
            output.push_str(" FAILED");
        }

        if let Some(details) = &self.details {
            output.push_str(&format!(" ({})", details));
        }

        output
    }
}
