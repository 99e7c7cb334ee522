//! Sensitive field registry
//!
//! A static table of which columns on which entities hold sensitive data,
//! how each is masked for display, and whether revealing it needs a fresh
//! password check. Columns not listed here are stored in plaintext.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::crypto::MaskType;
use crate::error::WeldMatchError;

/// Entities that carry encrypted columns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    WelderProfile,
    EmployerProfile,
    Certification,
}

impl EntityKind {
    /// All registered entities
    pub fn all() -> &'static [EntityKind] {
        &[
            EntityKind::WelderProfile,
            EntityKind::EmployerProfile,
            EntityKind::Certification,
        ]
    }

    /// Backing table name
    pub fn table_name(&self) -> &'static str {
        match self {
            EntityKind::WelderProfile => "welder_profiles",
            EntityKind::EmployerProfile => "employer_profiles",
            EntityKind::Certification => "certifications",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.table_name())
    }
}

impl FromStr for EntityKind {
    type Err = WeldMatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        EntityKind::all()
            .iter()
            .copied()
            .find(|kind| {
                kind.table_name() == normalized
                    || kind.table_name().trim_end_matches('s') == normalized
            })
            .ok_or_else(|| WeldMatchError::Validation(format!("Unknown entity: {}", s)))
    }
}

/// Registry entry for one sensitive column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldConfig {
    /// Column name
    pub name: &'static str,
    /// Human-readable label
    pub label: &'static str,
    /// Display transform applied when not revealed
    pub mask: MaskType,
    /// Whether revealing needs step-up verification
    pub requires_verification: bool,
}

const fn field(
    name: &'static str,
    label: &'static str,
    mask: MaskType,
    requires_verification: bool,
) -> FieldConfig {
    FieldConfig {
        name,
        label,
        mask,
        requires_verification,
    }
}

const WELDER_PROFILE_FIELDS: &[FieldConfig] = &[
    field("ssn", "Social Security Number", MaskType::Ssn, true),
    field("date_of_birth", "Date of Birth", MaskType::Date, true),
    field("bank_account_number", "Bank Account Number", MaskType::BankAccount, true),
    field("bank_routing_number", "Bank Routing Number", MaskType::LastFour, true),
    field("medical_notes", "Medical Information", MaskType::Full, true),
    field("drivers_license_number", "Driver's License Number", MaskType::LastFour, true),
    field("phone", "Phone", MaskType::Phone, false),
    field("emergency_contact_phone", "Emergency Contact Phone", MaskType::Phone, false),
];

const EMPLOYER_PROFILE_FIELDS: &[FieldConfig] = &[
    field("tax_id", "Employer Identification Number", MaskType::TaxId, true),
    field("bank_account_number", "Bank Account Number", MaskType::BankAccount, true),
    field("bank_routing_number", "Bank Routing Number", MaskType::LastFour, true),
    field("billing_email", "Billing Email", MaskType::Email, false),
    field("contact_phone", "Contact Phone", MaskType::Phone, false),
];

const CERTIFICATION_FIELDS: &[FieldConfig] = &[field(
    "certificate_number",
    "Certificate Number",
    MaskType::LastFour,
    false,
)];

/// Sensitive fields registered for an entity
pub fn fields_for(entity: EntityKind) -> &'static [FieldConfig] {
    match entity {
        EntityKind::WelderProfile => WELDER_PROFILE_FIELDS,
        EntityKind::EmployerProfile => EMPLOYER_PROFILE_FIELDS,
        EntityKind::Certification => CERTIFICATION_FIELDS,
    }
}

/// Look up one field's registry entry
pub fn field_config(entity: EntityKind, name: &str) -> Option<&'static FieldConfig> {
    fields_for(entity).iter().find(|f| f.name == name)
}

/// Whether a column is stored encrypted
pub fn is_sensitive(entity: EntityKind, name: &str) -> bool {
    field_config(entity, name).is_some()
}

/// Whether revealing a column needs step-up verification
pub fn requires_verification(entity: EntityKind, name: &str) -> bool {
    field_config(entity, name)
        .map(|f| f.requires_verification)
        .unwrap_or(false)
}
