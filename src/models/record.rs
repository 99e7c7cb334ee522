//! Profile record model
//!
//! A record is a row in one of the entity tables: a bag of named columns,
//! some of which hold ciphertext according to the field registry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use super::ids::{RecordId, UserId};
use crate::fields::EntityKind;

/// Column name to value
pub type FieldMap = BTreeMap<String, Value>;

/// A stored row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileRecord {
    /// Unique identifier
    pub id: RecordId,

    /// Which table this row belongs to
    pub entity: EntityKind,

    /// User whose key encrypts the sensitive columns
    pub owner_id: UserId,

    /// Column values; sensitive columns hold `enc:` wire strings
    #[serde(default)]
    pub fields: FieldMap,

    /// When the record was created
    pub created_at: DateTime<Utc>,

    /// When the record was last modified
    pub updated_at: DateTime<Utc>,
}

impl ProfileRecord {
    /// Create a new record with the given column values
    pub fn new(entity: EntityKind, owner_id: UserId, fields: FieldMap) -> Self {
        let now = Utc::now();
        Self {
            id: RecordId::new(),
            entity,
            owner_id,
            fields,
            created_at: now,
            updated_at: now,
        }
    }

    /// Get a column value
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Validate the record's shape
    pub fn validate(&self) -> Result<(), String> {
        for (name, value) in &self.fields {
            if name.trim().is_empty() {
                return Err("Field names cannot be empty".to_string());
            }
            if !name
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
            {
                return Err(format!("Invalid field name: {}", name));
            }
            if value.is_null() {
                return Err(format!("Field '{}' is null", name));
            }
        }
        Ok(())
    }
}
