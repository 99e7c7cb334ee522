//! Profile record repository for JSON storage
//!
//! One repository per entity table, each backed by `data/<table>.json`.
//! Rows are stored exactly as the service hands them over, so sensitive
//! columns are already ciphertext by the time they get here.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::WeldMatchError;
use crate::fields::EntityKind;
use crate::models::{ProfileRecord, RecordId, UserId};

use super::file_io::{read_json, write_json_atomic};

/// Serializable table layout
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct TableData {
    records: Vec<ProfileRecord>,
}

/// Repository for one entity table
pub struct RecordRepository {
    entity: EntityKind,
    path: PathBuf,
    data: RwLock<HashMap<RecordId, ProfileRecord>>,
}

impl RecordRepository {
    /// Create a new repository for `entity` stored at `path`
    pub fn new(entity: EntityKind, path: PathBuf) -> Self {
        Self {
            entity,
            path,
            data: RwLock::new(HashMap::new()),
        }
    }

    /// Which table this repository holds
    pub fn entity(&self) -> EntityKind {
        self.entity
    }

    /// Load records from disk
    pub fn load(&self) -> Result<(), WeldMatchError> {
        let file_data: TableData = read_json(&self.path)?;

        let mut data = self.data.write().map_err(|e| {
            WeldMatchError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;

        data.clear();
        for record in file_data.records {
            if record.entity != self.entity {
                return Err(WeldMatchError::Storage(format!(
                    "Record {} in {} belongs to {}",
                    record.id, self.entity, record.entity
                )));
            }
            data.insert(record.id, record);
        }

        Ok(())
    }

    /// Save records to disk
    pub fn save(&self) -> Result<(), WeldMatchError> {
        let records = self.get_all()?;
        write_json_atomic(&self.path, &TableData { records })
    }

    /// Get a record by ID
    pub fn get(&self, id: RecordId) -> Result<Option<ProfileRecord>, WeldMatchError> {
        let data = self.data.read().map_err(|e| {
            WeldMatchError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(data.get(&id).cloned())
    }

    /// Find a record by full ID or its short display form
    pub fn find(&self, identifier: &str) -> Result<Option<ProfileRecord>, WeldMatchError> {
        if let Ok(id) = identifier.parse::<RecordId>() {
            return self.get(id);
        }

        let data = self.data.read().map_err(|e| {
            WeldMatchError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;

        let mut matches = data.values().filter(|r| r.id.matches(identifier));
        match (matches.next(), matches.next()) {
            (Some(record), None) => Ok(Some(record.clone())),
            (Some(_), Some(_)) => Err(WeldMatchError::Validation(format!(
                "Ambiguous record identifier: {}",
                identifier
            ))),
            _ => Ok(None),
        }
    }

    /// Get all records, oldest first
    pub fn get_all(&self) -> Result<Vec<ProfileRecord>, WeldMatchError> {
        let data = self.data.read().map_err(|e| {
            WeldMatchError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;

        let mut records: Vec<_> = data.values().cloned().collect();
        records.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then(a.id.as_uuid().cmp(b.id.as_uuid()))
        });
        Ok(records)
    }

    /// Get the records owned by one user
    pub fn get_by_owner(&self, owner: UserId) -> Result<Vec<ProfileRecord>, WeldMatchError> {
        Ok(self
            .get_all()?
            .into_iter()
            .filter(|r| r.owner_id == owner)
            .collect())
    }

    /// Insert or update a record
    pub fn upsert(&self, record: ProfileRecord) -> Result<(), WeldMatchError> {
        if record.entity != self.entity {
            return Err(WeldMatchError::Storage(format!(
                "Cannot store a {} record in {}",
                record.entity, self.entity
            )));
        }

        let mut data = self.data.write().map_err(|e| {
            WeldMatchError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;

        data.insert(record.id, record);
        Ok(())
    }

    /// Delete a record
    pub fn delete(&self, id: RecordId) -> Result<bool, WeldMatchError> {
        let mut data = self.data.write().map_err(|e| {
            WeldMatchError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;

        Ok(data.remove(&id).is_some())
    }

    /// Count records
    pub fn count(&self) -> Result<usize, WeldMatchError> {
        let data = self.data.read().map_err(|e| {
            WeldMatchError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;
        Ok(data.len())
    }
}
