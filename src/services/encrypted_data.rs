//! Encrypting data access
//!
//! Sensitive columns are encrypted with the owner's key on the way in and
//! decrypted on the way out. The field registry decides which columns are
//! sensitive; everything else passes through as plaintext.

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{debug, info, warn};

use super::keyring::KeyRing;
use super::reveal::StepUpGate;
use crate::audit::{changed_fields, AuditEntry, AuditTrail};
use crate::crypto::{decrypt_value, encrypt_value, is_encrypted, mask_json, SecureString};
use crate::error::{WeldMatchError, WeldMatchResult};
use crate::fields::{self, EntityKind};
use crate::models::{FieldMap, ProfileRecord, RecordId, Role, UserId, Viewer};
use crate::storage::Storage;

/// Create/read/update helpers that keep sensitive columns encrypted at rest
#[derive(Clone, Copy)]
pub struct EncryptedDataService<'a> {
    storage: &'a Storage,
    keys: &'a KeyRing,
    audit: &'a AuditTrail,
}

impl<'a> EncryptedDataService<'a> {
    pub fn new(storage: &'a Storage, keys: &'a KeyRing, audit: &'a AuditTrail) -> Self {
        Self {
            storage,
            keys,
            audit,
        }
    }

    /// The audit trail events are written to
    pub fn audit(&self) -> &'a AuditTrail {
        self.audit
    }

    /// Store a new record, encrypting its sensitive columns with the owner's key
    pub fn create(
        &self,
        entity: EntityKind,
        owner: UserId,
        fields: FieldMap,
        actor: Viewer,
    ) -> WeldMatchResult<ProfileRecord> {
        if !actor.can_decrypt(owner) {
            return Err(WeldMatchError::AccessDenied(format!(
                "{} cannot create records for another user",
                actor.user_id
            )));
        }

        let plain: FieldMap = fields.into_iter().filter(|(_, v)| !v.is_null()).collect();
        let mut record = ProfileRecord::new(entity, owner, plain);
        record.validate().map_err(WeldMatchError::Validation)?;

        let sensitive = sensitive_names(entity, &record.fields);
        record.fields = self.seal(entity, owner, record.fields)?;

        let table = self.storage.table(entity);
        table.upsert(record.clone())?;
        table.save()?;

        self.audit.record(AuditEntry::edit(
            actor.user_id,
            entity,
            record.id,
            &sensitive,
            "create",
        ));
        info!(entity = %entity, record = %record.id, "Created record");

        Ok(record)
    }

    /// Look up a stored record by full or short ID
    pub fn find(&self, entity: EntityKind, identifier: &str) -> WeldMatchResult<ProfileRecord> {
        self.storage
            .table(entity)
            .find(identifier)?
            .ok_or_else(|| WeldMatchError::record_not_found(identifier))
    }

    fn load(&self, entity: EntityKind, id: RecordId) -> WeldMatchResult<ProfileRecord> {
        self.storage
            .table(entity)
            .get(id)?
            .ok_or_else(|| WeldMatchError::record_not_found(id.to_string()))
    }

    /// A record with every sensitive column decrypted
    ///
    /// Columns that fail to decrypt come back as `null`.
    pub fn get(
        &self,
        entity: EntityKind,
        id: RecordId,
        viewer: Viewer,
    ) -> WeldMatchResult<ProfileRecord> {
        let mut record = self.load(entity, id)?;
        ensure_can_decrypt(&record, viewer)?;

        record.fields = self.open_all(&record);
        Ok(record)
    }

    /// A record with sensitive columns masked for display
    pub fn get_masked(
        &self,
        entity: EntityKind,
        id: RecordId,
        viewer: Viewer,
    ) -> WeldMatchResult<ProfileRecord> {
        let record = self.load(entity, id)?;
        ensure_can_view_masked(&record, viewer)?;
        Ok(self.mask_record(record))
    }

    /// Masked view of every record the viewer may see
    pub fn list_masked(
        &self,
        entity: EntityKind,
        viewer: Viewer,
    ) -> WeldMatchResult<Vec<ProfileRecord>> {
        Ok(self
            .storage
            .table(entity)
            .get_all()?
            .into_iter()
            .filter(|r| ensure_can_view_masked(r, viewer).is_ok())
            .map(|r| self.mask_record(r))
            .collect())
    }

    /// Decrypt a single column for display
    ///
    /// Columns that need step-up verification are only revealed through a
    /// gate that was verified recently. Every attempt is audited.
    pub fn reveal_field(
        &self,
        entity: EntityKind,
        id: RecordId,
        field: &str,
        viewer: Viewer,
        gate: &StepUpGate,
        now: DateTime<Utc>,
    ) -> WeldMatchResult<SecureString> {
        let record = self.load(entity, id)?;
        let attempt = AuditEntry::reveal(viewer.user_id, entity, id, field);

        if let Err(e) = ensure_can_decrypt(&record, viewer) {
            self.audit.record(attempt.failed("access denied"));
            return Err(e);
        }

        if gate.user_id() != viewer.user_id {
            return Err(WeldMatchError::AccessDenied(
                "verification belongs to a different user".into(),
            ));
        }

        if !fields::is_sensitive(entity, field) {
            return Err(WeldMatchError::Validation(format!(
                "'{}' is not a sensitive field of {}",
                field, entity
            )));
        }

        if let Err(e) = gate.require(entity, field, now) {
            self.audit.record(attempt.failed("verification required"));
            return Err(e);
        }

        let value = match record.get(field) {
            Some(value) => self.open(&record, value).inspect_err(|_| {
                self.audit.record(attempt.clone().failed("decryption failed"));
            })?,
            None => return Err(WeldMatchError::field_not_found(field)),
        };

        self.audit.record(attempt);
        debug!(entity = %entity, record = %id, field, "Revealed field");

        Ok(SecureString::new(value_text(&value)))
    }

    /// Merge changes into a record
    ///
    /// A `null` change removes the column. Sensitive columns whose value did
    /// not change keep their existing ciphertext.
    pub fn update(
        &self,
        entity: EntityKind,
        id: RecordId,
        viewer: Viewer,
        changes: FieldMap,
    ) -> WeldMatchResult<ProfileRecord> {
        let existing = self.load(entity, id)?;
        ensure_can_decrypt(&existing, viewer)?;

        let mut before = FieldMap::new();
        for (name, stored) in &existing.fields {
            match self.open(&existing, stored) {
                Ok(value) => {
                    before.insert(name.clone(), value);
                }
                Err(e) => {
                    warn!(entity = %entity, record = %id, field = %name, error = %e,
                        "Could not decrypt field during update");
                }
            }
        }

        let mut after = before.clone();
        for (name, value) in &changes {
            if value.is_null() {
                after.remove(name);
            } else {
                after.insert(name.clone(), value.clone());
            }
        }

        let mut changed = changed_fields(&before, &after);
        for (name, value) in &changes {
            let undecryptable = existing.fields.contains_key(name) && !before.contains_key(name);
            if undecryptable && value.is_null() && !changed.contains(name) {
                changed.push(name.clone());
            }
        }
        changed.sort();

        if changed.is_empty() {
            debug!(entity = %entity, record = %id, "Update made no changes");
            return Ok(existing);
        }

        let mut stored = FieldMap::new();
        for (name, value) in existing.fields.iter() {
            if !changed.contains(name) {
                stored.insert(name.clone(), value.clone());
            }
        }
        for name in &changed {
            if let Some(value) = after.get(name) {
                let sealed = if fields::is_sensitive(entity, name) {
                    Value::String(self.seal_value(existing.owner_id, value)?)
                } else {
                    value.clone()
                };
                stored.insert(name.clone(), sealed);
            }
        }

        let record = ProfileRecord {
            fields: stored,
            updated_at: Utc::now(),
            ..existing
        };
        record.validate().map_err(WeldMatchError::Validation)?;

        let table = self.storage.table(entity);
        table.upsert(record.clone())?;
        table.save()?;

        self.audit
            .record(AuditEntry::edit(viewer.user_id, entity, id, &changed, "update"));
        info!(entity = %entity, record = %id, changed = changed.len(), "Updated record");

        Ok(record)
    }

    /// Delete a record
    pub fn delete(&self, entity: EntityKind, id: RecordId, viewer: Viewer) -> WeldMatchResult<()> {
        let record = self.load(entity, id)?;
        ensure_can_decrypt(&record, viewer)?;

        let table = self.storage.table(entity);
        table.delete(id)?;
        table.save()?;

        let sensitive = sensitive_names(entity, &record.fields);
        self.audit
            .record(AuditEntry::edit(viewer.user_id, entity, id, &sensitive, "delete"));
        info!(entity = %entity, record = %id, "Deleted record");

        Ok(())
    }

    /// Stored records of one owner, sensitive columns still encrypted
    pub fn list_for_owner(
        &self,
        entity: EntityKind,
        owner: UserId,
    ) -> WeldMatchResult<Vec<ProfileRecord>> {
        self.storage.table(entity).get_by_owner(owner)
    }

    /// Encrypt sensitive columns that still hold plaintext
    ///
    /// Returns the number of records rewritten.
    pub fn encrypt_plaintext_fields(&self, entity: EntityKind) -> WeldMatchResult<usize> {
        let table = self.storage.table(entity);
        let mut migrated = 0;

        for mut record in table.get_all()? {
            let mut touched = false;

            for config in fields::fields_for(entity) {
                let pending = match record.fields.get(config.name) {
                    Some(Value::Null) | None => None,
                    Some(Value::String(s)) if is_encrypted(s) => None,
                    Some(value) => Some(value.clone()),
                };

                if let Some(value) = pending {
                    let sealed = self.seal_value(record.owner_id, &value)?;
                    record
                        .fields
                        .insert(config.name.to_string(), Value::String(sealed));
                    touched = true;
                }
            }

            if touched {
                record.updated_at = Utc::now();
                table.upsert(record)?;
                migrated += 1;
            }
        }

        if migrated > 0 {
            table.save()?;
            info!(entity = %entity, records = migrated, "Encrypted legacy plaintext fields");
        }

        Ok(migrated)
    }

    /// Decrypt one stored column without auditing
    ///
    /// Used to redraw a field that was already revealed and audited.
    pub(crate) fn open_field(
        &self,
        entity: EntityKind,
        id: RecordId,
        field: &str,
        viewer: Viewer,
    ) -> WeldMatchResult<Option<Value>> {
        let record = self.load(entity, id)?;
        ensure_can_decrypt(&record, viewer)?;
        record
            .get(field)
            .map(|stored| self.open(&record, stored))
            .transpose()
    }

    fn seal_value(&self, owner: UserId, value: &Value) -> WeldMatchResult<String> {
        let key = self.keys.key_for(owner)?;
        encrypt_value(value, &key)
    }

    fn seal(
        &self,
        entity: EntityKind,
        owner: UserId,
        plain: FieldMap,
    ) -> WeldMatchResult<FieldMap> {
        let mut sealed = FieldMap::new();
        for (name, value) in plain {
            let value = if fields::is_sensitive(entity, &name) && !value.is_null() {
                Value::String(self.seal_value(owner, &value)?)
            } else {
                value
            };
            sealed.insert(name, value);
        }
        Ok(sealed)
    }

    fn open(&self, record: &ProfileRecord, stored: &Value) -> WeldMatchResult<Value> {
        match stored {
            Value::String(s) if is_encrypted(s) => {
                let key = self.keys.key_for(record.owner_id)?;
                decrypt_value(s, &key)
            }
            other => Ok(other.clone()),
        }
    }

    fn open_all(&self, record: &ProfileRecord) -> FieldMap {
        record
            .fields
            .iter()
            .map(|(name, stored)| {
                let value = self.open(record, stored).unwrap_or_else(|e| {
                    warn!(entity = %record.entity, record = %record.id, field = %name,
                        error = %e, "Failed to decrypt field");
                    Value::Null
                });
                (name.clone(), value)
            })
            .collect()
    }

    fn mask_record(&self, mut record: ProfileRecord) -> ProfileRecord {
        let mut opened = self.open_all(&record);
        for (name, value) in opened.iter_mut() {
            if let Some(config) = fields::field_config(record.entity, name) {
                if !value.is_null() {
                    *value = Value::String(mask_json(value, config.mask));
                }
            }
        }
        record.fields = opened;
        record
    }
}

fn ensure_can_decrypt(record: &ProfileRecord, viewer: Viewer) -> WeldMatchResult<()> {
    if viewer.can_decrypt(record.owner_id) {
        Ok(())
    } else {
        Err(WeldMatchError::AccessDenied(format!(
            "{} may not read {} {}",
            viewer.user_id, record.entity, record.id
        )))
    }
}

fn ensure_can_view_masked(record: &ProfileRecord, viewer: Viewer) -> WeldMatchResult<()> {
    let employer_visible = matches!(
        record.entity,
        EntityKind::WelderProfile | EntityKind::Certification
    );
    if viewer.role == Role::Employer && employer_visible {
        return Ok(());
    }
    ensure_can_decrypt(record, viewer)
}

fn sensitive_names(entity: EntityKind, fields: &FieldMap) -> Vec<String> {
    fields
        .keys()
        .filter(|name| fields::is_sensitive(entity, name))
        .cloned()
        .collect()
}

/// Text form of a scalar for display
pub(crate) fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::AuditAction;
    use crate::services::test_support::{fixture, welder_fields};
    use serde_json::json;

    #[test]
    fn test_create_encrypts_sensitive_fields() {
        let fx = fixture();
        let owner = fx.user(Role::Welder);
        let service = fx.service();

        let record = service
            .create(EntityKind::WelderProfile, owner.id, welder_fields(), owner.viewer())
            .unwrap();

        let ssn = record.get("ssn").unwrap().as_str().unwrap();
        assert!(is_encrypted(ssn));
        assert!(!ssn.contains("123-45-6789"));
        assert_eq!(record.get("first_name"), Some(&json!("Alex")));

        let raw = std::fs::read_to_string(
            fx.storage.paths().table_file(EntityKind::WelderProfile),
        )
        .unwrap();
        assert!(!raw.contains("123-45-6789"));

        let entries = fx.audit.logger().read_all().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].action, AuditAction::Edit);
        assert_eq!(entries[0].field.as_deref(), Some("phone,ssn"));
        assert_eq!(entries[0].details.as_deref(), Some("create"));
    }

    #[test]
    fn test_create_for_other_user_denied() {
        let fx = fixture();
        let owner = fx.user(Role::Welder);
        let other = fx.user(Role::Welder);

        let result = fx.service().create(
            EntityKind::WelderProfile,
            owner.id,
            welder_fields(),
            other.viewer(),
        );
        assert!(matches!(result, Err(WeldMatchError::AccessDenied(_))));
    }

    #[test]
    fn test_get_round_trips_types() {
        let fx = fixture();
        let owner = fx.user(Role::Employer);
        let service = fx.service();

        let mut fields = FieldMap::new();
        fields.insert("tax_id".into(), json!("12-3456789"));
        fields.insert("bank_account_number".into(), json!(9876543210u64));
        fields.insert("company_name".into(), json!("Arc Works"));
        let record = service
            .create(EntityKind::EmployerProfile, owner.id, fields, owner.viewer())
            .unwrap();

        let plain = service
            .get(EntityKind::EmployerProfile, record.id, owner.viewer())
            .unwrap();
        assert_eq!(plain.get("tax_id"), Some(&json!("12-3456789")));
        assert_eq!(plain.get("bank_account_number"), Some(&json!(9876543210u64)));
        assert_eq!(plain.get("company_name"), Some(&json!("Arc Works")));
    }

    #[test]
    fn test_get_access_rules() {
        let fx = fixture();
        let owner = fx.user(Role::Welder);
        let admin = fx.user(Role::Admin);
        let employer = fx.user(Role::Employer);
        let service = fx.service();

        let record = service
            .create(EntityKind::WelderProfile, owner.id, welder_fields(), owner.viewer())
            .unwrap();

        assert!(service
            .get(EntityKind::WelderProfile, record.id, admin.viewer())
            .is_ok());
        assert!(matches!(
            service.get(EntityKind::WelderProfile, record.id, employer.viewer()),
            Err(WeldMatchError::AccessDenied(_))
        ));

        let masked = service
            .get_masked(EntityKind::WelderProfile, record.id, employer.viewer())
            .unwrap();
        assert_eq!(masked.get("ssn"), Some(&json!("***-**-6789")));
        assert_eq!(masked.get("phone"), Some(&json!("(***) ***-0199")));
        assert_eq!(masked.get("first_name"), Some(&json!("Alex")));
    }

    #[test]
    fn test_employer_cannot_view_other_employer() {
        let fx = fixture();
        let owner = fx.user(Role::Employer);
        let other = fx.user(Role::Employer);
        let service = fx.service();

        let mut fields = FieldMap::new();
        fields.insert("tax_id".into(), json!("12-3456789"));
        let record = service
            .create(EntityKind::EmployerProfile, owner.id, fields, owner.viewer())
            .unwrap();

        assert!(service
            .get_masked(EntityKind::EmployerProfile, record.id, other.viewer())
            .is_err());
        assert!(service
            .list_masked(EntityKind::EmployerProfile, other.viewer())
            .unwrap()
            .is_empty());
        assert_eq!(
            service
                .list_masked(EntityKind::EmployerProfile, owner.viewer())
                .unwrap()
                .len(),
            1
        );
    }

    #[test]
    fn test_reveal_requires_verification() {
        let fx = fixture();
        let owner = fx.user(Role::Welder);
        let service = fx.service();
        let now = Utc::now();

        let record = service
            .create(EntityKind::WelderProfile, owner.id, welder_fields(), owner.viewer())
            .unwrap();
        let mut gate = fx.gate(&owner);

        let phone = service
            .reveal_field(EntityKind::WelderProfile, record.id, "phone", owner.viewer(), &gate, now)
            .unwrap();
        assert_eq!(phone.as_str(), "555-867-0199");

        let err = service
            .reveal_field(EntityKind::WelderProfile, record.id, "ssn", owner.viewer(), &gate, now)
            .unwrap_err();
        assert!(err.needs_verification());

        gate.verify(fx.password(), now, service.audit()).unwrap();
        let ssn = service
            .reveal_field(EntityKind::WelderProfile, record.id, "ssn", owner.viewer(), &gate, now)
            .unwrap();
        assert_eq!(ssn.as_str(), "123-45-6789");

        let reveals: Vec<_> = fx
            .audit
            .logger()
            .read_all()
            .unwrap()
            .into_iter()
            .filter(|e| e.action == AuditAction::Reveal)
            .collect();
        assert_eq!(reveals.len(), 3);
        assert!(reveals[0].success);
        assert!(!reveals[1].success);
        assert!(reveals[2].success);
    }

    #[test]
    fn test_denied_reveal_is_audited() {
        let fx = fixture();
        let owner = fx.user(Role::Welder);
        let employer = fx.user(Role::Employer);
        let service = fx.service();

        let record = service
            .create(EntityKind::WelderProfile, owner.id, welder_fields(), owner.viewer())
            .unwrap();
        let gate = fx.gate(&employer);

        let result = service.reveal_field(
            EntityKind::WelderProfile,
            record.id,
            "phone",
            employer.viewer(),
            &gate,
            Utc::now(),
        );
        assert!(matches!(result, Err(WeldMatchError::AccessDenied(_))));

        let last = fx.audit.logger().read_all().unwrap().pop().unwrap();
        assert_eq!(last.action, AuditAction::Reveal);
        assert_eq!(last.user_id, employer.id);
        assert_eq!(last.field.as_deref(), Some("phone"));
        assert!(!last.success);
        assert_eq!(last.details.as_deref(), Some("access denied"));
    }

    #[test]
    fn test_reveal_with_foreign_gate_denied() {
        let fx = fixture();
        let owner = fx.user(Role::Welder);
        let admin = fx.user(Role::Admin);
        let service = fx.service();

        let record = service
            .create(EntityKind::WelderProfile, owner.id, welder_fields(), owner.viewer())
            .unwrap();
        let gate = fx.gate(&owner);

        let result = service.reveal_field(
            EntityKind::WelderProfile,
            record.id,
            "phone",
            admin.viewer(),
            &gate,
            Utc::now(),
        );
        assert!(matches!(result, Err(WeldMatchError::AccessDenied(_))));
    }

    #[test]
    fn test_reveal_tampered_value_is_error() {
        let fx = fixture();
        let owner = fx.user(Role::Welder);
        let service = fx.service();

        let mut record = service
            .create(EntityKind::WelderProfile, owner.id, welder_fields(), owner.viewer())
            .unwrap();
        record
            .fields
            .insert("phone".into(), json!("enc:v1:AAAAAAAAAAAAAAAA:AAAA"));
        fx.storage.welder_profiles.upsert(record.clone()).unwrap();

        let gate = fx.gate(&owner);
        let result = service.reveal_field(
            EntityKind::WelderProfile,
            record.id,
            "phone",
            owner.viewer(),
            &gate,
            Utc::now(),
        );
        assert!(matches!(result, Err(WeldMatchError::Encryption(_))));

        let plain = service
            .get(EntityKind::WelderProfile, record.id, owner.viewer())
            .unwrap();
        assert_eq!(plain.get("phone"), Some(&Value::Null));
        assert_eq!(plain.get("ssn"), Some(&json!("123-45-6789")));
    }

    #[test]
    fn test_update_keeps_unchanged_ciphertext() {
        let fx = fixture();
        let owner = fx.user(Role::Welder);
        let service = fx.service();

        let record = service
            .create(EntityKind::WelderProfile, owner.id, welder_fields(), owner.viewer())
            .unwrap();

        let mut changes = FieldMap::new();
        changes.insert("ssn".into(), json!("123-45-6789"));
        changes.insert("phone".into(), json!("555-000-1111"));
        changes.insert("first_name".into(), Value::Null);
        let updated = service
            .update(EntityKind::WelderProfile, record.id, owner.viewer(), changes)
            .unwrap();

        assert_eq!(updated.get("ssn"), record.get("ssn"));
        assert_ne!(updated.get("phone"), record.get("phone"));
        assert!(updated.get("first_name").is_none());

        let last = fx.audit.logger().read_recent(1).unwrap().remove(0);
        assert_eq!(last.field.as_deref(), Some("first_name,phone"));
        assert_eq!(last.details.as_deref(), Some("update"));

        let plain = service
            .get(EntityKind::WelderProfile, record.id, owner.viewer())
            .unwrap();
        assert_eq!(plain.get("phone"), Some(&json!("555-000-1111")));
    }

    #[test]
    fn test_noop_update_not_audited() {
        let fx = fixture();
        let owner = fx.user(Role::Welder);
        let service = fx.service();

        let record = service
            .create(EntityKind::WelderProfile, owner.id, welder_fields(), owner.viewer())
            .unwrap();
        let count = fx.audit.logger().entry_count().unwrap();

        let mut changes = FieldMap::new();
        changes.insert("phone".into(), json!("555-867-0199"));
        let updated = service
            .update(EntityKind::WelderProfile, record.id, owner.viewer(), changes)
            .unwrap();

        assert_eq!(updated, record);
        assert_eq!(fx.audit.logger().entry_count().unwrap(), count);
    }

    #[test]
    fn test_delete() {
        let fx = fixture();
        let owner = fx.user(Role::Welder);
        let stranger = fx.user(Role::Welder);
        let service = fx.service();

        let record = service
            .create(EntityKind::WelderProfile, owner.id, welder_fields(), owner.viewer())
            .unwrap();

        assert!(service
            .delete(EntityKind::WelderProfile, record.id, stranger.viewer())
            .is_err());
        service
            .delete(EntityKind::WelderProfile, record.id, owner.viewer())
            .unwrap();
        assert!(service
            .get(EntityKind::WelderProfile, record.id, owner.viewer())
            .unwrap_err()
            .is_not_found());

        let last = fx.audit.logger().read_recent(1).unwrap().remove(0);
        assert_eq!(last.details.as_deref(), Some("delete"));
    }

    #[test]
    fn test_legacy_plaintext_and_migration() {
        let fx = fixture();
        let owner = fx.user(Role::Welder);
        let service = fx.service();

        let legacy = ProfileRecord::new(EntityKind::WelderProfile, owner.id, welder_fields());
        fx.storage.welder_profiles.upsert(legacy.clone()).unwrap();

        let plain = service
            .get(EntityKind::WelderProfile, legacy.id, owner.viewer())
            .unwrap();
        assert_eq!(plain.get("ssn"), Some(&json!("123-45-6789")));

        assert_eq!(
            service
                .encrypt_plaintext_fields(EntityKind::WelderProfile)
                .unwrap(),
            1
        );
        assert_eq!(
            service
                .encrypt_plaintext_fields(EntityKind::WelderProfile)
                .unwrap(),
            0
        );

        let stored = service
            .list_for_owner(EntityKind::WelderProfile, owner.id)
            .unwrap();
        assert!(is_encrypted(stored[0].get("ssn").unwrap().as_str().unwrap()));
        assert_eq!(stored[0].get("first_name"), Some(&json!("Alex")));

        let plain = service
            .get(EntityKind::WelderProfile, legacy.id, owner.viewer())
            .unwrap();
        assert_eq!(plain.get("ssn"), Some(&json!("123-45-6789")));
    }

    #[test]
    fn test_audit_failure_does_not_fail_operation() {
        let fx = fixture();
        let owner = fx.user(Role::Welder);

        std::fs::create_dir_all(fx.audit.logger().path()).unwrap();

        let record = fx
            .service()
            .create(EntityKind::WelderProfile, owner.id, welder_fields(), owner.viewer())
            .unwrap();
        assert!(fx
            .service()
            .get(EntityKind::WelderProfile, record.id, owner.viewer())
            .is_ok());
    }
}
