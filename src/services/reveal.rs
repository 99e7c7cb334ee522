//! Reveal/hide state and step-up verification
//!
//! A viewer sees masked values by default. Revealing a field decrypts it for
//! a limited time, after which it falls back to its mask. Highly sensitive
//! fields additionally need the viewer to have re-entered their password
//! recently.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, warn};

use super::encrypted_data::{value_text, EncryptedDataService};
use crate::audit::{AuditAction, AuditEntry, AuditTrail};
use crate::config::{Settings, VerificationSettings};
use crate::crypto::{verify_password, SecureString};
use crate::error::{WeldMatchError, WeldMatchResult};
use crate::fields::{self, EntityKind};
use crate::models::{RecordId, UserAccount, UserId, Viewer};

/// Audit detail for attempts refused by an active lockout
const LOCKED_DETAIL: &str = "locked";

/// Password re-entry state for one user
#[derive(Clone)]
pub struct StepUpGate {
    user_id: UserId,
    password_hash: String,
    policy: VerificationSettings,
    verified_at: Option<DateTime<Utc>>,
    failed_attempts: u32,
    locked_until: Option<DateTime<Utc>>,
}

impl StepUpGate {
    pub fn new(user: &UserAccount, policy: &VerificationSettings) -> Self {
        Self {
            user_id: user.id,
            password_hash: user.password_hash.clone(),
            policy: policy.clone(),
            verified_at: None,
            failed_attempts: 0,
            locked_until: None,
        }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Consecutive failed attempts since the last success or lockout
    pub fn failed_attempts(&self) -> u32 {
        self.failed_attempts
    }

    /// Seconds left on an active lockout
    pub fn lockout_remaining(&self, now: DateTime<Utc>) -> Option<i64> {
        self.locked_until
            .filter(|until| *until > now)
            .map(|until| (until - now).num_seconds().max(1))
    }

    /// Rebuild a gate from the user's recorded verification attempts
    ///
    /// Failure counts and lockouts carry over between sessions. A success
    /// from an earlier session clears them but never counts as verified.
    pub fn restore(
        user: &UserAccount,
        policy: &VerificationSettings,
        history: &[AuditEntry],
    ) -> Self {
        let mut gate = Self::new(user, policy);
        for entry in history.iter().filter(|e| e.user_id == user.id) {
            match entry.action {
                AuditAction::VerificationSucceeded => {
                    gate.failed_attempts = 0;
                    gate.locked_until = None;
                }
                AuditAction::VerificationFailed
                    if entry.details.as_deref() != Some(LOCKED_DETAIL) =>
                {
                    gate.register_failure(entry.timestamp);
                }
                _ => {}
            }
        }
        gate
    }

    /// [`StepUpGate::restore`] from the audit log
    pub fn load(
        user: &UserAccount,
        policy: &VerificationSettings,
        audit: &AuditTrail,
    ) -> WeldMatchResult<Self> {
        let history = audit.logger().read_for_user(user.id)?;
        Ok(Self::restore(user, policy, &history))
    }

    /// Check a re-entered password
    ///
    /// Each attempt is written to the audit trail. Too many consecutive
    /// failures lock the gate for the configured lockout period.
    pub fn verify(
        &mut self,
        password: &str,
        now: DateTime<Utc>,
        audit: &AuditTrail,
    ) -> WeldMatchResult<()> {
        if let Some(remaining_secs) = self.lockout_remaining(now) {
            audit.record(
                AuditEntry::verification(self.user_id, false, Some(LOCKED_DETAIL.into())).at(now),
            );
            return Err(WeldMatchError::VerificationLocked { remaining_secs });
        }

        if verify_password(password, &self.password_hash)? {
            self.verified_at = Some(now);
            self.failed_attempts = 0;
            self.locked_until = None;
            audit.record(AuditEntry::verification(self.user_id, true, None).at(now));
            debug!(user = %self.user_id, "Step-up verification succeeded");
            return Ok(());
        }

        let locked = self.register_failure(now);
        audit.record(
            AuditEntry::verification(
                self.user_id,
                false,
                Some(format!("attempt {}", self.failed_attempts)),
            )
            .at(now),
        );

        if locked {
            warn!(user = %self.user_id, attempts = self.failed_attempts,
                "Step-up verification locked");
            return Err(WeldMatchError::VerificationLocked {
                remaining_secs: self.policy.lockout().num_seconds(),
            });
        }

        Err(WeldMatchError::IncorrectPassword)
    }

    /// Count a failed attempt; returns `true` when it locks the gate
    fn register_failure(&mut self, at: DateTime<Utc>) -> bool {
        if self.locked_until.take().is_some() {
            self.failed_attempts = 0;
        }
        self.verified_at = None;
        self.failed_attempts += 1;

        if self.failed_attempts < self.policy.max_attempts {
            return false;
        }
        self.locked_until = Some(
            at.checked_add_signed(self.policy.lockout())
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
        );
        true
    }

    /// Whether a successful verification is still inside its window
    pub fn is_verified(&self, now: DateTime<Utc>) -> bool {
        self.verified_at
            .and_then(|at| at.checked_add_signed(self.policy.window()).map(|end| (at, end)))
            .map(|(at, end)| now >= at && now < end)
            .unwrap_or(false)
    }

    /// Fail unless the field can be revealed right now
    pub fn require(
        &self,
        entity: EntityKind,
        field: &str,
        now: DateTime<Utc>,
    ) -> WeldMatchResult<()> {
        if fields::requires_verification(entity, field) && !self.is_verified(now) {
            return Err(WeldMatchError::VerificationRequired {
                field: field.to_string(),
            });
        }
        Ok(())
    }

    /// Forget any verification, failure count and lockout
    pub fn reset(&mut self) {
        self.verified_at = None;
        self.failed_attempts = 0;
        self.locked_until = None;
    }
}

/// Identifies one field of one record
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldKey {
    pub entity: EntityKind,
    pub record_id: RecordId,
    pub field: String,
}

impl FieldKey {
    pub fn new(entity: EntityKind, record_id: RecordId, field: impl Into<String>) -> Self {
        Self {
            entity,
            record_id,
            field: field.into(),
        }
    }
}

/// Which fields are currently revealed and until when
#[derive(Debug, Clone)]
pub struct RevealState {
    auto_hide: Duration,
    revealed: HashMap<FieldKey, DateTime<Utc>>,
}

impl RevealState {
    pub fn new(auto_hide: Duration) -> Self {
        Self {
            auto_hide,
            revealed: HashMap::new(),
        }
    }

    /// Mark a field revealed, restarting its auto-hide timer
    pub fn reveal(&mut self, key: FieldKey, now: DateTime<Utc>) {
        let expires = now
            .checked_add_signed(self.auto_hide)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        self.revealed.insert(key, expires);
    }

    /// Returns whether the field was revealed
    pub fn hide(&mut self, key: &FieldKey) -> bool {
        self.revealed.remove(key).is_some()
    }

    pub fn hide_all(&mut self) {
        self.revealed.clear();
    }

    /// Flip a field; returns `true` when it is now revealed
    pub fn toggle(&mut self, key: FieldKey, now: DateTime<Utc>) -> bool {
        if self.is_revealed(&key, now) {
            self.hide(&key);
            false
        } else {
            self.reveal(key, now);
            true
        }
    }

    pub fn is_revealed(&self, key: &FieldKey, now: DateTime<Utc>) -> bool {
        self.revealed
            .get(key)
            .map(|expires| now < *expires)
            .unwrap_or(false)
    }

    /// When a revealed field will be masked again
    pub fn expires_at(&self, key: &FieldKey) -> Option<DateTime<Utc>> {
        self.revealed.get(key).copied()
    }

    /// Drop expired entries and return their keys
    pub fn sweep(&mut self, now: DateTime<Utc>) -> Vec<FieldKey> {
        let expired: Vec<FieldKey> = self
            .revealed
            .iter()
            .filter(|(_, expires)| now >= **expires)
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            self.revealed.remove(key);
        }
        expired
    }

    pub fn revealed_count(&self) -> usize {
        self.revealed.len()
    }
}

/// One column as it should be shown to the viewer
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayField {
    pub name: String,
    pub label: String,
    pub value: String,
    pub sensitive: bool,
    pub revealed: bool,
    pub requires_verification: bool,
}

/// A viewer's reveal/hide session over the data service
pub struct RevealSession<'a> {
    service: EncryptedDataService<'a>,
    viewer: Viewer,
    gate: StepUpGate,
    state: RevealState,
}

impl<'a> RevealSession<'a> {
    pub fn new(service: EncryptedDataService<'a>, user: &UserAccount, settings: &Settings) -> Self {
        Self {
            service,
            viewer: user.viewer(),
            gate: StepUpGate::new(user, &settings.verification),
            state: RevealState::new(settings.reveal.auto_hide()),
        }
    }

    /// A session whose gate carries over recorded failures and lockouts
    pub fn load(
        service: EncryptedDataService<'a>,
        user: &UserAccount,
        settings: &Settings,
    ) -> WeldMatchResult<Self> {
        let gate = StepUpGate::load(user, &settings.verification, service.audit())?;
        Ok(Self {
            gate,
            ..Self::new(service, user, settings)
        })
    }

    pub fn viewer(&self) -> Viewer {
        self.viewer
    }

    pub fn gate(&self) -> &StepUpGate {
        &self.gate
    }

    pub fn state(&self) -> &RevealState {
        &self.state
    }

    /// Re-enter the viewer's password
    pub fn verify(&mut self, password: &str, now: DateTime<Utc>) -> WeldMatchResult<()> {
        self.gate.verify(password, now, self.service.audit())
    }

    /// Decrypt a field and keep it revealed until auto-hide
    pub fn reveal(
        &mut self,
        entity: EntityKind,
        id: RecordId,
        field: &str,
        now: DateTime<Utc>,
    ) -> WeldMatchResult<SecureString> {
        let value = self
            .service
            .reveal_field(entity, id, field, self.viewer, &self.gate, now)?;
        self.state.reveal(FieldKey::new(entity, id, field), now);
        Ok(value)
    }

    /// Reveal a masked field or hide a revealed one
    ///
    /// Returns `true` when the field is now revealed.
    pub fn toggle(
        &mut self,
        entity: EntityKind,
        id: RecordId,
        field: &str,
        now: DateTime<Utc>,
    ) -> WeldMatchResult<bool> {
        let key = FieldKey::new(entity, id, field);
        if self.state.is_revealed(&key, now) {
            self.state.hide(&key);
            return Ok(false);
        }
        self.reveal(entity, id, field, now)?;
        Ok(true)
    }

    pub fn hide(&mut self, entity: EntityKind, id: RecordId, field: &str) -> bool {
        self.state.hide(&FieldKey::new(entity, id, field))
    }

    pub fn hide_all(&mut self) {
        self.state.hide_all();
    }

    pub fn sweep(&mut self, now: DateTime<Utc>) -> Vec<FieldKey> {
        self.state.sweep(now)
    }

    /// Every column of a record, revealed or masked as appropriate
    pub fn display(
        &mut self,
        entity: EntityKind,
        id: RecordId,
        now: DateTime<Utc>,
    ) -> WeldMatchResult<Vec<DisplayField>> {
        self.state.sweep(now);
        let masked = self.service.get_masked(entity, id, self.viewer)?;

        let mut rows = Vec::with_capacity(masked.fields.len());
        for (name, value) in &masked.fields {
            let config = fields::field_config(entity, name);
            let revealed = config.is_some()
                && self
                    .state
                    .is_revealed(&FieldKey::new(entity, id, name.as_str()), now);

            let value = if revealed {
                self.service
                    .open_field(entity, id, name, self.viewer)?
                    .map(|v| value_text(&v))
                    .unwrap_or_default()
            } else {
                value_text(value)
            };

            rows.push(DisplayField {
                name: name.clone(),
                label: config.map(|c| c.label.to_string()).unwrap_or_else(|| name.clone()),
                value,
                sensitive: config.is_some(),
                revealed,
                requires_verification: config.map(|c| c.requires_verification).unwrap_or(false),
            });
        }

        Ok(rows)
    }
}
