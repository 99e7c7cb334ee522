//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the service layer.

pub mod audit;
pub mod profile;
pub mod setup;
pub mod user;

pub use audit::{handle_audit_command, AuditCommands};
pub use profile::{handle_profile_command, ProfileCommands};
pub use setup::{handle_config, handle_fields, handle_init, handle_migrate};
pub use user::{handle_user_command, UserCommands};

use crate::audit::{AuditLogger, AuditTrail};
use crate::config::{load_master_secret, Settings, WeldMatchPaths};
use crate::crypto::SecureString;
use crate::error::{WeldMatchError, WeldMatchResult};
use crate::models::UserAccount;
use crate::services::{KeyRing, UserService};
use crate::storage::Storage;

/// Environment variable naming the acting user
pub const USER_ENV: &str = "WELDMATCH_USER";

/// Environment variable supplying the acting user's password
pub const PASSWORD_ENV: &str = "WELDMATCH_PASSWORD";

/// Everything a command needs, loaded once per invocation
pub struct Context {
    pub paths: WeldMatchPaths,
    pub settings: Settings,
    pub storage: Storage,
    pub audit: AuditTrail,
    acting_as: Option<String>,
    password: Option<SecureString>,
}

impl Context {
    /// Load settings and storage from `paths`
    pub fn load(
        paths: WeldMatchPaths,
        acting_as: Option<String>,
        password: Option<String>,
    ) -> WeldMatchResult<Self> {
        let settings = Settings::load_or_create(&paths)?;
        let mut storage = Storage::new(paths.clone())?;
        storage.load_all()?;
        let audit = AuditTrail::new(AuditLogger::new(paths.audit_log()));

        Ok(Self {
            paths,
            settings,
            storage,
            audit,
            acting_as,
            password: password.map(SecureString::new),
        })
    }

    /// Per-user key derivation over the master secret
    pub fn keyring(&self) -> WeldMatchResult<KeyRing> {
        let master = load_master_secret(&self.paths)?;
        Ok(KeyRing::new(master, self.settings.key_params))
    }

    /// The user this invocation acts as, if one was named
    pub fn try_actor(&self) -> WeldMatchResult<Option<UserAccount>> {
        match &self.acting_as {
            Some(identifier) => UserService::new(&self.storage).require(identifier).map(Some),
            None => Ok(None),
        }
    }

    /// The user this invocation acts as
    pub fn actor(&self) -> WeldMatchResult<UserAccount> {
        self.try_actor()?.ok_or_else(|| {
            WeldMatchError::Validation(format!(
                "No acting user; pass --as <email> or set {}",
                USER_ENV
            ))
        })
    }

    /// The acting user's password, prompting when none was supplied
    pub fn password(&self, prompt: &str) -> WeldMatchResult<SecureString> {
        match &self.password {
            Some(password) => Ok(password.clone()),
            None => prompt_password(prompt),
        }
    }

    /// A new password, confirmed when entered interactively
    pub fn new_password(&self) -> WeldMatchResult<SecureString> {
        if let Some(password) = &self.password {
            return Ok(password.clone());
        }

        let first = prompt_password("Password: ")?;
        let second = prompt_password("Confirm password: ")?;
        if first != second {
            return Err(WeldMatchError::Validation("Passwords do not match".into()));
        }
        Ok(first)
    }
}

/// Prompt for a password (hidden input)
fn prompt_password(prompt: &str) -> WeldMatchResult<SecureString> {
    rpassword::prompt_password(prompt)
        .map(SecureString::new)
        .map_err(|e| WeldMatchError::Io(format!("Failed to read password: {}", e)))
}
