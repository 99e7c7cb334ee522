//! User service
//!
//! Registers users and resolves the identity a command acts under.

use tracing::info;

use crate::crypto::hash_password;
use crate::error::{WeldMatchError, WeldMatchResult};
use crate::models::{Role, UserAccount, UserId, Viewer};
use crate::storage::Storage;

/// Service for user management
pub struct UserService<'a> {
    storage: &'a Storage,
}

impl<'a> UserService<'a> {
    /// Create a new user service
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Register a new user
    pub fn create(&self, email: &str, role: Role, password: &str) -> WeldMatchResult<UserAccount> {
        let email = email.trim();

        if self.storage.users.get_by_email(email)?.is_some() {
            return Err(WeldMatchError::Duplicate {
                entity_type: "User",
                identifier: email.to_string(),
            });
        }

        let user = UserAccount::new(email, role, hash_password(password)?);
        user.validate()
            .map_err(|e| WeldMatchError::Validation(e.to_string()))?;

        self.storage.users.upsert(user.clone())?;
        self.storage.users.save()?;

        info!(user = %user.id, role = %user.role, "Registered user");
        Ok(user)
    }

    /// Get a user by ID
    pub fn get(&self, id: UserId) -> WeldMatchResult<Option<UserAccount>> {
        self.storage.users.get(id)
    }

    /// Find a user by email or ID
    pub fn find(&self, identifier: &str) -> WeldMatchResult<Option<UserAccount>> {
        if let Some(user) = self.storage.users.get_by_email(identifier)? {
            return Ok(Some(user));
        }

        if let Ok(id) = identifier.trim().parse::<UserId>() {
            return self.storage.users.get(id);
        }

        Ok(self
            .storage
            .users
            .get_all()?
            .into_iter()
            .find(|u| u.id.matches(identifier)))
    }

    /// Find a user, failing if they don't exist
    pub fn require(&self, identifier: &str) -> WeldMatchResult<UserAccount> {
        self.find(identifier)?
            .ok_or_else(|| WeldMatchError::user_not_found(identifier))
    }

    /// The viewer identity for a user
    pub fn viewer(&self, identifier: &str) -> WeldMatchResult<Viewer> {
        Ok(self.require(identifier)?.viewer())
    }

    /// List all users
    pub fn list(&self) -> WeldMatchResult<Vec<UserAccount>> {
        self.storage.users.get_all()
    }
}
