//! User account model
//!
//! Users own profile records. The stored password hash is what step-up
//! verification checks before high-sensitivity fields are revealed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ids::UserId;
use crate::error::WeldMatchError;

/// Role a user signed up as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Welder,
    Employer,
    Admin,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Welder => write!(f, "welder"),
            Role::Employer => write!(f, "employer"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

impl FromStr for Role {
    type Err = WeldMatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "welder" => Ok(Role::Welder),
            "employer" => Ok(Role::Employer),
            "admin" => Ok(Role::Admin),
            other => Err(WeldMatchError::Validation(format!("Unknown role: {}", other))),
        }
    }
}

/// A registered user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserAccount {
    /// Unique identifier
    pub id: UserId,

    /// Login email, unique case-insensitively
    pub email: String,

    /// Role
    pub role: Role,

    /// Argon2id PHC string
    pub password_hash: String,

    /// When the user was created
    pub created_at: DateTime<Utc>,
}

impl UserAccount {
    /// Create a new user with an already-hashed password
    pub fn new(email: impl Into<String>, role: Role, password_hash: impl Into<String>) -> Self {
        Self {
            id: UserId::new(),
            email: email.into(),
            role,
            password_hash: password_hash.into(),
            created_at: Utc::now(),
        }
    }

    /// Normalize an email for lookups
    pub fn normalize_email(email: &str) -> String {
        email.trim().to_lowercase()
    }

    /// The identity this user acts under
    pub fn viewer(&self) -> Viewer {
        Viewer {
            user_id: self.id,
            role: self.role,
        }
    }

    /// Validate the user
    pub fn validate(&self) -> Result<(), UserValidationError> {
        let email = self.email.trim();
        if email.is_empty() {
            return Err(UserValidationError::EmptyEmail);
        }

        match email.split_once('@') {
            Some((local, domain)) if !local.is_empty() && domain.contains('.') => {}
            _ => return Err(UserValidationError::InvalidEmail(email.to_string())),
        }

        if self.password_hash.is_empty() {
            return Err(UserValidationError::MissingPasswordHash);
        }

        Ok(())
    }
}

/// Who is asking to read or change a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewer {
    pub user_id: UserId,
    pub role: Role,
}

impl Viewer {
    /// Whether this viewer may see decrypted values of a record owned by `owner`
    pub fn can_decrypt(&self, owner: UserId) -> bool {
        self.user_id == owner || self.role == Role::Admin
    }
}

/// Validation errors for users
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    EmptyEmail,
    InvalidEmail(String),
    MissingPasswordHash,
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyEmail => write!(f, "Email cannot be empty"),
            Self::InvalidEmail(email) => write!(f, "Invalid email address: {}", email),
            Self::MissingPasswordHash => write!(f, "User has no password hash"),
        }
    }
}

impl std::error::Error for UserValidationError {}
