//! Custom error types for WeldMatch
//!
//! This module defines the error hierarchy for the vault using thiserror
//! for ergonomic error definitions.

use thiserror::Error;

/// The main error type for WeldMatch operations
#[derive(Error, Debug)]
pub enum WeldMatchError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Validation errors for records and users
    #[error("Validation error: {0}")]
    Validation(String),

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// Duplicate entity errors
    #[error("{entity_type} already exists: {identifier}")]
    Duplicate {
        entity_type: &'static str,
        identifier: String,
    },

    /// Encryption errors
    #[error("Encryption error: {0}")]
    Encryption(String),

    /// Viewer may not perform the operation on this record
    #[error("Access denied: {0}")]
    AccessDenied(String),

    /// Field needs a fresh password re-entry before it can be revealed
    #[error("Verification required to reveal '{field}'")]
    VerificationRequired { field: String },

    /// Step-up verification password did not match
    #[error("Incorrect password")]
    IncorrectPassword,

    /// Too many failed verification attempts
    #[error("Verification locked for {remaining_secs}s after repeated failures")]
    VerificationLocked { remaining_secs: i64 },

    /// Export errors
    #[error("Export error: {0}")]
    Export(String),

    /// Storage errors
    #[error("Storage error: {0}")]
    Storage(String),
}

impl WeldMatchError {
    /// Create a "not found" error for profile records
    pub fn record_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Record",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for users
    pub fn user_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "User",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for registry fields
    pub fn field_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Field",
            identifier: identifier.into(),
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Check if the caller must re-authenticate before retrying
    pub fn needs_verification(&self) -> bool {
        matches!(self, Self::VerificationRequired { .. })
    }
}

impl From<std::io::Error> for WeldMatchError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for WeldMatchError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

impl From<serde_yaml::Error> for WeldMatchError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Export(err.to_string())
    }
}

impl From<csv::Error> for WeldMatchError {
    fn from(err: csv::Error) -> Self {
        Self::Export(err.to_string())
    }
}

/// Result type alias for WeldMatch operations
pub type WeldMatchResult<T> = Result<T, WeldMatchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = WeldMatchError::Config("test error".into());
        assert_eq!(err.to_string(), "Configuration error: test error");
    }

    #[test]
    fn test_not_found_error() {
        let err = WeldMatchError::user_not_found("pat@example.com");
        assert_eq!(err.to_string(), "User not found: pat@example.com");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_verification_required() {
        let err = WeldMatchError::VerificationRequired {
            field: "ssn".into(),
        };
        assert_eq!(err.to_string(), "Verification required to reveal 'ssn'");
        assert!(err.needs_verification());
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: WeldMatchError = io_err.into();
        assert!(matches!(err, WeldMatchError::Io(_)));
    }
}
