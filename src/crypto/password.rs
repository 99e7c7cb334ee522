//! Password hashing for step-up verification
//!
//! Login passwords are stored as Argon2id PHC strings and checked again
//! whenever a user asks to reveal a high-sensitivity field.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::error::{WeldMatchError, WeldMatchResult};

/// Minimum accepted password length
pub const MIN_PASSWORD_LEN: usize = 8;

/// Hash a password into a PHC string with a random salt
pub fn hash_password(password: &str) -> WeldMatchResult<String> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(WeldMatchError::Validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }

    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| WeldMatchError::Encryption(format!("Password hashing failed: {}", e)))?;

    Ok(hash.to_string())
}

/// Check a password against a stored PHC string
///
/// Returns `Ok(false)` for a wrong password and an error only when the stored
/// hash itself is unusable.
pub fn verify_password(password: &str, phc: &str) -> WeldMatchResult<bool> {
    let parsed = PasswordHash::new(phc).map_err(|e| {
        WeldMatchError::Encryption(format!("Stored password hash is invalid: {}", e))
    })?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(WeldMatchError::Encryption(format!(
            "Password verification failed: {}",
            e
        ))),
    }
}
