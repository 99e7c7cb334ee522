//! Per-user key derivation using Argon2id
//!
//! Every user gets their own field key, derived from the deployment's master
//! secret with a salt that is a pure function of the user ID. The same
//! master secret and user always produce the same key, so nothing but the
//! master secret has to be stored.

use argon2::{Algorithm, Argon2, Params, Version};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{WeldMatchError, WeldMatchResult};

/// Size of a derived AES-256 key in bytes
pub const KEY_SIZE: usize = 32;

/// Size of the per-user salt in bytes
const SALT_SIZE: usize = 16;

/// Domain separator mixed into every per-user salt
const SALT_CONTEXT: &[u8] = b"weldmatch-field-key:";

/// Cost parameters for Argon2id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyDerivationParams {
    /// Memory cost in KiB (default: 65536 = 64 MiB)
    pub memory_cost: u32,
    /// Time cost (iterations, default: 3)
    pub time_cost: u32,
    /// Parallelism degree (default: 4)
    pub parallelism: u32,
}

impl Default for KeyDerivationParams {
    fn default() -> Self {
        Self {
            memory_cost: 65536, // 64 MiB
            time_cost: 3,
            parallelism: 4,
        }
    }
}

impl KeyDerivationParams {
    /// Create params with specific values
    pub fn with_values(memory_cost: u32, time_cost: u32, parallelism: u32) -> Self {
        Self {
            memory_cost,
            time_cost,
            parallelism,
        }
    }
}

/// A derived encryption key, zeroed on drop
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct DerivedKey {
    key: [u8; KEY_SIZE],
}

impl DerivedKey {
    /// Wrap raw key bytes
    pub fn from_bytes(key: [u8; KEY_SIZE]) -> Self {
        Self { key }
    }

    /// Get the key bytes
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.key
    }
}

impl fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DerivedKey([REDACTED])")
    }
}

/// Salt for a user: SHA-256 over the context and user ID, truncated
fn user_salt(user_id: &str) -> [u8; SALT_SIZE] {
    let mut hasher = Sha256::new();
    hasher.update(SALT_CONTEXT);
    hasher.update(user_id.as_bytes());
    let digest = hasher.finalize();

    let mut salt = [0u8; SALT_SIZE];
    salt.copy_from_slice(&digest[..SALT_SIZE]);
    salt
}

/// Derive the field-encryption key for one user from the master secret
pub fn derive_user_key(
    master_secret: &str,
    user_id: &str,
    params: &KeyDerivationParams,
) -> WeldMatchResult<DerivedKey> {
    if master_secret.is_empty() {
        return Err(WeldMatchError::Encryption(
            "Master secret is empty".to_string(),
        ));
    }
    if user_id.trim().is_empty() {
        return Err(WeldMatchError::Encryption(
            "Cannot derive a key for an empty user ID".to_string(),
        ));
    }

    let argon2_params = Params::new(
        params.memory_cost,
        params.time_cost,
        params.parallelism,
        Some(KEY_SIZE),
    )
    .map_err(|e| WeldMatchError::Encryption(format!("Invalid Argon2 parameters: {}", e)))?;

    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, argon2_params);

    let salt = user_salt(user_id);
    let mut key = [0u8; KEY_SIZE];
    argon2
        .hash_password_into(master_secret.as_bytes(), &salt, &mut key)
        .map_err(|e| WeldMatchError::Encryption(format!("Key derivation failed: {}", e)))?;

    Ok(DerivedKey { key })
}

#[cfg(test)]
pub(crate) fn test_params() -> KeyDerivationParams {
    KeyDerivationParams::with_values(8, 1, 1)
}
