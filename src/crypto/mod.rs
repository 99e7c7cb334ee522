//! Cryptographic functions for WeldMatch
//!
//! Provides AES-256-GCM field encryption with per-user Argon2id key
//! derivation, display masks for sensitive values, and password hashing
//! for step-up verification.

pub mod encryption;
pub mod key_derivation;
pub mod masking;
pub mod password;
pub mod secure_memory;

pub use encryption::{
    decrypt, decrypt_string, decrypt_value, encrypt, encrypt_string, encrypt_value,
    is_encrypted, EncryptedData,
};
pub use key_derivation::{derive_user_key, DerivedKey, KeyDerivationParams, KEY_SIZE};
pub use masking::{mask, mask_json, MaskType};
pub use password::{hash_password, verify_password, MIN_PASSWORD_LEN};
pub use secure_memory::{SecureBytes, SecureString};
