//! AES-256-GCM encryption of individual field values
//!
//! Each value is encrypted with a fresh 96-bit nonce. Ciphertexts are stored
//! in a single database column using the compact wire form
//! `enc:v1:<nonce_b64>:<ciphertext_b64>`.

use aes_gcm::aead::rand_core::RngCore;
use aes_gcm::{
    aead::{Aead, KeyInit, OsRng},
    Aes256Gcm, Nonce,
};
use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{WeldMatchError, WeldMatchResult};

use super::DerivedKey;

/// Size of the AES-GCM nonce in bytes (96 bits)
const NONCE_SIZE: usize = 12;

/// Prefix marking a column value as ciphertext
pub const WIRE_PREFIX: &str = "enc:";

const CURRENT_VERSION: u8 = 1;

/// Encrypted data with associated metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedData {
    /// The nonce used for this encryption (base64 encoded)
    pub nonce: String,
    /// The encrypted ciphertext with authentication tag (base64 encoded)
    pub ciphertext: String,
    /// Version for future algorithm upgrades
    #[serde(default = "default_version")]
    pub version: u8,
}

fn default_version() -> u8 {
    CURRENT_VERSION
}

impl EncryptedData {
    fn new(nonce: &[u8], ciphertext: &[u8]) -> Self {
        Self {
            nonce: STANDARD.encode(nonce),
            ciphertext: STANDARD.encode(ciphertext),
            version: CURRENT_VERSION,
        }
    }

    /// Render as the single-column wire form
    pub fn to_wire(&self) -> String {
        format!(
            "{}v{}:{}:{}",
            WIRE_PREFIX, self.version, self.nonce, self.ciphertext
        )
    }

    /// Parse the single-column wire form
    pub fn parse(wire: &str) -> WeldMatchResult<Self> {
        let body = wire.strip_prefix(WIRE_PREFIX).ok_or_else(|| {
            WeldMatchError::Encryption("Value is not in encrypted wire form".to_string())
        })?;

        let mut parts = body.splitn(3, ':');
        let (version, nonce, ciphertext) = match (parts.next(), parts.next(), parts.next()) {
            (Some(v), Some(n), Some(c)) => (v, n, c),
            _ => {
                return Err(WeldMatchError::Encryption(
                    "Malformed encrypted value".to_string(),
                ))
            }
        };

        let version = version
            .strip_prefix('v')
            .and_then(|v| v.parse::<u8>().ok())
            .ok_or_else(|| {
                WeldMatchError::Encryption(format!("Invalid encryption version tag: {}", version))
            })?;

        Ok(Self {
            nonce: nonce.to_string(),
            ciphertext: ciphertext.to_string(),
            version,
        })
    }

    fn decode_nonce(&self) -> WeldMatchResult<Vec<u8>> {
        STANDARD.decode(&self.nonce).map_err(|e| {
            WeldMatchError::Encryption(format!("Invalid nonce encoding: {}", e))
        })
    }

    fn decode_ciphertext(&self) -> WeldMatchResult<Vec<u8>> {
        STANDARD.decode(&self.ciphertext).map_err(|e| {
            WeldMatchError::Encryption(format!("Invalid ciphertext encoding: {}", e))
        })
    }
}

/// Whether a stored column value is ciphertext
pub fn is_encrypted(value: &str) -> bool {
    value.starts_with(WIRE_PREFIX)
}

/// Encrypt plaintext data using AES-256-GCM
pub fn encrypt(plaintext: &[u8], key: &DerivedKey) -> WeldMatchResult<EncryptedData> {
    let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|e| WeldMatchError::Encryption(format!("Failed to create cipher: {}", e)))?;

    let mut nonce_bytes = [0u8; NONCE_SIZE];
    OsRng.fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let ciphertext = cipher
        .encrypt(nonce, plaintext)
        .map_err(|e| WeldMatchError::Encryption(format!("Encryption failed: {}", e)))?;

    Ok(EncryptedData::new(&nonce_bytes, &ciphertext))
}

/// Decrypt ciphertext using AES-256-GCM
pub fn decrypt(encrypted: &EncryptedData, key: &DerivedKey) -> WeldMatchResult<Vec<u8>> {
    if encrypted.version != CURRENT_VERSION {
        return Err(WeldMatchError::Encryption(format!(
            "Unsupported encryption version: {}",
            encrypted.version
        )));
    }

    let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|e| WeldMatchError::Encryption(format!("Failed to create cipher: {}", e)))?;

    let nonce_bytes = encrypted.decode_nonce()?;
    if nonce_bytes.len() != NONCE_SIZE {
        return Err(WeldMatchError::Encryption(format!(
            "Invalid nonce size: expected {}, got {}",
            NONCE_SIZE,
            nonce_bytes.len()
        )));
    }
    let nonce = Nonce::from_slice(&nonce_bytes);

    let ciphertext = encrypted.decode_ciphertext()?;

    cipher.decrypt(nonce, ciphertext.as_ref()).map_err(|_| {
        WeldMatchError::Encryption("Decryption failed: invalid key or corrupted data".to_string())
    })
}

/// Encrypt a string
pub fn encrypt_string(plaintext: &str, key: &DerivedKey) -> WeldMatchResult<EncryptedData> {
    encrypt(plaintext.as_bytes(), key)
}

/// Decrypt to a string
pub fn decrypt_string(encrypted: &EncryptedData, key: &DerivedKey) -> WeldMatchResult<String> {
    let plaintext = decrypt(encrypted, key)?;
    String::from_utf8(plaintext).map_err(|e| {
        WeldMatchError::Encryption(format!("Invalid UTF-8 in decrypted data: {}", e))
    })
}

/// Encrypt a scalar JSON value into its wire form
///
/// The scalar is serialized first so numbers and booleans come back with
/// their original type.
pub fn encrypt_value(value: &Value, key: &DerivedKey) -> WeldMatchResult<String> {
    match value {
        Value::String(_) | Value::Number(_) | Value::Bool(_) => {}
        Value::Null => {
            return Err(WeldMatchError::Validation(
                "Null values are not encrypted".to_string(),
            ))
        }
        Value::Array(_) | Value::Object(_) => {
            return Err(WeldMatchError::Validation(
                "Only scalar values can be stored in an encrypted field".to_string(),
            ))
        }
    }

    let serialized = serde_json::to_string(value)?;
    Ok(encrypt_string(&serialized, key)?.to_wire())
}

/// Decrypt a wire-form value back into the original scalar
pub fn decrypt_value(wire: &str, key: &DerivedKey) -> WeldMatchResult<Value> {
    let encrypted = EncryptedData::parse(wire)?;
    let serialized = decrypt_string(&encrypted, key)?;
    serde_json::from_str(&serialized).map_err(|e| {
        WeldMatchError::Encryption(format!("Decrypted value is not valid JSON: {}", e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn test_key() -> DerivedKey {
        DerivedKey::from_bytes([42u8; 32])
    }

    #[test]
    fn test_encrypt_decrypt_string() {
        let key = test_key();
        let encrypted = encrypt_string("123-45-6789", &key).unwrap();
        assert_eq!(decrypt_string(&encrypted, &key).unwrap(), "123-45-6789");
    }

    #[test]
    fn test_different_nonces() {
        let key = test_key();
        let encrypted1 = encrypt(b"same", &key).unwrap();
        let encrypted2 = encrypt(b"same", &key).unwrap();

        assert_ne!(encrypted1.nonce, encrypted2.nonce);
        assert_ne!(encrypted1.ciphertext, encrypted2.ciphertext);
    }

    #[test]
    fn test_wrong_key_fails() {
        let encrypted = encrypt(b"secret", &test_key()).unwrap();
        let other = DerivedKey::from_bytes([1u8; 32]);
        assert!(decrypt(&encrypted, &other).is_err());
    }

    #[test]
    fn test_tampered_ciphertext_fails() {
        let key = test_key();
        let mut encrypted = encrypt(b"secret", &key).unwrap();

        let mut ciphertext = STANDARD.decode(&encrypted.ciphertext).unwrap();
        ciphertext[0] ^= 0xFF;
        encrypted.ciphertext = STANDARD.encode(&ciphertext);

        assert!(decrypt(&encrypted, &key).is_err());
    }

    #[test]
    fn test_wire_form() {
        let key = test_key();
        let wire = encrypt_string("4111", &key).unwrap().to_wire();

        assert!(wire.starts_with("enc:v1:"));
        assert!(is_encrypted(&wire));
        assert!(!is_encrypted("4111"));

        let parsed = EncryptedData::parse(&wire).unwrap();
        assert_eq!(decrypt_string(&parsed, &key).unwrap(), "4111");
    }

    #[test]
    fn test_malformed_wire_rejected() {
        assert!(EncryptedData::parse("plain").is_err());
        assert!(EncryptedData::parse("enc:v1:only-nonce").is_err());
        assert!(EncryptedData::parse("enc:vx:a:b").is_err());
    }

    #[test]
    fn test_unsupported_version_rejected() {
        let key = test_key();
        let mut encrypted = encrypt(b"secret", &key).unwrap();
        encrypted.version = 2;
        assert!(decrypt(&encrypted, &key).is_err());
    }

    #[test]
    fn test_value_types_preserved() {
        let key = test_key();
        for value in [json!("555-0100"), json!(42), json!(true), json!(1.5)] {
            let wire = encrypt_value(&value, &key).unwrap();
            assert_eq!(decrypt_value(&wire, &key).unwrap(), value);
        }
    }

    #[test]
    fn test_non_scalar_rejected() {
        let key = test_key();
        assert!(encrypt_value(&json!(null), &key).is_err());
        assert!(encrypt_value(&json!([1, 2]), &key).is_err());
        assert!(encrypt_value(&json!({"a": 1}), &key).is_err());
    }
}
