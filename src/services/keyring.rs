//! Per-user key cache
//!
//! Deriving a key with Argon2id is deliberately slow, so each user's key is
//! derived once per process and shared afterwards.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tracing::debug;

use crate::crypto::{derive_user_key, DerivedKey, KeyDerivationParams, SecureString};
use crate::error::{WeldMatchError, WeldMatchResult};
use crate::models::UserId;

/// Derives and caches field keys from the master secret
pub struct KeyRing {
    master: SecureString,
    params: KeyDerivationParams,
    cache: Mutex<HashMap<UserId, Arc<DerivedKey>>>,
}

impl KeyRing {
    pub fn new(master: SecureString, params: KeyDerivationParams) -> Self {
        Self {
            master,
            params,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// The field key for one user
    pub fn key_for(&self, user_id: UserId) -> WeldMatchResult<Arc<DerivedKey>> {
        let mut cache = self.cache.lock().map_err(|e| {
            WeldMatchError::Encryption(format!("Failed to acquire key cache lock: {}", e))
        })?;

        if let Some(key) = cache.get(&user_id) {
            return Ok(Arc::clone(key));
        }

        debug!(user = %user_id, "Deriving field key");
        let key = Arc::new(derive_user_key(
            self.master.as_str(),
            &user_id.as_uuid().to_string(),
            &self.params,
        )?);
        cache.insert(user_id, Arc::clone(&key));
        Ok(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::key_derivation::test_params;

    #[test]
    fn test_key_cached_per_user() {
        let ring = KeyRing::new(SecureString::new("master"), test_params());
        let user = UserId::new();

        let a = ring.key_for(user).unwrap();
        let b = ring.key_for(user).unwrap();
        assert!(Arc::ptr_eq(&a, &b));

        let other = ring.key_for(UserId::new()).unwrap();
        assert_ne!(a.as_bytes(), other.as_bytes());
    }
}
