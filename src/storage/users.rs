//! User repository for JSON storage
//!
//! Manages loading and saving users to users.json

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::WeldMatchError;
use crate::models::{UserAccount, UserId};

use super::file_io::{read_json, write_json_atomic};

/// Serializable user data structure
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct UserData {
    users: Vec<UserAccount>,
}

/// Repository for user persistence
pub struct UserRepository {
    path: PathBuf,
    data: RwLock<HashMap<UserId, UserAccount>>,
    /// Index: normalized email -> user_id
    by_email: RwLock<HashMap<String, UserId>>,
}

impl UserRepository {
    /// Create a new user repository
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
            by_email: RwLock::new(HashMap::new()),
        }
    }

    /// Load users from disk
    pub fn load(&self) -> Result<(), WeldMatchError> {
        let file_data: UserData = read_json(&self.path)?;

        let mut data = self.data.write().map_err(|e| {
            WeldMatchError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;
        let mut by_email = self.by_email.write().map_err(|e| {
            WeldMatchError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;

        data.clear();
        by_email.clear();

        for user in file_data.users {
            by_email.insert(UserAccount::normalize_email(&user.email), user.id);
            data.insert(user.id, user);
        }

        Ok(())
    }

    /// Save users to disk
    pub fn save(&self) -> Result<(), WeldMatchError> {
        let users = self.get_all()?;
        write_json_atomic(&self.path, &UserData { users })
    }

    /// Get a user by ID
    pub fn get(&self, id: UserId) -> Result<Option<UserAccount>, WeldMatchError> {
        let data = self.data.read().map_err(|e| {
            WeldMatchError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(data.get(&id).cloned())
    }

    /// Get a user by email (case-insensitive)
    pub fn get_by_email(&self, email: &str) -> Result<Option<UserAccount>, WeldMatchError> {
        let data = self.data.read().map_err(|e| {
            WeldMatchError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;
        let by_email = self.by_email.read().map_err(|e| {
            WeldMatchError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(by_email
            .get(&UserAccount::normalize_email(email))
            .and_then(|id| data.get(id).cloned()))
    }

    /// Get all users sorted by email
    pub fn get_all(&self) -> Result<Vec<UserAccount>, WeldMatchError> {
        let data = self.data.read().map_err(|e| {
            WeldMatchError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;

        let mut users: Vec<_> = data.values().cloned().collect();
        users.sort_by(|a, b| a.email.to_lowercase().cmp(&b.email.to_lowercase()));
        Ok(users)
    }

    /// Insert or update a user
    pub fn upsert(&self, user: UserAccount) -> Result<(), WeldMatchError> {
        let mut data = self.data.write().map_err(|e| {
            WeldMatchError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;
        let mut by_email = self.by_email.write().map_err(|e| {
            WeldMatchError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;

        if let Some(old) = data.get(&user.id) {
            by_email.remove(&UserAccount::normalize_email(&old.email));
        }

        by_email.insert(UserAccount::normalize_email(&user.email), user.id);
        data.insert(user.id, user);
        Ok(())
    }

    /// Count users
    pub fn count(&self) -> Result<usize, WeldMatchError> {
        let data = self.data.read().map_err(|e| {
            WeldMatchError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;
        Ok(data.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;
    use tempfile::TempDir;

    fn create_test_repo() -> (TempDir, UserRepository) {
        let temp_dir = TempDir::new().unwrap();
        let repo = UserRepository::new(temp_dir.path().join("users.json"));
        (temp_dir, repo)
    }

    #[test]
    fn test_upsert_and_lookup() {
        let (_temp_dir, repo) = create_test_repo();
        let user = UserAccount::new("Casey@Example.com", Role::Welder, "hash");
        let id = user.id;
        repo.upsert(user).unwrap();

        assert!(repo.get(id).unwrap().is_some());
        assert_eq!(repo.get_by_email("casey@example.com").unwrap().unwrap().id, id);
        assert!(repo.get_by_email("other@example.com").unwrap().is_none());
    }

    #[test]
    fn test_email_change_updates_index() {
        let (_temp_dir, repo) = create_test_repo();
        let mut user = UserAccount::new("old@example.com", Role::Employer, "hash");
        repo.upsert(user.clone()).unwrap();

        user.email = "new@example.com".into();
        repo.upsert(user).unwrap();

        assert!(repo.get_by_email("old@example.com").unwrap().is_none());
        assert!(repo.get_by_email("new@example.com").unwrap().is_some());
        assert_eq!(repo.count().unwrap(), 1);
    }

    #[test]
    fn test_save_and_reload() {
        let (temp_dir, repo) = create_test_repo();
        repo.upsert(UserAccount::new("a@example.com", Role::Admin, "hash"))
            .unwrap();
        repo.save().unwrap();

        let reopened = UserRepository::new(temp_dir.path().join("users.json"));
        reopened.load().unwrap();
        assert_eq!(reopened.count().unwrap(), 1);
    }
}
