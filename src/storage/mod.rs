//! Storage layer for WeldMatch
//!
//! Provides JSON file storage with atomic writes. It stands in for the
//! hosted database: it persists whatever the service layer hands it and
//! knows nothing about encryption.

pub mod file_io;
pub mod records;
pub mod users;

pub use file_io::{read_json, write_json_atomic};
pub use records::RecordRepository;
pub use users::UserRepository;

use crate::config::paths::WeldMatchPaths;
use crate::error::WeldMatchError;
use crate::fields::EntityKind;

/// Main storage coordinator that provides access to all repositories
pub struct Storage {
    paths: WeldMatchPaths,
    pub users: UserRepository,
    pub welder_profiles: RecordRepository,
    pub employer_profiles: RecordRepository,
    pub certifications: RecordRepository,
}

impl Storage {
    /// Create a new Storage instance
    pub fn new(paths: WeldMatchPaths) -> Result<Self, WeldMatchError> {
        paths.ensure_directories()?;

        Ok(Self {
            users: UserRepository::new(paths.users_file()),
            welder_profiles: RecordRepository::new(
                EntityKind::WelderProfile,
                paths.table_file(EntityKind::WelderProfile),
            ),
            employer_profiles: RecordRepository::new(
                EntityKind::EmployerProfile,
                paths.table_file(EntityKind::EmployerProfile),
            ),
            certifications: RecordRepository::new(
                EntityKind::Certification,
                paths.table_file(EntityKind::Certification),
            ),
            paths,
        })
    }

    /// Get the paths configuration
    pub fn paths(&self) -> &WeldMatchPaths {
        &self.paths
    }

    /// The repository backing an entity table
    pub fn table(&self, entity: EntityKind) -> &RecordRepository {
        match entity {
            EntityKind::WelderProfile => &self.welder_profiles,
            EntityKind::EmployerProfile => &self.employer_profiles,
            EntityKind::Certification => &self.certifications,
        }
    }

    /// Load all data from disk
    pub fn load_all(&mut self) -> Result<(), WeldMatchError> {
        self.users.load()?;
        for entity in EntityKind::all() {
            self.table(*entity).load()?;
        }
        Ok(())
    }

    /// Save all data to disk
    pub fn save_all(&self) -> Result<(), WeldMatchError> {
        self.users.save()?;
        for entity in EntityKind::all() {
            self.table(*entity).save()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_storage_creation() {
        let temp_dir = TempDir::new().unwrap();
        let paths = WeldMatchPaths::with_base_dir(temp_dir.path().to_path_buf());
        let mut storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();

        assert!(temp_dir.path().join("data").exists());
        assert_eq!(
            storage.table(EntityKind::EmployerProfile).entity(),
            EntityKind::EmployerProfile
        );
    }

    #[test]
    fn test_save_all_writes_tables() {
        let temp_dir = TempDir::new().unwrap();
        let paths = WeldMatchPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::new(paths.clone()).unwrap();
        storage.save_all().unwrap();

        assert!(paths.users_file().exists());
        for entity in EntityKind::all() {
            assert!(paths.table_file(*entity).exists());
        }
    }
}
