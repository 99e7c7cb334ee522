//! Path management for WeldMatch
//!
//! ## Path Resolution Order
//!
//! 1. `WELDMATCH_DATA_DIR` environment variable (if set)
//! 2. The platform config directory (`~/.config/weldmatch` on Linux,
//!    `~/Library/Application Support/weldmatch` on macOS, `%APPDATA%\weldmatch`
//!    on Windows)

use std::path::PathBuf;

use directories::BaseDirs;

use crate::error::WeldMatchError;
use crate::fields::EntityKind;

/// Environment variable overriding the base directory
pub const DATA_DIR_ENV: &str = "WELDMATCH_DATA_DIR";

/// Manages all paths used by WeldMatch
#[derive(Debug, Clone)]
pub struct WeldMatchPaths {
    base_dir: PathBuf,
}

impl WeldMatchPaths {
    /// Resolve paths from the environment or the platform config directory
    pub fn new() -> Result<Self, WeldMatchError> {
        let base_dir = match std::env::var(DATA_DIR_ENV) {
            Ok(custom) if !custom.trim().is_empty() => PathBuf::from(custom),
            _ => resolve_default_path()?,
        };

        Ok(Self { base_dir })
    }

    /// Create WeldMatchPaths with a custom base directory (useful for testing)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Get the base directory
    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Get the data directory (`<base>/data/`)
    pub fn data_dir(&self) -> PathBuf {
        self.base_dir.join("data")
    }

    /// Get the path to the settings file
    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    /// Get the path to the master secret file
    pub fn master_key_file(&self) -> PathBuf {
        self.base_dir.join("master.key")
    }

    /// Get the path to the audit log
    pub fn audit_log(&self) -> PathBuf {
        self.base_dir.join("audit.log")
    }

    /// Get the path to users.json
    pub fn users_file(&self) -> PathBuf {
        self.data_dir().join("users.json")
    }

    /// Get the path to an entity table file
    pub fn table_file(&self, entity: EntityKind) -> PathBuf {
        self.data_dir().join(format!("{}.json", entity.table_name()))
    }

    /// Ensure the base and data directories exist
    pub fn ensure_directories(&self) -> Result<(), WeldMatchError> {
        std::fs::create_dir_all(&self.base_dir)
            .map_err(|e| WeldMatchError::Io(format!("Failed to create base directory: {}", e)))?;

        std::fs::create_dir_all(self.data_dir())
            .map_err(|e| WeldMatchError::Io(format!("Failed to create data directory: {}", e)))?;

        Ok(())
    }

    /// Check if WeldMatch has been initialized (config file exists)
    pub fn is_initialized(&self) -> bool {
        self.settings_file().exists()
    }
}

fn resolve_default_path() -> Result<PathBuf, WeldMatchError> {
    let dirs = BaseDirs::new().ok_or_else(|| {
        WeldMatchError::Config("Could not determine the user's config directory".into())
    })?;
    Ok(dirs.config_dir().join("weldmatch"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_custom_base_dir() {
        let temp_dir = TempDir::new().unwrap();
        let paths = WeldMatchPaths::with_base_dir(temp_dir.path().to_path_buf());

        assert_eq!(paths.base_dir(), temp_dir.path());
        assert_eq!(paths.data_dir(), temp_dir.path().join("data"));
    }

    #[test]
    fn test_ensure_directories() {
        let temp_dir = TempDir::new().unwrap();
        let paths = WeldMatchPaths::with_base_dir(temp_dir.path().join("nested"));

        paths.ensure_directories().unwrap();

        assert!(paths.base_dir().exists());
        assert!(paths.data_dir().exists());
        assert!(!paths.is_initialized());
    }

    #[test]
    fn test_file_paths() {
        let temp_dir = TempDir::new().unwrap();
        let paths = WeldMatchPaths::with_base_dir(temp_dir.path().to_path_buf());

        assert_eq!(paths.settings_file(), temp_dir.path().join("config.json"));
        assert_eq!(paths.master_key_file(), temp_dir.path().join("master.key"));
        assert_eq!(
            paths.table_file(EntityKind::EmployerProfile),
            temp_dir.path().join("data").join("employer_profiles.json")
        );
    }
}
