//! Settings for WeldMatch
//!
//! Key derivation cost, reveal auto-hide and step-up verification policy.
//! Every field has a default so older config files keep loading.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use super::paths::WeldMatchPaths;
use crate::crypto::KeyDerivationParams;
use crate::error::WeldMatchError;

/// Longest accepted auto-hide, verification window or lockout (one day)
pub const MAX_PERIOD_SECS: i64 = 86_400;

fn period(secs: i64) -> Duration {
    Duration::seconds(secs.clamp(0, MAX_PERIOD_SECS))
}

/// Reveal/hide behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevealSettings {
    /// Seconds a revealed field stays visible before it is masked again
    #[serde(default = "default_auto_hide_secs")]
    pub auto_hide_secs: i64,
}

impl Default for RevealSettings {
    fn default() -> Self {
        Self {
            auto_hide_secs: default_auto_hide_secs(),
        }
    }
}

impl RevealSettings {
    pub fn auto_hide(&self) -> Duration {
        period(self.auto_hide_secs)
    }
}

/// Step-up verification policy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationSettings {
    /// Seconds a successful re-authentication stays valid
    #[serde(default = "default_window_secs")]
    pub window_secs: i64,

    /// Consecutive failures before the gate locks
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Seconds the gate stays locked
    #[serde(default = "default_lockout_secs")]
    pub lockout_secs: i64,
}

impl Default for VerificationSettings {
    fn default() -> Self {
        Self {
            window_secs: default_window_secs(),
            max_attempts: default_max_attempts(),
            lockout_secs: default_lockout_secs(),
        }
    }
}

impl VerificationSettings {
    pub fn window(&self) -> Duration {
        period(self.window_secs)
    }

    pub fn lockout(&self) -> Duration {
        period(self.lockout_secs)
    }
}

/// User settings for WeldMatch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Argon2id cost for per-user key derivation
    #[serde(default)]
    pub key_params: KeyDerivationParams,

    #[serde(default)]
    pub reveal: RevealSettings,

    #[serde(default)]
    pub verification: VerificationSettings,
}

fn default_schema_version() -> u32 {
    1
}

fn default_auto_hide_secs() -> i64 {
    30
}

fn default_window_secs() -> i64 {
    300
}

fn default_max_attempts() -> u32 {
    5
}

fn default_lockout_secs() -> i64 {
    300
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            key_params: KeyDerivationParams::default(),
            reveal: RevealSettings::default(),
            verification: VerificationSettings::default(),
        }
    }
}

impl Settings {
    /// Load settings from disk, or return defaults if the file doesn't exist
    pub fn load_or_create(paths: &WeldMatchPaths) -> Result<Self, WeldMatchError> {
        let settings_path = paths.settings_file();

        if !settings_path.exists() {
            // Don't save yet - let caller decide when to persist
            return Ok(Settings::default());
        }

        let contents = std::fs::read_to_string(&settings_path)
            .map_err(|e| WeldMatchError::Io(format!("Failed to read settings file: {}", e)))?;

        let settings: Settings = serde_json::from_str(&contents).map_err(|e| {
            WeldMatchError::Config(format!("Failed to parse settings file: {}", e))
        })?;

        settings.validate()?;
        Ok(settings)
    }

    /// Save settings to disk
    pub fn save(&self, paths: &WeldMatchPaths) -> Result<(), WeldMatchError> {
        paths.ensure_directories()?;

        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| WeldMatchError::Config(format!("Failed to serialize settings: {}", e)))?;

        std::fs::write(paths.settings_file(), contents)
            .map_err(|e| WeldMatchError::Io(format!("Failed to write settings file: {}", e)))?;

        Ok(())
    }

    /// Reject settings that would disable protections
    pub fn validate(&self) -> Result<(), WeldMatchError> {
        if self.reveal.auto_hide_secs <= 0 {
            return Err(WeldMatchError::Config(
                "reveal.auto_hide_secs must be positive".into(),
            ));
        }
        if self.verification.window_secs <= 0 {
            return Err(WeldMatchError::Config(
                "verification.window_secs must be positive".into(),
            ));
        }
        if self.verification.max_attempts == 0 {
            return Err(WeldMatchError::Config(
                "verification.max_attempts must be at least 1".into(),
            ));
        }
        if self.verification.lockout_secs < 0 {
            return Err(WeldMatchError::Config(
                "verification.lockout_secs cannot be negative".into(),
            ));
        }

        for (name, secs) in [
            ("reveal.auto_hide_secs", self.reveal.auto_hide_secs),
            ("verification.window_secs", self.verification.window_secs),
            ("verification.lockout_secs", self.verification.lockout_secs),
        ] {
            if secs > MAX_PERIOD_SECS {
                return Err(WeldMatchError::Config(format!(
                    "{} cannot exceed {} seconds",
                    name, MAX_PERIOD_SECS
                )));
            }
        }
        Ok(())
    }
}
