//! Configuration module for WeldMatch
//!
//! This module provides configuration management including:
//! - Platform-aware path resolution
//! - Settings persistence
//! - Master secret loading

pub mod paths;
pub mod secret;
pub mod settings;

pub use paths::WeldMatchPaths;
pub use secret::{ensure_master_secret, load_master_secret, MASTER_KEY_ENV};
pub use settings::{RevealSettings, Settings, VerificationSettings};
