//! WeldMatch - field-level encryption and access control for profile data
//!
//! This library protects the sensitive columns of welder profiles, employer
//! profiles and certifications. Values are encrypted with a key derived per
//! user from a master secret, masked for display, revealed only to their
//! owner or an admin (with password re-entry for the most sensitive ones),
//! and every reveal, edit and export is written to an audit log.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `fields`: Registry of sensitive columns per entity
//! - `crypto`: Key derivation, AES-256-GCM, masking, password hashing
//! - `services`: Encrypting data access, reveal/hide state, users
//! - `audit`: Append-only audit log
//! - `storage`: JSON file storage layer
//! - `export`: Record and audit exports
//! - `config`: Paths, settings and the master secret
//! - `cli` / `display`: Command handlers and terminal formatting
//!
//! # Example
//!
//! ```rust,ignore
//! use weldmatch::config::{load_master_secret, Settings, WeldMatchPaths};
//! use weldmatch::services::{EncryptedDataService, KeyRing};
//!
//! let paths = WeldMatchPaths::new()?;
//! let settings = Settings::load_or_create(&paths)?;
//! let keys = KeyRing::new(load_master_secret(&paths)?, settings.key_params);
//! ```

pub mod audit;
pub mod cli;
pub mod config;
pub mod crypto;
pub mod display;
pub mod error;
pub mod export;
pub mod fields;
pub mod logging;
pub mod models;
pub mod services;
pub mod storage;

pub use error::{WeldMatchError, WeldMatchResult};
