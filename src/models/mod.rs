//! Core data models for WeldMatch
//!
//! This module contains the data structures the vault persists:
//! users and the profile records whose columns get encrypted.

pub mod ids;
pub mod record;
pub mod user;

pub use ids::{RecordId, UserId};
pub use record::{FieldMap, ProfileRecord};
pub use user::{Role, UserAccount, UserValidationError, Viewer};
