//! Service layer for WeldMatch
//!
//! The service layer sits between callers and storage: it encrypts and
//! decrypts sensitive columns, enforces who may see what, and records audit
//! events.

pub mod encrypted_data;
pub mod keyring;
pub mod reveal;
pub mod user;

pub use encrypted_data::EncryptedDataService;
pub use keyring::KeyRing;
pub use reveal::{DisplayField, FieldKey, RevealSession, RevealState, StepUpGate};
pub use user::UserService;
