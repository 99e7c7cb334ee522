//! Display formatting for terminal output
//!
//! Formats records, the field registry, users and audit entries for the
//! CLI. Sensitive values only ever reach these functions already masked or
//! explicitly revealed.

pub mod audit;
pub mod fields;
pub mod record;
pub mod user;

pub use audit::format_audit_entries;
pub use fields::format_field_registry;
pub use record::{format_display_fields, format_record_list};
pub use user::format_user_list;
