//! Change detection for edit events
//!
//! Edit events list the names of the columns that changed. Values are
//! compared but never reported, since sensitive columns must not leak into
//! the audit log.

use crate::models::FieldMap;

/// Names of top-level fields that were added, removed or modified
///
/// Returned in sorted order.
pub fn changed_fields(before: &FieldMap, after: &FieldMap) -> Vec<String> {
    let mut changes = Vec::new();

    for (key, before_val) in before {
        match after.get(key) {
            Some(after_val) if after_val == before_val => {}
            _ => changes.push(key.clone()),
        }
    }

    for key in after.keys() {
        if !before.contains_key(key) {
            changes.push(key.clone());
        }
    }

    changes.sort();
    changes
}
