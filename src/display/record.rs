//! Record display formatting
//!
//! Renders a record's columns as a table, marking which sensitive values
//! are masked and which are revealed.

use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::models::ProfileRecord;
use crate::services::DisplayField;

#[derive(Tabled)]
struct FieldRow {
    #[tabled(rename = "Field")]
    label: String,
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "")]
    marker: &'static str,
}

impl From<&DisplayField> for FieldRow {
    fn from(field: &DisplayField) -> Self {
        let marker = match (field.sensitive, field.revealed) {
            (false, _) => "",
            (true, true) => "revealed",
            (true, false) if field.requires_verification => "masked, needs verification",
            (true, false) => "masked",
        };

        Self {
            label: field.label.clone(),
            value: field.value.clone(),
            marker,
        }
    }
}

/// Format one record's fields as a table
pub fn format_display_fields(record: &ProfileRecord, fields: &[DisplayField]) -> String {
    let mut output = format!("{} {}\n", record.entity, record.id);
    output.push_str(&format!("Owner:   {}\n", record.owner_id));
    output.push_str(&format!(
        "Updated: {}\n\n",
        record.updated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));

    if fields.is_empty() {
        output.push_str("No fields.\n");
        return output;
    }

    let rows: Vec<FieldRow> = fields.iter().map(FieldRow::from).collect();
    output.push_str(&Table::new(rows).with(Style::psql()).to_string());
    output.push('\n');
    output
}

#[derive(Tabled)]
struct RecordRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Owner")]
    owner: String,
    #[tabled(rename = "Fields")]
    fields: usize,
    #[tabled(rename = "Updated")]
    updated: String,
}

/// Format a list of records as a summary table
pub fn format_record_list(records: &[ProfileRecord]) -> String {
    if records.is_empty() {
        return "No records found.".to_string();
    }

    let rows: Vec<RecordRow> = records
        .iter()
        .map(|r| RecordRow {
            id: r.id.to_string(),
            owner: r.owner_id.to_string(),
            fields: r.fields.len(),
            updated: r.updated_at.format("%Y-%m-%d %H:%M").to_string(),
        })
        .collect();

    let mut output = Table::new(rows).with(Style::psql()).to_string();
    output.push_str(&format!("\n\n{} record(s)", records.len()));
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::EntityKind;
    use crate::models::{FieldMap, UserId};

    fn display_field(name: &str, value: &str, sensitive: bool, revealed: bool) -> DisplayField {
        DisplayField {
            name: name.into(),
            label: name.into(),
            value: value.into(),
            sensitive,
            revealed,
            requires_verification: sensitive,
        }
    }

    #[test]
    fn test_format_display_fields() {
        let record = ProfileRecord::new(EntityKind::WelderProfile, UserId::new(), FieldMap::new());
        let fields = vec![
            display_field("first_name", "Alex", false, false),
            display_field("ssn", "***-**-6789", true, false),
            display_field("phone", "555-867-0199", true, true),
        ];

        let output = format_display_fields(&record, &fields);
        assert!(output.contains("welder_profiles"));
        assert!(output.contains("***-**-6789"));
        assert!(output.contains("masked, needs verification"));
        assert!(output.contains("revealed"));
    }

    #[test]
    fn test_empty_record_list() {
        assert_eq!(format_record_list(&[]), "No records found.");
    }

    #[test]
    fn test_record_list_counts() {
        let records = vec![
            ProfileRecord::new(EntityKind::Certification, UserId::new(), FieldMap::new()),
            ProfileRecord::new(EntityKind::Certification, UserId::new(), FieldMap::new()),
        ];
        let output = format_record_list(&records);
        assert!(output.contains("rec-"));
        assert!(output.ends_with("2 record(s)"));
    }
}
