//! Field registry display

use crate::fields::{fields_for, EntityKind};

/// Format the registry entries of the given entities
pub fn format_field_registry(entities: &[EntityKind]) -> String {
    let mut output = String::new();

    for (i, entity) in entities.iter().enumerate() {
        if i > 0 {
            output.push('\n');
        }

        let fields = fields_for(*entity);
        let name_width = fields.iter().map(|f| f.name.len()).max().unwrap_or(5).max(5);
        let label_width = fields.iter().map(|f| f.label.len()).max().unwrap_or(5).max(5);

        output.push_str(&format!("{}\n", entity));
        output.push_str(&format!(
            "  {:<name_width$}  {:<label_width$}  {:<12}  {}\n",
            "Field",
            "Label",
            "Mask",
            "Step-up",
            name_width = name_width,
            label_width = label_width,
        ));

        for field in fields {
            output.push_str(&format!(
                "  {:<name_width$}  {:<label_width$}  {:<12}  {}\n",
                field.name,
                field.label,
                field.mask.to_string(),
                if field.requires_verification { "yes" } else { "no" },
                name_width = name_width,
                label_width = label_width,
            ));
        }
    }

    output
}
