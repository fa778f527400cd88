//! Terminal styling and table rendering for CLI output.

use comfy_table::{Cell, Table, presets::UTF8_FULL_CONDENSED};
use lucent_index::{FieldDescriptor, Schema};
use lucent_query::{Cardinality, LanguageId};
use serde::Serialize;

/// ANSI color codes for terminal output.
pub mod colors {
    /// Bold text.
    pub const BOLD: &str = "\x1b[1m";
    /// Yellow text (for warnings).
    pub const YELLOW: &str = "\x1b[33m";
    /// Dim/gray text (for less important info).
    pub const DIM: &str = "\x1b[2m";
    /// Reset all formatting.
    pub const RESET: &str = "\x1b[0m";
}

/// Formats text as a subheader (bold).
pub fn subheader(text: &str) -> String {
    format!("{}{}{}", colors::BOLD, text, colors::RESET)
}

/// Formats text as dimmed/less important.
pub fn dim(text: &str) -> String {
    format!("{}{}{}", colors::DIM, text, colors::RESET)
}

/// Formats text as a warning (yellow).
pub fn warning(text: &str) -> String {
    format!("{}{}{}", colors::YELLOW, text, colors::RESET)
}

/// One row of `lucent fields` output.
#[derive(Debug, Serialize)]
pub struct FieldRow {
    /// Field id.
    pub id: String,
    /// Data type name.
    #[serde(rename = "type")]
    pub data_type: String,
    /// Whether the field is multi-valued.
    pub multi: bool,
    /// Query-time boost.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub boost: Option<f32>,
    /// Backend names as `(language, name)`; a single `und` entry for non-text fields.
    pub names: Vec<(String, String)>,
}

impl FieldRow {
    /// Resolves a field's backend names in the given languages.
    pub fn new(schema: &Schema, field: &FieldDescriptor, languages: &[LanguageId]) -> Self {
        let unspecified = [LanguageId::UNSPECIFIED];
        let languages = if field.is_text() && !languages.is_empty() {
            languages
        } else {
            &unspecified[..]
        };
        Self {
            id: field.id.clone(),
            data_type: field.data_type.to_string(),
            multi: field.cardinality == Cardinality::Multi,
            boost: field.boost,
            names: languages
                .iter()
                .map(|l| (l.to_string(), schema.field_name(field, l)))
                .collect(),
        }
    }
}

/// Renders field rows as a table.
pub fn fields_table(rows: &[FieldRow]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec!["Field", "Type", "Multi", "Boost", "Language", "Backend name"]);

    for row in rows {
        for (i, (language, name)) in row.names.iter().enumerate() {
            let first = i == 0;
            let boost = row.boost.map(|b| b.to_string()).unwrap_or_default();
            table.add_row(vec![
                Cell::new(if first { row.id.as_str() } else { "" }),
                Cell::new(if first { row.data_type.as_str() } else { "" }),
                Cell::new(if first && row.multi { "yes" } else { "" }),
                Cell::new(if first { boost.as_str() } else { "" }),
                Cell::new(language),
                Cell::new(name),
            ]);
        }
    }
    table
}
