//! Configuration validation.
//!
//! Validates a loaded configuration and reports warnings for potential issues.

use std::fmt;

use lucent_query::DataType;

use crate::{Config, FieldConfig};

/// Field ids with a fixed backend name.
const RESERVED_FIELD_IDS: &[&str] = &[
    "search_api_id",
    "search_api_relevance",
    "search_api_language",
    "search_api_datasource",
];

/// A non-fatal warning about the configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigWarning {
    /// No fields are defined.
    NoFieldsDefined,
    /// Fulltext fields exist but no search language is configured.
    TextFieldsWithoutLanguages {
        /// Ids of the fulltext fields.
        fields: Vec<String>,
    },
    /// A field id shadows a reserved id with a fixed backend name.
    ReservedFieldId {
        /// The offending id.
        field: String,
    },
    /// A boost is configured on a field that is not fulltext.
    BoostOnNonTextField {
        /// Field id.
        field: String,
        /// The field's data type.
        data_type: DataType,
    },
    /// A boost is zero or negative.
    InvalidBoost {
        /// Field id.
        field: String,
        /// The configured boost.
        boost: f32,
    },
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoFieldsDefined => write!(f, "no fields are defined in configuration"),
            Self::TextFieldsWithoutLanguages { fields } => write!(
                f,
                "fulltext fields ({}) need a language, but [search] languages is empty",
                fields.join(", ")
            ),
            Self::ReservedFieldId { field } => {
                write!(f, "field '{field}' uses a reserved id and will be ignored")
            }
            Self::BoostOnNonTextField { field, data_type } => write!(
                f,
                "field '{field}' has a boost but is of type {data_type}; only text fields are boosted"
            ),
            Self::InvalidBoost { field, boost } => {
                write!(f, "field '{field}' has a non-positive boost: {boost}")
            }
        }
    }
}

/// Validates the configuration and returns any warnings.
pub fn validate_config(config: &Config) -> Vec<ConfigWarning> {
    let mut warnings = Vec::new();

    if config.fields.is_empty() {
        warnings.push(ConfigWarning::NoFieldsDefined);
        return warnings;
    }

    let text_fields: Vec<String> = config.text_fields().map(|f| f.id.clone()).collect();
    if !text_fields.is_empty() && config.search.languages.is_empty() {
        warnings.push(ConfigWarning::TextFieldsWithoutLanguages {
            fields: text_fields,
        });
    }

    for field in &config.fields {
        warnings.extend(validate_field(field));
    }

    warnings
}

/// Validates a single field definition.
fn validate_field(field: &FieldConfig) -> Vec<ConfigWarning> {
    let mut warnings = Vec::new();

    if RESERVED_FIELD_IDS.contains(&field.id.as_str()) {
        warnings.push(ConfigWarning::ReservedFieldId {
            field: field.id.clone(),
        });
    }

    if let Some(boost) = field.boost {
        if !field.data_type.is_text() {
            warnings.push(ConfigWarning::BoostOnNonTextField {
                field: field.id.clone(),
                data_type: field.data_type,
            });
        }
        if boost <= 0.0 {
            warnings.push(ConfigWarning::InvalidBoost {
                field: field.id.clone(),
                boost,
            });
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use lucent_query::LanguageId;

    use super::*;

    fn field(id: &str, data_type: DataType, boost: Option<f32>) -> FieldConfig {
        FieldConfig {
            id: id.into(),
            data_type,
            multi: false,
            boost,
            datasource: None,
            name: None,
        }
    }

    fn config_with(fields: Vec<FieldConfig>) -> Config {
        let mut config = Config {
            fields,
            ..Config::default()
        };
        config.search.languages = vec![LanguageId::new("en").unwrap()];
        config
    }

    #[test]
    fn test_no_fields() {
        let warnings = validate_config(&Config::default());
        assert_eq!(warnings, vec![ConfigWarning::NoFieldsDefined]);
    }

    #[test]
    fn test_valid_config_has_no_warnings() {
        let config = config_with(vec![
            field("title", DataType::Text, Some(3.0)),
            field("nid", DataType::Integer, None),
        ]);
        assert!(validate_config(&config).is_empty());
    }

    #[test]
    fn test_text_fields_without_languages() {
        let mut config = config_with(vec![field("body", DataType::Text, None)]);
        config.search.languages.clear();

        let warnings = validate_config(&config);
        assert_eq!(
            warnings,
            vec![ConfigWarning::TextFieldsWithoutLanguages {
                fields: vec!["body".into()]
            }]
        );
        assert!(warnings[0].to_string().contains("body"));
    }

    #[test]
    fn test_reserved_id() {
        let config = config_with(vec![field("search_api_language", DataType::String, None)]);
        let warnings = validate_config(&config);
        assert!(matches!(
            &warnings[..],
            [ConfigWarning::ReservedFieldId { field }] if field == "search_api_language"
        ));
    }

    #[test]
    fn test_boost_checks() {
        let config = config_with(vec![
            field("nid", DataType::Integer, Some(2.0)),
            field("title", DataType::Text, Some(0.0)),
        ]);
        let warnings = validate_config(&config);
        assert_eq!(warnings.len(), 2);
        assert!(matches!(
            warnings[0],
            ConfigWarning::BoostOnNonTextField {
                data_type: DataType::Integer,
                ..
            }
        ));
        assert!(matches!(warnings[1], ConfigWarning::InvalidBoost { .. }));
        assert_eq!(
            warnings[1].to_string(),
            "field 'title' has a non-positive boost: 0"
        );
    }
}
