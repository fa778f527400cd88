//! Configuration merging.
//!
//! Merges multiple `RawConfig` files into a single resolved `Config`,
//! applying precedence rules.

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use crate::{
    BackendSettings, Config, FieldConfig, SearchSettings,
    parse::{RawBackendSettings, RawConfig, RawField, RawSearchSettings},
};

/// A parsed config file with its source path.
pub struct ParsedConfig {
    /// Path to the config file.
    pub path: PathBuf,
    /// Parsed raw configuration.
    pub config: RawConfig,
}

/// Merges multiple configuration files into a single resolved `Config`.
///
/// Configs should be provided in precedence order: highest precedence first (closest to CWD),
/// lowest precedence last (global config).
///
/// Merge rules:
/// - Scalar settings: first defined value wins (highest precedence)
/// - `languages`: first defined list wins as a whole
/// - Fields: merged by id, first definition wins completely
pub fn merge_configs(configs: &[ParsedConfig]) -> Config {
    if configs.is_empty() {
        return Config::default();
    }

    let backend = merge_backend_settings(configs);
    let search = merge_search_settings(configs);
    let fields = merge_fields(configs);
    let config_root = configs
        .first()
        .and_then(|c| c.path.parent())
        .map(Path::to_path_buf);

    Config {
        backend,
        search,
        fields,
        config_root,
    }
}

/// Merges backend settings, taking first defined value for each field.
fn merge_backend_settings(configs: &[ParsedConfig]) -> BackendSettings {
    let mut result = BackendSettings::default();

    // Lowest precedence first so higher precedence overwrites
    for parsed in configs.iter().rev() {
        if let Some(ref backend) = parsed.config.backend {
            apply_raw_backend(&mut result, backend);
        }
    }

    result
}

/// Applies raw backend settings to result, overwriting any present values.
fn apply_raw_backend(result: &mut BackendSettings, raw: &RawBackendSettings) {
    if let Some(ref v) = raw.site_name {
        result.site_name.clone_from(v);
    }
    if let Some(ref v) = raw.site_hash {
        result.site_hash = Some(v.clone());
    }
    if let Some(ref v) = raw.index_id {
        result.index_id.clone_from(v);
    }
    if let Some(ref v) = raw.id_field {
        result.id_field.clone_from(v);
    }
    if let Some(ref v) = raw.language_field {
        result.language_field.clone_from(v);
    }
    if let Some(v) = raw.foreign_schema {
        result.foreign_schema = v;
    }
}

/// Merges search settings.
fn merge_search_settings(configs: &[ParsedConfig]) -> SearchSettings {
    let mut result = SearchSettings::default();

    for parsed in configs.iter().rev() {
        if let Some(ref search) = parsed.config.search {
            apply_raw_search(&mut result, search);
        }
    }

    result
}

/// Applies raw search settings to result.
fn apply_raw_search(result: &mut SearchSettings, raw: &RawSearchSettings) {
    if let Some(v) = raw.parse_mode {
        result.parse_mode = v;
    }
    if let Some(v) = raw.conjunction {
        result.conjunction = v;
    }
    if let Some(ref v) = raw.languages {
        result.languages.clone_from(v);
    }
    if let Some(v) = raw.limit {
        result.limit = v;
    }
}

/// Merges fields from all configs.
///
/// Fields are merged by id - first definition wins completely.
fn merge_fields(configs: &[ParsedConfig]) -> Vec<FieldConfig> {
    let mut seen: HashMap<&str, FieldConfig> = HashMap::new();

    // Precedence order (highest first) - first definition wins
    for parsed in configs {
        let Some(ref fields) = parsed.config.field else {
            continue;
        };

        for (id, raw_field) in fields {
            seen.entry(id.as_str())
                .or_insert_with(|| convert_field(id, raw_field));
        }
    }

    let mut fields: Vec<FieldConfig> = seen.into_values().collect();
    fields.sort_by(|a, b| a.id.cmp(&b.id));
    fields
}

/// Converts a raw field to the final type with defaults applied.
fn convert_field(id: &str, raw: &RawField) -> FieldConfig {
    FieldConfig {
        id: id.to_string(),
        data_type: raw.data_type,
        multi: raw.multi.unwrap_or(false),
        boost: raw.boost,
        datasource: raw.datasource.clone(),
        name: raw.name.clone(),
    }
}

#[cfg(test)]
mod tests {
    use lucent_query::{Conjunction, DataType, LanguageId, ParseMode};

    use super::*;
    use crate::parse::parse_config_str;

    fn parsed(path: &str, toml: &str) -> ParsedConfig {
        ParsedConfig {
            path: PathBuf::from(path),
            config: parse_config_str(toml, Path::new("test")).unwrap(),
        }
    }

    #[test]
    fn test_merge_empty_configs() {
        let result = merge_configs(&[]);
        assert_eq!(result.search.limit, 10);
        assert!(result.fields.is_empty());
        assert!(result.config_root.is_none());
    }

    #[test]
    fn test_merge_single_config() {
        let result = merge_configs(&[parsed(
            "/site/.lucent.toml",
            r#"
[backend]
index_id = "content"

[search]
limit = 25

[field.title]
type = "text"
boost = 5.0
"#,
        )]);

        assert_eq!(result.backend.index_id, "content");
        assert_eq!(result.backend.site_name, "default");
        assert_eq!(result.search.limit, 25);
        assert_eq!(result.fields.len(), 1);
        assert_eq!(result.fields[0].id, "title");
        assert!(!result.fields[0].multi);
        assert_eq!(result.fields[0].boost, Some(5.0));
        assert_eq!(result.config_root, Some(PathBuf::from("/site")));
    }

    #[test]
    fn test_merge_scalar_override() {
        let high_prec = parsed(
            "/site/project/.lucent.toml",
            r#"
[search]
parse_mode = "phrase"
"#,
        );
        let low_prec = parsed(
            "/site/.lucent.toml",
            r#"
[search]
parse_mode = "edismax"
conjunction = "OR"

[backend]
site_name = "example.org"
"#,
        );

        let result = merge_configs(&[high_prec, low_prec]);

        assert_eq!(result.search.parse_mode, ParseMode::Phrase);
        assert_eq!(result.search.conjunction, Conjunction::Or);
        assert_eq!(result.backend.site_name, "example.org");
        assert_eq!(result.config_root, Some(PathBuf::from("/site/project")));
    }

    #[test]
    fn test_merge_languages_first_list_wins() {
        let high_prec = parsed("/a/b/.lucent.toml", "[search]\nlanguages = \"de\"\n");
        let low_prec = parsed("/a/.lucent.toml", "[search]\nlanguages = [\"en\", \"fr\"]\n");

        let result = merge_configs(&[high_prec, low_prec]);

        assert_eq!(result.search.languages, vec![LanguageId::new("de").unwrap()]);
    }

    #[test]
    fn test_merge_fields_first_wins() {
        let high_prec = parsed(
            "/a/b/.lucent.toml",
            r#"
[field.body]
type = "text"
multi = true
"#,
        );
        let low_prec = parsed(
            "/a/.lucent.toml",
            r#"
[field.body]
type = "string"
boost = 2.0

[field.created]
type = "date"
"#,
        );

        let result = merge_configs(&[high_prec, low_prec]);

        assert_eq!(result.fields.len(), 2);
        assert_eq!(result.fields[0].id, "body");
        assert_eq!(result.fields[0].data_type, DataType::Text);
        assert!(result.fields[0].multi);
        // First definition wins completely, the boost is not inherited
        assert!(result.fields[0].boost.is_none());
        assert_eq!(result.fields[1].id, "created");
    }
}
