//! Configuration system for lucent.
//!
//! lucent uses TOML configuration files named `.lucent.toml`. Configuration is resolved by
//! walking up the directory tree from the current working directory, collecting any
//! `.lucent.toml` files found, then loading `~/.lucent.toml` as the global config with lowest
//! precedence.
//!
//! A configuration describes one search index: how it is scoped on the backend (`[backend]`),
//! which defaults apply to searches (`[search]`), and which fields it holds (`[field.<id>]`).

#![warn(missing_docs)]

mod error;
mod merge;
mod parse;
mod sources;
mod templates;
mod validate;

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

pub use error::ConfigError;
use lucent_query::{Cardinality, Conjunction, DataType, LanguageId, ParseMode};
pub use merge::{ParsedConfig, merge_configs};
pub use parse::{
    RawBackendSettings, RawConfig, RawField, RawSearchSettings, parse_config_file,
    parse_config_str,
};
use serde::{Deserialize, Serialize};
pub use sources::{CONFIG_FILENAME, ConfigSource, ConfigSources, SourceKind, global_config_path};
pub use templates::{global_template, local_template};
pub use validate::ConfigWarning;
use validate::validate_config;

/// Top-level merged configuration for lucent.
///
/// This represents the fully resolved configuration after merging all discovered
/// `.lucent.toml` files according to precedence rules.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Backend naming and scoping settings.
    pub backend: BackendSettings,
    /// Search defaults.
    pub search: SearchSettings,
    /// Field definitions, sorted by id.
    pub fields: Vec<FieldConfig>,
    /// Directory containing the most specific config file.
    pub config_root: Option<PathBuf>,
}

impl Config {
    /// Loads configuration by discovering and merging all relevant `.lucent.toml` files.
    ///
    /// Returns `Ok(Config::default())` if no configuration files are found.
    pub fn load(cwd: &Path) -> Result<Self, ConfigError> {
        Self::load_from_files(&ConfigSources::discover(cwd).paths())
    }

    /// Loads configuration from a specific list of config file paths.
    ///
    /// Files should be provided in precedence order: highest precedence first.
    ///
    /// Returns `Ok(Config::default())` if the list is empty.
    pub fn load_from_files(files: &[PathBuf]) -> Result<Self, ConfigError> {
        if files.is_empty() {
            return Ok(Self::default());
        }

        let parsed: Vec<ParsedConfig> = files
            .iter()
            .map(|path| {
                let config = parse_config_file(path)?;
                Ok(ParsedConfig {
                    path: path.clone(),
                    config,
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        Ok(merge_configs(&parsed))
    }

    /// Looks up a field definition by id.
    pub fn field(&self, id: &str) -> Option<&FieldConfig> {
        self.fields.iter().find(|f| f.id == id)
    }

    /// Returns the fulltext fields in id order.
    pub fn text_fields(&self) -> impl Iterator<Item = &FieldConfig> {
        self.fields.iter().filter(|f| f.data_type.is_text())
    }

    /// Validates the configuration and returns any warnings.
    ///
    /// This checks for:
    /// - Empty configuration (no fields defined)
    /// - Fulltext fields without any configured language
    /// - Field ids that shadow reserved `search_api_*` ids
    /// - Boosts on non-text fields, and non-positive boosts
    pub fn validate(&self) -> Vec<ConfigWarning> {
        validate_config(self)
    }

    /// Serializes the effective settings to TOML format.
    ///
    /// The output has the same shape as a `.lucent.toml` file, so it can be used as a
    /// starting point for a new one.
    pub fn settings_to_toml(&self) -> Result<String, ConfigError> {
        let serializable = SerializableConfig {
            backend: &self.backend,
            search: &self.search,
            field: self
                .fields
                .iter()
                .map(|f| {
                    (
                        f.id.as_str(),
                        SerializableField {
                            data_type: f.data_type,
                            multi: f.multi,
                            boost: f.boost,
                            datasource: f.datasource.as_deref(),
                            name: f.name.as_deref(),
                        },
                    )
                })
                .collect(),
        };
        Ok(toml::to_string_pretty(&serializable)?)
    }
}

/// Backend naming and scoping settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct BackendSettings {
    /// Site name the scoping hash is derived from.
    pub site_name: String,
    /// Explicit scoping hash; derived from `site_name` when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site_hash: Option<String>,
    /// Index id every document is stored under.
    pub index_id: String,
    /// Backend field holding the item id.
    pub id_field: String,
    /// Backend field holding the item language.
    pub language_field: String,
    /// Whether the backend schema is foreign (not namespaced by index and site).
    pub foreign_schema: bool,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            site_name: String::from("default"),
            site_hash: None,
            index_id: String::from("default"),
            id_field: String::from("ss_search_api_id"),
            language_field: String::from("ss_search_api_language"),
            foreign_schema: false,
        }
    }
}

/// Search defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Parse mode for user keys.
    pub parse_mode: ParseMode,
    /// Conjunction between adjacent keys.
    pub conjunction: Conjunction,
    /// Languages searched when a query names none.
    pub languages: Vec<LanguageId>,
    /// Rows per request.
    pub limit: usize,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            parse_mode: ParseMode::Terms,
            conjunction: Conjunction::And,
            languages: Vec::new(),
            limit: 10,
        }
    }
}

/// A configured index field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldConfig {
    /// Field identifier, unique within the index.
    pub id: String,
    /// Data type.
    pub data_type: DataType,
    /// Whether the field holds multiple values.
    pub multi: bool,
    /// Query-time boost for fulltext fields.
    pub boost: Option<f32>,
    /// Datasource the field belongs to.
    pub datasource: Option<String>,
    /// Backend field name used verbatim instead of the derived one.
    pub name: Option<String>,
}

impl FieldConfig {
    /// Returns the field's cardinality.
    pub fn cardinality(&self) -> Cardinality {
        Cardinality::from_multi(self.multi)
    }
}

/// Borrowed view of the whole config for TOML output.
#[derive(Serialize)]
struct SerializableConfig<'a> {
    /// Backend settings.
    backend: &'a BackendSettings,
    /// Search defaults.
    search: &'a SearchSettings,
    /// Fields keyed by id (sorted for deterministic output).
    field: BTreeMap<&'a str, SerializableField<'a>>,
}

/// One field in TOML output.
#[derive(Serialize)]
struct SerializableField<'a> {
    /// Data type.
    #[serde(rename = "type")]
    data_type: DataType,
    /// Multi-valued flag.
    multi: bool,
    /// Boost, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    boost: Option<f32>,
    /// Datasource, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    datasource: Option<&'a str>,
    /// Explicit backend name, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
}
