//! Configuration file parsing.
//!
//! Parses individual `.lucent.toml` files into intermediate `RawConfig` structures
//! that preserve the optional nature of all fields before merging.

use std::{collections::BTreeMap, fs, path::Path};

use lucent_query::{Conjunction, DataType, LanguageId, ParseMode};
use serde::Deserialize;
use serde_with::{OneOrMany, serde_as};
#[cfg(test)]
use toml::de::Error as TomlError;

use crate::ConfigError;

/// Raw configuration as parsed directly from a TOML file.
///
/// All fields are optional to support partial configs that will be merged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawConfig {
    /// When true, stop discovery here - ignore parent and global configs.
    pub root: Option<bool>,
    /// Backend naming and scoping section.
    pub backend: Option<RawBackendSettings>,
    /// Search defaults section.
    pub search: Option<RawSearchSettings>,
    /// Field definitions: id -> field config.
    pub field: Option<BTreeMap<String, RawField>>,
}

/// Raw backend settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawBackendSettings {
    /// Human-readable site name the site hash is derived from.
    pub site_name: Option<String>,
    /// Explicit site hash, overriding the derived one.
    pub site_hash: Option<String>,
    /// Index id written to every document.
    pub index_id: Option<String>,
    /// Backend field holding the item id.
    pub id_field: Option<String>,
    /// Backend field holding the item language.
    pub language_field: Option<String>,
    /// Whether the target is a foreign, non-namespaced schema.
    pub foreign_schema: Option<bool>,
}

/// Raw search settings.
#[serde_as]
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawSearchSettings {
    /// Default parse mode for user keys.
    pub parse_mode: Option<ParseMode>,
    /// Default conjunction between adjacent keys.
    pub conjunction: Option<Conjunction>,
    /// Languages searched when a query names none.
    /// Accepts either a single string or an array of strings.
    #[serde_as(as = "Option<OneOrMany<_>>")]
    pub languages: Option<Vec<LanguageId>>,
    /// Default number of rows per request.
    pub limit: Option<usize>,
}

/// Raw field definition from TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct RawField {
    /// Data type of the field.
    #[serde(rename = "type")]
    pub data_type: DataType,
    /// Whether the field holds multiple values (defaults to false).
    pub multi: Option<bool>,
    /// Query-time boost for fulltext fields.
    pub boost: Option<f32>,
    /// Datasource the field belongs to.
    pub datasource: Option<String>,
    /// Backend field name used verbatim instead of the derived one.
    pub name: Option<String>,
}

/// Parses a configuration file from disk.
pub fn parse_config_file(path: &Path) -> Result<RawConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;

    parse_config_str(&contents, path)
}

/// Parses configuration from a TOML string.
///
/// The `path` parameter is used for error reporting.
pub fn parse_config_str(contents: &str, path: &Path) -> Result<RawConfig, ConfigError> {
    toml::from_str(contents).map_err(|source| ConfigError::ParseToml {
        path: path.to_path_buf(),
        source,
    })
}

/// Parses configuration from a TOML string without path context.
#[cfg(test)]
pub fn parse_config(contents: &str) -> Result<RawConfig, TomlError> {
    toml::from_str(contents)
}

/// Checks if a config file has `root = true` set.
///
/// Returns false if the file cannot be read or parsed.
pub fn is_root_config(path: &Path) -> bool {
    let Ok(contents) = fs::read_to_string(path) else {
        return false;
    };
    let Ok(config) = toml::from_str::<RawConfig>(&contents) else {
        return false;
    };
    config.root == Some(true)
}
