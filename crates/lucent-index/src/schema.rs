//! Index schema snapshot.
//!
//! The compiler sees an index as a set of [`FieldDescriptor`]s, a set of active languages
//! and the scoping values that separate this index from others on the same backend core.
//! A [`Schema`] also owns the [`FieldNameMapper`] whose cache belongs to that field set.

use std::collections::{BTreeMap, BTreeSet};

use lucent_config::{BackendSettings, Config, FieldConfig};
use lucent_query::{Cardinality, DataType, LanguageId};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    mapper::{FieldNameMapper, special},
    site::site_hash,
};

/// An indexed field as seen by the compiler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Field identifier, unique within the index.
    pub id: String,
    /// Data type.
    #[serde(rename = "type")]
    pub data_type: DataType,
    /// Single or multi-valued.
    #[serde(default)]
    pub cardinality: Cardinality,
    /// Datasource scope; used for routing only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datasource: Option<String>,
    /// Query-time boost for fulltext fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boost: Option<f32>,
    /// Backend name used verbatim instead of the derived dynamic field name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend_name: Option<String>,
}

impl FieldDescriptor {
    /// Creates a single-valued field.
    pub fn new(id: impl Into<String>, data_type: DataType) -> Self {
        Self {
            id: id.into(),
            data_type,
            cardinality: Cardinality::Single,
            datasource: None,
            boost: None,
            backend_name: None,
        }
    }

    /// Marks the field as multi-valued.
    pub fn multi(mut self) -> Self {
        self.cardinality = Cardinality::Multi;
        self
    }

    /// Sets the query-time boost.
    pub fn with_boost(mut self, boost: f32) -> Self {
        self.boost = Some(boost);
        self
    }

    /// Sets the datasource scope.
    pub fn with_datasource(mut self, datasource: impl Into<String>) -> Self {
        self.datasource = Some(datasource.into());
        self
    }

    /// Pins the backend field name.
    pub fn with_backend_name(mut self, name: impl Into<String>) -> Self {
        self.backend_name = Some(name.into());
        self
    }

    /// Returns true for fulltext fields.
    pub fn is_text(&self) -> bool {
        self.data_type.is_text()
    }
}

impl From<&FieldConfig> for FieldDescriptor {
    fn from(config: &FieldConfig) -> Self {
        Self {
            id: config.id.clone(),
            data_type: config.data_type,
            cardinality: config.cardinality(),
            datasource: config.datasource.clone(),
            boost: config.boost,
            backend_name: config.name.clone(),
        }
    }
}

/// Source of field definitions and languages for one compilation.
pub trait SchemaProvider {
    /// Looks up a field by id.
    fn resolve_field(&self, field_id: &str) -> Option<FieldDescriptor>;

    /// Returns the languages searched when a query names none.
    fn active_languages(&self) -> BTreeSet<LanguageId>;
}

/// Values that scope queries to one index of one site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexScope {
    /// Index id.
    pub index_id: String,
    /// Site hash.
    pub site_hash: String,
}

impl IndexScope {
    /// Backend field holding the index id.
    pub const INDEX_FIELD: &'static str = "index_id";
    /// Backend field holding the site hash.
    pub const HASH_FIELD: &'static str = "hash";

    /// Builds the scope from backend settings, deriving the hash from the site name when
    /// none is pinned.
    pub fn from_backend(backend: &BackendSettings) -> Self {
        Self {
            index_id: backend.index_id.clone(),
            site_hash: backend
                .site_hash
                .clone()
                .unwrap_or_else(|| site_hash(&backend.site_name)),
        }
    }
}

/// A field-set snapshot for compiling queries against one index.
#[derive(Debug)]
pub struct Schema {
    /// Configured fields by id.
    fields: BTreeMap<String, FieldDescriptor>,
    /// Reserved fields by id; these shadow configured fields.
    special: BTreeMap<&'static str, FieldDescriptor>,
    /// Languages searched when a query names none.
    languages: Vec<LanguageId>,
    /// Index and site scoping values.
    scope: IndexScope,
    /// Whether the backend schema is foreign (not namespaced).
    foreign: bool,
    /// Name mapper with a cache tied to this field set.
    mapper: FieldNameMapper,
}

impl Default for Schema {
    fn default() -> Self {
        Self::with_backend(&BackendSettings::default())
    }
}

impl Schema {
    /// Creates an empty schema with default backend settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty schema for the given backend settings.
    pub fn with_backend(backend: &BackendSettings) -> Self {
        let special = [
            (special::ID, DataType::String),
            (special::LANGUAGE, DataType::String),
            (special::DATASOURCE, DataType::String),
            (special::RELEVANCE, DataType::Decimal),
        ]
        .into_iter()
        .map(|(id, data_type)| (id, FieldDescriptor::new(id, data_type)))
        .collect();

        Self {
            fields: BTreeMap::new(),
            special,
            languages: Vec::new(),
            scope: IndexScope::from_backend(backend),
            foreign: backend.foreign_schema,
            mapper: FieldNameMapper::from_backend(backend),
        }
    }

    /// Builds a schema from a loaded configuration.
    pub fn from_config(config: &Config) -> Self {
        let mut schema = Self::with_backend(&config.backend);
        schema.languages.clone_from(&config.search.languages);
        schema
            .fields
            .extend(config.fields.iter().map(|f| (f.id.clone(), FieldDescriptor::from(f))));
        debug!(
            fields = schema.fields.len(),
            languages = schema.languages.len(),
            foreign = schema.foreign,
            "schema built from config"
        );
        schema
    }

    /// Adds a field, builder style.
    pub fn with_field(mut self, field: FieldDescriptor) -> Self {
        self.add_field(field);
        self
    }

    /// Sets the active languages, builder style.
    pub fn with_languages(mut self, languages: impl IntoIterator<Item = LanguageId>) -> Self {
        self.set_languages(languages);
        self
    }

    /// Marks the backend schema as foreign, builder style.
    pub fn with_foreign(mut self, foreign: bool) -> Self {
        self.foreign = foreign;
        self
    }

    /// Adds or replaces a field and invalidates cached names.
    pub fn add_field(&mut self, field: FieldDescriptor) {
        self.fields.insert(field.id.clone(), field);
        self.mapper.reset();
    }

    /// Removes a field and invalidates cached names.
    pub fn remove_field(&mut self, id: &str) -> Option<FieldDescriptor> {
        let removed = self.fields.remove(id);
        if removed.is_some() {
            self.mapper.reset();
        }
        removed
    }

    /// Replaces the active languages and invalidates cached names.
    pub fn set_languages(&mut self, languages: impl IntoIterator<Item = LanguageId>) {
        self.languages = languages.into_iter().collect();
        self.mapper.reset();
    }

    /// Looks up a field by id, reserved ids first.
    pub fn field(&self, id: &str) -> Option<&FieldDescriptor> {
        self.special.get(id).or_else(|| self.fields.get(id))
    }

    /// Returns the configured fields in id order.
    pub fn fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.values()
    }

    /// Returns the configured fulltext fields in id order.
    pub fn text_fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.values().filter(|f| f.is_text())
    }

    /// Returns the active languages.
    pub fn languages(&self) -> &[LanguageId] {
        &self.languages
    }

    /// Returns the index scoping values.
    pub fn scope(&self) -> &IndexScope {
        &self.scope
    }

    /// Returns true when the backend schema is foreign.
    pub fn is_foreign(&self) -> bool {
        self.foreign
    }

    /// Returns the field name mapper.
    pub fn mapper(&self) -> &FieldNameMapper {
        &self.mapper
    }

    /// Returns the backend name of a field in a language.
    pub fn field_name(&self, field: &FieldDescriptor, language: &LanguageId) -> String {
        self.mapper.field_name(field, language)
    }
}

impl SchemaProvider for Schema {
    fn resolve_field(&self, field_id: &str) -> Option<FieldDescriptor> {
        self.field(field_id).cloned()
    }

    fn active_languages(&self) -> BTreeSet<LanguageId> {
        self.languages.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use lucent_config::SearchSettings;

    use super::*;

    fn en() -> LanguageId {
        LanguageId::new("en").unwrap()
    }

    #[test]
    fn from_config_copies_fields_and_languages() {
        let config = Config {
            search: SearchSettings {
                languages: vec![en()],
                ..SearchSettings::default()
            },
            fields: vec![FieldConfig {
                id: "title".into(),
                data_type: DataType::Text,
                multi: true,
                boost: Some(3.0),
                datasource: Some("entity:node".into()),
                name: None,
            }],
            ..Config::default()
        };

        let schema = Schema::from_config(&config);

        let title = schema.field("title").unwrap();
        assert_eq!(title.cardinality, Cardinality::Multi);
        assert_eq!(title.boost, Some(3.0));
        assert_eq!(schema.languages(), &[en()]);
        assert_eq!(schema.field_name(title, &en()), "tm_X3b_en_title");
        assert_eq!(schema.scope().index_id, "default");
        assert_eq!(schema.scope().site_hash, site_hash("default"));
    }

    #[test]
    fn pinned_site_hash_wins() {
        let backend = BackendSettings {
            site_hash: Some("abc123".into()),
            ..BackendSettings::default()
        };
        assert_eq!(IndexScope::from_backend(&backend).site_hash, "abc123");
    }

    #[test]
    fn reserved_ids_resolve() {
        let schema = Schema::new().with_field(FieldDescriptor::new(
            "search_api_language",
            DataType::Integer,
        ));

        let language = schema.resolve_field("search_api_language").unwrap();
        assert_eq!(language.data_type, DataType::String);
        assert_eq!(schema.field_name(&language, &en()), "ss_search_api_language");
        assert!(schema.resolve_field("nope").is_none());
    }

    #[test]
    fn schema_changes_reset_the_name_cache() {
        let mut schema = Schema::new()
            .with_field(FieldDescriptor::new("body", DataType::Text))
            .with_languages([en()]);
        let body = schema.field("body").cloned().unwrap();

        schema.field_name(&body, &en());
        assert_eq!(schema.mapper().cached(), 1);

        schema.add_field(FieldDescriptor::new("body", DataType::Text).multi());
        assert_eq!(schema.mapper().cached(), 0);

        let body = schema.field("body").cloned().unwrap();
        assert_eq!(schema.field_name(&body, &en()), "tm_X3b_en_body");
        assert!(schema.remove_field("body").is_some());
        assert_eq!(schema.mapper().cached(), 0);
    }

    #[test]
    fn provider_reports_languages() {
        let de = LanguageId::new("de").unwrap();
        let schema = Schema::new().with_languages([en(), de.clone(), en()]);
        assert_eq!(
            schema.active_languages(),
            BTreeSet::from([de, en()])
        );
        assert_eq!(schema.text_fields().count(), 0);
    }
}
