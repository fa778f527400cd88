//! Request assembly.
//!
//! [`QueryAssembler`] turns an abstract [`SearchQuery`] into a [`SearchRequest`]: the main
//! query from the keys, filter queries from scoping, conditions and location filters, and
//! the sort, facet and grouping parameters.

use std::fmt;

use lucent_config::SearchSettings;
use lucent_query::{
    ConditionGroup, DataType, KeyExpression, LanguageId, Operator, ParseMode, parse_keys,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{
    CompileError,
    compile::{ConditionCompiler, FilterFragment, KeyFlattener, TargetField},
    escape::escape_term,
    mapper::special,
    schema::{FieldDescriptor, IndexScope, Schema},
    spatial::{LocationFilter, SkipSpatial, SpatialQueries, geofilt},
};

/// Query matching every document.
pub const MATCH_ALL: &str = "*:*";

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Ascending.
    #[default]
    Asc,
    /// Descending.
    Desc,
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        })
    }
}

/// One sort criterion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sort {
    /// Field id.
    pub field: String,
    /// Direction.
    #[serde(default)]
    pub order: SortOrder,
}

impl Sort {
    /// Creates a sort criterion.
    pub fn new(field: impl Into<String>, order: SortOrder) -> Self {
        Self {
            field: field.into(),
            order,
        }
    }
}

/// How selected values of a facet combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacetOperator {
    /// Selected values narrow the result; counts follow all filters.
    #[default]
    And,
    /// Selected values widen the result; counts ignore the facet's own filter.
    Or,
}

/// A facet request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Facet {
    /// Field id.
    pub field: String,
    /// Maximum number of values returned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    /// Minimum count for a value to be returned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_count: Option<u32>,
    /// Whether to count documents without a value.
    #[serde(default)]
    pub missing: bool,
    /// Combination of selected values.
    #[serde(default)]
    pub operator: FacetOperator,
}

impl Facet {
    /// Creates an AND facet with backend defaults.
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            limit: None,
            min_count: None,
            missing: false,
            operator: FacetOperator::And,
        }
    }

    /// Tag under which the filter for this facet's selection must be registered.
    pub fn exclusion_tag(&self) -> String {
        format!("facet:{}", self.field)
    }
}

/// Result grouping.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Grouping {
    /// Field ids to group by.
    pub fields: Vec<String>,
    /// Documents per group.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    /// Sort within each group.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sort: Vec<Sort>,
}

/// A backend-independent search query.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchQuery {
    /// Parsed fulltext keys.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keys: Option<KeyExpression>,
    /// Raw user input, parsed with the query's parse mode when `keys` is absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Fulltext field ids to search; empty means every fulltext field.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<String>,
    /// Parse mode; the assembler's default when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse_mode: Option<ParseMode>,
    /// Filter conditions.
    pub conditions: ConditionGroup,
    /// Languages to search; the schema's languages when empty.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub languages: Vec<LanguageId>,
    /// Sort criteria.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sorts: Vec<Sort>,
    /// Facet requests.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub facets: Vec<Facet>,
    /// Result grouping.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grouping: Option<Grouping>,
    /// Radius filters.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub locations: Vec<LocationFilter>,
    /// Index of the first result.
    pub offset: usize,
    /// Results per page; the assembler's default when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
    /// Skips the index and site scoping filter.
    pub skip_scoping: bool,
}

impl SearchQuery {
    /// Creates an empty query matching everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets raw user keys.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Sets parsed keys.
    pub fn with_keys(mut self, keys: KeyExpression) -> Self {
        self.keys = Some(keys);
        self
    }

    /// Sets the filter conditions.
    pub fn with_conditions(mut self, conditions: ConditionGroup) -> Self {
        self.conditions = conditions;
        self
    }

    /// Adds a sort criterion.
    pub fn sort(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        self.sorts.push(Sort::new(field, order));
        self
    }

    /// Adds a facet.
    pub fn facet(mut self, facet: Facet) -> Self {
        self.facets.push(facet);
        self
    }
}

/// A compiled search request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
    /// Main query.
    pub q: String,
    /// Filter queries in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fq: Vec<String>,
    /// Sort clause, e.g. `score desc,ds_created asc`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
    /// Index of the first result.
    pub start: usize,
    /// Results per page.
    pub rows: usize,
    /// Returned fields.
    pub fl: Vec<String>,
    /// Facet parameters.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub facet: Vec<(String, String)>,
    /// Grouping parameters.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub group: Vec<(String, String)>,
}

impl SearchRequest {
    /// Returns the request as ordered backend parameters. Repeated keys are kept.
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = vec![(String::from("q"), self.q.clone())];
        params.extend(self.fq.iter().map(|fq| (String::from("fq"), fq.clone())));
        if let Some(sort) = &self.sort {
            params.push((String::from("sort"), sort.clone()));
        }
        params.push((String::from("start"), self.start.to_string()));
        params.push((String::from("rows"), self.rows.to_string()));
        params.push((String::from("fl"), self.fl.join(",")));
        params.extend(self.facet.iter().cloned());
        params.extend(self.group.iter().cloned());
        params
    }

    /// Serializes the request as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Assembles search requests against one schema.
#[derive(Clone)]
pub struct QueryAssembler<'a> {
    /// Field set, languages and scoping.
    schema: &'a Schema,
    /// Parse mode, conjunction and page size defaults.
    settings: SearchSettings,
    /// Builder for location conditions.
    spatial: &'a dyn SpatialQueries,
}

impl<'a> QueryAssembler<'a> {
    /// Creates an assembler with default search settings.
    pub fn new(schema: &'a Schema) -> Self {
        Self {
            schema,
            settings: SearchSettings::default(),
            spatial: &SkipSpatial,
        }
    }

    /// Sets the search defaults.
    pub fn with_settings(mut self, settings: SearchSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Sets the builder for location conditions.
    pub fn with_spatial(mut self, spatial: &'a dyn SpatialQueries) -> Self {
        self.spatial = spatial;
        self
    }

    /// Assembles a request.
    pub fn assemble(&self, query: &SearchQuery) -> Result<SearchRequest, CompileError> {
        let languages = if query.languages.is_empty() {
            self.schema.languages().to_vec()
        } else {
            query.languages.clone()
        };
        let mode = query.parse_mode.unwrap_or(self.settings.parse_mode);

        let q = self.main_query(query, &languages, mode)?;

        let mut fq = Vec::new();
        if !query.skip_scoping && !self.schema.is_foreign() {
            fq.push(self.scope_filter());
        }
        let fragments = ConditionCompiler::new(self.schema)
            .with_spatial(self.spatial)
            .compile(&query.conditions, &languages)?;
        fq.extend(fragments.iter().map(FilterFragment::render));
        for location in &query.locations {
            fq.push(self.location_filter(location)?);
        }

        let request = SearchRequest {
            q,
            fq,
            sort: self.sort_clause(&query.sorts, &languages)?,
            start: query.offset,
            rows: query.limit.unwrap_or(self.settings.limit),
            fl: self.return_fields(),
            facet: self.facet_params(&query.facets, &languages)?,
            group: match &query.grouping {
                Some(grouping) => self.group_params(grouping, &languages)?,
                None => Vec::new(),
            },
        };
        debug!(
            q = %request.q,
            filters = request.fq.len(),
            facets = query.facets.len(),
            "request assembled"
        );
        Ok(request)
    }

    /// Flattens the keys over the target fields, or matches everything without keys.
    fn main_query(
        &self,
        query: &SearchQuery,
        languages: &[LanguageId],
        mode: ParseMode,
    ) -> Result<String, CompileError> {
        let parsed = match (&query.keys, &query.text) {
            (None, Some(text)) => parse_keys(text, mode, self.settings.conjunction)?,
            _ => None,
        };
        let Some(keys) = query.keys.as_ref().or(parsed.as_ref()) else {
            return Ok(MATCH_ALL.to_string());
        };

        let targets = self.target_fields(&query.fields, languages)?;
        let q = KeyFlattener::new(&targets, mode).flatten(keys)?;
        Ok(if q.is_empty() { MATCH_ALL.to_string() } else { q })
    }

    /// Returns the boosted language-specific names of the fulltext fields to search.
    fn target_fields(
        &self,
        ids: &[String],
        languages: &[LanguageId],
    ) -> Result<Vec<TargetField>, CompileError> {
        let fields: Vec<&FieldDescriptor> = if ids.is_empty() {
            self.schema.text_fields().collect()
        } else {
            ids.iter()
                .map(|id| self.field(id))
                .collect::<Result<_, _>>()?
        };

        let mut targets: Vec<TargetField> = Vec::new();
        for field in fields {
            if !field.is_text() {
                warn!(field = %field.id, data_type = %field.data_type, "not a fulltext field, ignored for keys");
                continue;
            }
            if languages.is_empty() {
                return Err(CompileError::MissingLanguageContext {
                    field: field.id.clone(),
                });
            }
            for language in languages {
                let name = self.schema.mapper().resolve_with_fallback(field, language);
                let target = TargetField::boosted(&name, field.boost);
                if !targets.contains(&target) {
                    targets.push(target);
                }
            }
        }
        Ok(targets)
    }

    /// Builds the filter restricting results to this index and site.
    fn scope_filter(&self) -> String {
        let scope = self.schema.scope();
        format!(
            "+{}:{} +{}:{}",
            IndexScope::INDEX_FIELD,
            escape_term(&scope.index_id),
            IndexScope::HASH_FIELD,
            escape_term(&scope.site_hash)
        )
    }

    /// Builds a `geofilt` filter query for a radius filter.
    fn location_filter(&self, location: &LocationFilter) -> Result<String, CompileError> {
        let field = self.field(&location.field)?;
        if field.data_type != DataType::Location {
            return Err(CompileError::unsupported(
                &field.id,
                field.data_type,
                Operator::Lte,
            ));
        }
        let name = self.schema.field_name(field, &LanguageId::UNSPECIFIED);
        Ok(geofilt(
            &name,
            location.lat,
            location.lon,
            location.radius_km,
        ))
    }

    /// Joins sort criteria into a sort clause.
    fn sort_clause(
        &self,
        sorts: &[Sort],
        languages: &[LanguageId],
    ) -> Result<Option<String>, CompileError> {
        if sorts.is_empty() {
            return Ok(None);
        }
        let clauses = sorts
            .iter()
            .map(|sort| Ok(format!("{} {}", self.name(&sort.field, languages)?, sort.order)))
            .collect::<Result<Vec<_>, CompileError>>()?;
        Ok(Some(clauses.join(",")))
    }

    /// Builds facet parameters.
    ///
    /// OR facets exclude filters tagged with [`Facet::exclusion_tag`].
    fn facet_params(
        &self,
        facets: &[Facet],
        languages: &[LanguageId],
    ) -> Result<Vec<(String, String)>, CompileError> {
        if facets.is_empty() {
            return Ok(Vec::new());
        }

        let mut params = vec![(String::from("facet"), String::from("true"))];
        for facet in facets {
            let name = self.name(&facet.field, languages)?;
            let value = match facet.operator {
                FacetOperator::And => name.clone(),
                FacetOperator::Or => format!("{{!ex={}}}{name}", facet.exclusion_tag()),
            };
            params.push((String::from("facet.field"), value));
            if let Some(limit) = facet.limit {
                params.push((format!("f.{name}.facet.limit"), limit.to_string()));
            }
            if let Some(min_count) = facet.min_count {
                params.push((format!("f.{name}.facet.mincount"), min_count.to_string()));
            }
            if facet.missing {
                params.push((format!("f.{name}.facet.missing"), String::from("true")));
            }
        }
        Ok(params)
    }

    /// Builds grouping parameters.
    fn group_params(
        &self,
        grouping: &Grouping,
        languages: &[LanguageId],
    ) -> Result<Vec<(String, String)>, CompileError> {
        if grouping.fields.is_empty() {
            return Ok(Vec::new());
        }

        let mut params = vec![(String::from("group"), String::from("true"))];
        for id in &grouping.fields {
            params.push((String::from("group.field"), self.name(id, languages)?));
        }
        if let Some(limit) = grouping.limit {
            params.push((String::from("group.limit"), limit.to_string()));
        }
        if let Some(sort) = self.sort_clause(&grouping.sort, languages)? {
            params.push((String::from("group.sort"), sort));
        }
        Ok(params)
    }

    /// Returns the fields every request asks for.
    fn return_fields(&self) -> Vec<String> {
        let mapper = self.schema.mapper();
        [special::ID, special::RELEVANCE, special::LANGUAGE]
            .into_iter()
            .map(|id| mapper.special_name(id).unwrap_or(id).to_string())
            .collect()
    }

    /// Looks up a field by id.
    fn field(&self, id: &str) -> Result<&'a FieldDescriptor, CompileError> {
        self.schema
            .field(id)
            .ok_or_else(|| CompileError::UnknownField(id.to_string()))
    }

    /// Returns the backend name of a field for sorting, faceting or grouping.
    ///
    /// Fulltext fields resolve in the first active language.
    fn name(&self, id: &str, languages: &[LanguageId]) -> Result<String, CompileError> {
        let field = self.field(id)?;
        if !field.is_text() {
            return Ok(self.schema.field_name(field, &LanguageId::UNSPECIFIED));
        }
        let language = languages
            .first()
            .ok_or_else(|| CompileError::MissingLanguageContext {
                field: field.id.clone(),
            })?;
        Ok(self.schema.field_name(field, language))
    }
}

#[cfg(test)]
mod tests {
    use lucent_config::BackendSettings;
    use lucent_query::{Condition, Conjunction};

    use super::*;

    fn en() -> LanguageId {
        LanguageId::new("en").unwrap()
    }

    fn schema() -> Schema {
        let backend = BackendSettings {
            index_id: "main".into(),
            site_hash: Some("abc123".into()),
            ..BackendSettings::default()
        };
        Schema::with_backend(&backend)
            .with_field(FieldDescriptor::new("title", DataType::Text).with_boost(5.0))
            .with_field(FieldDescriptor::new("body", DataType::Text))
            .with_field(FieldDescriptor::new("type", DataType::String))
            .with_field(FieldDescriptor::new("created", DataType::Date))
            .with_field(FieldDescriptor::new("store", DataType::Location))
            .with_languages([en()])
    }

    #[test]
    fn empty_query_matches_everything() {
        let schema = schema();
        let request = QueryAssembler::new(&schema)
            .assemble(&SearchQuery::new())
            .unwrap();

        assert_eq!(request.q, MATCH_ALL);
        assert_eq!(
            request.fq,
            vec![
                "+index_id:main +hash:abc123".to_string(),
                "ss_search_api_language:\"en\"".to_string(),
            ]
        );
        assert_eq!(request.sort, None);
        assert_eq!(request.rows, 10);
        assert_eq!(
            request.fl,
            vec!["ss_search_api_id", "score", "ss_search_api_language"]
        );
    }

    #[test]
    fn keys_search_every_fulltext_field() {
        let schema = schema();
        let request = QueryAssembler::new(&schema)
            .assemble(&SearchQuery::new().with_text("rust"))
            .unwrap();
        assert_eq!(
            request.q,
            "+(ts_X3b_en_body:(+rust)^1 ts_X3b_en_title:(+rust)^5)"
        );
    }

    #[test]
    fn keys_respect_field_selection_and_mode() {
        let schema = schema();
        let query = SearchQuery {
            fields: vec!["title".into()],
            parse_mode: Some(ParseMode::Phrase),
            ..SearchQuery::new().with_text("error handling")
        };
        let request = QueryAssembler::new(&schema).assemble(&query).unwrap();
        assert_eq!(request.q, "+(ts_X3b_en_title:(+\"error handling\")^5)");
    }

    #[test]
    fn settings_provide_defaults() {
        let schema = schema();
        let settings = SearchSettings {
            conjunction: Conjunction::Or,
            limit: 25,
            ..SearchSettings::default()
        };
        let query = SearchQuery {
            fields: vec!["body".into()],
            ..SearchQuery::new().with_text("a b")
        };
        let request = QueryAssembler::new(&schema)
            .with_settings(settings)
            .assemble(&query)
            .unwrap();
        assert_eq!(request.q, "+(ts_X3b_en_body:(a b)^1)");
        assert_eq!(request.rows, 25);
    }

    #[test]
    fn keys_need_languages() {
        let schema = schema().with_languages([]);
        let err = QueryAssembler::new(&schema)
            .assemble(&SearchQuery::new().with_text("rust"))
            .unwrap_err();
        assert!(matches!(err, CompileError::MissingLanguageContext { .. }));
    }

    #[test]
    fn keys_parse_errors_propagate() {
        let schema = schema();
        let err = QueryAssembler::new(&schema)
            .assemble(&SearchQuery::new().with_text("(rust"))
            .unwrap_err();
        assert!(matches!(err, CompileError::Query(_)));
    }

    #[test]
    fn conditions_and_tags_become_filters() {
        let schema = schema();
        let query = SearchQuery::new()
            .with_conditions(
                ConditionGroup::and().group(
                    ConditionGroup::or()
                        .tagged("facet:type")
                        .condition(Condition::eq("type", "article"))
                        .condition(Condition::eq("type", "page")),
                ),
            )
            .facet(Facet {
                operator: FacetOperator::Or,
                limit: Some(5),
                ..Facet::new("type")
            });
        let request = QueryAssembler::new(&schema).assemble(&query).unwrap();

        assert_eq!(
            request.fq[1],
            "{!tag=facet:type}(ss_type:\"article\" ss_type:\"page\")"
        );
        assert_eq!(
            request.facet,
            vec![
                ("facet".to_string(), "true".to_string()),
                (
                    "facet.field".to_string(),
                    "{!ex=facet:type}ss_type".to_string()
                ),
                ("f.ss_type.facet.limit".to_string(), "5".to_string()),
            ]
        );
    }

    #[test]
    fn foreign_and_unscoped_queries() {
        let foreign = schema().with_foreign(true);
        let request = QueryAssembler::new(&foreign)
            .assemble(&SearchQuery::new())
            .unwrap();
        assert!(request.fq.is_empty());

        let schema = schema();
        let query = SearchQuery {
            skip_scoping: true,
            ..SearchQuery::new()
        };
        let request = QueryAssembler::new(&schema).assemble(&query).unwrap();
        assert_eq!(request.fq, vec!["ss_search_api_language:\"en\"".to_string()]);
    }

    #[test]
    fn sorts_map_to_backend_names() {
        let schema = schema();
        let query = SearchQuery::new()
            .sort("search_api_relevance", SortOrder::Desc)
            .sort("created", SortOrder::Asc)
            .sort("title", SortOrder::Asc);
        let request = QueryAssembler::new(&schema).assemble(&query).unwrap();
        assert_eq!(
            request.sort.as_deref(),
            Some("score desc,ds_created asc,ts_X3b_en_title asc")
        );

        let err = QueryAssembler::new(&schema)
            .assemble(&SearchQuery::new().sort("nope", SortOrder::Asc))
            .unwrap_err();
        assert_eq!(err, CompileError::UnknownField("nope".into()));
    }

    #[test]
    fn location_filters() {
        let schema = schema();
        let query = SearchQuery {
            locations: vec![LocationFilter {
                field: "store".into(),
                lat: 52.5,
                lon: 13.4,
                radius_km: 5.0,
            }],
            ..SearchQuery::new()
        };
        let request = QueryAssembler::new(&schema).assemble(&query).unwrap();
        assert_eq!(
            request.fq.last().map(String::as_str),
            Some("{!geofilt sfield=locs_store pt=52.5,13.4 d=5}")
        );

        let wrong = SearchQuery {
            locations: vec![LocationFilter {
                field: "type".into(),
                lat: 0.0,
                lon: 0.0,
                radius_km: 1.0,
            }],
            ..SearchQuery::new()
        };
        assert!(matches!(
            QueryAssembler::new(&schema).assemble(&wrong),
            Err(CompileError::UnsupportedOperator { .. })
        ));
    }

    #[test]
    fn grouping_params() {
        let schema = schema();
        let query = SearchQuery {
            grouping: Some(Grouping {
                fields: vec!["type".into()],
                limit: Some(3),
                sort: vec![Sort::new("created", SortOrder::Desc)],
            }),
            ..SearchQuery::new()
        };
        let request = QueryAssembler::new(&schema).assemble(&query).unwrap();
        assert_eq!(
            request.group,
            vec![
                ("group".to_string(), "true".to_string()),
                ("group.field".to_string(), "ss_type".to_string()),
                ("group.limit".to_string(), "3".to_string()),
                ("group.sort".to_string(), "ds_created desc".to_string()),
            ]
        );
    }

    #[test]
    fn params_keep_order_and_repeats() {
        let request = SearchRequest {
            q: "*:*".into(),
            fq: vec!["a:1".into(), "b:2".into()],
            sort: Some("score desc".into()),
            start: 20,
            rows: 10,
            fl: vec!["id".into(), "score".into()],
            facet: vec![("facet".into(), "true".into())],
            group: Vec::new(),
        };
        let params = request.to_params();
        let keys: Vec<&str> = params.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(
            keys,
            vec!["q", "fq", "fq", "sort", "start", "rows", "fl", "facet"]
        );
        assert!(params.contains(&("fl".into(), "id,score".into())));
    }

    #[test]
    fn query_from_json() {
        let json = r#"{
            "text": "rust",
            "fields": ["body"],
            "conditions": {
                "conjunction": "AND",
                "conditions": [{"field": "type", "operator": "=", "value": "article"}]
            },
            "sorts": [{"field": "created", "order": "desc"}],
            "limit": 5
        }"#;
        let query: SearchQuery = serde_json::from_str(json).unwrap();
        let schema = schema();
        let request = QueryAssembler::new(&schema).assemble(&query).unwrap();

        assert_eq!(request.q, "+(ts_X3b_en_body:(+rust)^1)");
        assert_eq!(request.fq[1], "ss_type:\"article\"");
        assert_eq!(request.sort.as_deref(), Some("ds_created desc"));
        assert_eq!(request.rows, 5);

        let round: SearchRequest = serde_json::from_str(&request.to_json().unwrap()).unwrap();
        assert_eq!(round, request);
    }
}
