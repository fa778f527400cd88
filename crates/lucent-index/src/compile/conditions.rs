//! Condition compilation.
//!
//! Compiles a [`ConditionGroup`] into filter-query fragments. Members of the top-level
//! AND group stay separate fragments so each can be tagged and cached on its own;
//! nested groups are folded into one fragment each.

use std::collections::BTreeSet;

use lucent_query::{
    Condition, ConditionGroup, ConditionItem, Conjunction, DataType, KeyExpression, LanguageId,
    Operand, Operator, ParseMode, Value,
};
use serde::{Deserialize, Serialize};
use time::{OffsetDateTime, format_description::well_known::Rfc3339};
use tracing::{debug, trace};

use crate::{
    CompileError,
    compile::keys::{DEFAULT_SUFFIX, KeyFlattener, TargetField},
    escape::{escape_phrase, exists_query, range_query},
    mapper::special,
    schema::{FieldDescriptor, Schema},
    spatial::{SkipSpatial, SpatialQueries},
};

/// One filter query with the tags of the groups it came from.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FilterFragment {
    /// Query text.
    pub query: String,
    /// Tags for facet exclusion.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub tags: BTreeSet<String>,
}

impl FilterFragment {
    /// Creates an untagged fragment.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            tags: BTreeSet::new(),
        }
    }

    /// Adds tags (builder style).
    pub fn with_tags<'t>(mut self, tags: impl IntoIterator<Item = &'t String>) -> Self {
        self.tags.extend(tags.into_iter().cloned());
        self
    }

    /// Renders the fragment as a filter query, with a `{!tag=...}` prefix when tagged.
    pub fn render(&self) -> String {
        if self.tags.is_empty() {
            return self.query.clone();
        }
        let tags = self.tags.iter().cloned().collect::<Vec<_>>().join(",");
        format!("{{!tag={tags}}}{}", self.query)
    }
}

/// Folds fragments into one under a conjunction.
///
/// A single fragment passes through unchanged apart from gaining `tags`. Several fragments
/// are prefixed with `+` under AND, joined by spaces and parenthesized unless `last` marks
/// the outermost reduction. A fragment that already starts with `-` (or `+`) keeps its
/// sign, and under OR it is parenthesized instead. Tags of all fragments are merged.
pub fn reduce(
    fragments: Vec<FilterFragment>,
    conjunction: Conjunction,
    tags: &BTreeSet<String>,
    last: bool,
) -> Option<FilterFragment> {
    let mut merged_tags = tags.clone();

    if fragments.len() <= 1 {
        return fragments.into_iter().next().map(|mut fragment| {
            fragment.tags.append(&mut merged_tags);
            fragment
        });
    }

    let pre = match conjunction {
        Conjunction::And => "+",
        Conjunction::Or => "",
    };
    let parts: Vec<String> = fragments
        .into_iter()
        .map(|fragment| {
            merged_tags.extend(fragment.tags);
            let signed = fragment.query.starts_with(['-', '+']);
            match (signed, pre.is_empty()) {
                (true, true) => format!("({})", fragment.query),
                (true, false) => fragment.query,
                (false, _) => format!("{pre}{}", fragment.query),
            }
        })
        .collect();

    let joined = parts.join(" ");
    Some(FilterFragment {
        query: if last { joined } else { format!("({joined})") },
        tags: merged_tags,
    })
}

/// Compiles a condition tree against a schema.
///
/// `languages` is the ambient language set. Unless the schema is foreign or the group
/// already restricts `search_api_language` directly, a language filter for this set is
/// appended.
pub fn compile_conditions(
    group: &ConditionGroup,
    schema: &Schema,
    languages: &[LanguageId],
) -> Result<Vec<FilterFragment>, CompileError> {
    ConditionCompiler::new(schema).compile(group, languages)
}

/// Compiles condition trees, routing location fields to a spatial collaborator.
#[derive(Clone, Copy)]
pub struct ConditionCompiler<'a> {
    /// Field set and name mapper.
    schema: &'a Schema,
    /// Builder for location conditions.
    spatial: &'a dyn SpatialQueries,
}

impl<'a> ConditionCompiler<'a> {
    /// Creates a compiler that skips location conditions.
    pub fn new(schema: &'a Schema) -> Self {
        Self {
            schema,
            spatial: &SkipSpatial,
        }
    }

    /// Sets the spatial query builder.
    pub fn with_spatial(mut self, spatial: &'a dyn SpatialQueries) -> Self {
        self.spatial = spatial;
        self
    }

    /// Compiles the top-level group into filter fragments.
    pub fn compile(
        &self,
        group: &ConditionGroup,
        languages: &[LanguageId],
    ) -> Result<Vec<FilterFragment>, CompileError> {
        let overridden = language_override(group)?;
        let active = overridden.as_deref().unwrap_or(languages);

        let children = self.compile_members(group, active)?;
        let mut fragments: Vec<FilterFragment> = match group.conjunction {
            Conjunction::And => children
                .into_iter()
                .map(|f| f.with_tags(&group.tags))
                .collect(),
            Conjunction::Or => reduce(children, Conjunction::Or, &group.tags, true)
                .into_iter()
                .collect(),
        };

        if overridden.is_none() && !self.schema.is_foreign() && !languages.is_empty() {
            let condition = Condition::new(
                special::LANGUAGE,
                Operator::In,
                Operand::list(languages.iter().map(LanguageId::as_str)),
            );
            if let Some(fragment) = self.compile_condition(&condition, languages)? {
                fragments.push(fragment);
            }
        }

        debug!(fragments = fragments.len(), "conditions compiled");
        for fragment in &fragments {
            trace!(query = %fragment.query, tags = ?fragment.tags, "filter fragment");
        }
        Ok(fragments)
    }

    /// Compiles the members of a group, folding nested groups into one fragment each.
    fn compile_members(
        &self,
        group: &ConditionGroup,
        languages: &[LanguageId],
    ) -> Result<Vec<FilterFragment>, CompileError> {
        let mut fragments = Vec::with_capacity(group.children.len());
        for item in &group.children {
            match item {
                ConditionItem::Condition(condition) => {
                    fragments.extend(self.compile_condition(condition, languages)?);
                }
                ConditionItem::Group(nested) => {
                    let overridden = language_override(nested)?;
                    let active = overridden.as_deref().unwrap_or(languages);
                    let members = self.compile_members(nested, active)?;
                    fragments.extend(reduce(members, nested.conjunction, &nested.tags, false));
                }
            }
        }
        Ok(fragments)
    }

    /// Compiles one leaf condition.
    ///
    /// Returns `None` when the condition contributes no filter.
    fn compile_condition(
        &self,
        condition: &Condition,
        languages: &[LanguageId],
    ) -> Result<Option<FilterFragment>, CompileError> {
        let field = self
            .schema
            .field(&condition.field)
            .ok_or_else(|| CompileError::UnknownField(condition.field.clone()))?;

        let query = match field.data_type {
            DataType::Location => {
                let name = self.schema.field_name(field, &LanguageId::UNSPECIFIED);
                self.spatial.condition(field, &name, condition)?
            }
            DataType::Text => self.compile_fulltext(field, condition, languages)?,
            _ => Some(self.compile_value(field, condition)?),
        };
        Ok(query.map(FilterFragment::new))
    }

    /// Compiles a condition on a non-text, non-location field.
    fn compile_value(
        &self,
        field: &FieldDescriptor,
        condition: &Condition,
    ) -> Result<String, CompileError> {
        let operator = condition.operator;
        let name = self.schema.field_name(field, &LanguageId::UNSPECIFIED);

        if field.data_type == DataType::Boolean && (operator.is_comparison() || operator.is_range())
        {
            return Err(CompileError::unsupported(&field.id, field.data_type, operator));
        }

        let render = |value: &Value| render_value(field, operator, value);
        let invalid = |reason: &str| CompileError::invalid_operand(&field.id, operator, reason);

        match (operator, &condition.value) {
            (Operator::Eq, Operand::Null) => Ok(format!("-{}", exists_query(&name))),
            (Operator::Neq, Operand::Null) => Ok(exists_query(&name)),
            (Operator::Eq, Operand::Scalar(v)) => Ok(format!("{name}:{}", render(v)?)),
            (Operator::Neq, Operand::Scalar(v)) => Ok(format!("(*:* AND -{name}:{})", render(v)?)),
            (Operator::Lt, Operand::Scalar(v)) => {
                Ok(range_query(&name, None, Some(&render(v)?), false, false))
            }
            (Operator::Lte, Operand::Scalar(v)) => {
                Ok(range_query(&name, None, Some(&render(v)?), true, true))
            }
            (Operator::Gt, Operand::Scalar(v)) => {
                Ok(range_query(&name, Some(&render(v)?), None, false, false))
            }
            (Operator::Gte, Operand::Scalar(v)) => {
                Ok(range_query(&name, Some(&render(v)?), None, true, true))
            }
            (Operator::Between | Operator::NotBetween, Operand::List(values)) => {
                let [Some(low), Some(high)] = values.as_slice() else {
                    return Err(invalid("expected exactly two non-NULL values"));
                };
                let range = range_query(&name, Some(&render(low)?), Some(&render(high)?), true, true);
                Ok(if operator == Operator::Between {
                    range
                } else {
                    format!("(*:* -{range})")
                })
            }
            (Operator::In | Operator::NotIn, Operand::List(values)) => {
                if values.is_empty() {
                    return Err(invalid("expected at least one value"));
                }
                let has_null = values.iter().any(Option::is_none);
                let terms = values
                    .iter()
                    .flatten()
                    .map(|v| Ok(format!("{name}:{}", render(v)?)))
                    .collect::<Result<Vec<_>, CompileError>>()?;
                Ok(if operator == Operator::In {
                    in_query(&name, terms, has_null)
                } else {
                    not_in_query(&name, &terms, has_null)
                })
            }
            (_, Operand::List(_)) if !operator.is_list() && !operator.is_range() => {
                Err(invalid("expected a single value, got a list"))
            }
            (_, Operand::Null) if operator.is_comparison() => {
                Err(invalid("a range bound cannot be NULL"))
            }
            (_, _) if operator.is_range() => Err(invalid("expected exactly two non-NULL values")),
            (_, _) => Err(invalid("expected a list of values")),
        }
    }

    /// Compiles a condition on a fulltext field by flattening its values as phrase keys
    /// over the field's name in every active language.
    fn compile_fulltext(
        &self,
        field: &FieldDescriptor,
        condition: &Condition,
        languages: &[LanguageId],
    ) -> Result<Option<String>, CompileError> {
        if languages.is_empty() {
            return Err(CompileError::MissingLanguageContext {
                field: field.id.clone(),
            });
        }

        let mut names: Vec<String> = Vec::with_capacity(languages.len());
        for language in languages {
            let name = self.schema.mapper().resolve_with_fallback(field, language);
            if !names.contains(&name) {
                names.push(name);
            }
        }

        let operator = condition.operator;
        let values: Vec<&Value> = match (operator, &condition.value) {
            (Operator::Eq, Operand::Null) => {
                return Ok(Some(match names.as_slice() {
                    [name] => format!("-{}", exists_query(name)),
                    _ => format!(
                        "(*:* {})",
                        names
                            .iter()
                            .map(|n| format!("-{}", exists_query(n)))
                            .collect::<Vec<_>>()
                            .join(" ")
                    ),
                }));
            }
            (Operator::Neq, Operand::Null) => {
                let exists: Vec<String> = names.iter().map(|n| exists_query(n)).collect();
                return Ok(Some(match exists.as_slice() {
                    [single] => single.clone(),
                    _ => format!("({})", exists.join(" ")),
                }));
            }
            (Operator::Eq | Operator::Neq, Operand::Scalar(v)) => vec![v],
            (Operator::In | Operator::NotIn, Operand::List(values)) => {
                if values.iter().any(Option::is_none) {
                    return Err(CompileError::invalid_operand(
                        &field.id,
                        operator,
                        "NULL markers are not supported on fulltext fields",
                    ));
                }
                values.iter().flatten().collect()
            }
            _ => {
                return Err(CompileError::unsupported(&field.id, field.data_type, operator));
            }
        };

        let mut keys = KeyExpression::terms(Conjunction::Or, values.iter().map(|v| v.to_string()));
        if matches!(operator, Operator::Neq | Operator::NotIn) {
            keys = keys.negated();
        }

        let targets: Vec<TargetField> = names
            .iter()
            .map(|name| TargetField::new(name, Some(DEFAULT_SUFFIX)))
            .collect();
        let query = KeyFlattener::new(&targets, ParseMode::Phrase).flatten(&keys)?;
        Ok((!query.is_empty()).then_some(query))
    }
}

/// Builds the disjunction for `IN`, with an absence branch for a NULL member.
fn in_query(name: &str, mut terms: Vec<String>, has_null: bool) -> String {
    if has_null {
        terms.push(format!("(*:* -{})", exists_query(name)));
    }
    match terms.as_slice() {
        [single] => single.clone(),
        _ => format!("({})", terms.join(" ")),
    }
}

/// Builds the conjunction for `NOT IN`.
///
/// A NULL member turns the match-all base into a requirement that the field exists.
fn not_in_query(name: &str, terms: &[String], has_null: bool) -> String {
    if terms.is_empty() {
        return exists_query(name);
    }
    let base = if has_null {
        format!("+{}", exists_query(name))
    } else {
        String::from("*:*")
    };
    let negated: Vec<String> = terms.iter().map(|t| format!("-{t}")).collect();
    format!("({base} {})", negated.join(" "))
}

/// Renders and escapes one value for a field.
fn render_value(
    field: &FieldDescriptor,
    operator: Operator,
    value: &Value,
) -> Result<String, CompileError> {
    let text = match (field.data_type, value) {
        (DataType::Boolean, Value::Integer(i)) => (*i != 0).to_string(),
        (DataType::Boolean, Value::String(s)) => match s.as_str() {
            "1" | "true" => String::from("true"),
            "0" | "false" => String::from("false"),
            _ => {
                return Err(CompileError::invalid_operand(
                    &field.id,
                    operator,
                    format!("'{s}' is not a boolean"),
                ));
            }
        },
        (DataType::Date, Value::Integer(timestamp)) => format_timestamp(*timestamp)
            .ok_or_else(|| {
                CompileError::invalid_operand(
                    &field.id,
                    operator,
                    format!("timestamp {timestamp} is out of range"),
                )
            })?,
        _ => value.to_string(),
    };
    Ok(escape_phrase(&text))
}

/// Formats a unix timestamp as an ISO 8601 UTC date.
fn format_timestamp(timestamp: i64) -> Option<String> {
    OffsetDateTime::from_unix_timestamp(timestamp)
        .ok()?
        .format(&Rfc3339)
        .ok()
}

/// Returns the languages a direct `search_api_language` condition restricts the group to.
fn language_override(group: &ConditionGroup) -> Result<Option<Vec<LanguageId>>, CompileError> {
    let Some(condition) = group
        .conditions()
        .find(|c| c.field == special::LANGUAGE && matches!(c.operator, Operator::Eq | Operator::In))
    else {
        return Ok(None);
    };

    let values: Vec<&Value> = match &condition.value {
        Operand::Scalar(v) => vec![v],
        Operand::List(values) => values.iter().flatten().collect(),
        Operand::Null => return Ok(None),
    };

    let languages = values
        .into_iter()
        .map(|v| {
            LanguageId::new(v.to_string()).map_err(|e| {
                CompileError::invalid_operand(special::LANGUAGE, condition.operator, e.to_string())
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    debug!(?languages, "language context overridden by condition");
    Ok(Some(languages))
}
