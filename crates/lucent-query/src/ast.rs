//! Condition tree.
//!
//! Represents structured filter conditions before compilation to filter queries.

use std::{collections::BTreeSet, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// How the members of a group combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Conjunction {
    /// Every member must match.
    #[default]
    #[serde(rename = "AND", alias = "and")]
    And,
    /// At least one member must match.
    #[serde(rename = "OR", alias = "or")]
    Or,
}

impl fmt::Display for Conjunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::And => write!(f, "AND"),
            Self::Or => write!(f, "OR"),
        }
    }
}

impl FromStr for Conjunction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("and") {
            Ok(Self::And)
        } else if s.eq_ignore_ascii_case("or") {
            Ok(Self::Or)
        } else {
            Err(format!("unknown conjunction '{s}' (expected AND or OR)"))
        }
    }
}

/// Comparison operator of a single condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    /// Equality; `Eq(Null)` means the field has no value.
    #[serde(rename = "=", alias = "eq")]
    Eq,
    /// Inequality; `Neq(Null)` means the field has some value.
    #[serde(rename = "<>", alias = "neq")]
    Neq,
    /// Strictly less than.
    #[serde(rename = "<", alias = "lt")]
    Lt,
    /// Less than or equal.
    #[serde(rename = "<=", alias = "lte")]
    Lte,
    /// Greater than or equal.
    #[serde(rename = ">=", alias = "gte")]
    Gte,
    /// Strictly greater than.
    #[serde(rename = ">", alias = "gt")]
    Gt,
    /// Inclusive range over exactly two values.
    #[serde(rename = "BETWEEN", alias = "between")]
    Between,
    /// Negated inclusive range over exactly two values.
    #[serde(rename = "NOT BETWEEN", alias = "not_between")]
    NotBetween,
    /// Membership in a list.
    #[serde(rename = "IN", alias = "in")]
    In,
    /// Non-membership in a list.
    #[serde(rename = "NOT IN", alias = "not_in")]
    NotIn,
}

impl Operator {
    /// Returns true for the four open/closed range comparisons.
    pub fn is_comparison(self) -> bool {
        matches!(self, Self::Lt | Self::Lte | Self::Gte | Self::Gt)
    }

    /// Returns true for operators that take a two-element range.
    pub fn is_range(self) -> bool {
        matches!(self, Self::Between | Self::NotBetween)
    }

    /// Returns true for operators that take a list.
    pub fn is_list(self) -> bool {
        matches!(self, Self::In | Self::NotIn)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            Self::Eq => "=",
            Self::Neq => "<>",
            Self::Lt => "<",
            Self::Lte => "<=",
            Self::Gte => ">=",
            Self::Gt => ">",
            Self::Between => "BETWEEN",
            Self::NotBetween => "NOT BETWEEN",
            Self::In => "IN",
            Self::NotIn => "NOT IN",
        };
        f.write_str(symbol)
    }
}

/// A literal compared against a field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Boolean literal.
    Boolean(bool),
    /// Integer literal (also used for unix timestamps on date fields).
    Integer(i64),
    /// Floating point literal.
    Decimal(f64),
    /// String literal.
    String(String),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Decimal(d) => write!(f, "{d}"),
            Self::String(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Decimal(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

/// The right-hand side of a condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Operand {
    /// No value: the field is absent.
    Null,
    /// A list; `None` members are null markers.
    List(Vec<Option<Value>>),
    /// A single value.
    Scalar(Value),
}

impl Operand {
    /// Builds a list operand without null markers.
    pub fn list<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self::List(values.into_iter().map(|v| Some(v.into())).collect())
    }
}

impl From<Value> for Operand {
    fn from(value: Value) -> Self {
        Self::Scalar(value)
    }
}

/// A single `field <operator> value` filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    /// Abstract field identifier.
    pub field: String,
    /// Comparison operator.
    pub operator: Operator,
    /// Compared value.
    #[serde(default = "null_operand")]
    pub value: Operand,
}

/// Serde default for a missing `value` key.
fn null_operand() -> Operand {
    Operand::Null
}

impl Condition {
    /// Creates a condition from its parts.
    pub fn new(field: impl Into<String>, operator: Operator, value: Operand) -> Self {
        Self {
            field: field.into(),
            operator,
            value,
        }
    }

    /// `field = value`.
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, Operator::Eq, Operand::Scalar(value.into()))
    }

    /// `field <> value`.
    pub fn neq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, Operator::Neq, Operand::Scalar(value.into()))
    }

    /// `field = NULL`: the field has no value.
    pub fn is_null(field: impl Into<String>) -> Self {
        Self::new(field, Operator::Eq, Operand::Null)
    }

    /// `field <> NULL`: the field has some value.
    pub fn is_not_null(field: impl Into<String>) -> Self {
        Self::new(field, Operator::Neq, Operand::Null)
    }

    /// `field BETWEEN low AND high`.
    pub fn between(
        field: impl Into<String>,
        low: impl Into<Value>,
        high: impl Into<Value>,
    ) -> Self {
        Self::new(
            field,
            Operator::Between,
            Operand::List(vec![Some(low.into()), Some(high.into())]),
        )
    }

    /// `field NOT BETWEEN low AND high`.
    pub fn not_between(
        field: impl Into<String>,
        low: impl Into<Value>,
        high: impl Into<Value>,
    ) -> Self {
        Self::new(
            field,
            Operator::NotBetween,
            Operand::List(vec![Some(low.into()), Some(high.into())]),
        )
    }

    /// `field IN (values)`.
    pub fn is_in<I, V>(field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self::new(field, Operator::In, Operand::list(values))
    }

    /// `field NOT IN (values)`.
    pub fn not_in<I, V>(field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self::new(field, Operator::NotIn, Operand::list(values))
    }
}

/// A member of a condition group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConditionItem {
    /// A leaf condition.
    Condition(Condition),
    /// A nested group.
    Group(ConditionGroup),
}

/// A conjunction of conditions and nested groups, carrying facet tags.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ConditionGroup {
    /// How members combine.
    #[serde(default)]
    pub conjunction: Conjunction,
    /// Members in order.
    #[serde(default, rename = "conditions")]
    pub children: Vec<ConditionItem>,
    /// Tags used downstream to exclude this group's filters from facets.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub tags: BTreeSet<String>,
}

impl ConditionGroup {
    /// Creates an empty group.
    pub fn new(conjunction: Conjunction) -> Self {
        Self {
            conjunction,
            children: Vec::new(),
            tags: BTreeSet::new(),
        }
    }

    /// Creates an empty AND group.
    pub fn and() -> Self {
        Self::new(Conjunction::And)
    }

    /// Creates an empty OR group.
    pub fn or() -> Self {
        Self::new(Conjunction::Or)
    }

    /// Adds a tag (builder style).
    pub fn tagged(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    /// Appends a condition (builder style).
    pub fn condition(mut self, condition: Condition) -> Self {
        self.children.push(ConditionItem::Condition(condition));
        self
    }

    /// Appends a nested group (builder style).
    pub fn group(mut self, group: Self) -> Self {
        self.children.push(ConditionItem::Group(group));
        self
    }

    /// Appends a condition in place.
    pub fn add_condition(&mut self, condition: Condition) -> &mut Self {
        self.children.push(ConditionItem::Condition(condition));
        self
    }

    /// Returns true if the group has no members.
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Iterates over the direct leaf conditions of this group.
    pub fn conditions(&self) -> impl Iterator<Item = &Condition> {
        self.children.iter().filter_map(|item| match item {
            ConditionItem::Condition(c) => Some(c),
            ConditionItem::Group(_) => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builders_produce_expected_operands() {
        let c = Condition::between("price", 1, 10);
        assert_eq!(c.operator, Operator::Between);
        assert_eq!(
            c.value,
            Operand::List(vec![Some(Value::Integer(1)), Some(Value::Integer(10))])
        );

        let c = Condition::is_null("body");
        assert_eq!(c.value, Operand::Null);
    }

    #[test]
    fn group_builder_keeps_order_and_tags() {
        let group = ConditionGroup::or()
            .tagged("facet:color")
            .condition(Condition::eq("color", "red"))
            .condition(Condition::eq("color", "blue"));
        assert_eq!(group.children.len(), 2);
        assert!(group.tags.contains("facet:color"));
        assert_eq!(group.conditions().count(), 2);
    }

    #[test]
    fn deserializes_nested_groups() {
        let json = r#"{
            "conjunction": "AND",
            "conditions": [
                {"field": "status", "operator": "=", "value": true},
                {"conjunction": "OR", "tags": ["facet:type"], "conditions": [
                    {"field": "type", "operator": "IN", "value": ["page", null]},
                    {"field": "created", "operator": "<>", "value": null}
                ]}
            ]
        }"#;
        let group: ConditionGroup = serde_json::from_str(json).unwrap();
        assert_eq!(group.children.len(), 2);
        let ConditionItem::Group(nested) = &group.children[1] else {
            panic!("expected nested group");
        };
        assert_eq!(nested.conjunction, Conjunction::Or);
        let ConditionItem::Condition(first) = &nested.children[0] else {
            panic!("expected condition");
        };
        assert_eq!(
            first.value,
            Operand::List(vec![Some(Value::String("page".into())), None])
        );
        let ConditionItem::Condition(second) = &nested.children[1] else {
            panic!("expected condition");
        };
        assert_eq!(second.operator, Operator::Neq);
        assert_eq!(second.value, Operand::Null);
    }

    #[test]
    fn missing_value_is_null() {
        let c: Condition = serde_json::from_str(r#"{"field":"x","operator":"="}"#).unwrap();
        assert_eq!(c.value, Operand::Null);
    }

    #[test]
    fn conjunction_from_str() {
        assert_eq!("or".parse::<Conjunction>().unwrap(), Conjunction::Or);
        assert_eq!("AND".parse::<Conjunction>().unwrap(), Conjunction::And);
        assert!("xor".parse::<Conjunction>().is_err());
    }
}
