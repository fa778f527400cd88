//! Fulltext key flattening.
//!
//! Turns a [`KeyExpression`] plus a list of target fields into one boolean query string.
//! With fields `x^1` and `y^1` and keys `A B`:
//!
//! | Keys           | Mode    | Query                                                          |
//! |----------------|---------|----------------------------------------------------------------|
//! | `A AND B`      | terms   | `+((+(x:A^1 y:A^1) +(x:B^1 y:B^1)) x:(+A +B)^1 y:(+A +B)^1)`   |
//! | `A AND B`      | phrase  | `+(x:(+"A" +"B")^1 y:(+"A" +"B")^1)`                           |
//! | `A OR B`       | edismax | `+({!edismax qf='x^1 y^1'}A B)`                                |
//! | `A` (raw)      | direct  | `+(x:(A)^1 y:(A)^1)`                                           |
//!
//! Negated keys start with `-` instead of `+`.

use lucent_query::{Conjunction, KeyExpression, KeyGroup, ParseMode};
use tracing::trace;

use crate::{
    CompileError,
    escape::{escape_phrase, escape_term},
};

/// Suffix appended to a field when no boost is given.
pub const DEFAULT_SUFFIX: &str = "^1";

/// A target field with its boost or fuzziness suffix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetField {
    /// Backend field name.
    pub name: String,
    /// Suffix such as `^2` or `~1`, appended after the field's clause.
    pub suffix: String,
}

impl TargetField {
    /// Creates a target field.
    ///
    /// Without an explicit suffix, a trailing `^N` or `~N` is split off the name; if there
    /// is none, [`DEFAULT_SUFFIX`] is used.
    pub fn new(name: &str, suffix: Option<&str>) -> Self {
        if let Some(suffix) = suffix {
            return Self {
                name: name.to_string(),
                suffix: suffix.to_string(),
            };
        }
        match name.rfind(['^', '~']) {
            Some(pos) if pos > 0 => Self {
                name: name[..pos].to_string(),
                suffix: name[pos..].to_string(),
            },
            _ => Self {
                name: name.to_string(),
                suffix: DEFAULT_SUFFIX.to_string(),
            },
        }
    }

    /// Formats a boosted field, `^1` for no boost.
    pub fn boosted(name: &str, boost: Option<f32>) -> Self {
        let suffix = boost.map_or_else(|| DEFAULT_SUFFIX.to_string(), |b| format!("^{b}"));
        Self::new(name, Some(&suffix))
    }

    /// Renders `name:value suffix` for a single clause.
    fn clause(&self, value: &str) -> String {
        format!("{}:{value}{}", self.name, self.suffix)
    }
}

/// Compiles keys against fields given as `(name, suffix)` pairs.
///
/// Returns the empty string when the keys hold no terms; callers must then omit the
/// clause rather than emit it.
pub fn compile_keys(
    keys: &KeyExpression,
    fields: &[(String, Option<String>)],
    mode: ParseMode,
) -> Result<String, CompileError> {
    let fields: Vec<TargetField> = fields
        .iter()
        .map(|(name, suffix)| TargetField::new(name, suffix.as_deref()))
        .collect();
    KeyFlattener::new(&fields, mode).flatten(keys)
}

/// Flattens key trees for one set of fields and one parse mode.
#[derive(Debug, Clone, Copy)]
pub struct KeyFlattener<'a> {
    /// Target fields, possibly empty.
    fields: &'a [TargetField],
    /// How keys combine with fields.
    mode: ParseMode,
}

impl<'a> KeyFlattener<'a> {
    /// Creates a flattener.
    pub fn new(fields: &'a [TargetField], mode: ParseMode) -> Self {
        Self { fields, mode }
    }

    /// Flattens a key tree into a query string.
    pub fn flatten(&self, keys: &KeyExpression) -> Result<String, CompileError> {
        let result = match keys {
            KeyExpression::Term(raw) => self.flatten_raw(raw)?,
            KeyExpression::Group(group) => {
                let body = self.flatten_group(group)?;
                if body.is_empty() {
                    body
                } else {
                    let sign = if group.negation { '-' } else { '+' };
                    format!("{sign}{body}")
                }
            }
        };
        trace!(mode = %self.mode, query = %result, "keys flattened");
        Ok(result)
    }

    /// Inserts a raw query string, which only direct mode allows.
    fn flatten_raw(&self, raw: &str) -> Result<String, CompileError> {
        if self.mode != ParseMode::Direct {
            return Err(CompileError::IncompatibleParseMode {
                mode: self.mode,
                reason: "plain key strings are only allowed in direct mode",
            });
        }
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(String::new());
        }
        if self.fields.is_empty() {
            return Ok(format!("+({raw})"));
        }
        let clauses: Vec<String> = self
            .fields
            .iter()
            .map(|f| f.clause(&format!("({raw})")))
            .collect();
        Ok(format!("+({})", clauses.join(" ")))
    }

    /// Flattens a group into a parenthesized body without a leading sign.
    ///
    /// Returns the empty string for a group without terms.
    fn flatten_group(&self, group: &KeyGroup) -> Result<String, CompileError> {
        let pre = match group.conjunction {
            Conjunction::And => "+",
            Conjunction::Or => "",
        };

        let mut parts = Vec::new();
        let mut terms = Vec::new();
        for child in &group.children {
            match child {
                KeyExpression::Term(text) => {
                    if let Some(term) = self.escape(text, group.escaped) {
                        terms.push(term);
                    }
                }
                KeyExpression::Group(nested) => {
                    if self.mode == ParseMode::Edismax {
                        return Err(CompileError::IncompatibleParseMode {
                            mode: self.mode,
                            reason: "nested key groups cannot be expressed in edismax",
                        });
                    }
                    let body = self.flatten_group(nested)?;
                    if !body.is_empty() {
                        let sign = if nested.negation { "-" } else { pre };
                        parts.push(format!("{sign}{body}"));
                    }
                }
            }
        }

        if !terms.is_empty() {
            let term_part = self.term_part(&terms, pre);
            // Field alternatives must stay one clause next to required nested groups.
            if !parts.is_empty() && !self.fields.is_empty() && self.mode != ParseMode::Edismax {
                parts.push(format!("{pre}({term_part})"));
            } else {
                parts.push(term_part);
            }
        }

        if parts.is_empty() {
            return Ok(String::new());
        }
        Ok(format!("({})", parts.join(" ")))
    }

    /// Combines the escaped terms of one group with the target fields.
    fn term_part(&self, terms: &[String], pre: &str) -> String {
        let joined = terms
            .iter()
            .map(|t| format!("{pre}{t}"))
            .collect::<Vec<_>>()
            .join(" ");

        if self.fields.is_empty() {
            return joined;
        }

        if self.mode == ParseMode::Edismax {
            let qf = self
                .fields
                .iter()
                .map(|f| format!("{}{}", f.name, f.suffix))
                .collect::<Vec<_>>()
                .join(" ");
            return format!("{{!edismax qf='{qf}'}}{joined}");
        }

        let mut clauses = Vec::with_capacity(self.fields.len() + 1);
        if self.mode == ParseMode::Terms && self.fields.len() > 1 && terms.len() > 1 {
            // Each term must match in at least one field.
            let expansion = terms
                .iter()
                .map(|t| {
                    let per_field = self
                        .fields
                        .iter()
                        .map(|f| f.clause(t))
                        .collect::<Vec<_>>()
                        .join(" ");
                    format!("{pre}({per_field})")
                })
                .collect::<Vec<_>>()
                .join(" ");
            clauses.push(format!("({expansion})"));
        }
        clauses.extend(self.fields.iter().map(|f| f.clause(&format!("({joined})"))));
        clauses.join(" ")
    }

    /// Escapes one literal for the parse mode, or returns `None` for an empty one.
    fn escape(&self, text: &str, escaped: bool) -> Option<String> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        Some(match self.mode {
            _ if escaped => text.to_string(),
            ParseMode::Direct => text.to_string(),
            ParseMode::Terms | ParseMode::Edismax => escape_term(text),
            ParseMode::Phrase => escape_phrase(text),
        })
    }
}
