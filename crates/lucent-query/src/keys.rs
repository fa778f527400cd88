//! Fulltext key trees.
//!
//! Keys are what a user types into a search box, after parsing. They mirror
//! condition groups, but their leaves are plain terms.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ast::Conjunction;

/// How a key tree is combined with the list of fulltext fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParseMode {
    /// Every term is escaped as a single term and expanded per field.
    #[default]
    Terms,
    /// Every term is escaped as a quoted phrase.
    Phrase,
    /// Terms are handed to an inline extended dismax query.
    Edismax,
    /// The keys are a raw query string inserted verbatim.
    #[serde(alias = "keys")]
    Direct,
}

impl ParseMode {
    /// Returns the canonical lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Terms => "terms",
            Self::Phrase => "phrase",
            Self::Edismax => "edismax",
            Self::Direct => "direct",
        }
    }
}

impl fmt::Display for ParseMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a parse mode name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown parse mode '{0}' (expected terms, phrase, edismax or direct)")]
pub struct ParseModeError(pub String);

impl FromStr for ParseMode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "terms" => Ok(Self::Terms),
            "phrase" => Ok(Self::Phrase),
            "edismax" => Ok(Self::Edismax),
            "direct" | "keys" => Ok(Self::Direct),
            _ => Err(ParseModeError(s.to_string())),
        }
    }
}

/// A group of keys sharing a conjunction and negation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct KeyGroup {
    /// How children combine.
    #[serde(default)]
    pub conjunction: Conjunction,
    /// Whether the whole group must NOT match.
    #[serde(default)]
    pub negation: bool,
    /// Whether the terms are already escaped and must be inserted verbatim.
    #[serde(default)]
    pub escaped: bool,
    /// Child keys in order.
    #[serde(default)]
    pub children: Vec<KeyExpression>,
}

impl KeyGroup {
    /// Creates an empty, non-negated group.
    pub fn new(conjunction: Conjunction) -> Self {
        Self {
            conjunction,
            ..Self::default()
        }
    }
}

/// A fulltext key expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KeyExpression {
    /// A literal term, or a raw query string in direct mode.
    Term(String),
    /// A nested group.
    Group(KeyGroup),
}

impl KeyExpression {
    /// Creates a term leaf.
    pub fn term(text: impl Into<String>) -> Self {
        Self::Term(text.into())
    }

    /// Creates a non-negated group of plain terms.
    pub fn terms<I, S>(conjunction: Conjunction, terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Group(KeyGroup {
            conjunction,
            children: terms.into_iter().map(|t| Self::Term(t.into())).collect(),
            ..KeyGroup::default()
        })
    }

    /// Creates a group from arbitrary children.
    pub fn group(conjunction: Conjunction, negation: bool, children: Vec<Self>) -> Self {
        Self::Group(KeyGroup {
            conjunction,
            negation,
            escaped: false,
            children,
        })
    }

    /// Returns a copy of this expression with negation set (terms are wrapped).
    pub fn negated(self) -> Self {
        match self {
            Self::Group(mut g) => {
                g.negation = !g.negation;
                Self::Group(g)
            }
            term @ Self::Term(_) => Self::group(Conjunction::And, true, vec![term]),
        }
    }

    /// Returns true if the expression contains no non-empty term.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Term(t) => t.trim().is_empty(),
            Self::Group(g) => g.children.iter().all(Self::is_empty),
        }
    }

    /// Formats the expression as an indented tree.
    fn fmt_tree(&self, f: &mut fmt::Formatter<'_>, indent: usize) -> fmt::Result {
        let prefix = "  ".repeat(indent);
        match self {
            Self::Term(t) => writeln!(f, "{prefix}Term({t:?})"),
            Self::Group(g) => {
                let neg = if g.negation { " NOT" } else { "" };
                let esc = if g.escaped { " escaped" } else { "" };
                writeln!(f, "{prefix}{}{neg}{esc}", g.conjunction)?;
                for child in &g.children {
                    child.fmt_tree(f, indent + 1)?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for KeyExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_tree(f, 0)
    }
}
