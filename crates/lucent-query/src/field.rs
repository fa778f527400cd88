//! Field data types.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Data type of an indexed field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    /// Untokenized string.
    String,
    /// Tokenized, language-aware fulltext.
    Text,
    /// Integer number.
    Integer,
    /// Floating point number.
    Decimal,
    /// Boolean flag.
    Boolean,
    /// Point in time.
    Date,
    /// Range of time.
    DateRange,
    /// Geographic point.
    Location,
}

impl DataType {
    /// All data types in declaration order.
    pub const ALL: [Self; 8] = [
        Self::String,
        Self::Text,
        Self::Integer,
        Self::Decimal,
        Self::Boolean,
        Self::Date,
        Self::DateRange,
        Self::Location,
    ];

    /// Returns the snake_case name used in configuration.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Text => "text",
            Self::Integer => "integer",
            Self::Decimal => "decimal",
            Self::Boolean => "boolean",
            Self::Date => "date",
            Self::DateRange => "date_range",
            Self::Location => "location",
        }
    }

    /// Returns true for fulltext fields.
    pub fn is_text(self) -> bool {
        self == Self::Text
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown data type '{s}'"))
    }
}

/// Whether a field holds one value or many.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cardinality {
    /// At most one value.
    #[default]
    Single,
    /// Any number of values.
    Multi,
}

impl Cardinality {
    /// Maps a multi-valued flag to a cardinality.
    pub fn from_multi(multi: bool) -> Self {
        if multi { Self::Multi } else { Self::Single }
    }
}
