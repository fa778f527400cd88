//! Language identifiers.

use std::{borrow::Cow, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::LanguageError;

/// Separator between the type prefix and the language in dynamic field names.
///
/// It may never appear in a language id.
pub const LANGUAGE_SEPARATOR: char = ';';

/// An opaque language token such as `en` or `pt-br`.
///
/// Ids consist of ASCII letters, digits and `-`.
///
/// Only identity comparison is meaningful. The reserved value
/// [`LanguageId::UNSPECIFIED`] selects language-neutral field names.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LanguageId(Cow<'static, str>);

impl LanguageId {
    /// The reserved "no particular language" id.
    pub const UNSPECIFIED: Self = Self(Cow::Borrowed("und"));

    /// Validates and wraps a language id.
    pub fn new(id: impl Into<String>) -> Result<Self, LanguageError> {
        let id = id.into();
        if id.is_empty() {
            return Err(LanguageError::Empty);
        }
        if let Some(ch) = id
            .chars()
            .find(|&c| !(c.is_ascii_alphanumeric() || c == '-'))
        {
            return Err(LanguageError::InvalidCharacter { id, ch });
        }
        Ok(Self(Cow::Owned(id)))
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true for [`LanguageId::UNSPECIFIED`].
    pub fn is_unspecified(&self) -> bool {
        *self == Self::UNSPECIFIED
    }
}

impl fmt::Display for LanguageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for LanguageId {
    type Err = LanguageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for LanguageId {
    type Error = LanguageError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<LanguageId> for String {
    fn from(value: LanguageId) -> Self {
        value.0.into_owned()
    }
}
