//! Backend field naming.
//!
//! Every abstract field maps to a dynamic field on the backend whose name encodes the data
//! type, the cardinality and, for fulltext fields, the language:
//!
//! | Field                       | Backend name         |
//! |-----------------------------|----------------------|
//! | `status`, string, single    | `ss_status`          |
//! | `tags`, integer, multi      | `im_tags`            |
//! | `body`, text, single, `en`  | `ts_X3b_en_body`     |
//! | `body`, text, single, `und` | `ts_body`            |
//! | `field_a:b`, date, single   | `ds_field_a_X3a_b`   |
//!
//! Field ids are escaped with [`encode_name`] so that any id maps to a valid, unique name.

use std::{
    collections::HashMap,
    str,
    sync::{PoisonError, RwLock},
};

use lucent_config::BackendSettings;
use lucent_query::{Cardinality, DataType, LANGUAGE_SEPARATOR, LanguageId};
use tracing::{debug, trace};

use crate::schema::FieldDescriptor;

/// Marker that starts an escape sequence in an encoded name.
pub const ESCAPE_MARKER: &str = "_X";

/// Terminator of an escape sequence.
const ESCAPE_END: char = '_';

/// Lowercase hex digits.
const HEX_DIGITS: &[u8; 16] = b"0123456789abcdef";

/// Special field ids with fixed backend names.
pub mod special {
    /// The item id.
    pub const ID: &str = "search_api_id";
    /// The relevance score.
    pub const RELEVANCE: &str = "search_api_relevance";
    /// The item language.
    pub const LANGUAGE: &str = "search_api_language";
    /// The item datasource.
    pub const DATASOURCE: &str = "search_api_datasource";

    /// Backend name of the relevance score.
    pub const SCORE_FIELD: &str = "score";
    /// Backend name of the datasource.
    pub const DATASOURCE_FIELD: &str = "ss_search_api_datasource";
}

/// Encodes a field id into a string that is safe as a backend field name.
///
/// Every character outside `[A-Za-z0-9_]`, and a leading digit, is replaced by
/// `_X<hex>_`, where `<hex>` is the lowercase hex of the character's UTF-8 bytes.
/// An underscore directly followed by `X` is escaped too, so encoded names never
/// contain an unescaped marker and [`decode_name`] can always invert the encoding.
pub fn encode_name(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    let mut first = true;

    while let Some(c) = chars.next() {
        let needs_escape = match c {
            'A'..='Z' | 'a'..='z' => false,
            '0'..='9' => first,
            '_' => chars.peek() == Some(&'X'),
            _ => true,
        };
        if needs_escape {
            push_escaped(&mut out, c);
        } else {
            out.push(c);
        }
        first = false;
    }

    out
}

/// Appends the escape sequence for one character.
fn push_escaped(out: &mut String, c: char) {
    let mut buf = [0u8; 4];
    out.push_str(ESCAPE_MARKER);
    for byte in c.encode_utf8(&mut buf).bytes() {
        out.push(char::from(HEX_DIGITS[usize::from(byte >> 4)]));
        out.push(char::from(HEX_DIGITS[usize::from(byte & 0x0f)]));
    }
    out.push(ESCAPE_END);
}

/// Decodes a name produced by [`encode_name`].
///
/// Malformed escape sequences are kept as they are, so any string can be decoded.
pub fn decode_name(encoded: &str) -> String {
    let mut out = String::with_capacity(encoded.len());
    let mut rest = encoded;

    while let Some(pos) = rest.find(ESCAPE_MARKER) {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + ESCAPE_MARKER.len()..];
        match decode_sequence(after) {
            Some((c, consumed)) => {
                out.push(c);
                rest = &after[consumed..];
            }
            None => {
                out.push_str(ESCAPE_MARKER);
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

/// Decodes `<hex>_` at the start of `s` into one character.
///
/// Returns the character and the number of bytes consumed.
fn decode_sequence(s: &str) -> Option<(char, usize)> {
    let hex_len = s
        .bytes()
        .take_while(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
        .count();
    if hex_len == 0 || hex_len % 2 != 0 || hex_len > 8 {
        return None;
    }
    if s[hex_len..].chars().next() != Some(ESCAPE_END) {
        return None;
    }

    let bytes = (0..hex_len)
        .step_by(2)
        .map(|i| u8::from_str_radix(&s[i..i + 2], 16).ok())
        .collect::<Option<Vec<u8>>>()?;
    let decoded = str::from_utf8(&bytes).ok()?;
    let mut chars = decoded.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some((c, hex_len + 1)),
        _ => None,
    }
}

/// Returns the type prefix of a dynamic field, including the cardinality marker.
///
/// Date ranges are always multi-valued, so their prefix ignores `cardinality`.
pub fn type_prefix(data_type: DataType, cardinality: Cardinality) -> String {
    let base = match data_type {
        DataType::String => "s",
        DataType::Text => "t",
        DataType::Integer => "i",
        DataType::Decimal => "f",
        DataType::Boolean => "b",
        DataType::Date => "d",
        DataType::DateRange => return String::from("drm"),
        DataType::Location => "loc",
    };
    let marker = match cardinality {
        Cardinality::Single => 's',
        Cardinality::Multi => 'm',
    };
    format!("{base}{marker}")
}

/// Computes the dynamic field name of a field, ignoring special ids and pinned names.
///
/// The language segment goes through [`encode_name`] together with its separator, so
/// `body` in `en` becomes `ts_X3b_en_body`.
fn dynamic_name(field: &FieldDescriptor, language: &LanguageId) -> String {
    let prefix = type_prefix(field.data_type, field.cardinality);
    let encoded = encode_name(&field.id);
    if field.data_type.is_text() && !language.is_unspecified() {
        let segment = encode_name(&format!("{LANGUAGE_SEPARATOR}{language}"));
        format!("{prefix}{segment}_{encoded}")
    } else {
        format!("{prefix}_{encoded}")
    }
}

/// Computes the backend name of a field with the default special-field names.
///
/// This is the uncached form of [`FieldNameMapper::field_name`].
pub fn field_name(field: &FieldDescriptor, language: &LanguageId) -> String {
    FieldNameMapper::default().compute(field, language)
}

/// Maps fields to backend names and memoizes the results.
///
/// The cache is keyed by field id and language. Call [`FieldNameMapper::reset`] whenever
/// the field set changes.
#[derive(Debug)]
pub struct FieldNameMapper {
    /// Backend field for `search_api_id`.
    id_field: String,
    /// Backend field for `search_api_language`.
    language_field: String,
    /// Memoized names.
    cache: RwLock<HashMap<(String, LanguageId), String>>,
}

impl Default for FieldNameMapper {
    fn default() -> Self {
        Self::from_backend(&BackendSettings::default())
    }
}

impl FieldNameMapper {
    /// Creates a mapper with the given id and language field names.
    pub fn new(id_field: impl Into<String>, language_field: impl Into<String>) -> Self {
        Self {
            id_field: id_field.into(),
            language_field: language_field.into(),
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Creates a mapper from backend settings.
    pub fn from_backend(backend: &BackendSettings) -> Self {
        Self::new(&backend.id_field, &backend.language_field)
    }

    /// Returns the fixed backend name of a special field id.
    pub fn special_name(&self, id: &str) -> Option<&str> {
        match id {
            special::ID => Some(&self.id_field),
            special::RELEVANCE => Some(special::SCORE_FIELD),
            special::LANGUAGE => Some(&self.language_field),
            special::DATASOURCE => Some(special::DATASOURCE_FIELD),
            _ => None,
        }
    }

    /// Returns the backend name of a field in a language.
    ///
    /// Only fulltext fields depend on the language. Results are cached; a poisoned cache
    /// lock falls back to computing the name.
    pub fn field_name(&self, field: &FieldDescriptor, language: &LanguageId) -> String {
        let key = (field.id.clone(), language.clone());

        if let Ok(cache) = self.cache.read()
            && let Some(name) = cache.get(&key)
        {
            trace!(field = %field.id, %language, %name, "field name cache hit");
            return name.clone();
        }

        let name = self.compute(field, language);
        debug!(field = %field.id, %language, %name, "field name computed");
        if let Ok(mut cache) = self.cache.write() {
            cache.insert(key, name.clone());
        }
        name
    }

    /// Returns the name to query for a field in the requested language.
    ///
    /// Names are computed, not looked up, so this is the same name as
    /// [`FieldNameMapper::field_name`]. Whether the backend holds data for the language is
    /// the backend's concern.
    pub fn resolve_with_fallback(
        &self,
        field: &FieldDescriptor,
        requested_language: &LanguageId,
    ) -> String {
        self.field_name(field, requested_language)
    }

    /// Drops all cached names.
    pub fn reset(&self) {
        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        debug!(entries = cache.len(), "field name cache reset");
        cache.clear();
    }

    /// Returns the number of cached names.
    pub fn cached(&self) -> usize {
        self.cache.read().map_or(0, |cache| cache.len())
    }

    /// Computes a name without touching the cache.
    fn compute(&self, field: &FieldDescriptor, language: &LanguageId) -> String {
        if let Some(name) = self.special_name(&field.id) {
            return name.to_string();
        }
        if let Some(ref name) = field.backend_name {
            return name.clone();
        }
        dynamic_name(field, language)
    }
}
