//! Escaping primitives for the Lucene/Solr standard query syntax.
//!
//! Every literal that ends up in a query string passes through exactly one of these,
//! and composed sub-expressions are never escaped again.

/// Characters with meaning in the standard query parser.
const SPECIAL_CHARS: &[char] = &[
    '\\', '+', '-', '!', '(', ')', ':', '^', '[', ']', '"', '{', '}', '~', '*', '?', '|', '&',
    '/',
];

/// Escapes a single term so that it is parsed as one literal token.
///
/// Operators, wildcards, grouping characters and whitespace are backslash-escaped.
pub fn escape_term(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 4);
    for c in text.chars() {
        if SPECIAL_CHARS.contains(&c) || c.is_whitespace() {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Wraps text in double quotes so that it is matched as a phrase.
///
/// Only `"` and `\` need escaping inside quotes.
pub fn escape_phrase(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        if c == '"' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}

/// Builds a range query on a field.
///
/// Bounds must already be escaped. A missing bound is open (`*`). Inclusive bounds use
/// square brackets, exclusive bounds curly braces, and both ends are chosen independently.
pub fn range_query(
    field: &str,
    lower: Option<&str>,
    upper: Option<&str>,
    inclusive_lower: bool,
    inclusive_upper: bool,
) -> String {
    let open = if inclusive_lower { '[' } else { '{' };
    let close = if inclusive_upper { ']' } else { '}' };
    format!(
        "{field}:{open}{} TO {}{close}",
        lower.unwrap_or("*"),
        upper.unwrap_or("*")
    )
}

/// Builds the "field has any value" query.
pub fn exists_query(field: &str) -> String {
    range_query(field, None, None, true, true)
}
