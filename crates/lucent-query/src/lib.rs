//! Abstract query model for lucent.
//!
//! This crate holds the caller-facing vocabulary that the compiler in
//! `lucent-index` turns into search backend syntax:
//!
//! - **Conditions**: `field <op> value` filters, nested in AND/OR groups with tags
//! - **Keys**: fulltext key trees with conjunction, negation and escaping flags
//! - **Parse modes**: how keys combine with the list of fulltext fields
//! - **Languages**: validated language ids with a reserved "unspecified" value
//! - **Field types**: data types and cardinality of indexed fields
//!
//! It also provides a parser for free-text user input:
//!
//! ```
//! use lucent_query::{Conjunction, ParseMode, parse_keys};
//!
//! let keys = parse_keys("rust -deprecated", ParseMode::Terms, Conjunction::And).unwrap();
//! assert!(keys.is_some());
//! ```

#![warn(missing_docs)]

mod ast;
mod error;
mod field;
mod keys;
mod language;
mod lexer;
mod parser;

pub use ast::{Condition, ConditionGroup, ConditionItem, Conjunction, Operand, Operator, Value};
pub use error::{LanguageError, LexError, ParseError, QueryError, QueryErrorKind};
pub use field::{Cardinality, DataType};
pub use keys::{KeyExpression, KeyGroup, ParseMode, ParseModeError};
pub use language::{LANGUAGE_SEPARATOR, LanguageId};
pub use lexer::{Token, tokenize};
pub use parser::parse_keys;
