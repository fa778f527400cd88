//! Error types for the lucent-index crate.

use lucent_query::{DataType, Operator, ParseMode, QueryError};
use thiserror::Error;

/// Errors that abort the compilation of one query.
///
/// Compilation is deterministic, so none of these are worth retrying with the same input.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompileError {
    /// A condition references a field the schema does not know.
    #[error("unknown field: {0}")]
    UnknownField(String),

    /// A fulltext field was queried without any language to resolve its name.
    #[error("fulltext field '{field}' needs a language, but none is active")]
    MissingLanguageContext {
        /// The fulltext field id.
        field: String,
    },

    /// The keys cannot be expressed in the requested parse mode.
    #[error("keys cannot be compiled in {mode} parse mode: {reason}")]
    IncompatibleParseMode {
        /// The requested parse mode.
        mode: ParseMode,
        /// What made the keys incompatible.
        reason: &'static str,
    },

    /// The operator is not valid for the field's data type.
    #[error("operator {operator} is not supported on {data_type} field '{field}'")]
    UnsupportedOperator {
        /// Field id.
        field: String,
        /// Field data type.
        data_type: DataType,
        /// The rejected operator.
        operator: Operator,
    },

    /// The condition's value does not fit its operator.
    #[error("invalid value for {operator} on field '{field}': {reason}")]
    InvalidOperand {
        /// Field id.
        field: String,
        /// The condition's operator.
        operator: Operator,
        /// Why the value was rejected.
        reason: String,
    },

    /// User keys could not be parsed.
    #[error(transparent)]
    Query(#[from] QueryError),
}

impl CompileError {
    /// Creates an `InvalidOperand` error.
    pub(crate) fn invalid_operand(
        field: &str,
        operator: Operator,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidOperand {
            field: field.to_string(),
            operator,
            reason: reason.into(),
        }
    }

    /// Creates an `UnsupportedOperator` error.
    pub(crate) fn unsupported(field: &str, data_type: DataType, operator: Operator) -> Self {
        Self::UnsupportedOperator {
            field: field.to_string(),
            data_type,
            operator,
        }
    }
}
