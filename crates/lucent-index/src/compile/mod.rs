//! Query compilation.
//!
//! - [`keys`]: fulltext keys to a boolean query over language-specific fields
//! - [`conditions`]: condition trees to tagged filter fragments

pub mod conditions;
pub mod keys;

pub use conditions::{ConditionCompiler, FilterFragment, compile_conditions, reduce};
pub use keys::{DEFAULT_SUFFIX, KeyFlattener, TargetField, compile_keys};
