//! CLI support for the `lucent` binary.

pub mod args;
pub mod commands;
pub mod context;
pub mod output;

