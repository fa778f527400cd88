//! Implementations of `lucent field-name`, `lucent encode` and `lucent decode`.

use std::process::ExitCode;

use lucent_index::{FieldDescriptor, decode_name, encode_name, field_name as backend_name};
use lucent_query::{Cardinality, LanguageId};

use crate::cli::args::FieldNameCommand;

/// Prints the backend name of a field described on the command line.
pub fn field_name(cmd: &FieldNameCommand) -> ExitCode {
    let mut field = FieldDescriptor::new(&cmd.id, cmd.data_type);
    field.cardinality = Cardinality::from_multi(cmd.multi);
    let language = cmd.language.clone().unwrap_or(LanguageId::UNSPECIFIED);

    println!("{}", backend_name(&field, &language));
    ExitCode::SUCCESS
}

/// Prints the escaped form of a field id.
pub fn encode(name: &str) -> ExitCode {
    println!("{}", encode_name(name));
    ExitCode::SUCCESS
}

/// Prints the unescaped form of an encoded field id.
pub fn decode(name: &str) -> ExitCode {
    println!("{}", decode_name(name));
    ExitCode::SUCCESS
}
