//! Implementation of `lucent fields`.

use std::process::ExitCode;

use crate::cli::{
    args::FieldsCommand,
    context::CommandContext,
    output::{FieldRow, dim, fields_table, subheader},
};

/// Lists configured fields with their backend names per language.
pub fn run(ctx: &CommandContext, cmd: &FieldsCommand) -> ExitCode {
    let schema = ctx.schema();
    let languages = if cmd.languages.is_empty() {
        schema.languages().to_vec()
    } else {
        cmd.languages.clone()
    };

    let rows: Vec<FieldRow> = schema
        .fields()
        .map(|field| FieldRow::new(&schema, field, &languages))
        .collect();

    if cmd.json {
        return match serde_json::to_string_pretty(&rows) {
            Ok(json) => {
                println!("{json}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("error: failed to serialize JSON: {e}");
                ExitCode::FAILURE
            }
        };
    }

    if rows.is_empty() {
        println!("{}", dim("No fields defined."));
        println!();
        println!(
            "Run {} to create a configuration file.",
            subheader("lucent init")
        );
        return ExitCode::SUCCESS;
    }

    println!("{}", fields_table(&rows));
    ExitCode::SUCCESS
}
