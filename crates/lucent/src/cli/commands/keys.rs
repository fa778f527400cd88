//! Implementation of `lucent keys`.

use std::process::ExitCode;

use lucent_index::{CompileError, MATCH_ALL, QueryAssembler, SearchQuery, compile_keys};
use lucent_query::{Conjunction, KeyExpression, ParseMode, parse_keys};

use crate::cli::{args::KeysCommand, context::CommandContext, output::subheader};

/// Parses user keys and prints the flattened query.
///
/// Without `--field`, keys are flattened over the configured fulltext fields in the
/// configured languages.
pub fn run(ctx: &CommandContext, cmd: &KeysCommand) -> ExitCode {
    let settings = &ctx.config.search;
    let mode = cmd.mode.unwrap_or(settings.parse_mode);
    let conjunction = if cmd.or {
        Conjunction::Or
    } else {
        settings.conjunction
    };

    let keys = match parse_keys(&cmd.input, mode, conjunction) {
        Ok(Some(keys)) => keys,
        Ok(None) => {
            println!("{MATCH_ALL}");
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    if cmd.explain {
        println!("{}", subheader("Parsed keys:"));
        match serde_json::to_string_pretty(&keys) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("error: failed to serialize JSON: {e}");
                return ExitCode::FAILURE;
            }
        }
        println!();
        println!("{}", subheader(&format!("Query ({mode}):")));
    }

    match flatten(ctx, cmd, keys, mode) {
        Ok(query) => {
            println!("{query}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Flattens keys over the fields given on the command line, or the configured ones.
fn flatten(
    ctx: &CommandContext,
    cmd: &KeysCommand,
    keys: KeyExpression,
    mode: ParseMode,
) -> Result<String, CompileError> {
    if !cmd.fields.is_empty() {
        let fields: Vec<(String, Option<String>)> =
            cmd.fields.iter().map(|f| (f.clone(), None)).collect();
        let query = compile_keys(&keys, &fields, mode)?;
        return Ok(if query.is_empty() {
            MATCH_ALL.to_string()
        } else {
            query
        });
    }

    let schema = ctx.schema();
    let query = SearchQuery {
        parse_mode: Some(mode),
        skip_scoping: true,
        ..SearchQuery::new().with_keys(keys)
    };
    let request = QueryAssembler::new(&schema)
        .with_settings(ctx.config.search.clone())
        .assemble(&query)?;
    Ok(request.q)
}
