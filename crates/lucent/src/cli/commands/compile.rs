//! Implementation of `lucent compile`.

use std::{
    fs,
    io::{self, Read},
    path::Path,
    process::ExitCode,
};

use lucent_index::{GeofiltSpatial, QueryAssembler, SearchQuery};
use tracing::debug;

use crate::cli::{args::CompileCommand, context::CommandContext};

/// Assembles a JSON query into a request and prints its parameters.
pub fn run(ctx: &CommandContext, cmd: &CompileCommand) -> ExitCode {
    let text = match read_input(&cmd.input) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("error: failed to read {}: {e}", cmd.input.display());
            return ExitCode::FAILURE;
        }
    };

    let query: SearchQuery = match serde_json::from_str(&text) {
        Ok(query) => query,
        Err(e) => {
            eprintln!("error: invalid query in {}: {e}", cmd.input.display());
            return ExitCode::FAILURE;
        }
    };
    debug!(?query, "query loaded");

    let schema = ctx.schema();
    let mut assembler = QueryAssembler::new(&schema).with_settings(ctx.config.search.clone());
    if cmd.geofilt {
        assembler = assembler.with_spatial(&GeofiltSpatial);
    }

    let request = match assembler.assemble(&query) {
        Ok(request) => request,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    if cmd.json {
        return match request.to_json() {
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

    for (key, value) in request.to_params() {
        println!("{key}={value}");
    }
    ExitCode::SUCCESS
}

/// Reads the query from a file, or from stdin for `-`.
fn read_input(path: &Path) -> io::Result<String> {
    if path == Path::new("-") {
        let mut text = String::new();
        io::stdin().read_to_string(&mut text)?;
        return Ok(text);
    }
    fs::read_to_string(path)
}
