//! Command implementations and dispatch.

pub mod check;
pub mod compile;
pub mod config;
pub mod fields;
pub mod init;
pub mod keys;
pub mod naming;

use std::process::ExitCode;

use super::{args::Commands, context::CommandContext};

/// Dispatches to the selected subcommand.
pub fn run(command: Commands) -> ExitCode {
    // These must work without a config, or with one that fails to load.
    let needs_config = !matches!(
        command,
        Commands::Init(_)
            | Commands::Check
            | Commands::FieldName(_)
            | Commands::Encode { .. }
            | Commands::Decode { .. }
    );
    let loaded = if needs_config {
        CommandContext::load()
    } else {
        CommandContext::load_cwd_only()
    };
    let ctx = match loaded {
        Ok(ctx) => ctx,
        Err(code) => return code,
    };

    match command {
        Commands::Init(cmd) => init::run(&ctx, &cmd),
        Commands::Check => check::run(&ctx),
        Commands::Config => config::run(&ctx),
        Commands::Fields(cmd) => fields::run(&ctx, &cmd),
        Commands::FieldName(cmd) => naming::field_name(&cmd),
        Commands::Encode { name } => naming::encode(&name),
        Commands::Decode { name } => naming::decode(&name),
        Commands::Keys(cmd) => keys::run(&ctx, &cmd),
        Commands::Compile(cmd) => compile::run(&ctx, &cmd),
    }
}
