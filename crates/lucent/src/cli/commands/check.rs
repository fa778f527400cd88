//! Implementation of `lucent check`.

use std::process::ExitCode;

use lucent_config::{Config, ConfigSources, ConfigWarning, SourceKind};
use lucent_index::Schema;

use crate::cli::{
    context::CommandContext,
    output::{dim, subheader, warning},
};

/// Loads and validates configuration, reporting the effective index scope and warnings.
///
/// Exits with failure when loading fails or when there are warnings.
pub fn run(ctx: &CommandContext) -> ExitCode {
    let cwd = &ctx.cwd;

    let sources = ConfigSources::discover(cwd);
    if sources.is_empty() {
        println!("{}", dim("No configuration files found."));
        println!();
        println!(
            "Run {} to create a configuration file.",
            subheader("lucent init")
        );
        return ExitCode::SUCCESS;
    }

    println!("{}", subheader("Config files:"));
    for source in sources.iter() {
        let mut notes = Vec::new();
        if source.kind == SourceKind::Global {
            notes.push("global");
        }
        if source.root {
            notes.push("root");
        }
        if notes.is_empty() {
            println!("   {}", source.path.display());
        } else {
            println!("   {} {}", source.path.display(), dim(&format!("({})", notes.join(", "))));
        }
    }
    println!();

    let config = match Config::load_from_files(&sources.paths()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let schema = Schema::from_config(&config);
    let scope = schema.scope();
    println!("{}", subheader("Index:"));
    println!("   index_id {}", scope.index_id);
    println!("   site hash {}", scope.site_hash);
    if schema.is_foreign() {
        println!("   {}", dim("(foreign schema: no scoping filters)"));
    }
    println!();

    println!("{}", subheader("Fields:"));
    println!(
        "   {} defined, {} fulltext",
        config.fields.len(),
        config.text_fields().count()
    );
    let languages: Vec<&str> = config.search.languages.iter().map(|l| l.as_str()).collect();
    if languages.is_empty() {
        println!("   languages {}", dim("(none)"));
    } else {
        println!("   languages {}", languages.join(", "));
    }
    println!();

    let warnings = config.validate();
    if warnings.is_empty() {
        println!("No issues found.");
        return ExitCode::SUCCESS;
    }

    println!("{}", subheader(&format!("Warnings ({}):", warnings.len())));
    for w in &warnings {
        println!("   {}", warning(&w.to_string()));
    }
    println!();

    print_hints(&warnings);

    ExitCode::FAILURE
}

/// Prints hints for resolving common warnings.
fn print_hints(warnings: &[ConfigWarning]) {
    let mut hints: Vec<&str> = warnings
        .iter()
        .map(|w| match w {
            ConfigWarning::NoFieldsDefined => "Add [field.<id>] sections to .lucent.toml.",
            ConfigWarning::TextFieldsWithoutLanguages { .. } => {
                "Set languages in the [search] section, e.g. languages = [\"en\"]."
            }
            ConfigWarning::ReservedFieldId { .. } => {
                "Rename the field; search_api_* ids map to fixed backend fields."
            }
            ConfigWarning::BoostOnNonTextField { .. } => {
                "Boosts only apply to fulltext fields; remove them elsewhere."
            }
            ConfigWarning::InvalidBoost { .. } => "Boosts must be greater than zero.",
        })
        .collect();
    hints.sort_unstable();
    hints.dedup();

    for hint in hints {
        println!("{}", dim(&format!("Hint: {hint}")));
    }
}
