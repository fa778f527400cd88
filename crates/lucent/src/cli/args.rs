//! Clap argument definitions for the `lucent` CLI.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};
use lucent_query::{DataType, LanguageId, ParseMode};

/// Top-level CLI options.
#[derive(Parser)]
#[command(name = "lucent", version)]
#[command(about = "Lucent - Solr query compiler and dynamic field naming")]
pub struct Cli {
    /// Log more (-v for debug, -vv for trace); RUST_LOG takes precedence
    #[arg(short = 'v', long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Arguments for `lucent init`.
#[derive(Args, Debug, Clone)]
pub struct InitCommand {
    /// Create global ~/.lucent.toml instead
    #[arg(long)]
    pub global: bool,

    /// Overwrite existing configuration file
    #[arg(long)]
    pub force: bool,
}

/// Arguments for `lucent fields`.
#[derive(Args, Debug, Clone)]
pub struct FieldsCommand {
    /// Languages to resolve fulltext names for [default: configured languages]
    #[arg(short = 'l', long = "lang")]
    pub languages: Vec<LanguageId>,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Arguments for `lucent field-name`.
#[derive(Args, Debug, Clone)]
pub struct FieldNameCommand {
    /// Field id
    pub id: String,

    /// Data type: string, text, integer, decimal, boolean, date, date_range, location
    #[arg(short = 't', long = "type")]
    pub data_type: DataType,

    /// Field holds multiple values
    #[arg(long)]
    pub multi: bool,

    /// Language for fulltext fields [default: und]
    #[arg(short = 'l', long = "lang")]
    pub language: Option<LanguageId>,
}

/// Arguments for `lucent keys`.
#[derive(Args, Debug, Clone)]
pub struct KeysCommand {
    /// User keys, as typed into a search box
    pub input: String,

    /// Parse mode: terms, phrase, edismax, direct [default: from config]
    #[arg(short = 'm', long)]
    pub mode: Option<ParseMode>,

    /// Join adjacent keys with OR instead of the configured conjunction
    #[arg(long)]
    pub or: bool,

    /// Backend field to search, with optional boost (e.g. tm_X3b_en_title^5)
    #[arg(short = 'f', long = "field")]
    pub fields: Vec<String>,

    /// Print the parsed key tree before the flattened query
    #[arg(long)]
    pub explain: bool,
}

/// Arguments for `lucent compile`.
#[derive(Args, Debug, Clone)]
pub struct CompileCommand {
    /// JSON file holding the query, or - for stdin
    pub input: PathBuf,

    /// Output the request as JSON instead of key=value parameters
    #[arg(long)]
    pub json: bool,

    /// Compile distance conditions on location fields into geofilt queries
    #[arg(long)]
    pub geofilt: bool,
}

/// Supported `lucent` subcommands.
#[derive(Subcommand)]
pub enum Commands {
    /// Initialize lucent configuration in current directory
    Init(InitCommand),

    /// Validate configuration and diagnose issues
    Check,

    /// Show effective configuration settings
    Config,

    /// List configured fields and their backend names
    Fields(FieldsCommand),

    /// Print the backend name of one field
    FieldName(FieldNameCommand),

    /// Escape a field id for use in a backend field name
    Encode {
        /// Field id to encode
        name: String,
    },

    /// Reverse the escaping of an encoded field id
    Decode {
        /// Encoded name
        name: String,
    },

    /// Parse user keys and flatten them into a query
    #[command(after_help = "\
KEY SYNTAX (terms and edismax modes):
  term              Term must appear
  term1 term2       Adjacent terms (configured conjunction)
  \"phrase\"          Phrase kept as one key
  -term             Term must NOT appear
  term1 OR term2    Either term
  (expr)            Grouping")]
    Keys(KeysCommand),

    /// Assemble a JSON search query into a backend request
    Compile(CompileCommand),
}
