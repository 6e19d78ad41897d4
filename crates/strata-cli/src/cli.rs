use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "strata")]
#[command(about = "Strata GraphQL: preview the schema generated for a set of classes")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Class definitions (JSON array of {className, fields})
    #[arg(short, long, global = true, env = "STRATA_CLASSES")]
    pub classes: Option<PathBuf>,

    /// GraphQL config to apply before building (JSON)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Settings file with a [graphql] section
    #[arg(short, long, global = true, env = "STRATA_SETTINGS")]
    pub settings: Option<PathBuf>,

    /// Custom type definitions merged into the generated schema (SDL)
    #[arg(short, long, global = true)]
    pub typedefs: Option<PathBuf>,

    /// Cloud function to expose; it echoes its parameters (repeatable)
    #[arg(long = "function", global = true)]
    pub functions: Vec<String>,

    /// Output format
    #[arg(short, long, global = true)]
    pub format: Option<OutputFormat>,
}

#[derive(Clone, Copy, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Json,
    Table,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the generated schema as SDL
    Schema,
    /// List the generated types
    Types,
    /// Execute a GraphQL operation against an in-memory database
    Query(QueryArgs),
    /// Validate a GraphQL config file without building
    CheckConfig(CheckConfigArgs),
}

#[derive(clap::Args)]
pub struct QueryArgs {
    /// The operation, e.g. '{ health }'
    pub query: String,
    /// Variables (JSON object)
    #[arg(long)]
    pub variables: Option<String>,
}

#[derive(clap::Args)]
pub struct CheckConfigArgs {
    /// Path to the config (JSON)
    pub file: PathBuf,
}
