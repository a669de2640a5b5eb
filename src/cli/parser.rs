//! CLI argument parsing and structure definitions.

use clap::{Parser, Subcommand};

use super::commands;

/// Stand-off annotation indexing for linguistic corpora.
#[derive(Parser)]
#[command(name = "standoff")]
#[command(
    author,
    version,
    about = "Stand-off annotation indexing for linguistic corpora",
    long_about = r#"
standoff - build and query stand-off annotation indexes

A corpus subset is indexed as immutable literal spans plus typed structure
spans (document / paragraph / sentence / token / annotation layers), with
explicit membership and containment relations.

EXAMPLES:
  standoff ingest --input corpus.conllu --output index.json --force-alignment
  standoff export --index index.json --structure sentence --output text.txt
  standoff analyze --index index.json --types upos deprel Case
  standoff info --index index.json
"#
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Suppress progress messages on stderr
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// Available subcommands.
#[derive(Subcommand)]
pub enum Commands {
    /// Ingest an annotated corpus into a new index
    #[command(visible_alias = "i")]
    Ingest(commands::IngestArgs),

    /// Export structures of one type back to plain text
    #[command(visible_alias = "x")]
    Export(commands::ExportArgs),

    /// Compute pairwise overlap between annotation layers
    #[command(visible_alias = "a")]
    Analyze(commands::AnalyzeArgs),

    /// Show index size statistics and per-type counts
    Info(commands::InfoArgs),
}

/// Dispatch a parsed CLI invocation.
pub fn run(cli: Cli) -> Result<(), String> {
    match cli.command {
        Commands::Ingest(args) => commands::ingest::run(args, cli.quiet),
        Commands::Export(args) => commands::export::run(args, cli.quiet),
        Commands::Analyze(args) => commands::analyze::run(args, cli.quiet),
        Commands::Info(args) => commands::info::run(args),
    }
}
