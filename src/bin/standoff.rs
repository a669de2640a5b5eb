//! standoff - stand-off annotation indexing CLI.
//!
//! # Usage
//!
//! ```bash
//! # Build an index from a CoNLL-U treebank
//! standoff ingest --input corpus.conllu --output index.json
//!
//! # Export sentences back to plain text
//! standoff export --index index.json --structure sentence
//!
//! # Overlap between annotation layers
//! standoff analyze --index index.json --types upos deprel
//!
//! # Index statistics
//! standoff info --index index.json
//! ```

use std::process::ExitCode;

use clap::Parser;

use standoff::cli::{run, Cli};

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("{message}");
            ExitCode::FAILURE
        }
    }
}
