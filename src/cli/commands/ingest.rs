//! Ingest command - build an index from an annotated corpus file.

use std::fs::File;
use std::io::BufReader;

use clap::Parser;

use super::super::output::{format_error, log_info, log_warning};
use crate::conllu::parse_conllu;
use crate::ingest::{Granularity, IndexBuilder, IngestOptions};

/// Ingest an annotated corpus into a new index
#[derive(Parser, Debug)]
pub struct IngestArgs {
    /// Path to the corpus in CoNLL-U format
    #[arg(short, long, value_name = "PATH")]
    pub input: String,

    /// Path to write the persisted index
    #[arg(short, long, value_name = "PATH")]
    pub output: String,

    /// Literal granularity: 'character' or 'token'
    #[arg(long, default_value = "token")]
    pub granularity: String,

    /// Align tokens against the raw sentence text, reconstructing
    /// whitespace verbatim
    #[arg(long)]
    pub force_alignment: bool,

    /// Literal appended after each sentence (may be empty)
    #[arg(long, default_value = " ")]
    pub sentence_terminator: String,
}

pub fn run(args: IngestArgs, quiet: bool) -> Result<(), String> {
    let granularity: Granularity = args
        .granularity
        .parse()
        .map_err(|e| format_error("ingest", &format!("{e}")))?;
    let options = IngestOptions {
        granularity,
        force_alignment: args.force_alignment,
        sentence_terminator: args.sentence_terminator,
        ..IngestOptions::default()
    };

    let file = File::open(&args.input)
        .map_err(|e| format_error("ingest", &format!("cannot open {}: {e}", args.input)))?;
    let sentences = parse_conllu(BufReader::new(file))
        .map_err(|e| format_error("ingest", &format!("{e}")))?;
    log_info(
        &format!("Parsed {} sentences from '{}'.", sentences.len(), args.input),
        quiet,
    );

    let outcome = IndexBuilder::new(options)
        .ingest(&sentences)
        .map_err(|e| format_error("ingest", &format!("{e}")))?;
    for warning in &outcome.warnings {
        log_warning(warning);
    }

    outcome
        .index
        .save(&args.output)
        .map_err(|e| format_error("ingest", &format!("cannot save {}: {e}", args.output)))?;

    let stats = outcome.index.stats();
    log_info(
        &format!(
            "Built index '{}': {} literals, {} structures, {} containment edges.",
            args.output, stats.literals, stats.structures, stats.containment_edges
        ),
        quiet,
    );
    Ok(())
}
