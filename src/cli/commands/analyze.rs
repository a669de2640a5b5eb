//! Analyze command - pairwise overlap between annotation layers.

use clap::Parser;

use super::super::output::{format_error, log_info, write_output};
use crate::index::AnnotationIndex;
use crate::overlap::overlap_matrix;

/// Compute pairwise overlap between annotation layers
#[derive(Parser, Debug)]
pub struct AnalyzeArgs {
    /// Path to the persisted index
    #[arg(short, long, value_name = "PATH")]
    pub index: String,

    /// Annotation types to analyze (at least one)
    #[arg(short, long, value_name = "TYPE", num_args = 1.., required = true)]
    pub types: Vec<String>,

    /// Path to the JSON output file (stdout when omitted)
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<String>,
}

pub fn run(args: AnalyzeArgs, quiet: bool) -> Result<(), String> {
    let index = AnnotationIndex::load(&args.index)
        .map_err(|e| format_error("analyze", &format!("cannot load {}: {e}", args.index)))?;

    let matrix = overlap_matrix(&index, &args.types)
        .map_err(|e| format_error("analyze", &format!("{e}")))?;

    let mut json = serde_json::to_string_pretty(&matrix)
        .map_err(|e| format_error("analyze", &format!("{e}")))?;
    json.push('\n');
    write_output(&json, args.output.as_deref())?;

    log_info(
        &format!(
            "Computed overlap for {} type pairs across {} types.",
            matrix.len(),
            args.types.len()
        ),
        quiet,
    );
    Ok(())
}
