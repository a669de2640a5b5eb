//! Export command - serialize structures of one type back to plain text.

use clap::Parser;

use super::super::output::{format_error, log_info, write_output};
use crate::export::export_structures;
use crate::index::AnnotationIndex;

/// Export structures of one type back to plain text
#[derive(Parser, Debug)]
pub struct ExportArgs {
    /// Path to the persisted index
    #[arg(short, long, value_name = "PATH")]
    pub index: String,

    /// Structural level to export (e.g. 'sentence', 'token', 'document')
    #[arg(short, long, value_name = "TYPE")]
    pub structure: String,

    /// Separator placed after each exported unit
    #[arg(long, default_value = "\n")]
    pub separator: String,

    /// Path to the output text file (stdout when omitted)
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<String>,
}

pub fn run(args: ExportArgs, quiet: bool) -> Result<(), String> {
    let index = AnnotationIndex::load(&args.index)
        .map_err(|e| format_error("export", &format!("cannot load {}: {e}", args.index)))?;

    let exports = export_structures(&index, &args.structure)
        .map_err(|e| format_error("export", &format!("{e}")))?;

    let mut content = String::new();
    for export in &exports {
        content.push_str(export);
        content.push_str(&args.separator);
    }
    write_output(&content, args.output.as_deref())?;

    log_info(
        &format!("Exported {} {} structures.", exports.len(), args.structure),
        quiet,
    );
    Ok(())
}
