//! Info command - index size statistics and per-type counts.

use clap::Parser;

use super::super::output::format_error;
use crate::index::AnnotationIndex;

/// Show index size statistics and per-type counts
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to the persisted index
    #[arg(short, long, value_name = "PATH")]
    pub index: String,
}

pub fn run(args: InfoArgs) -> Result<(), String> {
    let index = AnnotationIndex::load(&args.index)
        .map_err(|e| format_error("info", &format!("cannot load {}: {e}", args.index)))?;

    let stats = index.stats();
    println!("standoff index '{}'", args.index);
    println!("  literals:          {}", stats.literals);
    println!("  structures:        {}", stats.structures);
    println!("  containment edges: {}", stats.containment_edges);
    println!();
    println!("Structure counts by type:");
    for (stype, count) in index.structure_counts() {
        println!("  {:<20} {}", stype, count);
    }
    Ok(())
}
