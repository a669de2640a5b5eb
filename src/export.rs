//! Export-to-text: serialize selected structures back into plain text.
//!
//! One exported unit per structure of the selected type, built by
//! concatenating the member literals' values in offset order. Read-only and
//! idempotent over an unchanged index.

use std::io::Write;

use crate::error::Result;
use crate::index::AnnotationIndex;

/// Export every structure of the given type as a string.
///
/// Zero matches for a declared type is a valid, empty outcome; a type that
/// was never declared in the index configuration is
/// [`crate::Error::UndefinedType`].
pub fn export_structures(index: &AnnotationIndex, stype: &str) -> Result<Vec<String>> {
    index.require_declared(stype)?;
    let mut exports = Vec::new();
    for structure in index.structures.find_by_type(stype) {
        let text: String = index
            .literals_of(structure.id)?
            .iter()
            .map(|l| l.value.as_str())
            .collect();
        exports.push(text);
    }
    Ok(exports)
}

/// Write each exported unit followed by the separator (default use: one
/// unit per line). Returns the number of units written.
pub fn write_export(
    index: &AnnotationIndex,
    stype: &str,
    writer: &mut impl Write,
    separator: &str,
) -> Result<usize> {
    let exports = export_structures(index, stype)?;
    for export in &exports {
        writer.write_all(export.as_bytes())?;
        writer.write_all(separator.as_bytes())?;
    }
    Ok(exports.len())
}
