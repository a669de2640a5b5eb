//! Output formatting utilities for CLI commands.

use std::io::{self, Write};

/// Format error message for display.
pub fn format_error(operation: &str, details: &str) -> String {
    format!("ERROR: {} - {}", operation, details)
}

/// Log an info message to stderr (respects quiet flag).
pub fn log_info(msg: &str, quiet: bool) {
    if !quiet {
        eprintln!("{}", msg);
    }
}

/// Log a warning to stderr (not silenced by quiet: warnings are part of the
/// ingestion contract, not progress chatter).
pub fn log_warning(msg: &str) {
    eprintln!("WARNING: {}", msg);
}

/// Write output to file or stdout.
pub fn write_output(content: &str, path: Option<&str>) -> Result<(), String> {
    if let Some(path) = path {
        std::fs::write(path, content)
            .map_err(|e| format!("Failed to write to {}: {}", path, e))?;
    } else {
        print!("{}", content);
        io::stdout()
            .flush()
            .map_err(|e| format!("Failed to flush stdout: {}", e))?;
    }
    Ok(())
}
