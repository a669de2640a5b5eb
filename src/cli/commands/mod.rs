//! Command implementations for the standoff CLI.
//!
//! Each command has its own module/file.

pub mod analyze;
pub mod export;
pub mod info;
pub mod ingest;

// Re-export argument types for the parser
pub use analyze::AnalyzeArgs;
pub use export::ExportArgs;
pub use info::InfoArgs;
pub use ingest::IngestArgs;
