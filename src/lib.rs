//! # standoff
//!
//! Stand-off annotation indexing for linguistic corpora.
//!
//! A corpus subset is represented as immutable character spans (*literals*)
//! plus arbitrarily nested, overlapping annotation spans (*structures*:
//! tokens, sentences, paragraphs, documents, morphosyntactic feature
//! layers), with explicit membership and hierarchical containment
//! relations between them.
//!
//! - **Ingestion**: annotated records (e.g. from CoNLL-U treebanks) are
//!   bulk-built into an index in a single pass, with optional forced
//!   alignment against the raw sentence text.
//! - **Query/Export**: structures can be retrieved by type, serialized
//!   back to plain text, or analyzed for pairwise layer overlap.
//!
//! The build is single-writer and atomic per subset; a built index is
//! immutable and safe for unbounded concurrent readers.
//!
//! # Example
//!
//! ```rust
//! use standoff::{ingest, export_structures, IngestOptions, SentenceRecord, TokenRecord};
//!
//! let sentence = SentenceRecord::new(vec![
//!     TokenRecord::new("Dogs").with_field("upos", "NOUN"),
//!     TokenRecord::new("bark").with_field("upos", "VERB"),
//! ]);
//! let built = ingest(&[sentence], IngestOptions::default()).unwrap();
//!
//! let lines = export_structures(&built.index, "sentence").unwrap();
//! assert_eq!(lines, vec!["Dogs bark "]);
//! ```

#![warn(missing_docs)]

pub mod conllu;
pub mod error;
pub mod export;
pub mod index;
pub mod ingest;
pub mod literal;
pub mod overlap;
pub mod record;
pub mod structure;

#[cfg(feature = "cli")]
pub mod cli;

pub use conllu::parse_conllu;
pub use error::{Error, Result};
pub use export::{export_structures, write_export};
pub use index::{AnnotationIndex, Containment, IndexStats};
pub use ingest::{ingest, Granularity, IndexBuilder, IngestOptions, Ingestion};
pub use literal::{Literal, LiteralId, LiteralStore};
pub use overlap::{overlap_matrix, OverlapEntry, OverlapMatrix};
pub use record::{SentenceRecord, TokenRecord};
pub use structure::{Structure, StructureId, StructureStore};
