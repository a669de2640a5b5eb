//! Error types for standoff.

use thiserror::Error;

/// Result type for standoff operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for standoff operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Token text not found at the expected position during forced alignment.
    ///
    /// Aborts the current subset's build; no partial index is persisted.
    #[error("Alignment failed at sentence {sentence}, token {token} ('{form}'): expected at offset {offset} of '{context}'")]
    Alignment {
        /// Zero-based sentence index within the ingested subset.
        sentence: usize,
        /// Zero-based token index within the sentence.
        token: usize,
        /// Surface form that could not be aligned.
        form: String,
        /// Character offset into the raw sentence text where the token was expected.
        offset: usize,
        /// Remaining raw sentence text at the failure point.
        context: String,
    },

    /// Inconsistent record or boundary markers in the ingestion input.
    #[error("Malformed record at {position}: {message}")]
    MalformedRecord {
        /// Human-readable position of the offending record (line or sentence/token).
        position: String,
        /// What was wrong with it.
        message: String,
    },

    /// Membership or containment edge referencing a non-existent id.
    ///
    /// Indicates a bug in the ingestion pipeline, not bad input.
    #[error("Integrity violation: {0}")]
    Integrity(String),

    /// A structure type that was never declared in the index configuration.
    #[error("Undefined structure type '{0}': not declared in this index")]
    UndefinedType(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Index serialization/deserialization error.
    #[error("Index format error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a malformed record error.
    pub fn malformed(position: impl Into<String>, message: impl Into<String>) -> Self {
        Error::MalformedRecord {
            position: position.into(),
            message: message.into(),
        }
    }

    /// Create an integrity error.
    pub fn integrity(msg: impl Into<String>) -> Self {
        Error::Integrity(msg.into())
    }

    /// Create an undefined type error.
    pub fn undefined_type(stype: impl Into<String>) -> Self {
        Error::UndefinedType(stype.into())
    }
}
