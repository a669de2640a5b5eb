//! Ingestion input interface: annotated token records grouped into sentences.
//!
//! These types are the boundary between the index and whatever front end
//! produced the annotations. The CoNLL-U reader in [`crate::conllu`]
//! produces them; any other tokenizer/tagger can as well.

use serde::{Deserialize, Serialize};

/// One annotated token.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRecord {
    /// Surface text of the token.
    pub form: String,
    /// Morphosyntactic fields as (name, value) pairs: `upos`, `xpos`,
    /// `lemma`, `deprel`, morphological features (`Case`, `Number`, ...),
    /// misc annotations. The key set is open but enumerable; unrecognized
    /// names are ignored with a warning at ingestion time.
    pub fields: Vec<(String, String)>,
    /// True when the source marks this token as not followed by whitespace
    /// (CoNLL-U `SpaceAfter=No`).
    pub no_space_after: bool,
    /// One-based id of the syntactic head within the sentence; 0 for the
    /// root, `None` when the corpus carries no dependency annotation.
    pub head: Option<u32>,
}

impl TokenRecord {
    /// Create a bare token with no annotations.
    #[must_use]
    pub fn new(form: impl Into<String>) -> Self {
        Self {
            form: form.into(),
            ..Self::default()
        }
    }

    /// Add a morphosyntactic field.
    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    /// Mark the token as not followed by whitespace.
    #[must_use]
    pub fn with_no_space_after(mut self) -> Self {
        self.no_space_after = true;
        self
    }

    /// Set the syntactic head (one-based, 0 = root).
    #[must_use]
    pub fn with_head(mut self, head: u32) -> Self {
        self.head = Some(head);
        self
    }
}

/// One sentence of annotated tokens with its metadata.
///
/// Document and paragraph boundary markers travel in `metadata` under the
/// `newdoc`/`newpar` keys (optionally with an id value), exactly as the
/// source records carry them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentenceRecord {
    /// The sentence's tokens in order.
    pub tokens: Vec<TokenRecord>,
    /// Sentence metadata as (key, value) pairs; boundary markers use an
    /// empty value when the source gives no id.
    pub metadata: Vec<(String, String)>,
    /// Raw untokenized sentence text, required for forced alignment.
    pub text: Option<String>,
}

impl SentenceRecord {
    /// Create a sentence from tokens.
    #[must_use]
    pub fn new(tokens: Vec<TokenRecord>) -> Self {
        Self {
            tokens,
            ..Self::default()
        }
    }

    /// Attach a metadata pair.
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.push((key.into(), value.into()));
        self
    }

    /// Attach raw sentence text for alignment.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Value of a metadata key, if present.
    #[must_use]
    pub fn metadata_value(&self, key: &str) -> Option<&str> {
        self.metadata
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}
