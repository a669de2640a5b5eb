//! Ingestion pipeline: annotated records in, one immutable index out.
//!
//! The builder consumes a sequence of [`SentenceRecord`]s and populates the
//! literal store, the structure store, and the containment relation in a
//! single bulk build. Any error discards the partially built state (the
//! builder is consumed by value), so a subset is either fully indexed or
//! not indexed at all.

use std::collections::{BTreeSet, HashSet};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::index::AnnotationIndex;
use crate::literal::LiteralId;
use crate::record::{SentenceRecord, TokenRecord};
use crate::structure::StructureId;

/// Carryover metadata patterns: keys matching these regexes persist across
/// sentences and attach to the enclosing document/paragraph structure
/// instead of the sentence.
static CARRYOVER_PATTERNS: Lazy<Vec<(Regex, CarryoverScope)>> = Lazy::new(|| {
    vec![
        (Regex::new(r"^newdoc( id)?$").unwrap(), CarryoverScope::Document),
        (Regex::new(r"^newpar( id)?$").unwrap(), CarryoverScope::Paragraph),
        // Document-level key/value metadata (e.g. GUM 'meta::dateCollected').
        // Metadata not recognized as paragraph-scoped defaults to document
        // scope.
        (Regex::new(r"^meta::.+$").unwrap(), CarryoverScope::DocumentMeta),
    ]
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CarryoverScope {
    Document,
    Paragraph,
    DocumentMeta,
}

/// Whether the literal stream holds one literal per character or per token.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    /// One literal per character of each textual unit.
    Character,
    /// One literal per token (and per whitespace gap).
    #[default]
    Token,
}

impl std::str::FromStr for Granularity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "character" | "char" => Ok(Granularity::Character),
            "token" => Ok(Granularity::Token),
            other => Err(Error::malformed(
                "granularity",
                format!("unknown literal granularity '{other}'"),
            )),
        }
    }
}

/// Morphosyntactic field names recognized by default: the CoNLL-U
/// single-valued columns plus the Universal Dependencies feature inventory.
pub const DEFAULT_ALLOWED_FIELDS: &[&str] = &[
    "lemma", "upos", "xpos", "deprel", "Abbr", "Animacy", "Aspect", "Case", "Clusivity",
    "Definite", "Degree", "Evident", "Foreign", "Gender", "Mood", "NounClass", "NumType",
    "Number", "Person", "Polarity", "Polite", "Poss", "PronType", "Reflex", "Tense", "Typo",
    "VerbForm", "Voice",
];

/// Configuration for one ingestion run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestOptions {
    /// Literal granularity (character vs. token).
    pub granularity: Granularity,
    /// Align tokens back onto the raw sentence text, reconstructing
    /// whitespace verbatim instead of applying the default rule.
    pub force_alignment: bool,
    /// Literal appended after each sentence; prevents adjacent exported
    /// sentences from concatenating without separation. May be empty.
    pub sentence_terminator: String,
    /// Per-corpus allow-list of morphosyntactic field names. Fields outside
    /// it are ignored with a warning.
    pub allowed_fields: BTreeSet<String>,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            granularity: Granularity::default(),
            force_alignment: false,
            sentence_terminator: " ".to_string(),
            allowed_fields: DEFAULT_ALLOWED_FIELDS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// Result of a completed ingestion: the validated index plus any non-fatal
/// warnings (unrecognized fields, uncovered raw text).
#[derive(Debug)]
pub struct Ingestion {
    /// The built, validated index.
    pub index: AnnotationIndex,
    /// Non-fatal warnings collected during the build.
    pub warnings: Vec<String>,
}

/// An open hierarchical scope (document or paragraph) during the build.
#[derive(Debug, Default)]
struct OpenScope {
    /// Structure id value (e.g. 'newdoc id' payload), if the source gave one.
    id: Option<String>,
    /// Literals accumulated while the scope was open.
    literals: Vec<LiteralId>,
    /// Sentences directly inside the scope (not via a nested paragraph).
    sentences: Vec<StructureId>,
    /// Closed paragraphs inside a document scope.
    paragraphs: Vec<StructureId>,
    /// Document-level carryover metadata, flushed when the scope closes.
    metadata: Vec<(String, String)>,
}

/// Single-writer bulk builder for one corpus subset.
#[derive(Debug)]
pub struct IndexBuilder {
    options: IngestOptions,
    index: AnnotationIndex,
    warnings: Vec<String>,
    warned_fields: HashSet<String>,
    observed_metadata_keys: BTreeSet<String>,
    document: Option<OpenScope>,
    paragraph: Option<OpenScope>,
}

impl IndexBuilder {
    /// Create a builder with the given options.
    #[must_use]
    pub fn new(options: IngestOptions) -> Self {
        Self {
            options,
            index: AnnotationIndex::default(),
            warnings: Vec::new(),
            warned_fields: HashSet::new(),
            observed_metadata_keys: BTreeSet::new(),
            document: None,
            paragraph: None,
        }
    }

    /// Ingest a full corpus subset and return the validated index.
    ///
    /// Consumes the builder: on error the partially built state is dropped.
    pub fn ingest(mut self, sentences: &[SentenceRecord]) -> Result<Ingestion> {
        for (sentence_idx, sentence) in sentences.iter().enumerate() {
            self.ingest_sentence(sentence_idx, sentence)?;
        }
        self.close_paragraph()?;
        self.close_document()?;

        let mut declared: BTreeSet<String> = ["document", "paragraph", "sentence", "token", "dependency"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        declared.extend(self.options.allowed_fields.iter().cloned());
        declared.extend(self.observed_metadata_keys.iter().cloned());

        let mut index = self.index;
        index.set_declared_types(declared);
        index.validate()?;
        Ok(Ingestion {
            index,
            warnings: self.warnings,
        })
    }

    fn ingest_sentence(&mut self, sentence_idx: usize, sentence: &SentenceRecord) -> Result<()> {
        if sentence.tokens.is_empty() {
            return Err(Error::malformed(
                format!("sentence {sentence_idx}"),
                "sentence record contains no tokens",
            ));
        }
        // An empty form would yield a zero-width literal.
        for (token_idx, token) in sentence.tokens.iter().enumerate() {
            if token.form.is_empty() {
                return Err(Error::malformed(
                    format!("sentence {sentence_idx}, token {token_idx}"),
                    "token has an empty surface form",
                ));
            }
        }

        self.process_boundaries(sentence_idx, sentence)?;

        let mut sentence_literals: Vec<LiteralId> = Vec::new();
        let mut token_structures: Vec<StructureId> = Vec::new();
        let mut token_literal_sets: Vec<Vec<LiteralId>> = Vec::new();

        if self.options.force_alignment {
            self.ingest_aligned_tokens(
                sentence_idx,
                sentence,
                &mut sentence_literals,
                &mut token_structures,
                &mut token_literal_sets,
            )?;
        } else {
            self.ingest_unaligned_tokens(
                sentence,
                &mut sentence_literals,
                &mut token_structures,
                &mut token_literal_sets,
            )?;
        }

        // Sentence terminator literal, part of the sentence span.
        if !self.options.sentence_terminator.is_empty() {
            let terminator = self.options.sentence_terminator.clone();
            sentence_literals.extend(self.append_unit(&terminator));
        }

        let sentence_sid =
            self.index
                .structures
                .create("sentence", None, &sentence_literals, &self.index.literals)?;
        for &token_sid in &token_structures {
            self.index.add_containment(sentence_sid, token_sid)?;
        }

        // Sentence-scoped metadata becomes one structure per key.
        for (key, value) in &sentence.metadata {
            if carryover_scope(key).is_some() {
                continue;
            }
            self.observed_metadata_keys.insert(key.clone());
            self.index.structures.create(
                key.clone(),
                Some(value.clone()),
                &sentence_literals,
                &self.index.literals,
            )?;
        }

        self.build_dependencies(
            sentence_idx,
            sentence,
            sentence_sid,
            &token_structures,
            &token_literal_sets,
        )?;

        // Track the sentence in the open scopes.
        if let Some(paragraph) = self.paragraph.as_mut() {
            paragraph.literals.extend(sentence_literals.iter().copied());
            paragraph.sentences.push(sentence_sid);
        }
        if let Some(document) = self.document.as_mut() {
            document.literals.extend(sentence_literals.iter().copied());
            if self.paragraph.is_none() {
                document.sentences.push(sentence_sid);
            }
        }
        Ok(())
    }

    /// Open/close document and paragraph scopes according to the sentence's
    /// boundary markers.
    fn process_boundaries(&mut self, sentence_idx: usize, sentence: &SentenceRecord) -> Result<()> {
        let mut new_document = false;
        let mut new_paragraph = false;
        let mut document_id: Option<String> = None;
        let mut paragraph_id: Option<String> = None;
        let mut document_meta: Vec<(String, String)> = Vec::new();

        for (key, value) in &sentence.metadata {
            match carryover_scope(key) {
                Some(CarryoverScope::Document) => {
                    new_document = true;
                    if !value.is_empty() {
                        document_id = Some(value.clone());
                    }
                }
                Some(CarryoverScope::Paragraph) => {
                    new_paragraph = true;
                    if !value.is_empty() {
                        paragraph_id = Some(value.clone());
                    }
                }
                Some(CarryoverScope::DocumentMeta) => {
                    document_meta.push((key.clone(), value.clone()));
                }
                None => {}
            }
        }

        if new_document {
            // A document boundary closes everything of equal or lower rank.
            self.close_paragraph()?;
            self.close_document()?;
            self.document = Some(OpenScope {
                id: document_id,
                ..OpenScope::default()
            });
        }
        if new_paragraph {
            self.close_paragraph()?;
            self.paragraph = Some(OpenScope {
                id: paragraph_id,
                ..OpenScope::default()
            });
        }

        if !document_meta.is_empty() {
            match self.document.as_mut() {
                // One value per key per document; a repeated key overwrites.
                Some(document) => {
                    for (key, value) in document_meta {
                        match document.metadata.iter_mut().find(|(k, _)| *k == key) {
                            Some(entry) => entry.1 = value,
                            None => document.metadata.push((key, value)),
                        }
                    }
                }
                None => self.warnings.push(format!(
                    "sentence {sentence_idx}: document-level metadata outside any document, ignored: {}",
                    document_meta
                        .iter()
                        .map(|(k, _)| k.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                )),
            }
        }
        Ok(())
    }

    /// Default mode: token literals plus a single-space literal between
    /// tokens, suppressed by the no-space-after flag. The final token gets
    /// no trailing space; the sentence terminator provides separation.
    fn ingest_unaligned_tokens(
        &mut self,
        sentence: &SentenceRecord,
        sentence_literals: &mut Vec<LiteralId>,
        token_structures: &mut Vec<StructureId>,
        token_literal_sets: &mut Vec<Vec<LiteralId>>,
    ) -> Result<()> {
        let last = sentence.tokens.len() - 1;
        for (token_idx, token) in sentence.tokens.iter().enumerate() {
            let token_literals = self.append_unit(&token.form);
            sentence_literals.extend(token_literals.iter().copied());

            let sid = self.create_token_structures(token, &token_literals)?;
            token_structures.push(sid);
            token_literal_sets.push(token_literals);

            if token_idx < last && !token.no_space_after {
                sentence_literals.extend(self.append_unit(" "));
            }
        }
        Ok(())
    }

    /// Alignment mode: consume the raw sentence text, emitting each
    /// inter-token gap verbatim as a whitespace literal.
    fn ingest_aligned_tokens(
        &mut self,
        sentence_idx: usize,
        sentence: &SentenceRecord,
        sentence_literals: &mut Vec<LiteralId>,
        token_structures: &mut Vec<StructureId>,
        token_literal_sets: &mut Vec<Vec<LiteralId>>,
    ) -> Result<()> {
        let text = sentence.text.as_deref().ok_or_else(|| {
            Error::malformed(
                format!("sentence {sentence_idx}"),
                "forced alignment requires raw sentence text",
            )
        })?;
        let raw: Vec<char> = text.chars().collect();
        let mut cursor = 0usize;

        for (token_idx, token) in sentence.tokens.iter().enumerate() {
            // Consume the gap since the previous token.
            let gap_start = cursor;
            while cursor < raw.len() && raw[cursor].is_whitespace() {
                cursor += 1;
            }
            if cursor > gap_start {
                let gap: String = raw[gap_start..cursor].iter().collect();
                sentence_literals.extend(self.append_unit(&gap));
            }

            let form: Vec<char> = token.form.chars().collect();
            if raw[cursor..].len() < form.len() || raw[cursor..cursor + form.len()] != form[..] {
                let context: String = raw[cursor..].iter().take(40).collect();
                return Err(Error::Alignment {
                    sentence: sentence_idx,
                    token: token_idx,
                    form: token.form.clone(),
                    offset: cursor,
                    context,
                });
            }
            cursor += form.len();

            let token_literals = self.append_unit(&token.form);
            sentence_literals.extend(token_literals.iter().copied());

            let sid = self.create_token_structures(token, &token_literals)?;
            token_structures.push(sid);
            token_literal_sets.push(token_literals);
        }

        // Trailing whitespace belongs to the sentence; anything else means
        // the tokens did not cover the raw text.
        let tail_start = cursor;
        while cursor < raw.len() && raw[cursor].is_whitespace() {
            cursor += 1;
        }
        if cursor > tail_start {
            let tail: String = raw[tail_start..cursor].iter().collect();
            sentence_literals.extend(self.append_unit(&tail));
        }
        if cursor < raw.len() {
            let leftover: String = raw[cursor..].iter().take(40).collect();
            self.warnings.push(format!(
                "sentence {sentence_idx}: raw text not fully covered by tokens, leftover '{leftover}'"
            ));
        }
        Ok(())
    }

    /// Append one textual unit as literals according to the granularity.
    fn append_unit(&mut self, value: &str) -> Vec<LiteralId> {
        match self.options.granularity {
            Granularity::Token => vec![self.index.literals.append(value)],
            Granularity::Character => value
                .chars()
                .map(|c| self.index.literals.append(c.to_string()))
                .collect(),
        }
    }

    /// Create the `token` structure and one structure per recognized
    /// morphosyntactic field, all covering the token's literals. Feature
    /// structures are overlapping annotations, not containment children.
    fn create_token_structures(
        &mut self,
        token: &TokenRecord,
        token_literals: &[LiteralId],
    ) -> Result<StructureId> {
        let sid =
            self.index
                .structures
                .create("token", None, token_literals, &self.index.literals)?;

        for (name, value) in &token.fields {
            if value.is_empty() {
                continue;
            }
            if !self.options.allowed_fields.contains(name) {
                if self.warned_fields.insert(name.clone()) {
                    self.warnings
                        .push(format!("unrecognized morphosyntactic field '{name}', ignored"));
                }
                continue;
            }
            self.index.structures.create(
                name.clone(),
                Some(value.clone()),
                token_literals,
                &self.index.literals,
            )?;
        }
        Ok(sid)
    }

    /// Build `dependency` projection structures from head annotations: one
    /// structure per token spanning the token and its transitive
    /// dependents, valued with the token's relation.
    fn build_dependencies(
        &mut self,
        sentence_idx: usize,
        sentence: &SentenceRecord,
        sentence_sid: StructureId,
        token_structures: &[StructureId],
        token_literal_sets: &[Vec<LiteralId>],
    ) -> Result<()> {
        if sentence.tokens.iter().all(|t| t.head.is_none()) {
            return Ok(());
        }

        let n = sentence.tokens.len();
        let mut children: Vec<Vec<usize>> = vec![Vec::new(); n];
        let mut roots: Vec<usize> = Vec::new();
        for (idx, token) in sentence.tokens.iter().enumerate() {
            let head = token.head.ok_or_else(|| {
                Error::malformed(
                    format!("sentence {sentence_idx}, token {idx}"),
                    "dependency head missing on a partially annotated sentence",
                )
            })? as usize;
            if head == 0 {
                roots.push(idx);
            } else if head > n {
                return Err(Error::malformed(
                    format!("sentence {sentence_idx}, token {idx}"),
                    format!("dependency head {head} out of range (sentence has {n} tokens)"),
                ));
            } else if head - 1 == idx {
                return Err(Error::malformed(
                    format!("sentence {sentence_idx}, token {idx}"),
                    "token is its own dependency head",
                ));
            } else {
                children[head - 1].push(idx);
            }
        }

        // Bottom-up over each tree so child projections exist before their
        // parents; a token left unvisited indicates a head cycle.
        let mut projection: Vec<Option<StructureId>> = vec![None; n];
        let mut order: Vec<usize> = Vec::with_capacity(n);
        let mut stack: Vec<usize> = roots.clone();
        while let Some(idx) = stack.pop() {
            order.push(idx);
            stack.extend(children[idx].iter().copied());
        }
        if order.len() != n {
            return Err(Error::malformed(
                format!("sentence {sentence_idx}"),
                "cyclic dependency heads",
            ));
        }

        for &idx in order.iter().rev() {
            let mut literals: Vec<LiteralId> = token_literal_sets[idx].clone();
            for &child in &children[idx] {
                let child_sid = projection[child].ok_or_else(|| {
                    Error::integrity("dependency child projected before its parent".to_string())
                })?;
                if let Some(members) = self.index.structures.members_of(child_sid) {
                    literals.extend(members.iter().copied());
                }
            }
            let relation = sentence.tokens[idx]
                .fields
                .iter()
                .find(|(name, _)| name == "deprel")
                .map(|(_, value)| value.clone());
            let sid = self.index.structures.create(
                "dependency",
                relation,
                &literals,
                &self.index.literals,
            )?;
            self.index.add_containment(sid, token_structures[idx])?;
            for &child in &children[idx] {
                if let Some(child_sid) = projection[child] {
                    self.index.add_containment(sid, child_sid)?;
                }
            }
            self.index.add_containment(sentence_sid, sid)?;
            projection[idx] = Some(sid);
        }
        Ok(())
    }

    /// Close the open paragraph, emitting its structure and containment
    /// edges and handing it to the enclosing document.
    fn close_paragraph(&mut self) -> Result<()> {
        let Some(paragraph) = self.paragraph.take() else {
            return Ok(());
        };
        if paragraph.literals.is_empty() {
            return Ok(());
        }
        let sid = self.index.structures.create(
            "paragraph",
            paragraph.id,
            &paragraph.literals,
            &self.index.literals,
        )?;
        for &sentence_sid in &paragraph.sentences {
            self.index.add_containment(sid, sentence_sid)?;
        }
        if let Some(document) = self.document.as_mut() {
            document.paragraphs.push(sid);
        }
        Ok(())
    }

    /// Close the open document, flushing carryover metadata into
    /// document-spanning structures.
    fn close_document(&mut self) -> Result<()> {
        let Some(document) = self.document.take() else {
            return Ok(());
        };
        if document.literals.is_empty() {
            return Ok(());
        }
        let sid = self.index.structures.create(
            "document",
            document.id,
            &document.literals,
            &self.index.literals,
        )?;
        for &paragraph_sid in &document.paragraphs {
            self.index.add_containment(sid, paragraph_sid)?;
        }
        for &sentence_sid in &document.sentences {
            self.index.add_containment(sid, sentence_sid)?;
        }
        // Carryover metadata attaches once per document, not per sentence.
        for (key, value) in document.metadata {
            self.observed_metadata_keys.insert(key.clone());
            self.index.structures.create(
                key,
                Some(value),
                &document.literals,
                &self.index.literals,
            )?;
        }
        Ok(())
    }
}

fn carryover_scope(key: &str) -> Option<CarryoverScope> {
    CARRYOVER_PATTERNS
        .iter()
        .find(|(pattern, _)| pattern.is_match(key))
        .map(|&(_, scope)| scope)
}

/// Convenience wrapper: build an index from sentences with the given options.
pub fn ingest(sentences: &[SentenceRecord], options: IngestOptions) -> Result<Ingestion> {
    IndexBuilder::new(options).ingest(sentences)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dogs_bark() -> SentenceRecord {
        SentenceRecord::new(vec![
            TokenRecord::new("Dogs").with_field("upos", "NOUN"),
            TokenRecord::new("bark").with_field("upos", "VERB"),
        ])
    }

    #[test]
    fn dogs_bark_scenario() {
        let outcome = ingest(&[dogs_bark()], IngestOptions::default()).unwrap();
        let index = &outcome.index;

        let tokens: Vec<_> = index.structures.find_by_type("token").collect();
        assert_eq!(tokens.len(), 2);

        let upos: Vec<_> = index
            .structures
            .find_by_type("upos")
            .filter_map(|s| s.value.as_deref())
            .collect();
        assert_eq!(upos, vec!["NOUN", "VERB"]);

        let sentences: Vec<_> = index.structures.find_by_type("sentence").collect();
        assert_eq!(sentences.len(), 1);
        let sentence = sentences[0];

        // 'Dogs bark' plus the single-space terminator.
        let covered: String = index
            .literals_of(sentence.id)
            .unwrap()
            .iter()
            .map(|l| l.value.as_str())
            .collect();
        assert_eq!(covered, "Dogs bark ");

        // One containment edge from the sentence to each token.
        let token_ids: Vec<_> = tokens.iter().map(|t| t.id).collect();
        for token_id in token_ids {
            assert!(index
                .containment()
                .iter()
                .any(|e| e.parent == sentence.id && e.child == token_id));
        }
    }

    #[test]
    fn no_space_after_suppresses_gap() {
        let sentence = SentenceRecord::new(vec![
            TokenRecord::new("do").with_no_space_after(),
            TokenRecord::new("n't"),
        ]);
        let outcome = ingest(&[sentence], IngestOptions::default()).unwrap();
        let sent = outcome
            .index
            .structures
            .find_by_type("sentence")
            .next()
            .unwrap();
        let covered: String = outcome
            .index
            .literals_of(sent.id)
            .unwrap()
            .iter()
            .map(|l| l.value.as_str())
            .collect();
        assert_eq!(covered, "don't ");
    }

    #[test]
    fn token_structure_excludes_trailing_whitespace() {
        let outcome = ingest(&[dogs_bark()], IngestOptions::default()).unwrap();
        let index = &outcome.index;
        let first = index.structures.find_by_type("token").next().unwrap();
        let covered: String = index
            .literals_of(first.id)
            .unwrap()
            .iter()
            .map(|l| l.value.as_str())
            .collect();
        assert_eq!(covered, "Dogs");
    }

    #[test]
    fn forced_alignment_reconstructs_gaps() {
        let sentence = SentenceRecord::new(vec![
            TokenRecord::new("Dogs"),
            TokenRecord::new("do"),
            TokenRecord::new("n't"),
            TokenRecord::new("bark"),
            TokenRecord::new("."),
        ])
        .with_text("Dogs don't bark.");

        let options = IngestOptions {
            force_alignment: true,
            sentence_terminator: String::new(),
            ..IngestOptions::default()
        };
        let outcome = ingest(&[sentence], options).unwrap();
        let index = &outcome.index;

        let sent = index.structures.find_by_type("sentence").next().unwrap();
        let covered: String = index
            .literals_of(sent.id)
            .unwrap()
            .iter()
            .map(|l| l.value.as_str())
            .collect();
        assert_eq!(covered, "Dogs don't bark.");

        // Inter-token gaps: ' ', '', ' ', '' — exactly two whitespace literals.
        let whitespace: Vec<_> = index
            .literals
            .iter()
            .filter(|l| l.value.chars().all(char::is_whitespace))
            .map(|l| l.value.as_str())
            .collect();
        assert_eq!(whitespace, vec![" ", " "]);
    }

    #[test]
    fn forced_alignment_preserves_irregular_whitespace() {
        let sentence = SentenceRecord::new(vec![TokenRecord::new("a"), TokenRecord::new("b")])
            .with_text("a \t b");
        let options = IngestOptions {
            force_alignment: true,
            sentence_terminator: String::new(),
            ..IngestOptions::default()
        };
        let outcome = ingest(&[sentence], options).unwrap();
        let gap = outcome
            .index
            .literals
            .iter()
            .find(|l| l.value.chars().all(char::is_whitespace))
            .unwrap();
        assert_eq!(gap.value, " \t ");
    }

    #[test]
    fn forced_alignment_mismatch_is_fatal() {
        let sentence =
            SentenceRecord::new(vec![TokenRecord::new("Cats")]).with_text("Dogs bark.");
        let options = IngestOptions {
            force_alignment: true,
            ..IngestOptions::default()
        };
        let err = ingest(&[sentence], options).unwrap_err();
        match err {
            Error::Alignment { form, offset, .. } => {
                assert_eq!(form, "Cats");
                assert_eq!(offset, 0);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn forced_alignment_requires_raw_text() {
        let options = IngestOptions {
            force_alignment: true,
            ..IngestOptions::default()
        };
        assert!(matches!(
            ingest(&[dogs_bark()], options),
            Err(Error::MalformedRecord { .. })
        ));
    }

    #[test]
    fn unknown_fields_warn_and_are_ignored() {
        let sentence =
            SentenceRecord::new(vec![TokenRecord::new("x").with_field("MyCustomTag", "yes")]);
        let outcome = ingest(&[sentence], IngestOptions::default()).unwrap();
        assert_eq!(outcome.warnings.len(), 1);
        assert!(outcome.warnings[0].contains("MyCustomTag"));
        assert_eq!(
            outcome.index.structures.find_by_type("MyCustomTag").count(),
            0
        );
    }

    #[test]
    fn character_granularity_splits_tokens() {
        let options = IngestOptions {
            granularity: Granularity::Character,
            ..IngestOptions::default()
        };
        let outcome = ingest(&[dogs_bark()], options).unwrap();
        let index = &outcome.index;

        // 'Dogs' + ' ' + 'bark' + terminator = 4 + 1 + 4 + 1 characters.
        assert_eq!(index.literals.len(), 10);
        let first = index.structures.find_by_type("token").next().unwrap();
        let covered: String = index
            .literals_of(first.id)
            .unwrap()
            .iter()
            .map(|l| l.value.as_str())
            .collect();
        assert_eq!(covered, "Dogs");
    }

    #[test]
    fn document_and_paragraph_boundaries_nest() {
        let sentences = vec![
            SentenceRecord::new(vec![TokenRecord::new("One")])
                .with_metadata("newdoc id", "d1")
                .with_metadata("newpar", ""),
            SentenceRecord::new(vec![TokenRecord::new("Two")]).with_metadata("newpar", ""),
            SentenceRecord::new(vec![TokenRecord::new("Three")]).with_metadata("newdoc id", "d2"),
        ];
        let outcome = ingest(&sentences, IngestOptions::default()).unwrap();
        let index = &outcome.index;

        let documents: Vec<_> = index.structures.find_by_type("document").collect();
        assert_eq!(documents.len(), 2);
        assert_eq!(documents[0].value.as_deref(), Some("d1"));
        assert_eq!(documents[1].value.as_deref(), Some("d2"));
        assert_eq!(index.structures.find_by_type("paragraph").count(), 2);

        // d1 contains both paragraphs; each paragraph contains its sentence.
        let d1 = documents[0].id;
        assert_eq!(
            index
                .children_of(d1)
                .filter(|s| s.stype == "paragraph")
                .count(),
            2
        );
        // d2 has no paragraph, so its sentence attaches directly.
        let d2 = documents[1].id;
        assert_eq!(
            index
                .children_of(d2)
                .filter(|s| s.stype == "sentence")
                .count(),
            1
        );
    }

    #[test]
    fn carryover_metadata_attaches_once_per_document() {
        let sentences = vec![
            SentenceRecord::new(vec![TokenRecord::new("One")])
                .with_metadata("newdoc id", "d1")
                .with_metadata("meta::genre", "fiction"),
            SentenceRecord::new(vec![TokenRecord::new("Two")]),
        ];
        let outcome = ingest(&sentences, IngestOptions::default()).unwrap();
        let index = &outcome.index;

        let genre: Vec<_> = index.structures.find_by_type("meta::genre").collect();
        assert_eq!(genre.len(), 1);
        assert_eq!(genre[0].value.as_deref(), Some("fiction"));

        // Spans the whole document, not just the first sentence.
        let document = index.structures.find_by_type("document").next().unwrap();
        assert_eq!((genre[0].start, genre[0].end), (document.start, document.end));
    }

    #[test]
    fn dependency_projections_cover_subtrees() {
        // 'big dogs bark': big <- dogs <- bark(root)
        let sentence = SentenceRecord::new(vec![
            TokenRecord::new("big").with_field("deprel", "amod").with_head(2),
            TokenRecord::new("dogs").with_field("deprel", "nsubj").with_head(3),
            TokenRecord::new("bark").with_field("deprel", "root").with_head(0),
        ]);
        let outcome = ingest(&[sentence], IngestOptions::default()).unwrap();
        let index = &outcome.index;

        let projections: Vec<_> = index.structures.find_by_type("dependency").collect();
        assert_eq!(projections.len(), 3);

        let root = projections
            .iter()
            .find(|s| s.value.as_deref() == Some("root"))
            .unwrap();
        let covered: String = index
            .literals_of(root.id)
            .unwrap()
            .iter()
            .map(|l| l.value.as_str())
            .collect();
        assert_eq!(covered, "bigdogsbark");

        let nsubj = projections
            .iter()
            .find(|s| s.value.as_deref() == Some("nsubj"))
            .unwrap();
        let covered: String = index
            .literals_of(nsubj.id)
            .unwrap()
            .iter()
            .map(|l| l.value.as_str())
            .collect();
        assert_eq!(covered, "bigdogs");
    }

    #[test]
    fn cyclic_heads_are_malformed() {
        let sentence = SentenceRecord::new(vec![
            TokenRecord::new("a").with_head(2),
            TokenRecord::new("b").with_head(1),
        ]);
        assert!(matches!(
            ingest(&[sentence], IngestOptions::default()),
            Err(Error::MalformedRecord { .. })
        ));
    }

    #[test]
    fn empty_token_form_is_malformed() {
        let sentence = SentenceRecord::new(vec![TokenRecord::new("Dogs"), TokenRecord::new("")]);

        let err = ingest(&[sentence.clone()], IngestOptions::default()).unwrap_err();
        match err {
            Error::MalformedRecord { position, .. } => {
                assert_eq!(position, "sentence 0, token 1");
            }
            other => panic!("unexpected error: {other}"),
        }

        // Same outcome at character granularity.
        let options = IngestOptions {
            granularity: Granularity::Character,
            ..IngestOptions::default()
        };
        assert!(matches!(
            ingest(&[sentence], options),
            Err(Error::MalformedRecord { .. })
        ));
    }

    #[test]
    fn repeated_carryover_key_keeps_one_value() {
        let sentences = vec![
            SentenceRecord::new(vec![TokenRecord::new("One")])
                .with_metadata("newdoc id", "d1")
                .with_metadata("meta::genre", "fiction"),
            SentenceRecord::new(vec![TokenRecord::new("Two")])
                .with_metadata("meta::genre", "essay"),
        ];
        let outcome = ingest(&sentences, IngestOptions::default()).unwrap();

        // One structure per key per document; the repeated key overwrites.
        let genre: Vec<_> = outcome
            .index
            .structures
            .find_by_type("meta::genre")
            .collect();
        assert_eq!(genre.len(), 1);
        assert_eq!(genre[0].value.as_deref(), Some("essay"));
    }

    #[test]
    fn empty_sentence_record_is_malformed() {
        let sentence = SentenceRecord::default();
        assert!(matches!(
            ingest(&[sentence], IngestOptions::default()),
            Err(Error::MalformedRecord { .. })
        ));
    }

    #[test]
    fn empty_terminator_appends_no_literal() {
        let options = IngestOptions {
            sentence_terminator: String::new(),
            ..IngestOptions::default()
        };
        let outcome = ingest(&[dogs_bark()], options).unwrap();
        assert_eq!(outcome.index.literals.len(), 3); // Dogs, ' ', bark
    }

    #[test]
    fn declared_types_include_absent_allowed_fields() {
        let outcome = ingest(&[dogs_bark()], IngestOptions::default()).unwrap();
        // 'Voice' never occurs but is part of the allow-list.
        assert!(outcome.index.declared_types().contains("Voice"));
        outcome.index.require_declared("Voice").unwrap();
        assert!(outcome.index.require_declared("Bogus").is_err());
    }
}
