//! CoNLL-U reader: turns treebank files into [`SentenceRecord`]s.
//!
//! Follows the CoNLL-U format (<https://universaldependencies.org/format.html>):
//! ten tab-separated columns per token line, `# key = value` comment lines
//! for sentence metadata, blank line between sentences. Multiword-token
//! ranges (`3-4`) and empty nodes (`3.1`) are skipped; the plain token lines
//! carry the text. `FEATS` and `MISC` are exploded into individual
//! key/value fields; `SpaceAfter=No` in `MISC` sets the token's
//! no-space-after flag instead of becoming a field.

use std::io::BufRead;

use crate::error::{Error, Result};
use crate::record::{SentenceRecord, TokenRecord};

/// CoNLL-U column names for the single-valued annotation fields, in file
/// order after `ID` and `FORM`.
const FIELD_COLUMNS: [(usize, &str); 4] = [(2, "lemma"), (3, "upos"), (4, "xpos"), (7, "deprel")];

/// Parse a CoNLL-U stream into sentence records.
///
/// Returns [`Error::MalformedRecord`] with the offending line number for
/// structural problems: wrong column count, unparsable token id or head,
/// token lines appearing before any content, duplicate `text` metadata.
pub fn parse_conllu(reader: impl BufRead) -> Result<Vec<SentenceRecord>> {
    let mut sentences = Vec::new();
    let mut current: Option<SentenceRecord> = None;

    for (line_idx, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = line_idx + 1;
        let trimmed = line.trim_end_matches(['\r', '\n']);

        if trimmed.is_empty() {
            if let Some(sentence) = current.take() {
                push_sentence(sentence, &mut sentences, line_no)?;
            }
            continue;
        }

        if let Some(comment) = trimmed.strip_prefix('#') {
            let sentence = current.get_or_insert_with(SentenceRecord::default);
            let (key, value) = match comment.split_once('=') {
                Some((k, v)) => (k.trim().to_string(), v.trim().to_string()),
                // Bare markers like '# newpar' carry no value.
                None => (comment.trim().to_string(), String::new()),
            };
            if key == "text" {
                if sentence.text.is_some() {
                    return Err(Error::malformed(
                        format!("line {line_no}"),
                        "duplicate 'text' metadata in one sentence",
                    ));
                }
                sentence.text = Some(value);
            } else if !key.is_empty() {
                sentence.metadata.push((key, value));
            }
            continue;
        }

        let columns: Vec<&str> = trimmed.split('\t').collect();
        if columns.len() != 10 {
            return Err(Error::malformed(
                format!("line {line_no}"),
                format!("expected 10 tab-separated columns, found {}", columns.len()),
            ));
        }

        // Multiword-token ranges and empty nodes do not contribute to the
        // literal stream; the plain token lines that follow carry the text.
        if columns[0].contains('-') || columns[0].contains('.') {
            continue;
        }
        let _id: u32 = columns[0].parse().map_err(|_| {
            Error::malformed(
                format!("line {line_no}"),
                format!("unparsable token id '{}'", columns[0]),
            )
        })?;

        let mut token = TokenRecord::new(columns[1]);

        for (column, name) in FIELD_COLUMNS {
            let value = columns[column];
            if value != "_" && !value.is_empty() {
                token.fields.push((name.to_string(), value.to_string()));
            }
        }

        // FEATS: 'Case=Nom|Number=Sing' exploded into one field per feature.
        if columns[5] != "_" {
            for feature in columns[5].split('|') {
                if let Some((name, value)) = feature.split_once('=') {
                    token.fields.push((name.to_string(), value.to_string()));
                }
            }
        }

        if columns[6] != "_" && !columns[6].is_empty() {
            token.head = Some(columns[6].parse().map_err(|_| {
                Error::malformed(
                    format!("line {line_no}"),
                    format!("unparsable head '{}'", columns[6]),
                )
            })?);
        }

        // MISC: same pipe-separated shape as FEATS; SpaceAfter is a flag,
        // not an annotation layer.
        if columns[9] != "_" {
            for misc in columns[9].split('|') {
                match misc.split_once('=') {
                    Some(("SpaceAfter", "No")) => token.no_space_after = true,
                    Some((name, value)) => {
                        token.fields.push((name.to_string(), value.to_string()));
                    }
                    None => {}
                }
            }
        }

        current
            .get_or_insert_with(SentenceRecord::default)
            .tokens
            .push(token);
    }

    if let Some(sentence) = current.take() {
        push_sentence(sentence, &mut sentences, 0)?;
    }

    Ok(sentences)
}

fn push_sentence(
    sentence: SentenceRecord,
    sentences: &mut Vec<SentenceRecord>,
    line_no: usize,
) -> Result<()> {
    if sentence.tokens.is_empty() {
        let position = if line_no == 0 {
            "end of input".to_string()
        } else {
            format!("line {line_no}")
        };
        return Err(Error::malformed(
            position,
            "sentence closed without any token lines",
        ));
    }
    sentences.push(sentence);
    Ok(())
}
