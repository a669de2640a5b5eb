//! Literal store: the ordered sequence of minimal textual units.
//!
//! Literals are the foundation of the index. Each literal is an immutable
//! slice of the logical character stream with half-open `[start, end)`
//! offsets and the text value it covers. Offsets are derived from insertion
//! order via a running cursor, so the store's order *is* the canonical text
//! order.

use serde::{Deserialize, Serialize};

/// Identifier of a literal within one index.
pub type LiteralId = u32;

/// Minimal indexed unit of text (a character or a token) with a fixed
/// offset span.
///
/// Invariant: `start < end`, and literals in one store are pairwise
/// non-overlapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Literal {
    /// Identifier within the owning store.
    pub id: LiteralId,
    /// Start offset (inclusive) into the logical character stream.
    pub start: usize,
    /// End offset (exclusive).
    pub end: usize,
    /// The literal text.
    pub value: String,
}

impl Literal {
    /// Number of character positions this literal covers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// True when the literal covers no positions (never the case for
    /// store-owned literals).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Append-only store of literals in canonical text order.
///
/// During the build phase, [`LiteralStore::append`] assigns ids and offsets
/// from a running cursor. After the build the store is read-only; all query
/// methods take `&self`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LiteralStore {
    literals: Vec<Literal>,
    /// Next free offset in the logical character stream.
    cursor: usize,
}

impl LiteralStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a literal, assigning its id and offsets from the running
    /// cursor. Empty values are rejected by the ingestion pipeline before
    /// they reach the store.
    pub fn append(&mut self, value: impl Into<String>) -> LiteralId {
        let value = value.into();
        let id = self.literals.len() as LiteralId;
        let start = self.cursor;
        let end = start + value.chars().count();
        self.cursor = end;
        self.literals.push(Literal {
            id,
            start,
            end,
            value,
        });
        id
    }

    /// Look up a literal by id.
    #[must_use]
    pub fn get(&self, id: LiteralId) -> Option<&Literal> {
        self.literals.get(id as usize)
    }

    /// All literals whose span falls entirely within `[start, end)`, in
    /// offset order.
    pub fn slice(&self, start: usize, end: usize) -> Vec<&Literal> {
        // Literals are stored in offset order, so a partition-point scan
        // suffices without an auxiliary interval index.
        let first = self.literals.partition_point(|l| l.start < start);
        self.literals[first..]
            .iter()
            .take_while(|l| l.end <= end)
            .collect()
    }

    /// Iterate over all literals in offset order.
    pub fn iter(&self) -> impl Iterator<Item = &Literal> {
        self.literals.iter()
    }

    /// Number of literals in the store.
    #[must_use]
    pub fn len(&self) -> usize {
        self.literals.len()
    }

    /// True when the store holds no literals.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.literals.is_empty()
    }

    /// Next free offset in the logical character stream.
    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_assigns_running_offsets() {
        let mut store = LiteralStore::new();
        let a = store.append("Dogs");
        let b = store.append(" ");
        let c = store.append("bark");

        assert_eq!(store.get(a).unwrap().start, 0);
        assert_eq!(store.get(a).unwrap().end, 4);
        assert_eq!(store.get(b).unwrap().start, 4);
        assert_eq!(store.get(b).unwrap().end, 5);
        assert_eq!(store.get(c).unwrap().start, 5);
        assert_eq!(store.get(c).unwrap().end, 9);
        assert_eq!(store.cursor(), 9);
    }

    #[test]
    fn offsets_count_chars_not_bytes() {
        let mut store = LiteralStore::new();
        store.append("héllo");
        assert_eq!(store.cursor(), 5);
    }

    #[test]
    fn slice_returns_covered_literals_in_order() {
        let mut store = LiteralStore::new();
        store.append("Dogs");
        store.append(" ");
        store.append("bark");

        let covered = store.slice(0, 5);
        let values: Vec<_> = covered.iter().map(|l| l.value.as_str()).collect();
        assert_eq!(values, vec!["Dogs", " "]);

        // Partially covered literals are excluded.
        let partial = store.slice(0, 7);
        let values: Vec<_> = partial.iter().map(|l| l.value.as_str()).collect();
        assert_eq!(values, vec!["Dogs", " "]);
    }

    #[test]
    fn slice_of_empty_range_is_empty() {
        let mut store = LiteralStore::new();
        store.append("x");
        assert!(store.slice(5, 5).is_empty());
    }
}
