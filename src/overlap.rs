//! Overlap analysis: how annotation layers co-occur over literal positions.
//!
//! For each unordered pair of structure types, counts the literal positions
//! covered by structures of both types. Symmetric by construction, explicit
//! zeros for declared types with no occurrences, and stable output ordering
//! so repeated runs over the same index are byte-identical.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::index::AnnotationIndex;
use crate::literal::LiteralId;

/// Co-occurrence statistic for one unordered type pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlapEntry {
    /// Lexicographically smaller type of the pair.
    pub source: String,
    /// Lexicographically larger type of the pair.
    pub target: String,
    /// Literal positions covered by both types.
    pub shared: usize,
    /// Jaccard fraction: shared positions over positions covered by either
    /// type; 0.0 when neither type covers anything.
    pub fraction: f64,
}

/// Pairwise overlap statistics over a set of annotation types.
///
/// Entries are normalized (smaller type first) and sorted, so serializing
/// the matrix twice over the same index yields byte-identical output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OverlapMatrix {
    entries: Vec<OverlapEntry>,
}

impl OverlapMatrix {
    /// Overlap entry for a pair of types, in either order.
    #[must_use]
    pub fn get(&self, a: &str, b: &str) -> Option<&OverlapEntry> {
        let (source, target) = pair_key(a, b);
        self.entries
            .iter()
            .find(|e| e.source == source && e.target == target)
    }

    /// Iterate over all entries in stable (sorted) order.
    pub fn iter(&self) -> impl Iterator<Item = &OverlapEntry> {
        self.entries.iter()
    }

    /// Number of type pairs in the matrix.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the matrix holds no pairs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn pair_key<'a>(a: &'a str, b: &'a str) -> (&'a str, &'a str) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Compute pairwise overlap for the given annotation types (including each
/// type with itself, whose shared count is simply its coverage).
///
/// Every type must have been declared when the index was built; a declared
/// type with zero occurrences contributes explicit zero entries.
pub fn overlap_matrix(index: &AnnotationIndex, types: &[String]) -> Result<OverlapMatrix> {
    for stype in types {
        index.require_declared(stype)?;
    }

    let coverage: BTreeMap<&str, HashSet<LiteralId>> = types
        .iter()
        .map(|t| (t.as_str(), index.coverage_of_type(t)))
        .collect();

    let mut pairs: BTreeMap<(&str, &str), OverlapEntry> = BTreeMap::new();
    for (i, a) in types.iter().enumerate() {
        for b in &types[i..] {
            let (source, target) = pair_key(a, b);
            let cov_a = &coverage[source];
            let cov_b = &coverage[target];
            let shared = cov_a.intersection(cov_b).count();
            let union = cov_a.union(cov_b).count();
            let fraction = if union == 0 {
                0.0
            } else {
                shared as f64 / union as f64
            };
            pairs.insert(
                (source, target),
                OverlapEntry {
                    source: source.to_string(),
                    target: target.to_string(),
                    shared,
                    fraction,
                },
            );
        }
    }
    Ok(OverlapMatrix {
        entries: pairs.into_values().collect(),
    })
}
