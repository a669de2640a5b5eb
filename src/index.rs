//! The annotation index: four relations plus build-time configuration.
//!
//! An [`AnnotationIndex`] holds the literal store, the structure store (with
//! its membership table), the hierarchical containment edges, and the set of
//! structure types declared when the index was built. It is produced once by
//! the ingestion pipeline and read-only afterwards; every query method takes
//! `&self`, so a built index is safe to share across unbounded concurrent
//! readers.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::literal::{Literal, LiteralId, LiteralStore};
use crate::structure::{Structure, StructureId, StructureStore};

/// A hierarchical containment edge: the parent's span fully contains the
/// child's span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Containment {
    /// Containing structure.
    pub parent: StructureId,
    /// Contained structure.
    pub child: StructureId,
}

/// Size statistics for an index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexStats {
    /// Number of literals.
    pub literals: usize,
    /// Number of structures.
    pub structures: usize,
    /// Number of containment edges.
    pub containment_edges: usize,
}

/// The persisted stand-off annotation index for one corpus subset.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnnotationIndex {
    /// The ordered literal sequence.
    pub literals: LiteralStore,
    /// Structures and their literal membership.
    pub structures: StructureStore,
    /// Hierarchical containment edges.
    containment: Vec<Containment>,
    /// Structure types declared by the build configuration. Export and
    /// analysis of a type outside this set is an error; a declared type
    /// with zero occurrences is not.
    declared_types: BTreeSet<String>,
}

impl AnnotationIndex {
    /// Create an empty index declaring the given structure types.
    #[must_use]
    pub fn new(declared_types: BTreeSet<String>) -> Self {
        Self {
            declared_types,
            ..Self::default()
        }
    }

    /// Record a containment edge.
    ///
    /// Both endpoints must exist and the parent's span must fully contain
    /// the child's span; violations are [`Error::Integrity`] (a pipeline
    /// bug, not bad input).
    pub fn add_containment(&mut self, parent: StructureId, child: StructureId) -> Result<()> {
        let p = self
            .structures
            .get(parent)
            .ok_or_else(|| Error::integrity(format!("containment parent {parent} does not exist")))?;
        let c = self
            .structures
            .get(child)
            .ok_or_else(|| Error::integrity(format!("containment child {child} does not exist")))?;
        if p.start > c.start || p.end < c.end {
            return Err(Error::integrity(format!(
                "containment parent {} [{}, {}) does not subsume child {} [{}, {})",
                parent, p.start, p.end, child, c.start, c.end
            )));
        }
        self.containment.push(Containment { parent, child });
        Ok(())
    }

    /// All containment edges.
    #[must_use]
    pub fn containment(&self) -> &[Containment] {
        &self.containment
    }

    /// Direct children of a structure.
    pub fn children_of(&self, id: StructureId) -> impl Iterator<Item = &Structure> {
        self.containment
            .iter()
            .filter(move |e| e.parent == id)
            .filter_map(|e| self.structures.get(e.child))
    }

    /// Direct parents of a structure.
    pub fn parents_of(&self, id: StructureId) -> impl Iterator<Item = &Structure> {
        self.containment
            .iter()
            .filter(move |e| e.child == id)
            .filter_map(|e| self.structures.get(e.parent))
    }

    /// Structure types declared at build time.
    #[must_use]
    pub fn declared_types(&self) -> &BTreeSet<String> {
        &self.declared_types
    }

    /// Record the declared type set. Called once by the ingestion pipeline
    /// when the build completes.
    pub(crate) fn set_declared_types(&mut self, declared_types: BTreeSet<String>) {
        self.declared_types = declared_types;
    }

    /// Err unless the given type was declared when the index was built.
    pub fn require_declared(&self, stype: &str) -> Result<()> {
        if self.declared_types.contains(stype) {
            Ok(())
        } else {
            Err(Error::undefined_type(stype))
        }
    }

    /// Member literals of a structure, in offset order.
    pub fn literals_of(&self, id: StructureId) -> Result<Vec<&Literal>> {
        self.structures.literals_of(id, &self.literals)
    }

    /// Check referential integrity and the span invariants.
    ///
    /// Every literal must cover at least one position (`start < end`) and
    /// not overlap its predecessor; every membership and containment edge
    /// must reference existing entities; every structure's `(start, end)`
    /// must equal the min/max offsets of its member literals. Run after
    /// every ingestion.
    pub fn validate(&self) -> Result<()> {
        let mut prev_end = 0;
        for literal in self.literals.iter() {
            if literal.start >= literal.end {
                return Err(Error::integrity(format!(
                    "literal {} covers no positions [{}, {})",
                    literal.id, literal.start, literal.end
                )));
            }
            if literal.start < prev_end {
                return Err(Error::integrity(format!(
                    "literal {} [{}, {}) overlaps its predecessor ending at {prev_end}",
                    literal.id, literal.start, literal.end
                )));
            }
            prev_end = literal.end;
        }

        for structure in self.structures.iter() {
            let members = self
                .structures
                .members_of(structure.id)
                .ok_or_else(|| Error::integrity(format!("structure {} has no membership row", structure.id)))?;
            if members.is_empty() {
                return Err(Error::integrity(format!(
                    "structure {} ('{}') has no member literals",
                    structure.id, structure.stype
                )));
            }

            let mut min = usize::MAX;
            let mut max = 0;
            for &lid in members {
                let literal = self.literals.get(lid).ok_or_else(|| {
                    Error::integrity(format!(
                        "structure {} references unknown literal {lid}",
                        structure.id
                    ))
                })?;
                min = min.min(literal.start);
                max = max.max(literal.end);
            }
            if (structure.start, structure.end) != (min, max) {
                return Err(Error::integrity(format!(
                    "structure {} ('{}') spans [{}, {}) but its literals cover [{min}, {max})",
                    structure.id, structure.stype, structure.start, structure.end
                )));
            }
        }

        for edge in &self.containment {
            let parent = self.structures.get(edge.parent).ok_or_else(|| {
                Error::integrity(format!("containment parent {} does not exist", edge.parent))
            })?;
            let child = self.structures.get(edge.child).ok_or_else(|| {
                Error::integrity(format!("containment child {} does not exist", edge.child))
            })?;
            if parent.start > child.start || parent.end < child.end {
                return Err(Error::integrity(format!(
                    "containment edge {} -> {} violates span subsumption",
                    edge.parent, edge.child
                )));
            }
        }
        Ok(())
    }

    /// Literal positions covered by at least one structure of the given
    /// type, as a set of literal ids.
    #[must_use]
    pub fn coverage_of_type(&self, stype: &str) -> HashSet<LiteralId> {
        let mut covered = HashSet::new();
        for structure in self.structures.find_by_type(stype) {
            if let Some(members) = self.structures.members_of(structure.id) {
                covered.extend(members.iter().copied());
            }
        }
        covered
    }

    /// Size statistics.
    #[must_use]
    pub fn stats(&self) -> IndexStats {
        IndexStats {
            literals: self.literals.len(),
            structures: self.structures.len(),
            containment_edges: self.containment.len(),
        }
    }

    /// Structure counts per type, in sorted type order.
    #[must_use]
    pub fn structure_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for structure in self.structures.iter() {
            *counts.entry(structure.stype.clone()).or_insert(0) += 1;
        }
        counts
    }

    /// Persist the index as JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = File::create(path)?;
        serde_json::to_writer(BufWriter::new(file), self)?;
        Ok(())
    }

    /// Load a persisted index.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let mut index: AnnotationIndex = serde_json::from_reader(BufReader::new(file))?;
        index.structures.rebuild_type_index();
        Ok(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_token_index() -> AnnotationIndex {
        let mut index = AnnotationIndex::new(
            ["token", "sentence"].iter().map(|s| s.to_string()).collect(),
        );
        let a = index.literals.append("Dogs");
        let ws = index.literals.append(" ");
        let b = index.literals.append("bark");
        index
            .structures
            .create("token", None, &[a], &index.literals)
            .unwrap();
        index
            .structures
            .create("token", None, &[b], &index.literals)
            .unwrap();
        index
            .structures
            .create("sentence", None, &[a, ws, b], &index.literals)
            .unwrap();
        index
    }

    #[test]
    fn containment_requires_span_subsumption() {
        let mut index = two_token_index();
        index.add_containment(2, 0).unwrap();
        index.add_containment(2, 1).unwrap();
        // A token cannot contain the sentence.
        assert!(matches!(
            index.add_containment(0, 2),
            Err(Error::Integrity(_))
        ));
        // Dangling ids are rejected.
        assert!(matches!(
            index.add_containment(2, 99),
            Err(Error::Integrity(_))
        ));
    }

    #[test]
    fn validate_accepts_well_formed_index() {
        let mut index = two_token_index();
        index.add_containment(2, 0).unwrap();
        index.add_containment(2, 1).unwrap();
        index.validate().unwrap();
    }

    #[test]
    fn validate_rejects_zero_width_literal() {
        let mut index = two_token_index();
        index.literals.append("");
        assert!(matches!(index.validate(), Err(Error::Integrity(_))));
    }

    #[test]
    fn require_declared_distinguishes_absent_from_undefined() {
        let index = two_token_index();
        index.require_declared("token").unwrap();
        assert!(matches!(
            index.require_declared("Voice"),
            Err(Error::UndefinedType(_))
        ));
    }

    #[test]
    fn persistence_round_trip() {
        let mut index = two_token_index();
        index.add_containment(2, 0).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.json");
        index.save(&path).unwrap();

        let loaded = AnnotationIndex::load(&path).unwrap();
        loaded.validate().unwrap();
        assert_eq!(loaded.stats(), index.stats());
        assert_eq!(loaded.structures.find_by_type("token").count(), 2);
        assert_eq!(loaded.declared_types(), index.declared_types());
    }
}
