//! Structure store: typed annotation spans over literals.
//!
//! A structure names a span of literals: a hierarchical unit (`document`,
//! `paragraph`, `sentence`, `token`), a dependency projection, or an
//! annotation layer keyed by its field name (`upos`, `deprel`, `Case`, ...).
//! The type is a data value, not a compiled-in enum, so the store is
//! polymorphic over annotation schemes.
//!
//! Membership (which literals a structure covers) is recorded explicitly
//! rather than recomputed by span arithmetic at query time.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::literal::{Literal, LiteralId, LiteralStore};

/// Identifier of a structure within one index.
pub type StructureId = u32;

/// A named, typed span over literals.
///
/// `start`/`end` are computed as the covering span of the structure's member
/// literals when it is created, never supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Structure {
    /// Identifier within the owning store.
    pub id: StructureId,
    /// Start offset (inclusive) of the covered span.
    pub start: usize,
    /// End offset (exclusive) of the covered span.
    pub end: usize,
    /// Structure type tag (`token`, `sentence`, an annotation field name, ...).
    pub stype: String,
    /// Annotation payload, absent for purely structural types.
    pub value: Option<String>,
}

/// Append-only store of structures with an explicit structure-literal
/// membership table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StructureStore {
    structures: Vec<Structure>,
    /// Membership relation: structure id -> member literal ids in offset order.
    members: Vec<Vec<LiteralId>>,
    /// Secondary index: type -> structure ids, in creation order.
    #[serde(skip)]
    by_type: HashMap<String, Vec<StructureId>>,
}

impl StructureStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a structure covering the given literals.
    ///
    /// The span is computed as the min/max offsets of the members; the
    /// membership table records the members in offset order. Passing a
    /// dangling literal id or an empty member list is a pipeline bug and
    /// yields [`Error::Integrity`].
    pub fn create(
        &mut self,
        stype: impl Into<String>,
        value: Option<String>,
        member_literals: &[LiteralId],
        literals: &LiteralStore,
    ) -> Result<StructureId> {
        let stype = stype.into();
        if member_literals.is_empty() {
            return Err(Error::integrity(format!(
                "structure of type '{stype}' created without member literals"
            )));
        }

        let mut start = usize::MAX;
        let mut end = 0;
        for &lid in member_literals {
            let literal = literals.get(lid).ok_or_else(|| {
                Error::integrity(format!(
                    "structure of type '{stype}' references unknown literal {lid}"
                ))
            })?;
            start = start.min(literal.start);
            end = end.max(literal.end);
        }

        let mut members = member_literals.to_vec();
        members.sort_unstable_by_key(|&lid| literals.get(lid).map(|l| l.start));
        members.dedup();

        let id = self.structures.len() as StructureId;
        self.structures.push(Structure {
            id,
            start,
            end,
            stype: stype.clone(),
            value,
        });
        self.members.push(members);
        self.by_type.entry(stype).or_default().push(id);
        Ok(id)
    }

    /// Look up a structure by id.
    #[must_use]
    pub fn get(&self, id: StructureId) -> Option<&Structure> {
        self.structures.get(id as usize)
    }

    /// All structures of the given type, in creation order. Restartable and
    /// finite; an unknown type yields an empty iterator.
    pub fn find_by_type<'a>(&'a self, stype: &str) -> impl Iterator<Item = &'a Structure> + 'a {
        self.by_type
            .get(stype)
            .map(|ids| ids.as_slice())
            .unwrap_or(&[])
            .iter()
            .filter_map(|&id| self.get(id))
    }

    /// The covering span of a structure.
    #[must_use]
    pub fn span_of(&self, id: StructureId) -> Option<(usize, usize)> {
        self.get(id).map(|s| (s.start, s.end))
    }

    /// Member literal ids of a structure, in offset order.
    #[must_use]
    pub fn members_of(&self, id: StructureId) -> Option<&[LiteralId]> {
        self.members.get(id as usize).map(|m| m.as_slice())
    }

    /// Member literals of a structure, in offset order.
    pub fn literals_of<'a>(
        &self,
        id: StructureId,
        literals: &'a LiteralStore,
    ) -> Result<Vec<&'a Literal>> {
        let members = self
            .members_of(id)
            .ok_or_else(|| Error::integrity(format!("unknown structure {id}")))?;
        members
            .iter()
            .map(|&lid| {
                literals.get(lid).ok_or_else(|| {
                    Error::integrity(format!("structure {id} references unknown literal {lid}"))
                })
            })
            .collect()
    }

    /// Iterate over all structures in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &Structure> {
        self.structures.iter()
    }

    /// Number of structures in the store.
    #[must_use]
    pub fn len(&self) -> usize {
        self.structures.len()
    }

    /// True when the store holds no structures.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.structures.is_empty()
    }

    /// Types that occur in the store.
    pub fn types(&self) -> impl Iterator<Item = &str> {
        self.by_type.keys().map(String::as_str)
    }

    /// Rebuild the type index after deserialization. Idempotent.
    pub(crate) fn rebuild_type_index(&mut self) {
        self.by_type.clear();
        for structure in &self.structures {
            self.by_type
                .entry(structure.stype.clone())
                .or_default()
                .push(structure.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with_text(tokens: &[&str]) -> (LiteralStore, Vec<LiteralId>) {
        let mut literals = LiteralStore::new();
        let ids = tokens.iter().map(|t| literals.append(*t)).collect();
        (literals, ids)
    }

    #[test]
    fn create_computes_covering_span() {
        let (literals, ids) = store_with_text(&["Dogs", " ", "bark"]);
        let mut store = StructureStore::new();

        let sid = store
            .create("sentence", None, &ids, &literals)
            .unwrap();
        assert_eq!(store.span_of(sid), Some((0, 9)));
    }

    #[test]
    fn create_rejects_dangling_literal() {
        let (literals, _) = store_with_text(&["x"]);
        let mut store = StructureStore::new();
        let err = store.create("token", None, &[42], &literals).unwrap_err();
        assert!(matches!(err, Error::Integrity(_)));
    }

    #[test]
    fn create_rejects_empty_membership() {
        let (literals, _) = store_with_text(&["x"]);
        let mut store = StructureStore::new();
        let err = store.create("token", None, &[], &literals).unwrap_err();
        assert!(matches!(err, Error::Integrity(_)));
    }

    #[test]
    fn find_by_type_is_restartable() {
        let (literals, ids) = store_with_text(&["Dogs", "bark"]);
        let mut store = StructureStore::new();
        store.create("token", None, &ids[..1], &literals).unwrap();
        store.create("token", None, &ids[1..], &literals).unwrap();
        store
            .create("upos", Some("NOUN".into()), &ids[..1], &literals)
            .unwrap();

        assert_eq!(store.find_by_type("token").count(), 2);
        // A second pass sees the same structures.
        assert_eq!(store.find_by_type("token").count(), 2);
        assert_eq!(store.find_by_type("sentence").count(), 0);
    }

    #[test]
    fn literals_of_returns_offset_order() {
        let (literals, ids) = store_with_text(&["a", "b", "c"]);
        let mut store = StructureStore::new();
        // Members given out of order are normalized.
        let sid = store
            .create("sentence", None, &[ids[2], ids[0], ids[1]], &literals)
            .unwrap();
        let values: Vec<_> = store
            .literals_of(sid, &literals)
            .unwrap()
            .iter()
            .map(|l| l.value.as_str())
            .collect();
        assert_eq!(values, vec!["a", "b", "c"]);
    }
}
