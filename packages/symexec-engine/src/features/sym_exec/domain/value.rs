//! Symbolic values and their arena
//!
//! A symbolic value is an opaque identity standing for a runtime value whose
//! concrete contents are unknown. Identity is the only equality that matters:
//! two values are the same iff they carry the same id.
//!
//! Per-value bookkeeping (the optional *wraps* link and the originating node)
//! lives in an arena owned by the exploration's constraint manager. Values
//! elsewhere only hold indices, so states stay cheap to copy and compare.

use crate::shared::models::NodeId;
use serde::{Deserialize, Serialize};

/// Opaque symbolic value identity.
///
/// Equality and ordering are by identity, never structural.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct SymbolicValue(pub u32);

impl std::fmt::Display for SymbolicValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "sv#{}", self.0)
    }
}

/// Per-value metadata held by the arena.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValueRecord {
    /// Value this one wraps (e.g. a factory result derived from a prior
    /// top-of-stack value). Only ever points at an earlier id, so the wraps
    /// relation is acyclic within one exploration.
    pub wraps: Option<SymbolicValue>,

    /// Node the value originated at. Lets a check recover the call site of
    /// a value it finds via a constraint query at end of path.
    pub origin: Option<NodeId>,
}

/// Arena of all values allocated during one routine's exploration.
#[derive(Debug, Default)]
pub struct ValueArena {
    records: Vec<ValueRecord>,
}

impl ValueArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a fresh value.
    ///
    /// A `wraps` link to a not-yet-allocated id is dropped; only earlier ids
    /// may be wrapped, which keeps the relation acyclic by construction.
    pub fn alloc(&mut self, mut record: ValueRecord) -> SymbolicValue {
        let id = self.records.len() as u32;
        if let Some(wrapped) = record.wraps {
            if wrapped.0 >= id {
                record.wraps = None;
            }
        }
        self.records.push(record);
        SymbolicValue(id)
    }

    /// Metadata for a value allocated in this arena.
    pub fn record(&self, value: SymbolicValue) -> Option<&ValueRecord> {
        self.records.get(value.0 as usize)
    }

    /// Node the value originated at, if recorded.
    pub fn origin(&self, value: SymbolicValue) -> Option<NodeId> {
        self.record(value).and_then(|r| r.origin)
    }

    /// True if `a` is `b` or wraps it, directly or transitively.
    pub fn references(&self, a: SymbolicValue, b: SymbolicValue) -> bool {
        let mut current = a;
        loop {
            if current == b {
                return true;
            }
            match self.record(current).and_then(|r| r.wraps) {
                // Wraps links only point at strictly smaller ids, so this
                // walk terminates.
                Some(inner) => current = inner,
                None => return false,
            }
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_equality() {
        let mut arena = ValueArena::new();
        let a = arena.alloc(ValueRecord::default());
        let b = arena.alloc(ValueRecord::default());
        assert_ne!(a, b);
        assert_eq!(a, SymbolicValue(0));
    }

    #[test]
    fn test_references_transitive() {
        let mut arena = ValueArena::new();
        let base = arena.alloc(ValueRecord::default());
        let mid = arena.alloc(ValueRecord {
            wraps: Some(base),
            origin: None,
        });
        let top = arena.alloc(ValueRecord {
            wraps: Some(mid),
            origin: Some(4),
        });

        assert!(arena.references(top, top));
        assert!(arena.references(top, mid));
        assert!(arena.references(top, base));
        assert!(!arena.references(base, top));
        assert_eq!(arena.origin(top), Some(4));
        assert_eq!(arena.origin(base), None);
    }

    #[test]
    fn test_forward_wrap_dropped() {
        let mut arena = ValueArena::new();
        let v = arena.alloc(ValueRecord {
            wraps: Some(SymbolicValue(9)),
            origin: None,
        });
        assert_eq!(arena.record(v).unwrap().wraps, None);
    }

    #[test]
    fn test_unrelated_values_do_not_reference() {
        let mut arena = ValueArena::new();
        let a = arena.alloc(ValueRecord::default());
        let b = arena.alloc(ValueRecord::default());
        assert!(!arena.references(a, b));
        assert!(!arena.references(b, a));
    }
}
