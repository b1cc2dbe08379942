//! Constraint manager: per-exploration value allocation
//!
//! One manager lives for the duration of one routine's exploration. It owns
//! the value arena (the fresh-id sequence plus wraps/origin metadata) and the
//! one-shot value factory a check may register so the next allocated value is
//! linked back to the call site the check observed.

use crate::features::sym_exec::domain::{SymbolicValue, ValueArena, ValueRecord};
use crate::shared::models::NodeId;
use tracing::warn;

/// What a check-supplied factory produces for the next fresh value.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValueSpec {
    /// Prior value the fresh one wraps, usually the top of stack the factory
    /// was handed.
    pub wraps: Option<SymbolicValue>,

    /// Originating node, recoverable later purely from the value.
    pub origin: Option<NodeId>,
}

/// One-shot factory invoked with the current top-of-stack value.
pub type ValueFactory = Box<dyn FnOnce(Option<SymbolicValue>) -> ValueSpec>;

/// Allocates fresh symbolic values during one routine's exploration.
#[derive(Default)]
pub struct ConstraintManager {
    arena: ValueArena,
    pending_factory: Option<ValueFactory>,
}

impl ConstraintManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory for the next allocated value. Consumed by the next
    /// `create_value` call; a still-pending factory is replaced.
    pub fn set_value_factory(&mut self, factory: ValueFactory) {
        if self.pending_factory.is_some() {
            warn!("value factory replaced before it was consumed");
        }
        self.pending_factory = Some(factory);
    }

    /// Allocate a fresh value, honoring a pending factory if one was
    /// registered. `top_of_stack` is the currently-top value, handed to the
    /// factory as the wrapped value.
    pub fn create_value(&mut self, top_of_stack: Option<SymbolicValue>) -> SymbolicValue {
        let spec = match self.pending_factory.take() {
            Some(factory) => factory(top_of_stack),
            None => ValueSpec::default(),
        };
        self.arena.alloc(ValueRecord {
            wraps: spec.wraps,
            origin: spec.origin,
        })
    }

    /// True if `a` is `b` or wraps it, directly or transitively.
    pub fn references(&self, a: SymbolicValue, b: SymbolicValue) -> bool {
        self.arena.references(a, b)
    }

    /// Node a value originated at, if its factory recorded one.
    pub fn origin(&self, value: SymbolicValue) -> Option<NodeId> {
        self.arena.origin(value)
    }

    pub fn arena(&self) -> &ValueArena {
        &self.arena
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_allocation_is_fresh() {
        let mut manager = ConstraintManager::new();
        let a = manager.create_value(None);
        let b = manager.create_value(Some(a));
        assert_ne!(a, b);
        // Without a factory the top-of-stack hint is not recorded as a wrap.
        assert!(!manager.references(b, a));
    }

    #[test]
    fn test_factory_consumed_once() {
        let mut manager = ConstraintManager::new();
        let base = manager.create_value(None);
        manager.set_value_factory(Box::new(|top| ValueSpec {
            wraps: top,
            origin: Some(7),
        }));

        let wrapped = manager.create_value(Some(base));
        assert!(manager.references(wrapped, base));
        assert_eq!(manager.origin(wrapped), Some(7));

        // Next allocation is plain again.
        let plain = manager.create_value(Some(wrapped));
        assert!(!manager.references(plain, wrapped));
        assert_eq!(manager.origin(plain), None);
    }

    #[test]
    fn test_factory_with_empty_stack() {
        let mut manager = ConstraintManager::new();
        manager.set_value_factory(Box::new(|top| ValueSpec {
            wraps: top,
            origin: Some(1),
        }));
        let value = manager.create_value(None);
        assert_eq!(manager.origin(value), Some(1));
        assert_eq!(manager.arena().record(value).unwrap().wraps, None);
    }
}
