//! Immutable program state
//!
//! A snapshot of one explored path: the expression-evaluation stack, the
//! local-variable bindings, and the constraint store. Never mutated in
//! place; every transformation returns a fresh state, which lets pending
//! worklist entries share snapshots freely.
//!
//! Structural equality (and hashing) over all three parts is what the engine
//! deduplicates on, and is what makes loop exploration terminate.

use super::constraint::{Constraint, DomainKey};
use super::value::SymbolicValue;
use crate::errors::{EngineError, Result};
use std::collections::BTreeMap;

/// Immutable snapshot of one execution path's abstract state.
///
/// Ordered maps keep iteration deterministic; constraint queries that feed
/// findings must not depend on hash order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ProgramState {
    /// Expression-evaluation stack; last element is the top.
    stack: Vec<SymbolicValue>,

    /// Local-variable bindings.
    locals: BTreeMap<String, SymbolicValue>,

    /// Constraint store: value -> domain -> fact. At most one fact per
    /// domain per value.
    constraints: BTreeMap<SymbolicValue, BTreeMap<DomainKey, Constraint>>,
}

impl ProgramState {
    /// Empty state used to seed the entry node.
    pub fn empty() -> Self {
        Self::default()
    }

    /// New state with `value` pushed on the stack.
    pub fn push(&self, value: SymbolicValue) -> ProgramState {
        let mut next = self.clone();
        next.stack.push(value);
        next
    }

    /// Value `n` positions from the top, without mutation.
    ///
    /// Absent means "no constraint available", not an error; hooks decline
    /// to act on it.
    pub fn peek(&self, n: usize) -> Option<SymbolicValue> {
        let depth = self.stack.len();
        if n < depth {
            Some(self.stack[depth - 1 - n])
        } else {
            None
        }
    }

    /// Remove the top `n` values, returning them top-first with the
    /// resulting state.
    ///
    /// Underflow is a contract violation in the statement-effect logic and
    /// fails loudly.
    pub fn pop(&self, n: usize) -> Result<(Vec<SymbolicValue>, ProgramState)> {
        let depth = self.stack.len();
        if n > depth {
            return Err(EngineError::StackUnderflow { needed: n, depth });
        }
        let mut next = self.clone();
        let mut popped = Vec::with_capacity(n);
        for _ in 0..n {
            // Cannot fail, length was checked above.
            if let Some(value) = next.stack.pop() {
                popped.push(value);
            }
        }
        Ok((popped, next))
    }

    /// Current stack depth.
    pub fn stack_depth(&self) -> usize {
        self.stack.len()
    }

    /// Value bound to a local, if any.
    pub fn local(&self, name: &str) -> Option<SymbolicValue> {
        self.locals.get(name).copied()
    }

    /// New state with `name` bound to `value`.
    pub fn bind_local(&self, name: impl Into<String>, value: SymbolicValue) -> ProgramState {
        let mut next = self.clone();
        next.locals.insert(name.into(), value);
        next
    }

    /// Attach a constraint to a value.
    ///
    /// Returns `None` when the value already carries a contradictory fact in
    /// the same domain: the state is logically infeasible and the engine
    /// drops the path instead of propagating it.
    pub fn add_constraint(
        &self,
        value: SymbolicValue,
        constraint: Constraint,
    ) -> Option<ProgramState> {
        if let Some(existing) = self.constraint(value, constraint.domain) {
            if !existing.is_compatible_with(&constraint) {
                return None;
            }
            // Identical fact: refinement is a no-op, but still return a
            // fresh snapshot for uniform copy-on-write semantics.
            return Some(self.clone());
        }
        let mut next = self.clone();
        next.constraints
            .entry(value)
            .or_default()
            .insert(constraint.domain, constraint);
        Some(next)
    }

    /// The fact a value carries in one domain, if any.
    pub fn constraint(&self, value: SymbolicValue, domain: DomainKey) -> Option<Constraint> {
        self.constraints
            .get(&value)
            .and_then(|by_domain| by_domain.get(domain))
            .copied()
    }

    /// Whether a value carries exactly this fact.
    pub fn has_constraint(&self, value: SymbolicValue, constraint: Constraint) -> bool {
        self.constraint(value, constraint.domain) == Some(constraint)
    }

    /// All values in this state carrying exactly `constraint`, in value-id
    /// order. Used by end-of-path reporting.
    pub fn values_with_constraint(&self, constraint: Constraint) -> Vec<SymbolicValue> {
        self.constraints
            .iter()
            .filter(|(_, by_domain)| by_domain.get(constraint.domain) == Some(&constraint))
            .map(|(value, _)| *value)
            .collect()
    }
}
