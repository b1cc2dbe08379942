//! Engine internals: value allocation, statement effects, worklist traversal

pub mod constraint_manager;
pub mod engine;
pub mod statement_effect;

pub use constraint_manager::{ConstraintManager, ValueFactory, ValueSpec};
pub use engine::{EngineOutput, SymbolicEngine};
