//! Core symbolic-execution domain: values, constraints, program state

pub mod constraint;
pub mod program_state;
pub mod value;

pub use constraint::{bool_literal, Constraint, DomainKey, BOOL_FALSE, BOOL_LITERAL_DOMAIN, BOOL_TRUE};
pub use program_state::ProgramState;
pub use value::{SymbolicValue, ValueArena, ValueRecord};
