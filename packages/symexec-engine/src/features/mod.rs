//! Feature modules - Each feature follows Hexagonal Architecture
//!
//! - domain/         - Pure business logic
//! - ports/          - Interface boundaries (traits, DTOs)
//! - application/    - Use cases
//! - infrastructure/ - Technical implementations

pub mod checks;
pub mod sym_exec;
