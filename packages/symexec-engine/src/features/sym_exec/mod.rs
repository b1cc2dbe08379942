// Symbolic execution of one routine at a time
//
// Hexagonal Architecture:
// - domain: values, constraints, program state
// - infrastructure: constraint manager, statement effects, worklist engine
// - ports: check contract and DTOs (findings, config, stats)
// - application: routine analysis use case and batch runner

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod ports;

pub use application::{AnalysisSummary, RoutineAnalyzer};
pub use domain::{Constraint, DomainKey, ProgramState, SymbolicValue};
pub use infrastructure::{ConstraintManager, SymbolicEngine, ValueSpec};
pub use ports::{
    AnalysisOutcome, CancelToken, CheckError, CheckerContext, EngineConfig, ExplorationStats,
    Finding, HookOutcome, RoutineAnalysis, SeCheck,
};
