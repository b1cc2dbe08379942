//! # symexec-engine
//!
//! Intra-procedural symbolic-execution engine with pluggable checks.
//!
//! The engine explores the control-flow paths of one routine at a time,
//! threading an immutable program state (expression-evaluation stack, local
//! bindings, and a store of constraints on symbolic values) through each
//! statement. Registered checks observe and extend the state at three hook
//! points - pre-statement, post-statement, and end of path - and report
//! findings anchored at the node a defective value originated from.
//!
//! The front end is an external collaborator: routines arrive as already
//! resolved control-flow graphs of statement nodes (see
//! [`shared::models::RoutineCfg`]), and type questions go through an opaque
//! [`shared::models::TypeOracle`].
//!
//! ## Exploration model
//!
//! - States are immutable snapshots, derived functionally and compared
//!   structurally; the engine deduplicates arrivals per node on that
//!   equality, which is what makes loop exploration terminate.
//! - A contradictory constraint attach makes a state infeasible; the path is
//!   silently pruned, never surfaced as an error.
//! - A per-node revisit budget conservatively drops states on loops that
//!   never converge; the incompleteness is counted in
//!   [`ExplorationStats`], not raised.
//! - Distinct routines are independent: the batch runner explores them in
//!   parallel, one constraint manager and worklist each.
//!
//! ## Example
//!
//! ```
//! use symexec_engine::features::checks::XxeProcessingCheck;
//! use symexec_engine::features::sym_exec::{CancelToken, RoutineAnalyzer};
//! use symexec_engine::shared::models::{ExactTypeOracle, RoutineCfg, Statement};
//!
//! let mut cfg = RoutineCfg::new("example");
//! cfg.add_sequential(Statement::Return { has_value: false }, 1);
//!
//! let analyzer = RoutineAnalyzer::new().with_check(Box::new(XxeProcessingCheck::new()));
//! let result = analyzer.analyze(&cfg, &ExactTypeOracle, &CancelToken::new());
//! assert!(result.findings.is_empty());
//! ```

pub mod errors;
pub mod features;
pub mod shared;

pub use errors::{EngineError, Result};
pub use features::checks::{XxeProcessingCheck, XXE_CHECK_NAME};
pub use features::sym_exec::{
    AnalysisOutcome, AnalysisSummary, CancelToken, CheckError, CheckerContext, Constraint,
    ConstraintManager, EngineConfig, ExplorationStats, Finding, HookOutcome, ProgramState,
    RoutineAnalysis, RoutineAnalyzer, SeCheck, SymbolicEngine, SymbolicValue,
};
pub use shared::models::{CallSite, Literal, NodeId, RoutineCfg, Statement, TypeOracle};
