//! Check contract and engine-facing DTOs
//!
//! The check contract is the extension seam: a check observes and extends
//! the program state at three hook points (pre-statement, post-statement,
//! end-of-path) and reports findings. Checks are stateless between hook
//! calls; anything a check wants to remember across statements must live in
//! the program state as constraints, because the engine interleaves paths.

use crate::features::sym_exec::domain::ProgramState;
use crate::features::sym_exec::infrastructure::ConstraintManager;
use crate::features::sym_exec::domain::SymbolicValue;
use crate::shared::models::{NodeId, RoutineCfg, Statement, TypeOracle};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;

/// Unexpected failure inside a check hook.
///
/// Does not abort the analysis run: the engine disables the offending check
/// for the remainder of the routine and logs the failure.
#[derive(Debug, Error)]
#[error("check hook failed: {0}")]
pub struct CheckError(pub String);

impl CheckError {
    pub fn new(msg: impl Into<String>) -> Self {
        CheckError(msg.into())
    }
}

/// What a hook did to the program state.
#[derive(Debug)]
pub enum HookOutcome {
    /// Hook declined to act; state flows through untouched.
    Unchanged,
    /// Hook produced a transformed state for the next hook to see.
    Transformed(ProgramState),
    /// Hook derived a contradiction; the path is pruned.
    Infeasible,
}

/// Pluggable analysis observing program state at the hook points.
///
/// Hooks must be pure with respect to everything except the state they
/// return; reporting a finding is the only other visible effect, and
/// findings are append-only and order-independent.
pub trait SeCheck: Send + Sync {
    /// Stable check identity carried on findings.
    fn name(&self) -> &'static str;

    /// Runs before the statement's intrinsic stack effect.
    fn pre_statement(
        &self,
        _ctx: &mut CheckerContext<'_>,
        _state: &ProgramState,
    ) -> Result<HookOutcome, CheckError> {
        Ok(HookOutcome::Unchanged)
    }

    /// Runs after the statement's intrinsic stack effect.
    fn post_statement(
        &self,
        _ctx: &mut CheckerContext<'_>,
        _state: &ProgramState,
    ) -> Result<HookOutcome, CheckError> {
        Ok(HookOutcome::Unchanged)
    }

    /// Runs once per distinct state reaching a terminal node.
    fn end_of_path(
        &self,
        _ctx: &mut CheckerContext<'_>,
        _state: &ProgramState,
    ) -> Result<(), CheckError> {
        Ok(())
    }
}

/// Per-hook view the engine hands to a check.
pub struct CheckerContext<'a> {
    cfg: &'a RoutineCfg,
    node: NodeId,
    oracle: &'a dyn TypeOracle,
    constraint_manager: &'a mut ConstraintManager,
    findings: &'a mut BTreeSet<Finding>,
}

impl<'a> CheckerContext<'a> {
    pub(crate) fn new(
        cfg: &'a RoutineCfg,
        node: NodeId,
        oracle: &'a dyn TypeOracle,
        constraint_manager: &'a mut ConstraintManager,
        findings: &'a mut BTreeSet<Finding>,
    ) -> Self {
        Self {
            cfg,
            node,
            oracle,
            constraint_manager,
            findings,
        }
    }

    /// Node the hook is observing.
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Statement payload of the current node.
    pub fn statement(&self) -> &Statement {
        const NOP: Statement = Statement::Nop;
        self.cfg
            .node(self.node)
            .map(|n| &n.statement)
            .unwrap_or(&NOP)
    }

    /// Type oracle for matcher queries.
    pub fn oracle(&self) -> &dyn TypeOracle {
        self.oracle
    }

    /// Exploration-wide value allocator.
    pub fn constraint_manager(&mut self) -> &mut ConstraintManager {
        self.constraint_manager
    }

    /// True if `a` is `b` or wraps it transitively.
    pub fn references(&self, a: SymbolicValue, b: SymbolicValue) -> bool {
        self.constraint_manager.references(a, b)
    }

    /// Originating node of a value, if its factory recorded one.
    pub fn origin_of(&self, value: SymbolicValue) -> Option<NodeId> {
        self.constraint_manager.origin(value)
    }

    /// Report a finding anchored at `anchor`. Duplicate reports for the same
    /// anchor and message collapse, so repeated unsafe paths to the same
    /// construct yield one finding.
    pub fn report_issue(&mut self, check: &'static str, anchor: NodeId, message: impl Into<String>) {
        self.findings.insert(Finding {
            check: check.to_string(),
            node: anchor,
            line: self.cfg.line_of(anchor),
            message: message.into(),
        });
    }
}

/// A reported defect, anchored at the originating node.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Finding {
    /// Reporting check identity
    pub check: String,

    /// Anchor node
    pub node: NodeId,

    /// Source line of the anchor node
    pub line: u32,

    /// Human-readable message
    pub message: String,
}

/// Exploration limits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Distinct states processed per node before further arrivals are
    /// conservatively dropped (documented incompleteness, bounds loops).
    pub max_node_revisits: usize,

    /// Worklist iterations before the exploration stops outright.
    pub max_steps: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_node_revisits: 8,
            max_steps: 16_000,
        }
    }
}

impl EngineConfig {
    pub fn with_max_node_revisits(mut self, max_node_revisits: usize) -> Self {
        self.max_node_revisits = max_node_revisits;
        self
    }

    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }
}

/// Cooperative cancellation signal, checked between worklist iterations.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Counters exposed for diagnosability; budget exhaustion degrades soundness
/// silently but must be visible here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplorationStats {
    /// Worklist entries processed
    pub steps: u64,

    /// States enqueued against successors
    pub states_enqueued: u64,

    /// Arrivals dropped because a structurally equal state was already seen
    pub states_deduplicated: u64,

    /// Paths pruned as logically infeasible
    pub infeasible_pruned: u64,

    /// Arrivals dropped by the per-node revisit budget
    pub revisit_budget_drops: u64,

    /// Iterations dropped by the overall step budget
    pub step_budget_hit: bool,

    /// Checks disabled after a hook failure
    pub checks_disabled: u64,

    /// Distinct states that reached a terminal node
    pub end_of_path_states: u64,
}

/// How one routine's analysis ended.
///
/// `Cancelled` must be distinguishable from "analyzed with zero findings" in
/// any summary output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnalysisOutcome {
    /// Exploration drained the worklist
    Completed,
    /// Cooperative cancellation abandoned pending states
    Cancelled,
    /// Internal contract violation aborted the routine
    Aborted { reason: String },
}

/// Per-routine analysis result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutineAnalysis {
    /// Routine name from the CFG
    pub routine: String,

    /// How exploration ended
    pub outcome: AnalysisOutcome,

    /// Findings, sorted
    pub findings: Vec<Finding>,

    /// Exploration counters
    pub stats: ExplorationStats,
}
