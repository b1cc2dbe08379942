//! Worklist-driven path exploration
//!
//! Walks one routine's CFG with a FIFO worklist of (node, state) pairs:
//! pre-statement hooks, intrinsic statement effect, post-statement hooks,
//! then successors. Infeasible states are pruned; arrivals already seen at a
//! node (structural equality) are deduplicated; a per-node revisit budget
//! bounds loop exploration, trading completeness for termination.
//!
//! Exploration is single-threaded and cooperative: a cancellation token is
//! checked once per worklist iteration, never mid-node.

use super::constraint_manager::ConstraintManager;
use super::statement_effect;
use crate::errors::{EngineError, Result};
use crate::features::sym_exec::domain::ProgramState;
use crate::features::sym_exec::ports::{
    CancelToken, CheckerContext, EngineConfig, ExplorationStats, Finding, HookOutcome, SeCheck,
};
use crate::shared::models::{NodeId, RoutineCfg, TypeOracle};
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::{BTreeSet, VecDeque};
use tracing::{debug, warn};

/// Raw exploration output; the application layer turns it into a
/// `RoutineAnalysis`.
#[derive(Debug)]
pub struct EngineOutput {
    pub findings: Vec<Finding>,
    pub stats: ExplorationStats,
    pub cancelled: bool,
}

/// Symbolic-execution driver for one routine.
pub struct SymbolicEngine<'a> {
    cfg: &'a RoutineCfg,
    oracle: &'a dyn TypeOracle,
    checks: &'a [Box<dyn SeCheck>],
    config: EngineConfig,
}

/// Result of composing one hook over the current state.
enum HookStep {
    Continue,
    Prune,
}

impl<'a> SymbolicEngine<'a> {
    pub fn new(
        cfg: &'a RoutineCfg,
        oracle: &'a dyn TypeOracle,
        checks: &'a [Box<dyn SeCheck>],
    ) -> Self {
        Self {
            cfg,
            oracle,
            checks,
            config: EngineConfig::default(),
        }
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Explore the routine to exhaustion, cancellation, or budget.
    pub fn run(&self, cancel: &CancelToken) -> Result<EngineOutput> {
        let mut manager = ConstraintManager::new();
        let mut findings: BTreeSet<Finding> = BTreeSet::new();
        let mut stats = ExplorationStats::default();
        let mut cancelled = false;

        // Check indices disabled after an unexpected hook failure.
        let mut disabled: FxHashSet<usize> = FxHashSet::default();

        // Structural-equality signatures already processed per node.
        let mut seen: FxHashMap<NodeId, FxHashSet<ProgramState>> = FxHashMap::default();
        let mut arrivals: FxHashMap<NodeId, usize> = FxHashMap::default();

        let mut worklist: VecDeque<(NodeId, ProgramState)> = VecDeque::new();
        let entry_state = ProgramState::empty();
        seen.entry(self.cfg.entry)
            .or_default()
            .insert(entry_state.clone());
        arrivals.insert(self.cfg.entry, 1);
        worklist.push_back((self.cfg.entry, entry_state));

        'work: while let Some((node_id, state)) = worklist.pop_front() {
            if cancel.is_cancelled() {
                warn!(
                    routine = %self.cfg.name,
                    pending = worklist.len(),
                    "exploration cancelled, abandoning pending states"
                );
                cancelled = true;
                break;
            }

            stats.steps += 1;
            if stats.steps > self.config.max_steps as u64 {
                warn!(
                    routine = %self.cfg.name,
                    max_steps = self.config.max_steps,
                    "step budget exhausted, remaining states dropped"
                );
                stats.step_budget_hit = true;
                break;
            }

            let node = self
                .cfg
                .node(node_id)
                .ok_or(EngineError::UnknownNode(node_id))?;

            let mut current = state;

            // 1. Pre-statement hooks, composed sequentially.
            for (index, check) in self.checks.iter().enumerate() {
                if disabled.contains(&index) {
                    continue;
                }
                let step = self.run_state_hook(
                    check.as_ref(),
                    true,
                    node_id,
                    &mut current,
                    &mut manager,
                    &mut findings,
                    &mut disabled,
                    index,
                    &mut stats,
                );
                if matches!(step, HookStep::Prune) {
                    continue 'work;
                }
            }

            // 2. Intrinsic statement effect.
            match statement_effect::apply(&current, node, &mut manager)? {
                Some(next) => current = next,
                None => {
                    stats.infeasible_pruned += 1;
                    debug!(node = node_id, "intrinsic effect infeasible, path pruned");
                    continue;
                }
            }

            // 3. Post-statement hooks.
            for (index, check) in self.checks.iter().enumerate() {
                if disabled.contains(&index) {
                    continue;
                }
                let step = self.run_state_hook(
                    check.as_ref(),
                    false,
                    node_id,
                    &mut current,
                    &mut manager,
                    &mut findings,
                    &mut disabled,
                    index,
                    &mut stats,
                );
                if matches!(step, HookStep::Prune) {
                    continue 'work;
                }
            }

            // 4. Terminal node: end-of-path hooks, once per distinct state.
            let successors = self.cfg.successors(node_id);
            if successors.is_empty() {
                stats.end_of_path_states += 1;
                for (index, check) in self.checks.iter().enumerate() {
                    if disabled.contains(&index) {
                        continue;
                    }
                    let mut ctx = CheckerContext::new(
                        self.cfg,
                        node_id,
                        self.oracle,
                        &mut manager,
                        &mut findings,
                    );
                    if let Err(error) = check.end_of_path(&mut ctx, &current) {
                        self.disable_check(check.name(), index, &error, &mut disabled, &mut stats);
                    }
                }
                continue;
            }

            // 5. Enqueue successors, deduplicating and budgeting.
            for &successor in successors {
                let signatures = seen.entry(successor).or_default();
                if signatures.contains(&current) {
                    stats.states_deduplicated += 1;
                    continue;
                }
                let visits = arrivals.entry(successor).or_insert(0);
                if *visits >= self.config.max_node_revisits {
                    stats.revisit_budget_drops += 1;
                    debug!(
                        node = successor,
                        budget = self.config.max_node_revisits,
                        "revisit budget exhausted, state dropped"
                    );
                    continue;
                }
                *visits += 1;
                signatures.insert(current.clone());
                worklist.push_back((successor, current.clone()));
                stats.states_enqueued += 1;
            }
        }

        Ok(EngineOutput {
            findings: findings.into_iter().collect(),
            stats,
            cancelled,
        })
    }

    /// Run one pre/post hook, folding its outcome into `current`.
    #[allow(clippy::too_many_arguments)]
    fn run_state_hook(
        &self,
        check: &dyn SeCheck,
        pre: bool,
        node_id: NodeId,
        current: &mut ProgramState,
        manager: &mut ConstraintManager,
        findings: &mut BTreeSet<Finding>,
        disabled: &mut FxHashSet<usize>,
        index: usize,
        stats: &mut ExplorationStats,
    ) -> HookStep {
        let mut ctx = CheckerContext::new(self.cfg, node_id, self.oracle, manager, findings);
        let outcome = if pre {
            check.pre_statement(&mut ctx, current)
        } else {
            check.post_statement(&mut ctx, current)
        };
        match outcome {
            Ok(HookOutcome::Unchanged) => HookStep::Continue,
            Ok(HookOutcome::Transformed(next)) => {
                *current = next;
                HookStep::Continue
            }
            Ok(HookOutcome::Infeasible) => {
                stats.infeasible_pruned += 1;
                debug!(
                    check = check.name(),
                    node = node_id,
                    "hook derived a contradiction, path pruned"
                );
                HookStep::Prune
            }
            Err(error) => {
                self.disable_check(check.name(), index, &error, disabled, stats);
                HookStep::Continue
            }
        }
    }

    fn disable_check(
        &self,
        name: &str,
        index: usize,
        error: &crate::features::sym_exec::ports::CheckError,
        disabled: &mut FxHashSet<usize>,
        stats: &mut ExplorationStats,
    ) {
        warn!(
            check = name,
            routine = %self.cfg.name,
            %error,
            "check hook failed, check disabled for remainder of routine"
        );
        disabled.insert(index);
        stats.checks_disabled += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::sym_exec::domain::{Constraint, SymbolicValue};
    use crate::features::sym_exec::ports::CheckError;
    use crate::shared::models::{ExactTypeOracle, Literal, Statement};
    use std::result::Result;

    const ORACLE: ExactTypeOracle = ExactTypeOracle;

    fn run(cfg: &RoutineCfg, checks: &[Box<dyn SeCheck>]) -> EngineOutput {
        SymbolicEngine::new(cfg, &ORACLE, checks)
            .run(&CancelToken::new())
            .unwrap()
    }

    /// Counts hook invocations per node via findings (stateless otherwise).
    struct PathCounter;

    impl SeCheck for PathCounter {
        fn name(&self) -> &'static str {
            "path-counter"
        }

        fn end_of_path(
            &self,
            ctx: &mut CheckerContext<'_>,
            _state: &ProgramState,
        ) -> Result<(), CheckError> {
            let node = ctx.node();
            ctx.report_issue("path-counter", node, "reached exit");
            Ok(())
        }
    }

    struct FailingCheck;

    impl SeCheck for FailingCheck {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn pre_statement(
            &self,
            _ctx: &mut CheckerContext<'_>,
            _state: &ProgramState,
        ) -> Result<HookOutcome, CheckError> {
            Err(CheckError::new("boom"))
        }
    }

    /// Prunes every path through a node carrying a `Branch` statement.
    struct PruneBranches;

    impl SeCheck for PruneBranches {
        fn name(&self) -> &'static str {
            "prune-branches"
        }

        fn pre_statement(
            &self,
            ctx: &mut CheckerContext<'_>,
            _state: &ProgramState,
        ) -> Result<HookOutcome, CheckError> {
            if matches!(ctx.statement(), Statement::Branch) {
                return Ok(HookOutcome::Infeasible);
            }
            Ok(HookOutcome::Unchanged)
        }
    }

    fn straight_line_cfg() -> RoutineCfg {
        let mut cfg = RoutineCfg::new("straight");
        cfg.add_sequential(Statement::Nop, 1);
        cfg.add_sequential(Statement::Literal(Literal::Int(1)), 2);
        cfg.add_sequential(Statement::Return { has_value: true }, 3);
        cfg
    }

    #[test]
    fn test_straight_line_reaches_exit_once() {
        let checks: Vec<Box<dyn SeCheck>> = vec![Box::new(PathCounter)];
        let output = run(&straight_line_cfg(), &checks);
        assert_eq!(output.findings.len(), 1);
        assert_eq!(output.stats.end_of_path_states, 1);
        assert!(!output.cancelled);
    }

    #[test]
    fn test_loop_terminates_via_dedup() {
        // entry -> head -> body -> head, head -> exit
        let mut cfg = RoutineCfg::new("looping");
        let entry = cfg.add_node(Statement::Nop, 1);
        let head = cfg.add_node(Statement::Nop, 2);
        let body = cfg.add_node(Statement::Nop, 3);
        let exit = cfg.add_node(Statement::Return { has_value: false }, 4);
        cfg.add_edge(entry, head);
        cfg.add_edge(head, body);
        cfg.add_edge(body, head);
        cfg.add_edge(head, exit);

        let checks: Vec<Box<dyn SeCheck>> = vec![Box::new(PathCounter)];
        let output = run(&cfg, &checks);

        // Second arrival at head carries a structurally equal state.
        assert!(output.stats.states_deduplicated >= 1);
        assert_eq!(output.stats.end_of_path_states, 1);
        assert_eq!(output.findings.len(), 1);
    }

    #[test]
    fn test_revisit_budget_bounds_growing_states() {
        // Loop body pushes a literal each round, so states never repeat and
        // only the revisit budget stops exploration.
        let mut cfg = RoutineCfg::new("growing");
        let entry = cfg.add_node(Statement::Nop, 1);
        let head = cfg.add_node(Statement::Nop, 2);
        let body = cfg.add_node(Statement::Literal(Literal::Int(1)), 3);
        let exit = cfg.add_node(Statement::Return { has_value: false }, 4);
        cfg.add_edge(entry, head);
        cfg.add_edge(head, body);
        cfg.add_edge(body, head);
        cfg.add_edge(head, exit);

        let checks: Vec<Box<dyn SeCheck>> = vec![];
        let output = SymbolicEngine::new(&cfg, &ORACLE, &checks)
            .with_config(EngineConfig::default().with_max_node_revisits(3))
            .run(&CancelToken::new())
            .unwrap();

        assert!(output.stats.revisit_budget_drops >= 1);
    }

    #[test]
    fn test_cancellation_abandons_pending_states() {
        let cancel = CancelToken::new();
        cancel.cancel();

        let checks: Vec<Box<dyn SeCheck>> = vec![Box::new(PathCounter)];
        let output = SymbolicEngine::new(&straight_line_cfg(), &ORACLE, &checks)
            .run(&cancel)
            .unwrap();

        assert!(output.cancelled);
        assert!(output.findings.is_empty());
    }

    #[test]
    fn test_failing_check_is_disabled_not_fatal() {
        let checks: Vec<Box<dyn SeCheck>> = vec![Box::new(FailingCheck), Box::new(PathCounter)];
        let output = run(&straight_line_cfg(), &checks);

        // The failing check is disabled once; the other check still runs.
        assert_eq!(output.stats.checks_disabled, 1);
        assert_eq!(output.findings.len(), 1);
    }

    #[test]
    fn test_infeasible_branch_paths_are_pruned() {
        // entry -> branch -> exit; the check prunes at the branch node.
        let mut cfg = RoutineCfg::new("pruned");
        let entry = cfg.add_node(Statement::Literal(Literal::Bool(true)), 1);
        let branch = cfg.add_node(Statement::Branch, 2);
        let exit = cfg.add_node(Statement::Return { has_value: false }, 3);
        cfg.add_edge(entry, branch);
        cfg.add_edge(branch, exit);

        let checks: Vec<Box<dyn SeCheck>> =
            vec![Box::new(PruneBranches), Box::new(PathCounter)];
        let output = run(&cfg, &checks);

        assert_eq!(output.stats.infeasible_pruned, 1);
        assert!(output.findings.is_empty());
    }

    #[test]
    fn test_stack_underflow_aborts_routine() {
        let mut cfg = RoutineCfg::new("underflow");
        cfg.add_sequential(Statement::Return { has_value: true }, 1);

        let checks: Vec<Box<dyn SeCheck>> = vec![];
        let error = SymbolicEngine::new(&cfg, &ORACLE, &checks)
            .run(&CancelToken::new())
            .unwrap_err();
        assert!(matches!(error, EngineError::StackUnderflow { .. }));
    }

    #[test]
    fn test_determinism_across_runs() {
        let mut cfg = RoutineCfg::new("diamond");
        let entry = cfg.add_node(Statement::Literal(Literal::Bool(true)), 1);
        let branch = cfg.add_node(Statement::Branch, 2);
        let left = cfg.add_node(Statement::Nop, 3);
        let right = cfg.add_node(Statement::Nop, 4);
        let join = cfg.add_node(Statement::Nop, 5);
        let exit = cfg.add_node(Statement::Return { has_value: false }, 6);
        cfg.add_edge(entry, branch);
        cfg.add_edge(branch, left);
        cfg.add_edge(branch, right);
        cfg.add_edge(left, join);
        cfg.add_edge(right, join);
        cfg.add_edge(join, exit);

        let checks: Vec<Box<dyn SeCheck>> = vec![Box::new(PathCounter)];
        let first = run(&cfg, &checks);
        let second = run(&cfg, &checks);
        assert_eq!(first.findings, second.findings);
        assert_eq!(first.stats, second.stats);
    }

    /// A check attaching/querying its own domain next to another check's
    /// domain on the same value.
    struct TagEntry;

    impl SeCheck for TagEntry {
        fn name(&self) -> &'static str {
            "tag-entry"
        }

        fn post_statement(
            &self,
            ctx: &mut CheckerContext<'_>,
            state: &ProgramState,
        ) -> Result<HookOutcome, CheckError> {
            if !matches!(ctx.statement(), Statement::Literal(_)) {
                return Ok(HookOutcome::Unchanged);
            }
            let Some(top) = state.peek(0) else {
                return Ok(HookOutcome::Unchanged);
            };
            match state.add_constraint(top, Constraint::new("tag-entry", "seen")) {
                Some(next) => Ok(HookOutcome::Transformed(next)),
                None => Ok(HookOutcome::Infeasible),
            }
        }

        fn end_of_path(
            &self,
            ctx: &mut CheckerContext<'_>,
            state: &ProgramState,
        ) -> Result<(), CheckError> {
            for value in state.values_with_constraint(Constraint::new("tag-entry", "seen")) {
                // Values from other domains must not leak into this query.
                assert_ne!(value, SymbolicValue(u32::MAX));
                let node = ctx.node();
                ctx.report_issue("tag-entry", node, "tagged value reached exit");
            }
            Ok(())
        }
    }

    #[test]
    fn test_check_domains_compose_without_collision() {
        let checks: Vec<Box<dyn SeCheck>> = vec![Box::new(TagEntry), Box::new(PathCounter)];
        let output = run(&straight_line_cfg(), &checks);
        let names: Vec<&str> = output.findings.iter().map(|f| f.check.as_str()).collect();
        assert!(names.contains(&"tag-entry"));
        assert!(names.contains(&"path-counter"));
    }
}
