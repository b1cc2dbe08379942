//! Routine analysis use case
//!
//! Wires a fixed check set to the engine, maps raw exploration output into
//! per-routine results, and fans out over routines with rayon. Routines
//! share no mutable state: each gets its own constraint manager and
//! worklist, so the batch runner needs no locking.

use crate::features::sym_exec::infrastructure::SymbolicEngine;
use crate::features::sym_exec::ports::{
    AnalysisOutcome, CancelToken, EngineConfig, ExplorationStats, RoutineAnalysis, SeCheck,
};
use crate::shared::models::{RoutineCfg, TypeOracle};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Analyzes routines with a fixed, ordered check set.
///
/// The check order determines hook-composition order within a node; checks
/// must not rely on it for correctness.
#[derive(Default)]
pub struct RoutineAnalyzer {
    checks: Vec<Box<dyn SeCheck>>,
    config: EngineConfig,
}

impl RoutineAnalyzer {
    pub fn new() -> Self {
        Self {
            checks: Vec::new(),
            config: EngineConfig::default(),
        }
    }

    pub fn with_check(mut self, check: Box<dyn SeCheck>) -> Self {
        self.checks.push(check);
        self
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Analyze one routine.
    ///
    /// An internal contract violation (front-end/engine mismatch) aborts only
    /// this routine and is folded into the outcome, preserving forward
    /// progress for the rest of the batch.
    pub fn analyze(
        &self,
        cfg: &RoutineCfg,
        oracle: &dyn TypeOracle,
        cancel: &CancelToken,
    ) -> RoutineAnalysis {
        let engine =
            SymbolicEngine::new(cfg, oracle, &self.checks).with_config(self.config.clone());
        match engine.run(cancel) {
            Ok(output) => RoutineAnalysis {
                routine: cfg.name.clone(),
                outcome: if output.cancelled {
                    AnalysisOutcome::Cancelled
                } else {
                    AnalysisOutcome::Completed
                },
                findings: output.findings,
                stats: output.stats,
            },
            Err(error) => {
                warn!(routine = %cfg.name, %error, "routine analysis aborted");
                RoutineAnalysis {
                    routine: cfg.name.clone(),
                    outcome: AnalysisOutcome::Aborted {
                        reason: error.to_string(),
                    },
                    findings: Vec::new(),
                    stats: ExplorationStats::default(),
                }
            }
        }
    }

    /// Analyze routines in parallel, preserving input order in the output.
    pub fn analyze_batch(
        &self,
        routines: &[RoutineCfg],
        oracle: &dyn TypeOracle,
        cancel: &CancelToken,
    ) -> Vec<RoutineAnalysis> {
        routines
            .par_iter()
            .map(|cfg| self.analyze(cfg, oracle, cancel))
            .collect()
    }
}

/// Batch rollup distinguishing incompletely analyzed routines from routines
/// analyzed clean.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisSummary {
    pub completed: usize,
    pub cancelled: usize,
    pub aborted: usize,
    pub total_findings: usize,
}

impl AnalysisSummary {
    pub fn of(results: &[RoutineAnalysis]) -> Self {
        let mut summary = AnalysisSummary::default();
        for result in results {
            match result.outcome {
                AnalysisOutcome::Completed => summary.completed += 1,
                AnalysisOutcome::Cancelled => summary.cancelled += 1,
                AnalysisOutcome::Aborted { .. } => summary.aborted += 1,
            }
            summary.total_findings += result.findings.len();
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::models::{ExactTypeOracle, Literal, Statement};

    fn straight_line(name: &str) -> RoutineCfg {
        let mut cfg = RoutineCfg::new(name);
        cfg.add_sequential(Statement::Literal(Literal::Int(1)), 1);
        cfg.add_sequential(Statement::Return { has_value: true }, 2);
        cfg
    }

    fn underflowing(name: &str) -> RoutineCfg {
        let mut cfg = RoutineCfg::new(name);
        cfg.add_sequential(Statement::Return { has_value: true }, 1);
        cfg
    }

    #[test]
    fn test_analyze_completes_clean_routine() {
        let analyzer = RoutineAnalyzer::new();
        let result = analyzer.analyze(
            &straight_line("m"),
            &ExactTypeOracle,
            &CancelToken::new(),
        );
        assert_eq!(result.outcome, AnalysisOutcome::Completed);
        assert!(result.findings.is_empty());
        assert!(result.stats.steps > 0);
    }

    #[test]
    fn test_malformed_routine_aborts_in_isolation() {
        let analyzer = RoutineAnalyzer::new();
        let routines = vec![straight_line("good"), underflowing("bad")];
        let results =
            analyzer.analyze_batch(&routines, &ExactTypeOracle, &CancelToken::new());

        assert_eq!(results[0].outcome, AnalysisOutcome::Completed);
        assert!(matches!(
            results[1].outcome,
            AnalysisOutcome::Aborted { .. }
        ));
        assert_eq!(results[1].routine, "bad");
    }

    #[test]
    fn test_batch_preserves_input_order() {
        let analyzer = RoutineAnalyzer::new();
        let routines: Vec<RoutineCfg> =
            (0..16).map(|i| straight_line(&format!("m{i}"))).collect();
        let results =
            analyzer.analyze_batch(&routines, &ExactTypeOracle, &CancelToken::new());
        for (i, result) in results.iter().enumerate() {
            assert_eq!(result.routine, format!("m{i}"));
        }
    }

    #[test]
    fn test_summary_separates_cancelled_from_clean() {
        let analyzer = RoutineAnalyzer::new();
        let cancel = CancelToken::new();
        cancel.cancel();
        let cancelled = analyzer.analyze(&straight_line("m"), &ExactTypeOracle, &cancel);

        let clean = analyzer.analyze(
            &straight_line("n"),
            &ExactTypeOracle,
            &CancelToken::new(),
        );

        let summary = AnalysisSummary::of(&[cancelled, clean]);
        assert_eq!(summary.cancelled, 1);
        assert_eq!(summary.completed, 1);
        assert_eq!(summary.aborted, 0);
        assert_eq!(summary.total_findings, 0);
    }
}
