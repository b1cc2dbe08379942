//! XXE factory check
//!
//! Flags XML parser factories left open to external-entity injection: every
//! freshly constructed factory starts UNSECURED, and only a property call
//! setting a known securing feature to a statically-false value proves it
//! SECURED. A factory cannot be both on one path, so the securing attach
//! contradicts the default and prunes that path; values still UNSECURED in a
//! state reaching routine exit are reported at their construction site.

use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;

use super::method_matcher::{MethodMatcher, ParameterCriteria, TypeCriteria};
use crate::features::sym_exec::domain::{Constraint, DomainKey, ProgramState, BOOL_FALSE};
use crate::features::sym_exec::infrastructure::ValueSpec;
use crate::features::sym_exec::ports::{CheckError, CheckerContext, HookOutcome, SeCheck};
use crate::shared::models::{CallSite, Literal, Statement};

/// Constraint domain of this check.
pub const XXE_DOMAIN: DomainKey = "xxe-secured";

/// Default state of every constructed factory.
pub const UNSECURED: Constraint = Constraint::new(XXE_DOMAIN, "unsecured");

/// A factory proven secured by a matching property call.
pub const SECURED: Constraint = Constraint::new(XXE_DOMAIN, "secured");

const XML_INPUT_FACTORY: &str = "javax.xml.stream.XMLInputFactory";

const NEW_INSTANCE: MethodMatcher = MethodMatcher::new(
    TypeCriteria::Is(XML_INPUT_FACTORY),
    "newInstance",
    ParameterCriteria::Any,
);

const SET_PROPERTY: MethodMatcher = MethodMatcher::new(
    TypeCriteria::SubtypeOf(XML_INPUT_FACTORY),
    "setProperty",
    ParameterCriteria::Exact(&["java.lang.String", "java.lang.Object"]),
);

/// A property that, set to false, secures the factory against XXE.
struct SecuringFeature {
    property_name: &'static str,
}

/// Securing features keyed by the property name the first argument folds to.
/// One uniform rule evaluated per feature; no per-variant behavior.
static SECURING_FEATURES: Lazy<FxHashMap<&'static str, SecuringFeature>> = Lazy::new(|| {
    [SecuringFeature {
        property_name: "javax.xml.stream.supportDTD",
    }]
    .into_iter()
    .map(|feature| (feature.property_name, feature))
    .collect()
});

/// Looks up the securing feature named by the call's first argument.
fn feature_for(call: &CallSite) -> Option<&'static SecuringFeature> {
    call.arg_constant(0)
        .and_then(Literal::as_str)
        .and_then(|name| SECURING_FEATURES.get(name))
}

impl SecuringFeature {
    /// Second argument is statically false: either its value carries the
    /// boolean-false literal constraint, or it folds to the string "false",
    /// case-insensitive.
    fn is_set_to_false(&self, state: &ProgramState, call: &CallSite) -> bool {
        let by_literal = state
            .peek(0)
            .is_some_and(|value| state.has_constraint(value, BOOL_FALSE));
        let by_string = call
            .arg_constant(1)
            .and_then(Literal::as_str)
            .is_some_and(|s| s.eq_ignore_ascii_case("false"));
        by_literal || by_string
    }

    /// Attach SECURED to the receiver (two argument slots below the top)
    /// when this call proves the feature disabled. A receiver already
    /// UNSECURED contradicts, so the path is pruned.
    fn check_arguments(&self, state: &ProgramState, call: &CallSite) -> HookOutcome {
        if !self.is_set_to_false(state, call) {
            return HookOutcome::Unchanged;
        }
        let Some(receiver) = state.peek(2) else {
            return HookOutcome::Unchanged;
        };
        match state.add_constraint(receiver, SECURED) {
            Some(next) => HookOutcome::Transformed(next),
            None => HookOutcome::Infeasible,
        }
    }
}

/// Symbolic-execution check for unsecured XML input factories.
#[derive(Debug, Default)]
pub struct XxeProcessingCheck;

impl XxeProcessingCheck {
    pub fn new() -> Self {
        Self
    }
}

pub const XXE_CHECK_NAME: &str = "xxe-processing";
const MESSAGE: &str = "Disable access to external entities in XML parsing.";

impl SeCheck for XxeProcessingCheck {
    fn name(&self) -> &'static str {
        XXE_CHECK_NAME
    }

    fn pre_statement(
        &self,
        ctx: &mut CheckerContext<'_>,
        state: &ProgramState,
    ) -> Result<HookOutcome, CheckError> {
        let Statement::Call(call) = ctx.statement() else {
            return Ok(HookOutcome::Unchanged);
        };
        if NEW_INSTANCE.matches(call, ctx.oracle()) {
            // Link the construction result back to this call site so the
            // end-of-path report can recover it from the value alone.
            let site = ctx.node();
            ctx.constraint_manager()
                .set_value_factory(Box::new(move |top| ValueSpec {
                    wraps: top,
                    origin: Some(site),
                }));
            return Ok(HookOutcome::Unchanged);
        }
        if SET_PROPERTY.matches(call, ctx.oracle()) {
            if let Some(feature) = feature_for(call) {
                return Ok(feature.check_arguments(state, call));
            }
        }
        Ok(HookOutcome::Unchanged)
    }

    fn post_statement(
        &self,
        ctx: &mut CheckerContext<'_>,
        state: &ProgramState,
    ) -> Result<HookOutcome, CheckError> {
        let Statement::Call(call) = ctx.statement() else {
            return Ok(HookOutcome::Unchanged);
        };
        if !NEW_INSTANCE.matches(call, ctx.oracle()) {
            return Ok(HookOutcome::Unchanged);
        }
        // Default-insecure policy: the just-pushed factory starts UNSECURED
        // until a matching property call proves otherwise.
        let Some(result) = state.peek(0) else {
            return Ok(HookOutcome::Unchanged);
        };
        match state.add_constraint(result, UNSECURED) {
            Some(next) => Ok(HookOutcome::Transformed(next)),
            None => Ok(HookOutcome::Infeasible),
        }
    }

    fn end_of_path(
        &self,
        ctx: &mut CheckerContext<'_>,
        state: &ProgramState,
    ) -> Result<(), CheckError> {
        for value in state.values_with_constraint(UNSECURED) {
            if let Some(site) = ctx.origin_of(value) {
                ctx.report_issue(XXE_CHECK_NAME, site, MESSAGE);
            }
        }
        Ok(())
    }
}
