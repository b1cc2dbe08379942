//! Data-driven call-site matchers
//!
//! Plain configuration values describing which resolved calls a check cares
//! about: declaring-type criteria, method name, parameter-type sequence.
//! Evaluated against the front end's call-site structure plus the opaque
//! type oracle; no reflection, no per-matcher behavior.

use crate::shared::models::{CallSite, TypeOracle};

/// Criteria on the declaring type of the resolved method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeCriteria {
    /// Exactly this fully qualified type
    Is(&'static str),
    /// This type or any subtype, per the oracle
    SubtypeOf(&'static str),
    /// Any type
    Any,
}

impl TypeCriteria {
    fn matches(&self, declaring_type: &str, oracle: &dyn TypeOracle) -> bool {
        match self {
            TypeCriteria::Is(expected) => declaring_type == *expected,
            TypeCriteria::SubtypeOf(ancestor) => oracle.is_subtype_of(declaring_type, ancestor),
            TypeCriteria::Any => true,
        }
    }
}

/// Criteria on the resolved overload's parameter types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterCriteria {
    /// Any signature
    Any,
    /// Exactly these fully qualified parameter types, in order
    Exact(&'static [&'static str]),
}

impl ParameterCriteria {
    fn matches(&self, parameter_types: &[String]) -> bool {
        match self {
            ParameterCriteria::Any => true,
            ParameterCriteria::Exact(expected) => {
                parameter_types.len() == expected.len()
                    && parameter_types
                        .iter()
                        .zip(expected.iter())
                        .all(|(actual, wanted)| actual == wanted)
            }
        }
    }
}

/// Matcher for one method signature family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MethodMatcher {
    pub type_criteria: TypeCriteria,
    pub name: &'static str,
    pub parameters: ParameterCriteria,
}

impl MethodMatcher {
    pub const fn new(
        type_criteria: TypeCriteria,
        name: &'static str,
        parameters: ParameterCriteria,
    ) -> Self {
        Self {
            type_criteria,
            name,
            parameters,
        }
    }

    /// Whether this matcher accepts the resolved call site.
    pub fn matches(&self, call: &CallSite, oracle: &dyn TypeOracle) -> bool {
        call.method_name == self.name
            && self.type_criteria.matches(&call.declaring_type, oracle)
            && self.parameters.matches(&call.parameter_types)
    }
}
