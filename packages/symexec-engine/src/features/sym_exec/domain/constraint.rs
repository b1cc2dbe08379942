//! Constraints: typed facts attachable to symbolic values
//!
//! Each check defines its own constraint domain (a small finite tag set) and
//! attaches facts in that domain only. Domains namespace the facts so
//! independent checks never collide inside one program state.
//!
//! A state holds at most one constraint per domain per value. Attaching the
//! same constraint again is a no-op refinement; attaching a different
//! constraint from the same domain is a contradiction, which makes the state
//! infeasible and prunes the path.

use serde::Serialize;

/// Namespace key of a constraint domain.
pub type DomainKey = &'static str;

/// A typed fact in one domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Constraint {
    /// Defining domain (one per check or intrinsic fact family)
    pub domain: DomainKey,

    /// Tag within the domain's finite enumeration
    pub tag: &'static str,
}

impl Constraint {
    pub const fn new(domain: DomainKey, tag: &'static str) -> Self {
        Self { domain, tag }
    }

    /// Whether attaching `other` on top of `self` is a refinement.
    /// Domains are flat enumerations, so only the identical fact refines.
    pub fn is_compatible_with(&self, other: &Constraint) -> bool {
        debug_assert_eq!(self.domain, other.domain);
        self.tag == other.tag
    }
}

impl std::fmt::Display for Constraint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.domain, self.tag)
    }
}

/// Intrinsic domain for boolean literals: a value pushed for a `true` or
/// `false` literal carries the matching fact.
pub const BOOL_LITERAL_DOMAIN: DomainKey = "bool-literal";

pub const BOOL_TRUE: Constraint = Constraint::new(BOOL_LITERAL_DOMAIN, "true");
pub const BOOL_FALSE: Constraint = Constraint::new(BOOL_LITERAL_DOMAIN, "false");

/// Boolean-literal constraint for a concrete literal value.
pub fn bool_literal(value: bool) -> Constraint {
    if value {
        BOOL_TRUE
    } else {
        BOOL_FALSE
    }
}
