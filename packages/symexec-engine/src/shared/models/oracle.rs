//! Opaque type oracle
//!
//! Name/type resolution happens in the front end; during exploration the
//! engine and the checks only need subtype queries against already-resolved
//! type names. The oracle must be `Sync` because distinct routines may be
//! explored by parallel workers sharing one oracle.

use rustc_hash::FxHashMap;

/// Subtype queries over fully qualified type names.
pub trait TypeOracle: Sync {
    /// True if `ty` is `ancestor` or a subtype of it. Reflexive.
    fn is_subtype_of(&self, ty: &str, ancestor: &str) -> bool;
}

/// Oracle that knows no hierarchy: subtype iff the names are equal.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExactTypeOracle;

impl TypeOracle for ExactTypeOracle {
    fn is_subtype_of(&self, ty: &str, ancestor: &str) -> bool {
        ty == ancestor
    }
}

/// Map-backed oracle over declared direct supertypes.
#[derive(Debug, Clone, Default)]
pub struct NominalTypeOracle {
    supertypes: FxHashMap<String, Vec<String>>,
}

impl NominalTypeOracle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare `ty` a direct subtype of `ancestor`.
    pub fn declare_subtype(&mut self, ty: impl Into<String>, ancestor: impl Into<String>) {
        self.supertypes
            .entry(ty.into())
            .or_default()
            .push(ancestor.into());
    }
}

impl TypeOracle for NominalTypeOracle {
    fn is_subtype_of(&self, ty: &str, ancestor: &str) -> bool {
        if ty == ancestor {
            return true;
        }
        let mut pending = vec![ty];
        let mut seen: Vec<&str> = Vec::new();
        while let Some(current) = pending.pop() {
            if seen.contains(&current) {
                continue;
            }
            seen.push(current);
            if let Some(parents) = self.supertypes.get(current) {
                for parent in parents {
                    if parent == ancestor {
                        return true;
                    }
                    pending.push(parent);
                }
            }
        }
        false
    }
}
