//! Intrinsic symbolic effect of each statement kind
//!
//! Applied between the pre-statement and post-statement hooks: sub-expression
//! evaluation pushed operands onto the stack in earlier nodes, so each kind
//! pops what it consumes and pushes what it produces. Call results go through
//! the constraint manager so a check-registered value factory can link the
//! fresh value back to its call site.
//!
//! Underflow here is a front-end/engine mismatch and aborts the routine.

use crate::errors::Result;
use crate::features::sym_exec::domain::{bool_literal, ProgramState};
use crate::features::sym_exec::infrastructure::ConstraintManager;
use crate::shared::models::{CfgNode, Literal, Statement};

/// Apply a node's intrinsic stack effect.
///
/// `None` means the effect derived a contradiction and the path is pruned
/// (cannot currently happen for fresh-value constraints, kept for the same
/// pruning contract the hooks use).
pub fn apply(
    state: &ProgramState,
    node: &CfgNode,
    manager: &mut ConstraintManager,
) -> Result<Option<ProgramState>> {
    let next = match &node.statement {
        Statement::Nop => state.clone(),

        Statement::Literal(literal) => {
            let value = manager.create_value(state.peek(0));
            let pushed = state.push(value);
            match literal {
                Literal::Bool(b) => match pushed.add_constraint(value, bool_literal(*b)) {
                    Some(constrained) => constrained,
                    None => return Ok(None),
                },
                _ => pushed,
            }
        }

        Statement::ReadLocal(name) => match state.local(name) {
            Some(value) => state.push(value),
            // Unbound read: allocate an unknown and bind it so later reads
            // of the same local see the same identity.
            None => {
                let value = manager.create_value(state.peek(0));
                state.push(value).bind_local(name.clone(), value)
            }
        },

        Statement::WriteLocal(name) => {
            let (values, rest) = state.pop(1)?;
            rest.bind_local(name.clone(), values[0])
        }

        Statement::Call(call) => {
            // The factory (if a pre-statement hook registered one) receives
            // the top of stack as it stood when the hook observed it.
            let observed_top = state.peek(0);
            let (_consumed, rest) = state.pop(call.consumed_slots())?;
            if call.returns_value {
                let result = manager.create_value(observed_top);
                rest.push(result)
            } else {
                rest
            }
        }

        Statement::Branch => {
            let (_condition, rest) = state.pop(1)?;
            rest
        }

        Statement::Return { has_value } => {
            if *has_value {
                let (_returned, rest) = state.pop(1)?;
                rest
            } else {
                state.clone()
            }
        }
    };
    Ok(Some(next))
}
