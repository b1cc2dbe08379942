//! Property-based tests for program-state semantics

use proptest::prelude::*;
use symexec_engine::{Constraint, ProgramState, SymbolicValue};

const DOMAIN_A: &str = "prop-domain-a";
const DOMAIN_B: &str = "prop-domain-b";

/// A small op language over one state.
#[derive(Debug, Clone)]
enum Op {
    Push(u32),
    Pop,
    Bind(String, u32),
    Attach(u32, bool),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0u32..16).prop_map(Op::Push),
        Just(Op::Pop),
        ("[a-d]", 0u32..16).prop_map(|(name, id)| Op::Bind(name, id)),
        (0u32..16, any::<bool>()).prop_map(|(id, first)| Op::Attach(id, first)),
    ]
}

/// Apply ops, skipping underflowing pops and contradictory attaches.
fn replay(ops: &[Op]) -> ProgramState {
    let mut state = ProgramState::empty();
    for op in ops {
        state = match op {
            Op::Push(id) => state.push(SymbolicValue(*id)),
            Op::Pop => match state.pop(1) {
                Ok((_, next)) => next,
                Err(_) => state,
            },
            Op::Bind(name, id) => state.bind_local(name.clone(), SymbolicValue(*id)),
            Op::Attach(id, first) => {
                let domain = if *first { DOMAIN_A } else { DOMAIN_B };
                let constraint = Constraint::new(domain, "set");
                state
                    .add_constraint(SymbolicValue(*id), constraint)
                    .unwrap_or(state)
            }
        };
    }
    state
}

proptest! {
    /// Identical op sequences produce structurally equal states: the
    /// signature the engine deduplicates on is replay-stable.
    #[test]
    fn replay_is_deterministic(ops in prop::collection::vec(op_strategy(), 0..40)) {
        prop_assert_eq!(replay(&ops), replay(&ops));
    }

    /// Transformations never mutate the source state.
    #[test]
    fn transformations_are_copy_on_write(ops in prop::collection::vec(op_strategy(), 0..20), id in 0u32..16) {
        let state = replay(&ops);
        let snapshot = state.clone();

        let _ = state.push(SymbolicValue(id));
        let _ = state.pop(1);
        let _ = state.bind_local("x", SymbolicValue(id));
        let _ = state.add_constraint(SymbolicValue(id), Constraint::new(DOMAIN_A, "set"));

        prop_assert_eq!(state, snapshot);
    }

    /// push then pop(1) restores the original state and returns the value.
    #[test]
    fn push_pop_roundtrip(ops in prop::collection::vec(op_strategy(), 0..20), id in 0u32..16) {
        let state = replay(&ops);
        let pushed = state.push(SymbolicValue(id));
        let (values, rest) = pushed.pop(1).unwrap();
        prop_assert_eq!(values, vec![SymbolicValue(id)]);
        prop_assert_eq!(rest, state);
    }

    /// peek never changes the state and agrees with pop order.
    #[test]
    fn peek_agrees_with_pop(ops in prop::collection::vec(op_strategy(), 1..30)) {
        let state = replay(&ops);
        let depth = state.stack_depth();
        if depth >= 2 {
            let top = state.peek(0).unwrap();
            let below = state.peek(1).unwrap();
            let (values, _) = state.pop(2).unwrap();
            prop_assert_eq!(values, vec![top, below]);
        }
        prop_assert_eq!(state.stack_depth(), depth);
    }

    /// At most one constraint per domain: a second, different fact in the
    /// same domain is always rejected, never overwritten.
    #[test]
    fn same_domain_never_overwrites(id in 0u32..16) {
        let value = SymbolicValue(id);
        let state = ProgramState::empty()
            .add_constraint(value, Constraint::new(DOMAIN_A, "set"))
            .unwrap();
        prop_assert!(state
            .add_constraint(value, Constraint::new(DOMAIN_A, "other"))
            .is_none());
        prop_assert_eq!(
            state.constraint(value, DOMAIN_A),
            Some(Constraint::new(DOMAIN_A, "set"))
        );
    }
}
