//! Statement payloads attached to CFG nodes
//!
//! The front end lowers each routine into a graph of statement nodes. A node
//! exposes exactly the structure hook pattern-matching needs: the resolved
//! call target, the argument list, and constant-foldable literals. Building
//! this representation from source text is the front end's job, not ours.

use serde::{Deserialize, Serialize};

/// Constant-folded literal value, as resolved by the front end.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Literal {
    Bool(bool),
    Str(String),
    Int(i64),
}

impl Literal {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Literal::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Literal::Str(s) => Some(s),
            _ => None,
        }
    }
}

/// One argument position at a call site.
///
/// `constant` is present when the front end could fold the argument
/// expression down to a literal (e.g. a `static final` field read).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Argument {
    pub constant: Option<Literal>,
}

impl Argument {
    pub fn unknown() -> Self {
        Self::default()
    }

    pub fn constant(value: Literal) -> Self {
        Self {
            constant: Some(value),
        }
    }
}

/// Call-site structure as resolved by the front end's symbol oracle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CallSite {
    /// Fully qualified type the resolved method is invoked on
    pub declaring_type: String,

    /// Method name
    pub method_name: String,

    /// Fully qualified parameter types of the resolved overload
    pub parameter_types: Vec<String>,

    /// Argument positions, in source order
    pub arguments: Vec<Argument>,

    /// Instance calls evaluate a receiver onto the stack below the arguments
    pub has_receiver: bool,

    /// Whether the call pushes a result value
    pub returns_value: bool,
}

impl CallSite {
    /// Constant-folded literal for argument `index`, if the front end has one.
    pub fn arg_constant(&self, index: usize) -> Option<&Literal> {
        self.arguments.get(index).and_then(|a| a.constant.as_ref())
    }

    /// Number of argument values the call consumes from the stack
    /// (receiver excluded).
    pub fn arity(&self) -> usize {
        self.arguments.len()
    }

    /// Total stack slots consumed: arguments plus the receiver, if any.
    pub fn consumed_slots(&self) -> usize {
        self.arity() + usize::from(self.has_receiver)
    }
}

/// Statement payload of one CFG node.
///
/// Each kind has a fixed intrinsic stack effect, applied by the engine
/// between the pre-statement and post-statement hooks.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Statement {
    /// Evaluate a constant sub-expression: pushes a fresh value.
    Literal(Literal),

    /// Read a local variable: pushes the bound value (fresh if unbound).
    ReadLocal(String),

    /// Store the top of stack into a local binding.
    WriteLocal(String),

    /// Invoke a resolved method; receiver and arguments were evaluated onto
    /// the stack by preceding nodes.
    Call(CallSite),

    /// Branch on the condition at the top of the stack; pops it.
    /// Successor edges are the arms.
    Branch,

    /// Leave the routine, popping the returned value if there is one.
    Return { has_value: bool },

    /// No stack effect (entry markers, join points).
    Nop,
}
