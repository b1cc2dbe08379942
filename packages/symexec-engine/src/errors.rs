//! Error types for symexec-engine
//!
//! Provides unified error handling across the crate.

use crate::shared::models::NodeId;
use thiserror::Error;

/// Main error type for engine operations
///
/// Errors here are internal contract violations (front-end/engine mismatch),
/// never defects in the analyzed code. Defects in analyzed code surface as
/// findings, not errors.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Statement-effect logic popped more values than the stack holds.
    /// Aborts the routine's analysis; the CFG encoding is malformed.
    #[error("evaluation stack underflow: needed {needed} values, stack depth {depth}")]
    StackUnderflow { needed: usize, depth: usize },

    /// A CFG edge points at a node id the routine does not contain.
    #[error("unknown CFG node {0}")]
    UnknownNode(NodeId),

    /// Catch-all internal error
    #[error("internal error: {0}")]
    Internal(String),
}

impl EngineError {
    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        EngineError::Internal(msg.into())
    }
}

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;
