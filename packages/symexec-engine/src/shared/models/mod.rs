//! Shared data models: routine CFG, statement payloads, type oracle

pub mod cfg;
pub mod oracle;
pub mod statement;

pub use cfg::{CfgNode, NodeId, RoutineCfg};
pub use oracle::{ExactTypeOracle, NominalTypeOracle, TypeOracle};
pub use statement::{Argument, CallSite, Literal, Statement};
