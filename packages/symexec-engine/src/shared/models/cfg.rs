//! Routine control-flow graph
//!
//! Minimal representation the engine traverses: statement nodes with
//! successor edges. Nodes with no successors are the routine's exit points.
//! The graph is supplied fully built by an external front end; the engine
//! never mutates it.

use super::statement::Statement;
use serde::{Deserialize, Serialize};

/// CFG node identifier, unique within one routine
pub type NodeId = u32;

/// One statement node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CfgNode {
    /// Node ID
    pub id: NodeId,

    /// Statement payload
    pub statement: Statement,

    /// Successor nodes, in front-end order (branch arms keep source order)
    pub successors: Vec<NodeId>,

    /// Source line, for finding anchors
    pub line: u32,
}

/// Control-flow graph of a single routine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutineCfg {
    /// Routine name (diagnostics and summaries)
    pub name: String,

    /// Nodes indexed by their id
    nodes: Vec<CfgNode>,

    /// Entry node
    pub entry: NodeId,
}

impl RoutineCfg {
    /// Create an empty routine graph; entry is the first node added.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nodes: Vec::new(),
            entry: 0,
        }
    }

    /// Append a node with no successors yet, returning its id.
    pub fn add_node(&mut self, statement: Statement, line: u32) -> NodeId {
        let id = self.nodes.len() as NodeId;
        self.nodes.push(CfgNode {
            id,
            statement,
            successors: Vec::new(),
            line,
        });
        id
    }

    /// Append a node and connect it from the previously added node.
    ///
    /// Convenience for straight-line sequences; branches still need
    /// explicit `add_edge` calls.
    pub fn add_sequential(&mut self, statement: Statement, line: u32) -> NodeId {
        let id = self.add_node(statement, line);
        if id > 0 {
            self.add_edge(id - 1, id);
        }
        id
    }

    /// Add a successor edge.
    pub fn add_edge(&mut self, from: NodeId, to: NodeId) {
        if let Some(node) = self.nodes.get_mut(from as usize) {
            if !node.successors.contains(&to) {
                node.successors.push(to);
            }
        }
    }

    /// Look up a node.
    pub fn node(&self, id: NodeId) -> Option<&CfgNode> {
        self.nodes.get(id as usize)
    }

    /// Successors of a node. Unknown ids have none.
    pub fn successors(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(|n| n.successors.as_slice()).unwrap_or(&[])
    }

    /// A node with no successors ends an execution path.
    pub fn is_terminal(&self, id: NodeId) -> bool {
        self.successors(id).is_empty()
    }

    /// Source line of a node, 0 if unknown.
    pub fn line_of(&self, id: NodeId) -> u32 {
        self.node(id).map(|n| n.line).unwrap_or(0)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}
