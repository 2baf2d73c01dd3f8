//! CFG node and graph definitions.

use std::fmt;

use crate::ast::LabelId;
use crate::operand::OperandSet;

/// Maximum case targets a single switch may fan out to.
pub const MAX_CASE_TARGETS: usize = 256;

/// Maximum labels registered (or gotos parked) in one function.
pub const MAX_LABELS: usize = 256;

/// Index of a node within its function's [`CfgGraph`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// Control-flow role of a node.
///
/// The kind decides which outgoing edges the dataflow engine follows:
/// `If` uses its two branch edges, `Switch` its case fan-out (unless a
/// binding scope absorbed it), `Bind` an absorbed fan-out when present,
/// and everything else the straight successor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Straight-line statement node.
    Normal,
    /// Conditional head with true/false edges.
    If,
    /// Switch head owning a case fan-out table.
    Switch,
    /// Binding scope head; carries declarations and a scope id.
    Bind,
    /// Jump target.
    Label,
    /// Unconditional jump; its successor is the jump destination.
    Goto,
}

/// One control point of a lowered function.
#[derive(Debug, Clone)]
pub struct CfgNode {
    pub kind: NodeKind,
    /// Short human-readable tag shown by graph renderings.
    pub info: String,

    /// Names written at this node.
    pub defs: OperandSet,
    /// Names read at this node.
    pub uses: OperandSet,
    /// Names live into this node from below, minus what it settles itself.
    pub in_set: OperandSet,
    /// Names some successor may read before defining.
    pub out_set: OperandSet,

    /// Straight-line successor.
    pub succ: Option<NodeId>,
    /// Successor when an `If` condition holds.
    pub branch_true: Option<NodeId>,
    /// Successor when an `If` condition fails.
    pub branch_false: Option<NodeId>,
    /// Case fan-out of a `Switch`, or of a `Bind` that absorbed one.
    pub cases: Vec<NodeId>,

    /// Hierarchical scope identifier (`Bind` only, empty otherwise).
    pub scope_id: String,
    /// Enclosing `Bind`, for scope-chain walks.
    pub parent_scope: Option<NodeId>,
    /// Ordinal handed to the next child scope.
    pub child_count: u32,
    /// Names this scope declares, in declaration order (`Bind` only).
    pub decls: Vec<String>,

    /// A label's own id, or a goto's destination id.
    pub label_id: Option<LabelId>,
}

impl CfgNode {
    fn new(kind: NodeKind, info: String) -> Self {
        CfgNode {
            kind,
            info,
            defs: OperandSet::new(),
            uses: OperandSet::new(),
            in_set: OperandSet::new(),
            out_set: OperandSet::new(),
            succ: None,
            branch_true: None,
            branch_false: None,
            cases: Vec::new(),
            scope_id: String::new(),
            parent_scope: None,
            child_count: 0,
            decls: Vec::new(),
            label_id: None,
        }
    }
}

/// Arena-owned control-flow graph of one function.
///
/// Nodes are appended during lowering and addressed by [`NodeId`]; edges
/// are ids, so the graph is freely cloneable and never self-referential.
#[derive(Debug, Clone)]
pub struct CfgGraph {
    /// Source-level name of the lowered function.
    pub function_name: String,
    /// Index of the synthetic entry node.
    pub entry: NodeId,
    nodes: Vec<CfgNode>,
}

impl CfgGraph {
    pub fn new(function_name: impl Into<String>) -> Self {
        CfgGraph {
            function_name: function_name.into(),
            entry: NodeId(0),
            nodes: Vec::new(),
        }
    }

    /// Append a fresh node and return its id.
    pub fn add_node(&mut self, kind: NodeKind, info: impl Into<String>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(CfgNode::new(kind, info.into()));
        id
    }

    pub fn node(&self, id: NodeId) -> &CfgNode {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut CfgNode {
        &mut self.nodes[id.0]
    }

    /// Node count, including the synthetic entry.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All nodes in arena order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &CfgNode)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(index, node)| (NodeId(index), node))
    }

    /// The binding-scope nodes, in arena order.
    pub fn binds(&self) -> impl Iterator<Item = (NodeId, &CfgNode)> {
        self.iter().filter(|(_, node)| node.kind == NodeKind::Bind)
    }
}
