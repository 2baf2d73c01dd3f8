//! Text rendering of annotated graphs.
//!
//! Produces the one-node-per-line dump used by `--dump-cfg` and by tests
//! that eyeball a whole graph at once. The walk follows control flow from
//! the entry node so the dump reads roughly in execution order; nodes
//! reachable twice print a short back-reference instead of recursing.

use fixedbitset::FixedBitSet;

use crate::cfg::types::{CfgGraph, NodeId, NodeKind};
use crate::intern::Interner;
use crate::operand::OperandSet;

/// Render `graph` as indented text, resolving syms through `names`.
pub fn render_graph(graph: &CfgGraph, names: &Interner) -> String {
    let mut out = String::new();
    if graph.is_empty() {
        return out;
    }
    let mut seen = FixedBitSet::with_capacity(graph.len());
    render_from(graph, names, graph.entry, &mut seen, &mut out);
    out
}

fn render_from(
    graph: &CfgGraph,
    names: &Interner,
    id: NodeId,
    seen: &mut FixedBitSet,
    out: &mut String,
) {
    if seen.contains(id.0) {
        out.push_str(&format!("[{id}] (seen)\n"));
        return;
    }
    seen.insert(id.0);

    let node = graph.node(id);
    out.push_str(&format!("[{id}][{:<12}]", node.info));
    push_set(out, "DEF", &node.defs, names);
    push_set(out, "USE", &node.uses, names);
    push_set(out, "IN", &node.in_set, names);
    push_set(out, "OUT", &node.out_set, names);
    out.push('\n');

    match node.kind {
        NodeKind::If => {
            if let Some(target) = node.branch_true {
                render_from(graph, names, target, seen, out);
            }
            if let Some(target) = node.branch_false {
                render_from(graph, names, target, seen, out);
            }
        }
        NodeKind::Switch => {
            if let Some(target) = node.succ {
                render_from(graph, names, target, seen, out);
            }
            for &target in &node.cases {
                render_from(graph, names, target, seen, out);
            }
        }
        _ => {
            if let Some(target) = node.succ {
                render_from(graph, names, target, seen, out);
            }
        }
    }
}

fn push_set(out: &mut String, tag: &str, set: &OperandSet, names: &Interner) {
    if set.is_empty() {
        return;
    }
    out.push_str(&format!("[{tag}:"));
    for (i, sym) in set.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        out.push_str(names.resolve(sym));
    }
    out.push(']');
}
