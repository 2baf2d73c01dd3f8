//! May-use-before-init propagation - backward data flow analysis.
//!
//! A name is dangerous at a program point if some path from that point
//! reaches a read of the name before any write to it. The analysis flows
//! backward from reads toward the entry, unioning over paths.
//!
//! # Data Flow Equations
//!
//! - `DEF[N]` = names written at node N
//! - `USE[N]` = names read at node N
//! - `OUT[N]` = UNION(USE[S] UNION IN[S]) for all successors S of N
//! - `IN[N]`  = OUT[N] minus anything in DEF[N] or USE[N]
//!
//! Subtracting USE as well as DEF is what makes the result a
//! read-before-init witness rather than plain liveness: a node that
//! reads a name already reports it itself, so the danger does not
//! propagate past the read.
//!
//! Iteration sweeps every node in arena order until a full sweep adds
//! nothing. Sets only grow, so the fixpoint exists and is reached in at
//! most `names * nodes` additions.

use std::time::Instant;

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cfg::types::{CfgGraph, CfgNode, NodeId, NodeKind};
use crate::intern::Sym;

/// Counters describing one analysis run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisMetrics {
    /// Nodes in the graph, including the synthetic entry.
    pub nodes: usize,
    /// Full sweeps executed, counting the final sweep that added nothing.
    pub passes: usize,
    /// Distinct names appearing in any def or use set.
    pub names_tracked: usize,
    /// Gotos lowered without a matching label.
    pub unresolved_gotos: usize,
    /// Wall-clock time of the fixpoint loop, in microseconds.
    pub analysis_time_us: u64,
}

/// Run the backward propagation to its fixpoint, filling the per-node
/// IN and OUT sets in place.
pub fn compute(graph: &mut CfgGraph) -> AnalysisMetrics {
    let start = Instant::now();
    let mut passes = 0;
    let mut candidates: Vec<Sym> = Vec::new();

    loop {
        passes += 1;
        let mut changed = false;

        for index in 0..graph.len() {
            let id = NodeId(index);
            candidates.clear();
            gather_from_successors(graph, id, &mut candidates);

            if !candidates.is_empty() {
                changed = true;
                absorb(graph.node_mut(id), &candidates);
            }
        }

        if !changed {
            break;
        }
    }

    let mut tracked: FxHashSet<Sym> = FxHashSet::default();
    for (_, node) in graph.iter() {
        tracked.extend(node.defs.iter());
        tracked.extend(node.uses.iter());
    }

    let metrics = AnalysisMetrics {
        nodes: graph.len(),
        passes,
        names_tracked: tracked.len(),
        unresolved_gotos: 0,
        analysis_time_us: start.elapsed().as_micros() as u64,
    };
    debug!(
        function = %graph.function_name,
        nodes = metrics.nodes,
        passes = metrics.passes,
        "dataflow fixpoint converged"
    );
    metrics
}

/// Collect what `id`'s successors demand and `id` does not yet carry.
///
/// Which edges count as successors depends on the node kind: a
/// conditional contributes both branches, a switch its case fan-out
/// unless a binding scope absorbed it, a scope its absorbed fan-out
/// when present, everything else the straight successor.
fn gather_from_successors(graph: &CfgGraph, id: NodeId, candidates: &mut Vec<Sym>) {
    let node = graph.node(id);
    match node.kind {
        NodeKind::If => {
            if let Some(target) = node.branch_true {
                gather(graph, id, target, candidates);
            }
            if let Some(target) = node.branch_false {
                gather(graph, id, target, candidates);
            }
        }
        NodeKind::Switch => match node.succ {
            Some(succ) if graph.node(succ).kind == NodeKind::Bind => {
                gather(graph, id, succ, candidates);
            }
            _ => {
                for &target in &node.cases {
                    gather(graph, id, target, candidates);
                }
            }
        },
        NodeKind::Bind => {
            if node.cases.is_empty() {
                if let Some(target) = node.succ {
                    gather(graph, id, target, candidates);
                }
            } else {
                for &target in &node.cases {
                    gather(graph, id, target, candidates);
                }
            }
        }
        NodeKind::Normal | NodeKind::Label | NodeKind::Goto => {
            if let Some(target) = node.succ {
                gather(graph, id, target, candidates);
            }
        }
    }
}

/// One successor's contribution: USE(succ) then IN(succ), skipping names
/// already gathered this step or already in OUT(cur).
fn gather(graph: &CfgGraph, cur: NodeId, succ: NodeId, candidates: &mut Vec<Sym>) {
    let out_set = &graph.node(cur).out_set;
    let succ_node = graph.node(succ);
    for sym in succ_node.uses.iter().chain(succ_node.in_set.iter()) {
        if !candidates.contains(&sym) && !out_set.contains(sym) {
            candidates.push(sym);
        }
    }
}

/// Fold gathered names into a node: all of them join OUT, and the ones
/// the node neither writes nor reads nor already carries join IN.
fn absorb(node: &mut CfgNode, candidates: &[Sym]) {
    for &sym in candidates {
        node.out_set.insert(sym);
        if !node.defs.contains(sym) && !node.uses.contains(sym) && !node.in_set.contains(sym) {
            node.in_set.insert(sym);
        }
    }
}
