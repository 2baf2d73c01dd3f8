//! Findings extraction and report formatting.
//!
//! After the fixpoint, every binding scope's OUT set lists the names
//! some path may read before writing. The names that belong to the
//! scope's own declarations are the findings: locals whose declaration
//! is reachable by a read before any initialization.

use serde::{Deserialize, Serialize};

use crate::cfg::types::CfgGraph;
use crate::intern::Interner;

/// One variable that may be read before it is initialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    /// Hierarchical id of the scope declaring the variable.
    pub scope_id: String,
    /// Position of the declaration within that scope.
    pub decl_index: usize,
    /// The declared (source-level) name.
    pub name: String,
}

/// Scan every binding scope of an analyzed graph for findings.
///
/// A name in a scope's OUT set counts when the scope itself still
/// carries it (IN) or reads it (USE), and it resolves to one of the
/// scope's own declarations under the scope's renaming. Findings come
/// back ordered by scope id, then declaration order.
pub fn collect_findings(graph: &CfgGraph, names: &Interner) -> Vec<Finding> {
    let mut findings = Vec::new();
    for (_, node) in graph.binds() {
        for sym in node.out_set.iter() {
            if !node.in_set.contains(sym) && !node.uses.contains(sym) {
                continue;
            }
            for (index, decl) in node.decls.iter().enumerate() {
                let candidate = format!("{}{}-{}", decl, node.scope_id, index);
                if names.lookup(&candidate) == Some(sym) {
                    findings.push(Finding {
                        scope_id: node.scope_id.clone(),
                        decl_index: index,
                        name: decl.clone(),
                    });
                    break;
                }
            }
        }
    }
    findings.sort_by(|a, b| {
        a.scope_id
            .cmp(&b.scope_id)
            .then(a.decl_index.cmp(&b.decl_index))
    });
    findings
}

/// The classic one-line report, `name:var1,var2`. `None` when clean.
pub fn report_line(function_name: &str, findings: &[Finding]) -> Option<String> {
    if findings.is_empty() {
        return None;
    }
    let mut line = format!("{function_name}:");
    for (i, finding) in findings.iter().enumerate() {
        if i > 0 {
            line.push(',');
        }
        line.push_str(&finding.name);
    }
    Some(line)
}
