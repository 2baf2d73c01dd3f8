//! coldread - finds variables that may be read before initialization.
//!
//! The pipeline has three stages. Lowering walks a function's typed
//! syntax tree and builds a control-flow graph whose nodes carry def and
//! use sets, with every declared variable renamed after the binding scope
//! that owns it. A backward may-analysis then propagates demanded names
//! until a fixpoint: a name in a node's OUT set means some path from that
//! node reads the name before writing it. Finally, reporting scans each
//! binding scope for its own declarations among the dangerous names.
//!
//! # Example
//!
//! ```
//! use coldread::analyze_function;
//! use coldread::ast::{Expr, FunctionDef};
//!
//! // int f() { int x, y; y = x; return y; }
//! let body = Expr::bind(
//!     &["x", "y"],
//!     Expr::stmts(vec![
//!         Expr::decl("y", Some(Expr::name("x"))),
//!         Expr::ret(Some(Expr::name("y"))),
//!     ]),
//! );
//! let func = FunctionDef { name: "f".to_string(), body };
//!
//! let analysis = analyze_function(&func).unwrap();
//! assert_eq!(analysis.report_line(), Some("f:x".to_string()));
//! ```

pub mod ast;
pub mod cfg;
pub mod dataflow;
pub mod error;
pub mod intern;
pub mod operand;
pub mod report;

use serde_json::json;
use tracing::debug;

use crate::ast::{FunctionDef, Unit};
use crate::cfg::{CfgBuilder, CfgGraph, LoweredFunction};
use crate::intern::Interner;

// =============================================================================
// Re-exports
// =============================================================================

pub use crate::dataflow::AnalysisMetrics;
pub use crate::error::{ColdreadError, Result};
pub use crate::report::Finding;

/// Full analysis result for one function.
#[derive(Debug)]
pub struct FunctionAnalysis {
    /// Source-level function name.
    pub function_name: String,
    /// May-read-before-init variables, ordered by scope then declaration.
    pub findings: Vec<Finding>,
    /// Counters from lowering and the fixpoint.
    pub metrics: AnalysisMetrics,
    /// The annotated graph, with final IN/OUT sets.
    pub graph: CfgGraph,
    /// Interner resolving every name the graph tracks.
    pub names: Interner,
}

impl FunctionAnalysis {
    /// The classic one-line report, `name:var1,var2`. `None` when clean.
    pub fn report_line(&self) -> Option<String> {
        report::report_line(&self.function_name, &self.findings)
    }

    /// Text dump of the annotated graph.
    pub fn render_cfg(&self) -> String {
        cfg::render_graph(&self.graph, &self.names)
    }

    /// JSON object with the findings and metrics (the graph is omitted).
    pub fn to_json(&self) -> serde_json::Value {
        json!({
            "function": self.function_name,
            "findings": self.findings,
            "metrics": self.metrics,
        })
    }
}

/// Results for a whole translation unit, in source order.
#[derive(Debug)]
pub struct UnitReport {
    pub functions: Vec<FunctionAnalysis>,
}

impl UnitReport {
    /// Report lines of the functions with findings, in source order.
    pub fn lines(&self) -> impl Iterator<Item = String> + '_ {
        self.functions
            .iter()
            .filter_map(FunctionAnalysis::report_line)
    }

    /// JSON array of every function's result, findings or not.
    pub fn to_json(&self) -> serde_json::Value {
        json!({
            "functions": self
                .functions
                .iter()
                .map(FunctionAnalysis::to_json)
                .collect::<Vec<_>>(),
        })
    }
}

/// Analyze a single function: lower, run the fixpoint, collect findings.
///
/// # Errors
///
/// Fails when lowering rejects the tree; see
/// [`cfg::CfgBuilder::lower_function`].
pub fn analyze_function(func: &FunctionDef) -> Result<FunctionAnalysis> {
    let LoweredFunction {
        mut graph,
        names,
        unresolved_gotos,
    } = CfgBuilder::lower_function(func)?;

    let mut metrics = dataflow::compute(&mut graph);
    metrics.unresolved_gotos = unresolved_gotos;

    let findings = report::collect_findings(&graph, &names);
    debug!(
        function = %func.name,
        findings = findings.len(),
        "analysis finished"
    );

    Ok(FunctionAnalysis {
        function_name: func.name.clone(),
        findings,
        metrics,
        graph,
        names,
    })
}

/// Analyze every function of a unit, stopping at the first hard error.
pub fn analyze_unit(unit: &Unit) -> Result<UnitReport> {
    let mut functions = Vec::with_capacity(unit.functions.len());
    for func in &unit.functions {
        functions.push(analyze_function(func)?);
    }
    Ok(UnitReport { functions })
}
