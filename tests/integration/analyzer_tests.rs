//! End-to-end analyzer tests.
//!
//! Each test builds a function body the way a C frontend would emit it,
//! runs the full pipeline and checks the findings line.

use coldread::ast::{Expr, FunctionDef, LabelId, Ty, Unit};
use coldread::{analyze_function, analyze_unit, FunctionAnalysis};

fn analyze(name: &str, body: Expr) -> FunctionAnalysis {
    analyze_function(&FunctionDef {
        name: name.to_string(),
        body,
    })
    .expect("analysis should succeed")
}

fn report(name: &str, body: Expr) -> Option<String> {
    analyze(name, body).report_line()
}

fn if_stmt(cond: Expr, then_branch: Option<Expr>, else_branch: Option<Expr>) -> Expr {
    Expr::Cond {
        ty: Ty::Void,
        cond: Box::new(cond),
        then_branch: then_branch.map(Box::new),
        else_branch: else_branch.map(Box::new),
    }
}

// =============================================================================
// Straight-line code
// =============================================================================

#[test]
fn test_use_before_init_reported() {
    // int f() { int x, y; y = x; return y; }
    let body = Expr::bind(
        &["x", "y"],
        Expr::stmts(vec![
            Expr::decl("y", Some(Expr::name("x"))),
            Expr::ret(Some(Expr::name("y"))),
        ]),
    );
    assert_eq!(report("f", body), Some("f:x".to_string()));
}

#[test]
fn test_initialized_before_use_is_clean() {
    // int g() { int x; x = 1; return x; }
    let body = Expr::bind(
        &["x"],
        Expr::stmts(vec![
            Expr::assign(Expr::name("x"), Expr::int(1)),
            Expr::ret(Some(Expr::name("x"))),
        ]),
    );
    assert_eq!(report("g", body), None);
}

#[test]
fn test_empty_body_is_clean() {
    assert_eq!(report("empty", Expr::stmts(vec![])), None);
}

#[test]
fn test_parameters_are_never_reported() {
    // Parameters are not declared by any scope, so reads of them are fine.
    let body = Expr::bind(&[], Expr::stmts(vec![Expr::ret(Some(Expr::name("p")))]));
    assert_eq!(report("id", body), None);
}

#[test]
fn test_findings_follow_declaration_order() {
    // Uses arrive b first, a second; the report still lists a,b.
    let body = Expr::bind(
        &["a", "b"],
        Expr::stmts(vec![
            Expr::call("printf", vec![Expr::name("b")]),
            Expr::call("printf", vec![Expr::name("a")]),
        ]),
    );
    assert_eq!(report("f", body), Some("f:a,b".to_string()));
}

// =============================================================================
// Branches
// =============================================================================

#[test]
fn test_branch_may_skip_initialization() {
    // int f(int p) { int x; if (p) x = 1; return x; }
    let body = Expr::bind(
        &["x"],
        Expr::stmts(vec![
            if_stmt(
                Expr::name("p"),
                Some(Expr::assign(Expr::name("x"), Expr::int(1))),
                None,
            ),
            Expr::ret(Some(Expr::name("x"))),
        ]),
    );
    assert_eq!(report("f", body), Some("f:x".to_string()));
}

#[test]
fn test_initialization_on_both_branches_is_clean() {
    // int f(int p) { int x; if (p) x = 1; else x = 2; return x; }
    let body = Expr::bind(
        &["x"],
        Expr::stmts(vec![
            if_stmt(
                Expr::name("p"),
                Some(Expr::assign(Expr::name("x"), Expr::int(1))),
                Some(Expr::assign(Expr::name("x"), Expr::int(2))),
            ),
            Expr::ret(Some(Expr::name("x"))),
        ]),
    );
    assert_eq!(report("f", body), None);
}

#[test]
fn test_branch_redefinition_after_init_is_clean() {
    // int g(int p) { int a = 1; if (p) a = 2; return a; }
    let body = Expr::bind(
        &["a"],
        Expr::stmts(vec![
            Expr::decl("a", Some(Expr::int(1))),
            if_stmt(
                Expr::name("p"),
                Some(Expr::assign(Expr::name("a"), Expr::int(2))),
                None,
            ),
            Expr::ret(Some(Expr::name("a"))),
        ]),
    );
    assert_eq!(report("g", body), None);
}

#[test]
fn test_value_conditional_reads_every_part() {
    // y = p ? a : x;  with x local and uninitialized
    let body = Expr::bind(
        &["x"],
        Expr::stmts(vec![Expr::assign(
            Expr::name("y"),
            Expr::Cond {
                ty: Ty::Value,
                cond: Box::new(Expr::name("p")),
                then_branch: Some(Box::new(Expr::name("a"))),
                else_branch: Some(Box::new(Expr::name("x"))),
            },
        )]),
    );
    assert_eq!(report("f", body), Some("f:x".to_string()));
}

// =============================================================================
// Scopes
// =============================================================================

#[test]
fn test_shadowed_inner_variable_reported_alone() {
    // { int v; v = 1; { int v; printf(v); } }
    let body = Expr::bind(
        &["v"],
        Expr::stmts(vec![
            Expr::assign(Expr::name("v"), Expr::int(1)),
            Expr::bind(
                &["v"],
                Expr::stmts(vec![Expr::call("printf", vec![Expr::name("v")])]),
            ),
        ]),
    );
    let analysis = analyze("shadow", body);
    assert_eq!(analysis.report_line(), Some("shadow:v".to_string()));
    assert_eq!(analysis.findings.len(), 1, "only the inner v is uninitialized");
    assert_eq!(
        analysis.findings[0].scope_id, "#0#0",
        "the finding belongs to the inner scope"
    );
}

#[test]
fn test_inner_use_of_outer_variable_reports_the_outer_scope() {
    // { int x; { printf(x); } }
    let body = Expr::bind(
        &["x"],
        Expr::stmts(vec![Expr::bind(
            &[],
            Expr::stmts(vec![Expr::call("printf", vec![Expr::name("x")])]),
        )]),
    );
    let analysis = analyze("outer", body);
    assert_eq!(analysis.report_line(), Some("outer:x".to_string()));
    assert_eq!(analysis.findings[0].scope_id, "#0");
}

// =============================================================================
// Calls
// =============================================================================

#[test]
fn test_scanf_counts_as_initialization() {
    // { int x; scanf(&x); return x; }
    let body = Expr::bind(
        &["x"],
        Expr::stmts(vec![
            Expr::call("scanf", vec![Expr::AddrOf(Box::new(Expr::name("x")))]),
            Expr::ret(Some(Expr::name("x"))),
        ]),
    );
    assert_eq!(report("f", body), None);
}

#[test]
fn test_ordinary_call_does_not_initialize() {
    // { int x; printf(&x); return x; }
    let body = Expr::bind(
        &["x"],
        Expr::stmts(vec![
            Expr::call("printf", vec![Expr::AddrOf(Box::new(Expr::name("x")))]),
            Expr::ret(Some(Expr::name("x"))),
        ]),
    );
    assert_eq!(report("f", body), Some("f:x".to_string()));
}

// =============================================================================
// Gotos and loops
// =============================================================================

#[test]
fn test_goto_loop_terminates_and_reports_first_iteration_read() {
    // { int x, y; L1: y = x; x = 1; goto L1; }
    // The first pass through the loop reads x before any write.
    let body = Expr::bind(
        &["x", "y"],
        Expr::stmts(vec![
            Expr::Label { id: LabelId(1) },
            Expr::assign(Expr::name("y"), Expr::name("x")),
            Expr::assign(Expr::name("x"), Expr::int(1)),
            Expr::Goto { target: LabelId(1) },
        ]),
    );
    assert_eq!(report("f", body), Some("f:x".to_string()));
}

#[test]
fn test_unresolved_goto_shows_in_metrics() {
    let body = Expr::bind(
        &["x"],
        Expr::stmts(vec![Expr::Goto {
            target: LabelId(40),
        }]),
    );
    let analysis = analyze("f", body);
    assert_eq!(analysis.metrics.unresolved_gotos, 1);
}

// =============================================================================
// Switches
// =============================================================================

#[test]
fn test_switch_default_path_missing_init_reported() {
    // switch (s) { case 1: x = 1; break; default: ; } return x;
    let body = Expr::bind(
        &["x"],
        Expr::stmts(vec![
            Expr::Switch {
                cond: Box::new(Expr::name("s")),
                body: Box::new(Expr::bind(
                    &[],
                    Expr::stmts(vec![
                        Expr::Case { default: false },
                        Expr::assign(Expr::name("x"), Expr::int(1)),
                        Expr::Goto { target: LabelId(5) },
                        Expr::Case { default: true },
                    ]),
                )),
            },
            Expr::Label { id: LabelId(5) },
            Expr::ret(Some(Expr::name("x"))),
        ]),
    );
    assert_eq!(report("pick", body), Some("pick:x".to_string()));
}

#[test]
fn test_switch_initializing_every_case_is_clean() {
    // switch (s) { case 1: x = 1; break; default: x = 2; } return x;
    let body = Expr::bind(
        &["x"],
        Expr::stmts(vec![
            Expr::Switch {
                cond: Box::new(Expr::name("s")),
                body: Box::new(Expr::bind(
                    &[],
                    Expr::stmts(vec![
                        Expr::Case { default: false },
                        Expr::assign(Expr::name("x"), Expr::int(1)),
                        Expr::Goto { target: LabelId(5) },
                        Expr::Case { default: true },
                        Expr::assign(Expr::name("x"), Expr::int(2)),
                    ]),
                )),
            },
            Expr::Label { id: LabelId(5) },
            Expr::ret(Some(Expr::name("x"))),
        ]),
    );
    assert_eq!(report("pick", body), None);
}

#[test]
fn test_switch_without_default_keeps_the_skip_path() {
    // switch (s) { case 1: x = 1; } return x;
    // With no default, control may bypass every case.
    let body = Expr::bind(
        &["x"],
        Expr::stmts(vec![
            Expr::Switch {
                cond: Box::new(Expr::name("s")),
                body: Box::new(Expr::bind(
                    &[],
                    Expr::stmts(vec![
                        Expr::Case { default: false },
                        Expr::assign(Expr::name("x"), Expr::int(1)),
                    ]),
                )),
            },
            Expr::ret(Some(Expr::name("x"))),
        ]),
    );
    assert_eq!(report("pick", body), Some("pick:x".to_string()));
}

// =============================================================================
// Units and metrics
// =============================================================================

#[test]
fn test_unit_reports_only_functions_with_findings() {
    let unit = Unit {
        functions: vec![
            FunctionDef {
                name: "f".to_string(),
                body: Expr::bind(
                    &["x", "y"],
                    Expr::stmts(vec![
                        Expr::decl("y", Some(Expr::name("x"))),
                        Expr::ret(Some(Expr::name("y"))),
                    ]),
                ),
            },
            FunctionDef {
                name: "g".to_string(),
                body: Expr::bind(
                    &["x"],
                    Expr::stmts(vec![
                        Expr::assign(Expr::name("x"), Expr::int(1)),
                        Expr::ret(Some(Expr::name("x"))),
                    ]),
                ),
            },
        ],
    };
    let report = analyze_unit(&unit).expect("unit analysis should succeed");
    let lines: Vec<_> = report.lines().collect();
    assert_eq!(lines, vec!["f:x".to_string()]);
}

#[test]
fn test_metrics_describe_the_run() {
    let body = Expr::bind(
        &["x"],
        Expr::stmts(vec![
            if_stmt(
                Expr::name("p"),
                Some(Expr::assign(Expr::name("x"), Expr::int(1))),
                None,
            ),
            Expr::ret(Some(Expr::name("x"))),
        ]),
    );
    let analysis = analyze("f", body);
    let metrics = &analysis.metrics;

    assert_eq!(metrics.nodes, analysis.graph.len());
    assert!(metrics.passes >= 2, "a changing sweep plus the clean one");
    assert!(
        metrics.names_tracked >= 2,
        "x and p should both be tracked, got {}",
        metrics.names_tracked
    );
    assert_eq!(metrics.unresolved_gotos, 0);
}

#[test]
fn test_cfg_dump_shows_final_sets() {
    let body = Expr::bind(
        &["x"],
        Expr::stmts(vec![Expr::ret(Some(Expr::name("x")))]),
    );
    let text = analyze("f", body).render_cfg();
    assert!(text.contains("[USE:x#0-0]"), "dump missing the renamed use:\n{text}");
    assert!(text.contains("[OUT:x#0-0]"), "dump missing the propagated OUT:\n{text}");
}
