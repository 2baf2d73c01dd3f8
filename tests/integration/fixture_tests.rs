//! JSON fixture tests.
//!
//! Exercises the serialized unit format end to end: fixtures under
//! tests/fixtures/ are read from disk, parsed and analyzed exactly the
//! way the CLI does it.

use std::fs;
use std::path::PathBuf;

use coldread::analyze_unit;
use coldread::ast::Unit;

/// Get the path to test fixtures.
fn fixtures_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

fn load_unit(name: &str) -> Unit {
    let path = fixtures_path().join(name);
    let text = fs::read_to_string(&path)
        .unwrap_or_else(|err| panic!("reading fixture {}: {err}", path.display()));
    Unit::from_json(&text)
        .unwrap_or_else(|err| panic!("parsing fixture {}: {err}", path.display()))
}

#[test]
fn test_uninit_simple_fixture() {
    let unit = load_unit("uninit_simple.json");
    let report = analyze_unit(&unit).expect("analysis should succeed");

    let lines: Vec<_> = report.lines().collect();
    assert_eq!(
        lines,
        vec!["f:x".to_string()],
        "f leaks x, g initializes before use"
    );
}

#[test]
fn test_switch_fallthrough_fixture() {
    let unit = load_unit("switch_fallthrough.json");
    let report = analyze_unit(&unit).expect("analysis should succeed");

    let lines: Vec<_> = report.lines().collect();
    assert_eq!(
        lines,
        vec!["pick:x".to_string()],
        "the empty default case reaches the read without initializing"
    );
}

#[test]
fn test_shadowing_fixture() {
    let unit = load_unit("shadowing.json");
    let report = analyze_unit(&unit).expect("analysis should succeed");

    let function = &report.functions[0];
    assert_eq!(function.report_line(), Some("shadow:v".to_string()));
    assert_eq!(function.findings.len(), 1);
    assert_eq!(
        function.findings[0].scope_id, "#0#0",
        "only the inner declaration of v is uninitialized"
    );
}

#[test]
fn test_fixture_metrics_are_sane() {
    let unit = load_unit("uninit_simple.json");
    let report = analyze_unit(&unit).expect("analysis should succeed");

    for function in &report.functions {
        assert!(function.metrics.nodes >= 3, "every fixture body lowers to nodes");
        assert!(function.metrics.passes >= 1);
        assert_eq!(function.metrics.unresolved_gotos, 0);
    }
}
