//! Integration tests for the static pre-check layer

use jspad_analysis::{
    compute_diagnostics, find_unmatched_delimiters, looks_infinite, scan_restricted_globals,
    to_markers, Severity,
};

#[test]
fn balanced_pairs_produce_no_diagnostics() {
    for source in [
        "function add(a, b) { return a + b; }",
        "const xs = [1, 2, [3, 4]];",
        "if (a) { b(\"(\"); }",
    ] {
        assert!(
            find_unmatched_delimiters(source).is_empty(),
            "expected no findings for {source:?}"
        );
    }
}

#[test]
fn mismatched_pair_reports_both_sides() {
    let diagnostics = find_unmatched_delimiters("(]");
    assert_eq!(diagnostics.len(), 2);
    assert_eq!(diagnostics[0].offset, 1);
    assert_eq!(diagnostics[0].message, "Unmatched ]");
    assert_eq!(diagnostics[1].offset, 0);
    assert_eq!(diagnostics[1].message, "Unmatched (");
}

#[test]
fn restricted_global_scan_matches_spec_examples() {
    assert!(scan_restricted_globals("console.log(1+1)").is_empty());

    let found = scan_restricted_globals("document.title");
    assert!(found.contains(&"document"));
}

#[test]
fn loop_heuristic_matches_spec_examples() {
    assert!(looks_infinite("for (;;) { x++; }"));
    assert!(!looks_infinite("for (let i=0;i<10;i++){}"));
}

#[test]
fn diagnostics_are_recomputed_wholesale() {
    let first = compute_diagnostics("(");
    assert_eq!(first.len(), 1);

    // A fixed text yields a fresh, empty set; nothing carries over.
    let second = compute_diagnostics("()");
    assert!(second.iter().all(|d| !d.message.contains("Unmatched")));
}

#[test]
fn markers_carry_line_and_column_through_newlines() {
    let source = "const ok = 1;\nconst bad = (;\n";
    let diagnostics = compute_diagnostics(source);
    let markers = to_markers(source, &diagnostics);
    assert!(
        markers.iter().any(|m| m.start_line == 2),
        "expected a marker on line 2, got {markers:?}"
    );
}

#[test]
fn lint_severities_follow_the_rule_set() {
    let diagnostics = compute_diagnostics("let unused = 'x'\n");
    assert!(diagnostics
        .iter()
        .any(|d| d.message == "Missing semicolon." && d.severity == Severity::Error));
    assert!(diagnostics
        .iter()
        .any(|d| d.message == "Strings must use doublequote." && d.severity == Severity::Error));
    assert!(diagnostics
        .iter()
        .any(|d| d.message.contains("never used") && d.severity == Severity::Warning));
}
