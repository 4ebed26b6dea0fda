// crates/verdict-contract/tests/lint.rs
// ============================================================================
// Module: Contract Lint Tests
// Description: Validate structural checks and status-dependent gates.
// Purpose: Ensure frozen contracts fail closed and drafts stay workable.
// Dependencies: verdict-contract, tempfile
// ============================================================================

//! Contract lint behavior tests.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

use std::path::Path;

use verdict_contract::LintOptions;
use verdict_contract::LintReport;
use verdict_contract::lint_path;

// ============================================================================
// SECTION: Fixtures
// ============================================================================

fn contract_with(status: &str, extra_requirement: bool) -> String {
    let mut doc = format!(
        r#"
contract: io_core
version: 1.0.0
status: {status}
description: Core IO behavior.
runner:
  executor: function
  entry: demo.entry
  symbol: run
requirements:
  - id: R001
    priority: must
    description: Reads succeed.
    acceptance_criteria: [reads return data]
"#
    );
    if extra_requirement {
        doc.push_str(
            r#"  - id: R002
    priority: should
    description: Writes succeed.
    acceptance_criteria: [writes land]
"#,
        );
    }
    doc.push_str(
        r#"tests:
  - id: T001
    name: read works
    type: unit
    requirement: R001
    assert:
      - op: eq
        actual: 1
        expected: 1
"#,
    );
    doc
}

fn lint_one(body: &str, options: &LintOptions) -> LintReport {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("contract.yaml");
    std::fs::write(&path, body).unwrap();
    lint_path(&path, options)
}

fn codes(diagnostics: &[verdict_core::Diagnostic]) -> Vec<&str> {
    diagnostics.iter().map(|d| d.code.as_str()).collect()
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[test]
fn complete_contract_passes() {
    let report = lint_one(&contract_with("frozen", false), &LintOptions::default());
    assert!(report.ok, "unexpected findings: {}", codes(&report.errors).join(", "));
    assert_eq!(report.contracts_checked, 1);
}

#[test]
fn frozen_uncovered_requirement_is_an_error_draft_is_not() {
    let frozen = lint_one(&contract_with("frozen", true), &LintOptions::default());
    assert!(!frozen.ok);
    assert!(codes(&frozen.errors).contains(&"uncovered_requirement"));

    let draft = lint_one(&contract_with("draft", true), &LintOptions::default());
    assert!(draft.ok);
    assert!(codes(&draft.warnings).contains(&"uncovered_requirement"));
}

#[test]
fn strict_promotes_warnings_to_failures() {
    let report = lint_one(&contract_with("draft", true), &LintOptions { strict: true });
    assert!(!report.ok);
    assert!(report.errors.is_empty());
}

#[test]
fn missing_required_fields_are_coded() {
    let report = lint_one("contract: bare\n", &LintOptions::default());
    assert!(!report.ok);
    let found = codes(&report.errors);
    assert!(found.iter().filter(|code| **code == "missing_field").count() >= 5);
}

#[test]
fn runner_without_executor_is_flagged() {
    let body = contract_with("draft", false).replace("  executor: function\n", "");
    let report = lint_one(&body, &LintOptions::default());
    assert!(codes(&report.errors).contains(&"missing_executor"));
}

#[test]
fn invalid_status_is_flagged() {
    let body = contract_with("retired", false);
    let report = lint_one(&body, &LintOptions::default());
    assert!(codes(&report.errors).contains(&"invalid_status"));
}

#[test]
fn frozen_guard_that_does_not_parse_fails_closed() {
    let mut body = contract_with("frozen", false);
    body.push_str("    skip_if: \"vars.x ==\"\n");
    let report = lint_one(&body, &LintOptions::default());
    assert!(!report.ok);
    assert!(codes(&report.errors).contains(&"invalid_guard"));

    let draft = lint_one(
        &body.replace("status: frozen", "status: draft"),
        &LintOptions::default(),
    );
    assert!(draft.ok);
    assert!(codes(&draft.warnings).contains(&"invalid_guard"));
}

#[test]
fn project_manifests_are_skipped() {
    let report = lint_one("project: verdict\nversion: 1.0.0\n", &LintOptions::default());
    assert!(report.ok);
    assert_eq!(report.contracts_checked, 0);
}

#[test]
fn missing_path_is_an_error() {
    let report = lint_path(Path::new("/nonexistent/contracts"), &LintOptions::default());
    assert!(!report.ok);
    assert!(codes(&report.errors).contains(&"path_not_found"));
}
