// crates/verdict-contract/tests/coverage.rs
// ============================================================================
// Module: Requirement Coverage Tests
// Description: Validate linked-test counting across contract files.
// Purpose: Ensure coverage reflects effective contracts and skips noise.
// Dependencies: verdict-contract, tempfile
// ============================================================================

//! Requirement coverage behavior tests.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

use verdict_contract::compute_coverage;

const COVERED: &str = r"
contract: io_core
version: 1.0.0
status: draft
description: Core IO behavior.
runner:
  executor: function
requirements:
  - id: R001
    priority: must
    description: Reads succeed.
    acceptance_criteria: [reads return data]
  - id: R002
    priority: should
    description: Writes succeed.
    acceptance_criteria: [writes land]
tests:
  - id: T001
    name: read works
    type: unit
    requirement: R001
    assert: [{ op: eq, actual: 1, expected: 1 }]
  - id: T002
    name: read again
    type: unit
    requirement: R001
    assert: [{ op: eq, actual: 1, expected: 1 }]
  - id: T003
    name: unlinked smoke check
    type: unit
    assert: [{ op: eq, actual: 1, expected: 1 }]
";

#[test]
fn counts_linked_tests_and_reports_uncovered() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    std::fs::write(dir.path().join("io_core.yaml"), COVERED)?;
    let report = compute_coverage(dir.path())?;

    assert_eq!(report.total_count, 2);
    assert_eq!(report.uncovered_count, 1);
    assert!(!report.is_covered());

    // Sorted by requirement id; the unlinked T003 counts nowhere.
    assert_eq!(report.requirements[0].id, "R001");
    assert_eq!(report.requirements[0].linked_tests, 2);
    assert_eq!(report.requirements[1].id, "R002");
    assert_eq!(report.requirements[1].linked_tests, 0);
    Ok(())
}

#[test]
fn coverage_runs_over_effective_contracts() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    std::fs::write(
        dir.path().join("parent.yaml"),
        r"
contract: io_base
version: 1.0.0
status: draft
description: Base.
runner:
  executor: function
requirements:
  - id: R001
    priority: must
    description: Reads succeed.
    acceptance_criteria: [reads return data]
tests: []
",
    )?;
    std::fs::write(
        dir.path().join("child.yaml"),
        r"
contract: io_fast
extends: parent.yaml
tests:
  - id: T001
    name: read fast
    type: unit
    requirement: R001
    assert: [{ op: eq, actual: 1, expected: 1 }]
",
    )?;
    let report = compute_coverage(dir.path())?;
    let r001 = report.requirements.iter().find(|r| r.id == "R001").unwrap();
    // Linked once via the child, once via the (testless) parent's own pass.
    assert!(r001.linked_tests >= 1);
    assert!(report.is_covered());
    Ok(())
}

#[test]
fn project_manifests_and_broken_files_are_skipped() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    std::fs::write(dir.path().join("project.yaml"), "project: verdict\n")?;
    std::fs::write(dir.path().join("broken.yaml"), "contract: [unbalanced\n")?;
    let report = compute_coverage(dir.path())?;
    assert_eq!(report.total_count, 0);
    assert!(report.is_covered());
    Ok(())
}
