// crates/verdict-core/tests/report.rs
// ============================================================================
// Module: Report Builder Tests
// Description: Validate schema checks, name sanitizing, and file layout.
// Purpose: Ensure reports are rejected when inconsistent and land on disk
//          in the documented layout.
// Dependencies: verdict-core, serde_json, tempfile
// ============================================================================

//! Report validation and persistence tests.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

use serde_json::Value;
use serde_json::json;
use verdict_core::AssertionRecord;
use verdict_core::BindingOutcome;
use verdict_core::BindingRun;
use verdict_core::MatrixBinding;
use verdict_core::REPORT_SCHEMA_VERSION;
use verdict_core::RunId;
use verdict_core::RunReport;
use verdict_core::RunSummary;
use verdict_core::TestId;
use verdict_core::TestRecord;
use verdict_core::TestStatus;
use verdict_core::runtime::report::build_matrix_report;
use verdict_core::runtime::report::sanitize_binding_name;
use verdict_core::runtime::report::validate_matrix;
use verdict_core::runtime::report::validate_single;
use verdict_core::runtime::report::write_matrix;
use verdict_core::runtime::report::write_single;

// ============================================================================
// SECTION: Fixtures
// ============================================================================

fn passing_record(id: &str) -> TestRecord {
    TestRecord {
        id: TestId::new(id),
        name: id.to_string(),
        requirement: None,
        test_type: None,
        status: TestStatus::Pass,
        message: "All assertions passed".to_string(),
        assertions: vec![AssertionRecord::outcome(
            "eq",
            json!(1),
            json!(1),
            true,
        )],
        steps: Vec::new(),
        duration_ms: None,
        files_scanned: None,
    }
}

fn single_report(run_id: &str) -> RunReport {
    let results = vec![passing_record("T001")];
    RunReport {
        schema_version: REPORT_SCHEMA_VERSION.to_string(),
        report_type: "single".to_string(),
        contract: "io_core".to_string(),
        contract_version: Some("1.0.0".to_string()),
        run_id: RunId::new(run_id),
        tool_version: "0.1.0".to_string(),
        started_at: "2026-01-01T00:00:00Z".to_string(),
        duration_ms: 3,
        warnings: Vec::new(),
        errors: Vec::new(),
        summary: RunSummary::tally(&results),
        results,
        artifacts_dir: "artifacts".to_string(),
    }
}

fn binding(label: &str, value: Value, run_id: &str) -> MatrixBinding {
    MatrixBinding {
        var: "pack_id".to_string(),
        value,
        label: label.to_string(),
        run_id: RunId::new(run_id),
    }
}

// ============================================================================
// SECTION: Validation
// ============================================================================

#[test]
fn single_report_with_consistent_summary_validates() {
    assert!(validate_single(&single_report("run_aa00bb11cc")).is_ok());
}

#[test]
fn summary_disagreeing_with_results_is_rejected() {
    let mut report = single_report("run_aa00bb11cc");
    report.summary.passed = 9;
    assert!(validate_single(&report).is_err());
}

#[test]
fn wrong_report_type_marker_is_rejected() {
    let mut report = single_report("run_aa00bb11cc");
    report.report_type = "matrix".to_string();
    assert!(validate_single(&report).is_err());
}

#[test]
fn matrix_counts_must_sum_to_total() {
    let runs = vec![BindingRun {
        binding: binding("alpha", json!("alpha"), "run_00_01"),
        outcome: BindingOutcome::Completed(single_report("run_00_01")),
    }];
    let mut report = build_matrix_report(
        "io_core",
        &RunId::new("run_00"),
        "0.1.0",
        "2026-01-01T00:00:00Z".to_string(),
        3,
        &runs,
        std::path::Path::new("artifacts/run_00"),
    );
    assert!(validate_matrix(&report).is_ok());
    report.skipped_targets = 2;
    assert!(validate_matrix(&report).is_err());
}

// ============================================================================
// SECTION: Sanitizing
// ============================================================================

#[test]
fn binding_names_are_made_filesystem_safe() {
    assert_eq!(sanitize_binding_name("pack-1.2_x"), "pack-1.2_x");
    assert_eq!(sanitize_binding_name("a/b:c d"), "a_b_c_d");
    assert_eq!(sanitize_binding_name(""), "_");
}

// ============================================================================
// SECTION: Layout
// ============================================================================

#[test]
fn single_report_file_is_named_after_the_run_id() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let path = write_single(&single_report("run_aa00bb11cc"), dir.path())?;
    assert_eq!(
        path.file_name().and_then(|name| name.to_str()),
        Some("run_aa00bb11cc.json")
    );
    let body: Value = serde_json::from_slice(&std::fs::read(&path)?)?;
    assert_eq!(body["report_type"], json!("single"));
    assert_eq!(body["summary"]["passed"], json!(1));
    Ok(())
}

#[test]
fn matrix_layout_is_summary_plus_targets_directory() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let runs = vec![
        BindingRun {
            binding: binding("alpha", json!("alpha"), "run_00_01"),
            outcome: BindingOutcome::Completed(single_report("run_00_01")),
        },
        BindingRun {
            binding: binding("beta/2", json!("beta/2"), "run_00_02"),
            outcome: BindingOutcome::Completed(single_report("run_00_02")),
        },
        BindingRun {
            binding: binding("gamma", json!("gamma"), "run_00_03"),
            outcome: BindingOutcome::NotAttempted,
        },
    ];
    let report = build_matrix_report(
        "io_core",
        &RunId::new("run_00"),
        "0.1.0",
        "2026-01-01T00:00:00Z".to_string(),
        3,
        &runs,
        dir.path(),
    );
    let summary_path = write_matrix(&report, &runs, dir.path())?;
    assert_eq!(
        summary_path.file_name().and_then(|name| name.to_str()),
        Some("matrix_summary.json")
    );
    assert!(dir.path().join("targets").join("alpha.json").is_file());
    assert!(dir.path().join("targets").join("beta_2.json").is_file());
    // Not-attempted bindings persist no per-target file.
    assert!(!dir.path().join("targets").join("gamma.json").exists());
    Ok(())
}

#[test]
fn matrix_summary_never_embeds_full_results() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let runs = vec![BindingRun {
        binding: binding("alpha", json!("alpha"), "run_00_01"),
        outcome: BindingOutcome::Completed(single_report("run_00_01")),
    }];
    let report = build_matrix_report(
        "io_core",
        &RunId::new("run_00"),
        "0.1.0",
        "2026-01-01T00:00:00Z".to_string(),
        3,
        &runs,
        dir.path(),
    );
    let summary_path = write_matrix(&report, &runs, dir.path())?;
    let body: Value = serde_json::from_slice(&std::fs::read(&summary_path)?)?;
    assert_eq!(body["report_type"], json!("matrix"));
    assert!(body["targets"][0].get("results").is_none());
    assert_eq!(
        body["targets"][0]["report_path"],
        json!("targets/alpha.json")
    );
    Ok(())
}
