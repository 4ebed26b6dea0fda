// crates/verdict-core/src/runtime/report.rs
// ============================================================================
// Module: Verdict Report Builder
// Description: Report validation, matrix aggregation, and file persistence.
// Purpose: Enforce schema invariants and the on-disk report layout.
// Dependencies: serde_json, thiserror, crate::core, crate::runtime::matrix
// ============================================================================

//! ## Overview
//! The builder validates reports before they touch disk and owns the output
//! layout: single-run reports persist as one file named after the run id;
//! matrix runs persist a summary file plus one sanitized-name file per
//! binding under a `targets/` subdirectory, with filesystem-unsafe
//! characters in binding names replaced by underscores.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io;
use std::path::Path;
use std::path::PathBuf;

use thiserror::Error;

use crate::core::identifiers::RunId;
use crate::core::report::MatrixReport;
use crate::core::report::REPORT_SCHEMA_VERSION;
use crate::core::report::RunReport;
use crate::core::report::RunSummary;
use crate::core::report::TargetStatus;
use crate::core::report::TargetSummary;
use crate::runtime::matrix::BindingOutcome;
use crate::runtime::matrix::BindingRun;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while validating or persisting reports.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum ReportError {
    /// A required field is empty or inconsistent.
    #[error("invalid report: {0}")]
    Invalid(String),
    /// Writing a report file failed.
    #[error("failed to write report {path}: {source}")]
    Io {
        /// Destination path.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
    /// Report serialization failed.
    #[error(transparent)]
    Serialize(#[from] serde_json::Error),
}

// ============================================================================
// SECTION: Validation
// ============================================================================

/// Validates a single-run report against the schema invariants.
///
/// # Errors
///
/// Returns [`ReportError::Invalid`] when a required field is empty, the
/// type marker is wrong, or the summary disagrees with the result list.
pub fn validate_single(report: &RunReport) -> Result<(), ReportError> {
    if report.schema_version != REPORT_SCHEMA_VERSION {
        return Err(ReportError::Invalid(format!(
            "unexpected schema_version '{}'",
            report.schema_version
        )));
    }
    if report.report_type != "single" {
        return Err(ReportError::Invalid(format!(
            "single-run report carries report_type '{}'",
            report.report_type
        )));
    }
    if report.contract.is_empty() {
        return Err(ReportError::Invalid("contract must not be empty".to_string()));
    }
    if report.run_id.as_str().is_empty() {
        return Err(ReportError::Invalid("run_id must not be empty".to_string()));
    }
    let tallied = RunSummary::tally(&report.results);
    if tallied != report.summary {
        return Err(ReportError::Invalid(
            "summary counts disagree with results".to_string(),
        ));
    }
    Ok(())
}

/// Validates a matrix report against the schema invariants.
///
/// # Errors
///
/// Returns [`ReportError::Invalid`] when the marker or target counts are
/// inconsistent.
pub fn validate_matrix(report: &MatrixReport) -> Result<(), ReportError> {
    if report.report_type != "matrix" {
        return Err(ReportError::Invalid(format!(
            "matrix report carries report_type '{}'",
            report.report_type
        )));
    }
    if report.total_targets != report.targets.len() {
        return Err(ReportError::Invalid(
            "total_targets disagrees with target list".to_string(),
        ));
    }
    let counted = report.passed_targets + report.failed_targets + report.skipped_targets;
    if counted != report.total_targets {
        return Err(ReportError::Invalid(
            "per-status target counts do not sum to total_targets".to_string(),
        ));
    }
    Ok(())
}

// ============================================================================
// SECTION: Matrix Aggregation
// ============================================================================

/// Replaces filesystem-unsafe characters in a binding name.
///
/// Keeps ASCII alphanumerics plus `.`, `_`, and `-`; everything else
/// becomes `_`. Empty names render as `_`.
#[must_use]
pub fn sanitize_binding_name(name: &str) -> String {
    if name.is_empty() {
        return "_".to_string();
    }
    name.chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() || matches!(ch, '.' | '_' | '-') {
                ch
            } else {
                '_'
            }
        })
        .collect()
}

/// Aggregates binding outcomes into a matrix report.
///
/// Targets never embed full result bodies; completed targets carry their
/// summary counts and, once persisted, a relative path to the full report.
#[must_use]
pub fn build_matrix_report(
    contract: &str,
    run_prefix: &RunId,
    tool_version: &str,
    started_at: String,
    duration_ms: u64,
    runs: &[BindingRun],
    artifacts_dir: &Path,
) -> MatrixReport {
    let mut targets = Vec::with_capacity(runs.len());
    let mut passed = 0;
    let mut failed = 0;
    let mut skipped = 0;

    for run in runs {
        let target = match &run.outcome {
            BindingOutcome::Completed(report) => {
                let status = if report.summary.is_success() {
                    passed += 1;
                    TargetStatus::Passed
                } else {
                    failed += 1;
                    TargetStatus::Failed
                };
                TargetSummary {
                    binding: run.binding.label.clone(),
                    value: run.binding.value.clone(),
                    run_id: run.binding.run_id.clone(),
                    status,
                    summary: Some(report.summary),
                    report_path: Some(format!(
                        "targets/{}.json",
                        sanitize_binding_name(&run.binding.label)
                    )),
                }
            }
            BindingOutcome::NotAttempted => {
                skipped += 1;
                TargetSummary {
                    binding: run.binding.label.clone(),
                    value: run.binding.value.clone(),
                    run_id: run.binding.run_id.clone(),
                    status: TargetStatus::NotAttempted,
                    summary: None,
                    report_path: None,
                }
            }
        };
        targets.push(target);
    }

    MatrixReport {
        schema_version: REPORT_SCHEMA_VERSION.to_string(),
        report_type: "matrix".to_string(),
        contract: contract.to_string(),
        run_id: run_prefix.clone(),
        tool_version: tool_version.to_string(),
        started_at,
        duration_ms,
        total_targets: runs.len(),
        passed_targets: passed,
        failed_targets: failed,
        skipped_targets: skipped,
        targets,
        artifacts_dir: artifacts_dir.display().to_string(),
    }
}

// ============================================================================
// SECTION: Persistence
// ============================================================================

/// Serializes a value as pretty JSON and writes it atomically enough for
/// report consumers (single write, no partial truncation on rename-free
/// platforms).
fn write_json<T: serde::Serialize>(value: &T, path: &Path) -> Result<(), ReportError> {
    let rendered = serde_json::to_vec_pretty(value)?;
    std::fs::write(path, rendered).map_err(|source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Persists a single-run report as one file named after its run id.
///
/// # Errors
///
/// Returns [`ReportError`] when validation or writing fails.
pub fn write_single(report: &RunReport, directory: &Path) -> Result<PathBuf, ReportError> {
    validate_single(report)?;
    std::fs::create_dir_all(directory).map_err(|source| ReportError::Io {
        path: directory.to_path_buf(),
        source,
    })?;
    let path = directory.join(format!("{}.json", report.run_id.as_str()));
    write_json(report, &path)?;
    Ok(path)
}

/// Persists a matrix: the summary file plus one file per completed binding
/// under `targets/`.
///
/// # Errors
///
/// Returns [`ReportError`] when validation or any write fails.
pub fn write_matrix(
    report: &MatrixReport,
    runs: &[BindingRun],
    directory: &Path,
) -> Result<PathBuf, ReportError> {
    validate_matrix(report)?;
    let targets_dir = directory.join("targets");
    std::fs::create_dir_all(&targets_dir).map_err(|source| ReportError::Io {
        path: targets_dir.clone(),
        source,
    })?;

    for run in runs {
        if let BindingOutcome::Completed(full) = &run.outcome {
            validate_single(full)?;
            let name = sanitize_binding_name(&run.binding.label);
            write_json(full, &targets_dir.join(format!("{name}.json")))?;
        }
    }

    let summary_path = directory.join("matrix_summary.json");
    write_json(report, &summary_path)?;
    Ok(summary_path)
}
