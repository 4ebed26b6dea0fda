// crates/verdict-core/src/core/report.rs
// ============================================================================
// Module: Verdict Report Model
// Description: Typed shapes for single-run and matrix report documents.
// Purpose: Enforce the report schema invariants downstream tooling depends on.
// Dependencies: serde, serde_json, crate::core
// ============================================================================

//! ## Overview
//! Reports come in exactly two explicitly tagged shapes: a single-run report
//! (`report_type: "single"`) and a matrix summary (`report_type: "matrix"`).
//! A matrix summary never embeds full per-run results, only per-target
//! summaries plus a relative path to each persisted full report. Status
//! values are a closed set and every test record carries an always-present
//! (possibly empty) assertions list.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

use crate::core::contract::TestType;
use crate::core::envelope::StepEnvelope;
use crate::core::identifiers::RequirementId;
use crate::core::identifiers::RunId;
use crate::core::identifiers::TestId;

/// Schema version stamped into every emitted report.
pub const REPORT_SCHEMA_VERSION: &str = "1.0";

// ============================================================================
// SECTION: Statuses
// ============================================================================

/// Outcome of one test. Closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestStatus {
    /// All assertions passed.
    Pass,
    /// At least one assertion failed.
    Fail,
    /// Skipped via `skip` or a true `skip_if`.
    Skipped,
    /// Configuration, timeout, or assertion-evaluation error.
    Error,
}

/// Outcome of one matrix target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetStatus {
    /// The target completed and every test passed or was skipped.
    Passed,
    /// The target completed with at least one failing or erroring test.
    Failed,
    /// Fail-fast stopped the matrix before this target started.
    NotAttempted,
}

// ============================================================================
// SECTION: Records
// ============================================================================

/// Result of one assertion evaluation. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssertionRecord {
    /// Operator name.
    pub op: String,
    /// Resolved actual value.
    pub actual: Value,
    /// Resolved (or implicit, rendered explicitly) expected value.
    pub expected: Value,
    /// Whether the assertion held.
    pub pass: bool,
    /// Stable error tag when evaluation itself failed.
    #[serde(default)]
    pub error: Option<String>,
    /// User-provided context for failure reporting.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Operator-specific detail fields.
    #[serde(default)]
    pub details: Map<String, Value>,
}

impl AssertionRecord {
    /// Creates a record for a completed operator evaluation.
    #[must_use]
    pub fn outcome(op: impl Into<String>, actual: Value, expected: Value, pass: bool) -> Self {
        Self {
            op: op.into(),
            actual,
            expected,
            pass,
            error: None,
            message: None,
            details: Map::new(),
        }
    }

    /// Creates a failing record carrying a stable error tag.
    #[must_use]
    pub fn error(
        op: impl Into<String>,
        actual: Value,
        expected: Value,
        tag: impl Into<String>,
    ) -> Self {
        Self {
            op: op.into(),
            actual,
            expected,
            pass: false,
            error: Some(tag.into()),
            message: None,
            details: Map::new(),
        }
    }

    /// Attaches operator-specific detail fields.
    #[must_use]
    pub fn with_details(mut self, details: Map<String, Value>) -> Self {
        self.details = details;
        self
    }

    /// Attaches the user-provided message.
    #[must_use]
    pub fn with_message(mut self, message: Option<String>) -> Self {
        self.message = message;
        self
    }
}

/// Result of one test within a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestRecord {
    /// Test identifier.
    pub id: TestId,
    /// Human-readable test name.
    pub name: String,
    /// Covered requirement, when linked.
    pub requirement: Option<RequirementId>,
    /// Test category.
    #[serde(rename = "type")]
    pub test_type: Option<TestType>,
    /// Outcome status.
    pub status: TestStatus,
    /// Human-readable outcome summary.
    pub message: String,
    /// Always present, possibly empty.
    pub assertions: Vec<AssertionRecord>,
    /// Envelopes of executed steps, in declared order.
    pub steps: Vec<StepEnvelope>,
    /// Elapsed wall time for the test.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    /// Files scanned by a static file-scan test.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files_scanned: Option<usize>,
}

/// A structured warning or error attached to a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Stable machine-readable code.
    pub code: String,
    /// Human-readable description.
    pub message: String,
}

impl Diagnostic {
    /// Creates a diagnostic.
    #[must_use]
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

// ============================================================================
// SECTION: Summaries
// ============================================================================

/// Per-status test counts for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Tests with status `pass`.
    pub passed: usize,
    /// Tests with status `fail`.
    pub failed: usize,
    /// Tests with status `skipped`.
    pub skipped: usize,
    /// Tests with status `error`.
    pub error: usize,
}

impl RunSummary {
    /// Tallies statuses over a result list.
    #[must_use]
    pub fn tally(results: &[TestRecord]) -> Self {
        let mut summary = Self::default();
        for record in results {
            match record.status {
                TestStatus::Pass => summary.passed += 1,
                TestStatus::Fail => summary.failed += 1,
                TestStatus::Skipped => summary.skipped += 1,
                TestStatus::Error => summary.error += 1,
            }
        }
        summary
    }

    /// Returns whether the run succeeded under the default posture.
    ///
    /// Error states count as failures: they indicate unresolved ambiguity.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.failed == 0 && self.error == 0
    }
}

// ============================================================================
// SECTION: Report Documents
// ============================================================================

/// The serialized outcome of one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    /// Report schema version; consumers check the major component.
    pub schema_version: String,
    /// Distinguishing marker; always `"single"` for this shape.
    pub report_type: String,
    /// Contract identifier.
    pub contract: String,
    /// Contract document version.
    pub contract_version: Option<String>,
    /// Run identifier.
    pub run_id: RunId,
    /// Version of the tool that produced the report.
    pub tool_version: String,
    /// RFC 3339 start timestamp.
    pub started_at: String,
    /// Elapsed wall time for the whole run.
    pub duration_ms: u64,
    /// Non-fatal diagnostics.
    pub warnings: Vec<Diagnostic>,
    /// Fatal diagnostics recorded before or during the run.
    pub errors: Vec<Diagnostic>,
    /// Per-status counts over `results`.
    pub summary: RunSummary,
    /// One record per executed or skipped test.
    pub results: Vec<TestRecord>,
    /// Absolute path of the run's artifacts directory.
    pub artifacts_dir: String,
}

/// Per-target summary inside a matrix report.
///
/// # Invariants
/// - Never carries full result bodies, only counts and a report path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetSummary {
    /// Display label for the binding value.
    pub binding: String,
    /// The bound parameter value.
    pub value: Value,
    /// Run identifier of the target's run.
    pub run_id: RunId,
    /// Target outcome.
    pub status: TargetStatus,
    /// Per-status counts; absent for not-attempted targets.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<RunSummary>,
    /// Path of the persisted full report, relative to the summary file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_path: Option<String>,
}

/// Aggregate report over a matrix of parameterized runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatrixReport {
    /// Report schema version; consumers check the major component.
    pub schema_version: String,
    /// Distinguishing marker; always `"matrix"` for this shape.
    pub report_type: String,
    /// Contract identifier.
    pub contract: String,
    /// Shared run-id prefix of all targets.
    pub run_id: RunId,
    /// Version of the tool that produced the report.
    pub tool_version: String,
    /// RFC 3339 start timestamp.
    pub started_at: String,
    /// Elapsed wall time for the whole matrix.
    pub duration_ms: u64,
    /// Total declared targets.
    pub total_targets: usize,
    /// Targets that completed with every test passing or skipped.
    pub passed_targets: usize,
    /// Targets that completed with failing or erroring tests.
    pub failed_targets: usize,
    /// Targets fail-fast prevented from starting.
    pub skipped_targets: usize,
    /// One summary per target, in declaration order.
    pub targets: Vec<TargetSummary>,
    /// Absolute path of the matrix artifacts directory.
    pub artifacts_dir: String,
}
