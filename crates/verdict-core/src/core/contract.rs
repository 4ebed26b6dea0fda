// crates/verdict-core/src/core/contract.rs
// ============================================================================
// Module: Verdict Contract Model
// Description: Data model for contract documents, requirements, tests, and steps.
// Purpose: Provide the typed document shapes shared by loading, resolution, and runs.
// Dependencies: serde, serde_json, crate::core::identifiers
// ============================================================================

//! ## Overview
//! This module defines the typed shape of a contract document. Fields that a
//! valid contract must carry are modeled as `Option` so that lint can report
//! structured diagnostics instead of failing deserialization; the runtime
//! materializes required fields and aborts the affected test when they are
//! missing.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

use crate::core::identifiers::ContractId;
use crate::core::identifiers::RequirementId;
use crate::core::identifiers::TestId;

// ============================================================================
// SECTION: Enumerations
// ============================================================================

/// Lifecycle status of a contract document.
///
/// # Invariants
/// - Frozen contracts are immutable; changes require a new version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractStatus {
    /// Mutable, under authoring.
    Draft,
    /// Immutable; strict validation applies.
    Frozen,
    /// Retired; kept for history.
    Deprecated,
}

/// Advisory priority of a requirement. Never gates pass/fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    /// Required for acceptance.
    Must,
    /// Expected but negotiable.
    Should,
    /// Desirable extra.
    Nice,
}

/// Category of a test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestType {
    /// In-process, deterministic.
    Unit,
    /// Crosses a component boundary.
    Integration,
    /// Full system path.
    E2e,
    /// File-content scan; no steps execute.
    Static,
}

/// Backend kind selected by the runner configuration.
///
/// # Invariants
/// - Closed set; new kinds are added as variants, never by reflection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutorKind {
    /// Synchronous in-process call / call_n against a registered symbol.
    Function,
    /// External process invocation with an argv command.
    Process,
    /// File-content scan feeding `$.ast`; rejects steps.
    Static,
    /// Stub; always returns a not-implemented envelope.
    #[serde(rename = "audio-render")]
    AudioRender,
}

impl ExecutorKind {
    /// Returns the wire name of the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Function => "function",
            Self::Process => "process",
            Self::Static => "static",
            Self::AudioRender => "audio-render",
        }
    }
}

/// Declared action of a single step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepAction {
    /// One function invocation.
    Call,
    /// N repeated function invocations with aggregated timing.
    CallN,
    /// External process invocation.
    Shell,
    /// Sleep for a declared duration (integration/e2e only).
    Wait,
    /// Fixture setup by identifier.
    Setup,
    /// Fixture teardown by identifier.
    Teardown,
    /// Non-realtime audio render (audio backend only).
    RenderNrt,
}

impl StepAction {
    /// Returns the wire name of the action.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Call => "call",
            Self::CallN => "call_n",
            Self::Shell => "shell",
            Self::Wait => "wait",
            Self::Setup => "setup",
            Self::Teardown => "teardown",
            Self::RenderNrt => "render_nrt",
        }
    }
}

// ============================================================================
// SECTION: Document Shapes
// ============================================================================

/// One requirement declared by a contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequirementSpec {
    /// Requirement identifier (`R###` by convention).
    pub id: RequirementId,
    /// Advisory priority; lint reports when absent.
    #[serde(default)]
    pub priority: Option<Priority>,
    /// Human-readable description.
    #[serde(default)]
    pub description: Option<String>,
    /// Acceptance criteria statements.
    #[serde(default)]
    pub acceptance_criteria: Vec<String>,
}

/// One declared step within a test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepSpec {
    /// Action performed by this step.
    pub action: StepAction,
    /// Action-specific keyword arguments (`with:` in documents).
    #[serde(default, rename = "with")]
    pub args: Map<String, Value>,
    /// Context binding name for this step's envelope.
    #[serde(default)]
    pub save_as: Option<String>,
    /// Per-step call-target override; wins over the runner-level symbol.
    #[serde(default)]
    pub method: Option<String>,
    /// Iteration count; required for `call_n`.
    #[serde(default)]
    pub n: Option<u32>,
    /// Warmup steps execute but never save their envelope.
    #[serde(default)]
    pub warmup: bool,
    /// Argv command; required for `shell`.
    #[serde(default)]
    pub command: Option<Vec<String>>,
    /// Sleep duration; required for `wait`.
    #[serde(default)]
    pub seconds: Option<f64>,
    /// Fixture identifier for `setup` / `teardown`.
    #[serde(default)]
    pub fixture: Option<String>,
}

/// One declared assertion within a test.
///
/// # Invariants
/// - `op` stays a plain string so unknown operators fail the assertion with
///   an `unknown_op` tag instead of failing document parsing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssertionSpec {
    /// Operator name from the fixed set.
    pub op: String,
    /// Actual operand: literal or `$.` path reference.
    #[serde(default)]
    pub actual: Option<Value>,
    /// Expected operand: literal or `$.` path reference.
    #[serde(default)]
    pub expected: Option<Value>,
    /// Regular-expression pattern for `matches` / `not_matches`.
    #[serde(default)]
    pub pattern: Option<String>,
    /// Inclusive lower bound for `in_range`.
    #[serde(default)]
    pub min: Option<Value>,
    /// Inclusive upper bound for `in_range`.
    #[serde(default)]
    pub max: Option<Value>,
    /// Absolute tolerance for `approx`.
    #[serde(default)]
    pub tolerance: Option<Value>,
    /// User-provided context attached to the result.
    #[serde(default)]
    pub message: Option<String>,
}

/// One test declared by a contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestSpec {
    /// Test identifier (`T###` by convention).
    pub id: TestId,
    /// Human-readable name.
    #[serde(default)]
    pub name: Option<String>,
    /// Test category; lint reports when absent.
    #[serde(default, rename = "type")]
    pub test_type: Option<TestType>,
    /// Back-reference to the covered requirement.
    #[serde(default)]
    pub requirement: Option<RequirementId>,
    /// Ordered step sequence.
    #[serde(default)]
    pub steps: Vec<StepSpec>,
    /// Assertion list evaluated after steps complete.
    #[serde(default, rename = "assert")]
    pub assertions: Vec<AssertionSpec>,
    /// Unconditional skip with a reason.
    #[serde(default)]
    pub skip: Option<String>,
    /// Guard expression; a true result records the test as skipped.
    #[serde(default)]
    pub skip_if: Option<String>,
    /// File globs for static file-scan tests.
    #[serde(default)]
    pub files: Option<Value>,
}

impl TestSpec {
    /// Returns the display name, falling back to the identifier.
    #[must_use]
    pub fn display_name(&self) -> &str {
        match &self.name {
            Some(name) if !name.is_empty() => name,
            _ => self.id.as_str(),
        }
    }
}

/// Runner configuration selecting and parameterizing an executor backend.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RunnerSpec {
    /// Backend kind; lint reports when absent.
    #[serde(default)]
    pub executor: Option<ExecutorKind>,
    /// Entry point for the function backend.
    #[serde(default)]
    pub entry: Option<String>,
    /// Default call target for the function backend.
    #[serde(default)]
    pub symbol: Option<String>,
    /// Per-test timeout bounding the sum of all step durations.
    #[serde(default)]
    pub timeout_ms: Option<u64>,
    /// Environment variables exported to process steps.
    #[serde(default)]
    pub env: Map<String, Value>,
    /// Parser selector for the static backend.
    #[serde(default)]
    pub parser: Option<String>,
    /// Backend-specific keys not modeled above; merged key-by-key.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One declared input or output of a contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IoDecl {
    /// Declaration name; the override key during `extends` resolution.
    pub name: String,
    /// Declared value type.
    #[serde(default, rename = "type")]
    pub value_type: Option<String>,
    /// Human-readable description.
    #[serde(default)]
    pub description: Option<String>,
    /// Whether the declaration is mandatory.
    #[serde(default)]
    pub required: bool,
}

/// Matrix declaration expanding one contract into parameterized runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatrixSpec {
    /// Variable name bound per target.
    pub var: String,
    /// Explicit value list; one run per value.
    #[serde(default)]
    pub values: Vec<Value>,
    /// Discovery dimension resolved once before any test executes.
    #[serde(default)]
    pub discover: Option<String>,
}

/// A full contract document as parsed from YAML.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ContractDoc {
    /// Contract identifier.
    #[serde(default)]
    pub contract: Option<ContractId>,
    /// Document version string.
    #[serde(default)]
    pub version: Option<String>,
    /// Lifecycle status.
    #[serde(default)]
    pub status: Option<ContractStatus>,
    /// Human-readable description.
    #[serde(default)]
    pub description: Option<String>,
    /// Relative path of the parent contract to merge with.
    #[serde(default)]
    pub extends: Option<String>,
    /// Runner configuration.
    #[serde(default)]
    pub runner: Option<RunnerSpec>,
    /// Variables seeded into the run context.
    #[serde(default)]
    pub vars: Map<String, Value>,
    /// Declared inputs.
    #[serde(default)]
    pub inputs: Vec<IoDecl>,
    /// Declared outputs.
    #[serde(default)]
    pub outputs: Vec<IoDecl>,
    /// Requirement list.
    #[serde(default)]
    pub requirements: Vec<RequirementSpec>,
    /// Test list.
    #[serde(default)]
    pub tests: Vec<TestSpec>,
    /// Optional matrix declaration.
    #[serde(default)]
    pub matrix: Option<MatrixSpec>,
}

impl ContractDoc {
    /// Returns the contract identifier or a placeholder for diagnostics.
    #[must_use]
    pub fn contract_name(&self) -> &str {
        self.contract.as_ref().map_or("unknown", ContractId::as_str)
    }
}

/// A contract after `extends` resolution, with effective counts exposed.
///
/// # Invariants
/// - `doc.extends` is `None`; resolution consumes the parent chain.
/// - Counts reflect the merged requirement and test lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedContract {
    /// The effective, parent-merged document.
    pub doc: ContractDoc,
    /// Number of effective requirements.
    pub effective_requirements: usize,
    /// Number of effective tests.
    pub effective_tests: usize,
}

impl ResolvedContract {
    /// Wraps an already-effective document, recording its counts.
    #[must_use]
    pub fn from_doc(doc: ContractDoc) -> Self {
        let effective_requirements = doc.requirements.len();
        let effective_tests = doc.tests.len();
        Self {
            doc,
            effective_requirements,
            effective_tests,
        }
    }
}
