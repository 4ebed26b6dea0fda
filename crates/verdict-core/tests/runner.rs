// crates/verdict-core/tests/runner.rs
// ============================================================================
// Module: Run Orchestrator Tests
// Description: Validate sequencing, skip logic, save_as, and status rules.
// Purpose: Ensure one run turns a contract into a correct report body.
// Dependencies: verdict-core, serde_json, tempfile
// ============================================================================

//! Run orchestrator behavior tests with a stub executor backend.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use serde_json::Value;
use serde_json::json;
use verdict_core::ContractDoc;
use verdict_core::Executor;
use verdict_core::ExecutorError;
use verdict_core::ExecutorFactory;
use verdict_core::ResolvedContract;
use verdict_core::RunContext;
use verdict_core::RunId;
use verdict_core::RunOrchestrator;
use verdict_core::RunnerOptions;
use verdict_core::RunnerSpec;
use verdict_core::StepAction;
use verdict_core::StepEnvelope;
use verdict_core::StepSpec;
use verdict_core::TestId;
use verdict_core::TestStatus;

// ============================================================================
// SECTION: Stub Backend
// ============================================================================

/// Echoes step arguments back as a successful envelope.
struct EchoExecutor;

impl Executor for EchoExecutor {
    fn supports(&self, action: StepAction) -> bool {
        matches!(action, StepAction::Call)
    }

    fn setup(&mut self, _ctx: &RunContext, _runner: &RunnerSpec) -> Result<(), ExecutorError> {
        Ok(())
    }

    fn execute_step(
        &mut self,
        _ctx: &RunContext,
        _runner: &RunnerSpec,
        _test_id: &TestId,
        step: &StepSpec,
        _timeout_ms: u64,
    ) -> StepEnvelope {
        StepEnvelope::success(Value::Object(step.args.clone()))
    }

    fn teardown(&mut self, _ctx: &RunContext, _runner: &RunnerSpec) -> Result<(), ExecutorError> {
        Ok(())
    }
}

struct EchoFactory;

impl ExecutorFactory for EchoFactory {
    fn create(&self, _runner: &RunnerSpec) -> Result<Box<dyn Executor>, ExecutorError> {
        Ok(Box::new(EchoExecutor))
    }
}

/// Counts lifecycle calls so tests can observe backend reuse.
struct CountingExecutor {
    /// Steps executed across all tests served by this backend.
    executed: Arc<AtomicUsize>,
    /// Teardown invocations.
    teardowns: Arc<AtomicUsize>,
}

impl Executor for CountingExecutor {
    fn supports(&self, action: StepAction) -> bool {
        matches!(action, StepAction::Call)
    }

    fn setup(&mut self, _ctx: &RunContext, _runner: &RunnerSpec) -> Result<(), ExecutorError> {
        Ok(())
    }

    fn execute_step(
        &mut self,
        _ctx: &RunContext,
        _runner: &RunnerSpec,
        _test_id: &TestId,
        _step: &StepSpec,
        _timeout_ms: u64,
    ) -> StepEnvelope {
        self.executed.fetch_add(1, Ordering::SeqCst);
        StepEnvelope::success(json!(true))
    }

    fn teardown(&mut self, _ctx: &RunContext, _runner: &RunnerSpec) -> Result<(), ExecutorError> {
        self.teardowns.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

struct CountingFactory {
    /// Backends created for the run.
    created: Arc<AtomicUsize>,
    /// Shared step counter handed to each backend.
    executed: Arc<AtomicUsize>,
    /// Shared teardown counter handed to each backend.
    teardowns: Arc<AtomicUsize>,
}

impl ExecutorFactory for CountingFactory {
    fn create(&self, _runner: &RunnerSpec) -> Result<Box<dyn Executor>, ExecutorError> {
        self.created.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(CountingExecutor {
            executed: Arc::clone(&self.executed),
            teardowns: Arc::clone(&self.teardowns),
        }))
    }
}

// ============================================================================
// SECTION: Fixtures
// ============================================================================

fn contract(fields: Value) -> ResolvedContract {
    let doc: ContractDoc = serde_json::from_value(fields).unwrap();
    ResolvedContract::from_doc(doc)
}

fn run(
    fields: Value,
    options: RunnerOptions,
) -> Result<verdict_core::RunReport, Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let options = RunnerOptions {
        artifacts_root: dir.path().to_path_buf(),
        ..options
    };
    let orchestrator = RunOrchestrator::new(&EchoFactory, options);
    let report = orchestrator.run_contract(
        &contract(fields),
        &dir.path().join("contracts").join("sample.yaml"),
        &RunId::new("run_test0001"),
        None,
    )?;
    Ok(report)
}

fn base_contract() -> Value {
    json!({
        "contract": "io_core",
        "version": "1.2.0",
        "status": "draft",
        "runner": { "executor": "function" },
        "tests": [],
    })
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[test]
fn saved_step_results_resolve_in_assertions() -> Result<(), Box<dyn std::error::Error>> {
    let mut doc = base_contract();
    doc["tests"] = json!([{
        "id": "T001",
        "name": "echo round trip",
        "type": "unit",
        "steps": [{ "action": "call", "with": { "x": 41 }, "save_as": "result" }],
        "assert": [
            { "op": "eq", "actual": "$.result.value.x", "expected": 41 },
            { "op": "eq", "actual": "$.result.ok", "expected": true },
        ],
    }]);
    let report = run(doc, RunnerOptions::default())?;
    assert_eq!(report.report_type, "single");
    assert_eq!(report.results.len(), 1);
    assert_eq!(report.results[0].status, TestStatus::Pass);
    assert_eq!(report.summary.passed, 1);
    assert_eq!(report.results[0].steps.len(), 1);
    Ok(())
}

#[test]
fn failing_assertion_fails_only_its_test() -> Result<(), Box<dyn std::error::Error>> {
    let mut doc = base_contract();
    doc["tests"] = json!([
        {
            "id": "T001",
            "assert": [{ "op": "eq", "actual": 1, "expected": 2 }],
        },
        {
            "id": "T002",
            "assert": [{ "op": "eq", "actual": 1, "expected": 1 }],
        },
    ]);
    let report = run(doc, RunnerOptions::default())?;
    assert_eq!(report.results[0].status, TestStatus::Fail);
    assert_eq!(report.results[1].status, TestStatus::Pass);
    assert_eq!(report.summary.failed, 1);
    assert_eq!(report.summary.passed, 1);
    Ok(())
}

#[test]
fn unconditional_skip_records_reason() -> Result<(), Box<dyn std::error::Error>> {
    let mut doc = base_contract();
    doc["tests"] = json!([{
        "id": "T001",
        "skip": "flaky on CI",
        "assert": [{ "op": "eq", "actual": 1, "expected": 2 }],
    }]);
    let report = run(doc, RunnerOptions::default())?;
    assert_eq!(report.results[0].status, TestStatus::Skipped);
    assert!(report.results[0].message.contains("flaky on CI"));
    // Skipped tests still carry an always-present assertions list.
    assert!(report.results[0].assertions.is_empty());
    Ok(())
}

#[test]
fn guard_expression_skips_without_running_steps() -> Result<(), Box<dyn std::error::Error>> {
    let mut doc = base_contract();
    doc["vars"] = json!({ "fast": true });
    doc["tests"] = json!([{
        "id": "T001",
        "skip_if": "vars.fast == true",
        "steps": [{ "action": "call", "save_as": "result" }],
        "assert": [{ "op": "eq", "actual": "$.result.ok", "expected": true }],
    }]);
    let report = run(doc, RunnerOptions::default())?;
    assert_eq!(report.results[0].status, TestStatus::Skipped);
    assert!(report.results[0].steps.is_empty());
    Ok(())
}

#[test]
fn malformed_guard_marks_the_test_as_error() -> Result<(), Box<dyn std::error::Error>> {
    let mut doc = base_contract();
    doc["tests"] = json!([
        { "id": "T001", "skip_if": "steps.result == 1" },
        { "id": "T002", "assert": [{ "op": "eq", "actual": 1, "expected": 1 }] },
    ]);
    let report = run(doc, RunnerOptions::default())?;
    assert_eq!(report.results[0].status, TestStatus::Error);
    assert!(report.results[0].message.contains("Guard expression error"));
    // The run continues past the error state.
    assert_eq!(report.results[1].status, TestStatus::Pass);
    Ok(())
}

#[test]
fn unsupported_action_aborts_the_owning_test() -> Result<(), Box<dyn std::error::Error>> {
    let mut doc = base_contract();
    doc["tests"] = json!([{
        "id": "T001",
        "steps": [{ "action": "render_nrt" }],
        "assert": [{ "op": "eq", "actual": 1, "expected": 1 }],
    }]);
    let report = run(doc, RunnerOptions::default())?;
    assert_eq!(report.results[0].status, TestStatus::Error);
    assert_eq!(
        report.results[0].steps[0].error_code.as_deref(),
        Some("invalid_action")
    );
    Ok(())
}

#[test]
fn fail_fast_stops_after_the_first_failing_test() -> Result<(), Box<dyn std::error::Error>> {
    let mut doc = base_contract();
    doc["tests"] = json!([
        { "id": "T001", "assert": [{ "op": "eq", "actual": 1, "expected": 2 }] },
        { "id": "T002", "assert": [{ "op": "eq", "actual": 1, "expected": 1 }] },
    ]);
    let options = RunnerOptions {
        fail_fast: true,
        ..RunnerOptions::default()
    };
    let report = run(doc, options)?;
    // The second test is never started and never recorded.
    assert_eq!(report.results.len(), 1);
    assert_eq!(report.results[0].status, TestStatus::Fail);
    assert_eq!(report.summary.failed, 1);
    assert_eq!(report.summary.passed, 0);
    Ok(())
}

#[test]
fn only_filter_selects_tests_by_id() -> Result<(), Box<dyn std::error::Error>> {
    let mut doc = base_contract();
    doc["tests"] = json!([
        { "id": "T001", "assert": [{ "op": "eq", "actual": 1, "expected": 1 }] },
        { "id": "T002", "assert": [{ "op": "eq", "actual": 1, "expected": 2 }] },
    ]);
    let options = RunnerOptions {
        only_test_ids: vec![TestId::new("T001")],
        ..RunnerOptions::default()
    };
    let report = run(doc, options)?;
    assert_eq!(report.results.len(), 1);
    assert_eq!(report.results[0].id, TestId::new("T001"));
    Ok(())
}

#[test]
fn environment_facts_are_visible_to_guards() -> Result<(), Box<dyn std::error::Error>> {
    let mut doc = base_contract();
    doc["tests"] = json!([{
        "id": "T001",
        "skip_if": "env.os_family != 'linux' and env.os_family != 'darwin' and env.os_family != 'windows' and env.os_family != 'unknown'",
        "assert": [],
    }]);
    let report = run(doc, RunnerOptions::default())?;
    // The family is always one of the closed set, so the guard is false.
    assert_eq!(report.results[0].status, TestStatus::Pass);
    Ok(())
}

#[test]
fn one_executor_serves_every_test_and_tears_down_once() -> Result<(), Box<dyn std::error::Error>>
{
    let mut doc = base_contract();
    doc["tests"] = json!([
        {
            "id": "T001",
            "steps": [{ "action": "call", "save_as": "first" }],
            "assert": [{ "op": "eq", "actual": "$.first.ok", "expected": true }],
        },
        {
            "id": "T002",
            "steps": [{ "action": "call", "save_as": "second" }],
            "assert": [{ "op": "eq", "actual": "$.second.ok", "expected": true }],
        },
        {
            "id": "T003",
            "steps": [{ "action": "call", "save_as": "third" }],
            "assert": [{ "op": "eq", "actual": "$.third.ok", "expected": true }],
        },
    ]);
    let factory = CountingFactory {
        created: Arc::new(AtomicUsize::new(0)),
        executed: Arc::new(AtomicUsize::new(0)),
        teardowns: Arc::new(AtomicUsize::new(0)),
    };

    let dir = tempfile::tempdir()?;
    let options = RunnerOptions {
        artifacts_root: dir.path().to_path_buf(),
        ..RunnerOptions::default()
    };
    let orchestrator = RunOrchestrator::new(&factory, options);
    let report = orchestrator.run_contract(
        &contract(doc),
        &dir.path().join("contracts").join("sample.yaml"),
        &RunId::new("run_test0002"),
        None,
    )?;

    // One backend instance is borrowed per test in turn, then torn down.
    assert_eq!(report.summary.passed, 3);
    assert_eq!(factory.created.load(Ordering::SeqCst), 1);
    assert_eq!(factory.executed.load(Ordering::SeqCst), 3);
    assert_eq!(factory.teardowns.load(Ordering::SeqCst), 1);
    Ok(())
}

#[test]
fn report_carries_schema_and_contract_header() -> Result<(), Box<dyn std::error::Error>> {
    let report = run(base_contract(), RunnerOptions::default())?;
    assert_eq!(report.schema_version, verdict_core::REPORT_SCHEMA_VERSION);
    assert_eq!(report.contract, "io_core");
    assert_eq!(report.contract_version.as_deref(), Some("1.2.0"));
    assert!(!report.artifacts_dir.is_empty());
    Ok(())
}
