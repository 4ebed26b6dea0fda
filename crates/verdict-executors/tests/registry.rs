// crates/verdict-executors/tests/registry.rs
// ============================================================================
// Module: Executor Registry Tests
// Description: Validate kind dispatch and the step-rejecting backends.
// Purpose: Ensure the factory hands out the right backend per kind.
// Dependencies: verdict-executors, verdict-core, serde_json
// ============================================================================

//! Registry dispatch and stub-backend behavior tests.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

use serde_json::Map;
use serde_json::json;
use verdict_core::ExecutorError;
use verdict_core::ExecutorFactory;
use verdict_core::RunContext;
use verdict_core::RunId;
use verdict_core::RunnerSpec;
use verdict_core::StepAction;
use verdict_core::StepSpec;
use verdict_core::TestId;
use verdict_executors::ExecutorRegistry;

fn context() -> RunContext {
    RunContext {
        artifacts_dir: std::env::temp_dir(),
        work_dir: std::env::temp_dir(),
        run_id: RunId::new("run_rg000001"),
        vars: Map::new(),
        env: Map::new(),
        runner: Map::new(),
        contract: Map::new(),
    }
}

fn runner_for(kind: &str) -> RunnerSpec {
    serde_json::from_value(json!({ "executor": kind })).unwrap()
}

#[test]
fn each_kind_maps_to_a_backend_with_its_capability() {
    let registry = ExecutorRegistry::new();
    for (kind, action, supported) in [
        ("function", StepAction::Call, true),
        ("function", StepAction::Shell, false),
        ("process", StepAction::Shell, true),
        ("process", StepAction::CallN, false),
        ("audio-render", StepAction::RenderNrt, true),
        ("static", StepAction::Call, false),
    ] {
        let backend = registry.create(&runner_for(kind)).unwrap();
        assert_eq!(
            backend.supports(action),
            supported,
            "kind {kind} action {}",
            action.as_str()
        );
    }
}

#[test]
fn missing_kind_is_a_configuration_error() {
    let registry = ExecutorRegistry::new();
    let err = registry.create(&RunnerSpec::default()).err().unwrap();
    assert!(matches!(err, ExecutorError::Configuration(_)));
}

#[test]
fn static_backend_rejects_any_step() {
    let registry = ExecutorRegistry::new();
    let mut backend = registry.create(&runner_for("static")).unwrap();
    let step: StepSpec = serde_json::from_value(json!({ "action": "call" })).unwrap();
    let envelope = backend.execute_step(
        &context(),
        &runner_for("static"),
        &TestId::new("T001"),
        &step,
        1_000,
    );
    assert!(!envelope.ok);
    assert_eq!(envelope.error_code.as_deref(), Some("static_no_steps"));
}

#[test]
fn audio_backend_always_reports_not_implemented() {
    let registry = ExecutorRegistry::new();
    let mut backend = registry.create(&runner_for("audio-render")).unwrap();
    let step: StepSpec = serde_json::from_value(json!({ "action": "render_nrt" })).unwrap();
    let envelope = backend.execute_step(
        &context(),
        &runner_for("audio-render"),
        &TestId::new("T001"),
        &step,
        1_000,
    );
    assert!(!envelope.ok);
    assert_eq!(envelope.error_code.as_deref(), Some("not_implemented"));
}
