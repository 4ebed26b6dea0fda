// crates/verdict-core/src/runtime/runner.rs
// ============================================================================
// Module: Verdict Run Orchestrator
// Description: Sequences tests, steps, skip logic, and assertions for one run.
// Purpose: Turn an effective contract plus a variable binding into a run report.
// Dependencies: skip-logic, serde_json, thiserror, crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! One orchestrator call executes one contract under one variable binding.
//! Tests run sequentially; within a test, steps run strictly in declared
//! order so `save_as` bindings are visible to later assertions. A per-test
//! timeout bounds the sum of all step durations. Configuration errors abort
//! only the owning test; errors never cross test boundaries.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;
use std::time::Instant;

use serde_json::Map;
use serde_json::Value;
use serde_json::json;
use thiserror::Error;

use crate::core::context::ContextStore;
use crate::core::contract::ContractDoc;
use crate::core::contract::ExecutorKind;
use crate::core::contract::ResolvedContract;
use crate::core::contract::RunnerSpec;
use crate::core::contract::StepAction;
use crate::core::contract::StepSpec;
use crate::core::contract::TestSpec;
use crate::core::contract::TestType;
use crate::core::envelope::StepEnvelope;
use crate::core::identifiers::RunId;
use crate::core::identifiers::TestId;
use crate::core::report::AssertionRecord;
use crate::core::report::REPORT_SCHEMA_VERSION;
use crate::core::report::RunReport;
use crate::core::report::RunSummary;
use crate::core::report::TestRecord;
use crate::core::report::TestStatus;
use crate::core::time::elapsed_ms;
use crate::core::time::now_rfc3339;
use crate::interfaces::Executor;
use crate::interfaces::ExecutorFactory;
use crate::interfaces::RunContext;
use crate::runtime::assertions::run_assertions;
use crate::runtime::scan::run_file_scan;

/// Default per-test timeout when the runner configuration sets none.
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

// ============================================================================
// SECTION: Options and Errors
// ============================================================================

/// Options controlling one orchestrator call.
#[derive(Debug, Clone)]
pub struct RunnerOptions {
    /// Root directory for per-run artifacts.
    pub artifacts_root: PathBuf,
    /// Variables injected from the caller; contract vars override them.
    pub injected_vars: Map<String, Value>,
    /// When non-empty, only these test identifiers execute.
    pub only_test_ids: Vec<TestId>,
    /// Stop executing tests after the first failure or error.
    pub fail_fast: bool,
    /// Version string of the invoking tool, stamped into reports.
    pub tool_version: String,
}

impl Default for RunnerOptions {
    fn default() -> Self {
        Self {
            artifacts_root: PathBuf::from("artifacts"),
            injected_vars: Map::new(),
            only_test_ids: Vec::new(),
            fail_fast: false,
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Errors that prevent a run from starting at all.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum RunnerError {
    /// The run's artifacts directory could not be created.
    #[error("failed to create artifacts directory {path}: {source}")]
    Artifacts {
        /// The directory that could not be created.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
}

// ============================================================================
// SECTION: Environment Facts
// ============================================================================

/// Maps the build-time OS name onto the closed family set.
fn os_family() -> &'static str {
    match std::env::consts::OS {
        "linux" => "linux",
        "macos" => "darwin",
        "windows" => "windows",
        _ => "unknown",
    }
}

/// Parses a semantic version string into a numeric triple, zero-filling
/// missing components.
fn parse_semver(version: &str) -> (u64, u64, u64) {
    let mut parts = version.trim().split('.');
    let mut next = || {
        parts
            .next()
            .and_then(|part| part.parse::<u64>().ok())
            .unwrap_or(0)
    };
    (next(), next(), next())
}

/// Builds the closed set of environment facts exposed to `skip_if`.
#[must_use]
pub fn environment_facts(tool_version: &str) -> Map<String, Value> {
    let (major, minor, patch) = parse_semver(tool_version);
    let mut env = Map::new();
    env.insert(
        "os".to_string(),
        json!(format!("{}-{}", std::env::consts::OS, std::env::consts::ARCH)),
    );
    env.insert("os_family".to_string(), json!(os_family()));
    env.insert("tool_major".to_string(), json!(major));
    env.insert("tool_minor".to_string(), json!(minor));
    env.insert("tool_patch".to_string(), json!(patch));
    env
}

// ============================================================================
// SECTION: Orchestrator
// ============================================================================

/// Error codes that classify a step failure as fatal to its owning test.
const FATAL_STEP_CODES: &[&str] = &[
    "invalid_action",
    "missing_call_target",
    "missing_command",
    "static_no_steps",
    "timeout",
];

/// Executes one contract's tests under one variable binding.
pub struct RunOrchestrator<'f> {
    /// Creates executor backends per run.
    factory: &'f dyn ExecutorFactory,
    /// Call options.
    options: RunnerOptions,
}

impl<'f> RunOrchestrator<'f> {
    /// Creates an orchestrator over an executor factory.
    #[must_use]
    pub fn new(factory: &'f dyn ExecutorFactory, options: RunnerOptions) -> Self {
        Self {
            factory,
            options,
        }
    }

    /// Runs a contract and assembles its report body.
    ///
    /// `binding` carries the matrix variable bound for this run, when any.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError`] when the artifacts directory cannot be
    /// created; everything else is captured inside the report.
    pub fn run_contract(
        &self,
        contract: &ResolvedContract,
        contract_path: &Path,
        run_id: &RunId,
        binding: Option<(&str, &Value)>,
    ) -> Result<RunReport, RunnerError> {
        let started_at = now_rfc3339();
        let start = Instant::now();
        let doc = &contract.doc;

        let artifacts_dir = self
            .options
            .artifacts_root
            .join(run_id.as_str())
            .join(doc.contract_name());
        std::fs::create_dir_all(&artifacts_dir).map_err(|source| RunnerError::Artifacts {
            path: artifacts_dir.clone(),
            source,
        })?;

        let runner_spec = doc.runner.clone().unwrap_or_default();
        let ctx = self.build_context(contract, contract_path, &artifacts_dir, run_id, binding);

        let results = self.run_tests(doc, &runner_spec, contract_path, &ctx);
        let summary = RunSummary::tally(&results);

        Ok(RunReport {
            schema_version: REPORT_SCHEMA_VERSION.to_string(),
            report_type: "single".to_string(),
            contract: doc.contract_name().to_string(),
            contract_version: doc.version.clone(),
            run_id: run_id.clone(),
            tool_version: self.options.tool_version.clone(),
            started_at,
            duration_ms: elapsed_ms(start),
            warnings: Vec::new(),
            errors: Vec::new(),
            summary,
            results,
            artifacts_dir: artifacts_dir.display().to_string(),
        })
    }

    /// Builds the run context snapshot shared by all of the run's tests.
    fn build_context(
        &self,
        contract: &ResolvedContract,
        contract_path: &Path,
        artifacts_dir: &Path,
        run_id: &RunId,
        binding: Option<(&str, &Value)>,
    ) -> RunContext {
        let doc = &contract.doc;

        let mut vars = self.options.injected_vars.clone();
        for (key, value) in &doc.vars {
            vars.insert(key.clone(), value.clone());
        }
        if let Some((name, value)) = binding {
            vars.insert(name.to_string(), value.clone());
        }

        let mut runner = Map::new();
        runner.insert("tool_version".to_string(), json!(self.options.tool_version));
        runner.insert("fail_fast".to_string(), json!(self.options.fail_fast));
        runner.insert("run_id".to_string(), json!(run_id.as_str()));

        let mut meta = Map::new();
        meta.insert("contract".to_string(), json!(doc.contract_name()));
        meta.insert("version".to_string(), json!(doc.version));
        meta.insert(
            "status".to_string(),
            doc.status.and_then(|s| serde_json::to_value(s).ok()).unwrap_or(Value::Null),
        );
        meta.insert("path".to_string(), json!(contract_path.display().to_string()));
        meta.insert("effective_requirements".to_string(), json!(contract.effective_requirements));
        meta.insert("effective_tests".to_string(), json!(contract.effective_tests));

        RunContext {
            artifacts_dir: artifacts_dir.to_path_buf(),
            work_dir: contract_path.parent().unwrap_or(Path::new(".")).to_path_buf(),
            run_id: run_id.clone(),
            vars,
            env: environment_facts(&self.options.tool_version),
            runner,
            contract: meta,
        }
    }

    /// Runs every selected test, honoring fail-fast.
    fn run_tests(
        &self,
        doc: &ContractDoc,
        runner_spec: &RunnerSpec,
        contract_path: &Path,
        ctx: &RunContext,
    ) -> Vec<TestRecord> {
        let timeout_ms = runner_spec.timeout_ms.unwrap_or(DEFAULT_TIMEOUT_MS);
        let is_static = runner_spec.executor == Some(ExecutorKind::Static);

        // The static backend populates $.ast once per contract; it executes
        // no steps.
        let ast = is_static.then(|| static_ast_blob(runner_spec, contract_path));

        let mut executor = if is_static {
            None
        } else {
            match self.factory.create(runner_spec) {
                Ok(mut backend) => match backend.setup(ctx, runner_spec) {
                    Ok(()) => Some(backend),
                    Err(err) => {
                        return vec![infrastructure_error(
                            "EXECUTOR",
                            format!("Executor setup failed: {err}"),
                        )];
                    }
                },
                Err(err) => {
                    return vec![infrastructure_error("EXECUTOR", err.to_string())];
                }
            }
        };

        let mut results = Vec::new();
        for test in &doc.tests {
            if !self.options.only_test_ids.is_empty()
                && !self.options.only_test_ids.contains(&test.id)
            {
                continue;
            }

            let record = self.run_test(test, executor.as_deref_mut(), runner_spec, ctx, timeout_ms, ast.as_ref());
            let stop = self.options.fail_fast
                && matches!(record.status, TestStatus::Fail | TestStatus::Error);
            results.push(record);
            if stop {
                break;
            }
        }

        if let Some(mut backend) = executor {
            if backend.teardown(ctx, runner_spec).is_err() {
                results.push(infrastructure_error("TEARDOWN", "Executor teardown failed"));
            }
        }
        results
    }

    /// Runs one test end to end.
    fn run_test(
        &self,
        test: &TestSpec,
        executor: Option<&mut (dyn Executor + '_)>,
        runner_spec: &RunnerSpec,
        ctx: &RunContext,
        timeout_ms: u64,
        ast: Option<&Value>,
    ) -> TestRecord {
        let start = Instant::now();

        if let Some(reason) = &test.skip {
            return finished(test, TestStatus::Skipped, format!("Skipped: {reason}"), start);
        }
        if let Some(expression) = &test.skip_if {
            match evaluate_guard(expression, ctx) {
                Ok(true) => {
                    return finished(
                        test,
                        TestStatus::Skipped,
                        format!("Skipped by guard: {expression}"),
                        start,
                    );
                }
                Ok(false) => {}
                Err(reason) => {
                    return finished(
                        test,
                        TestStatus::Error,
                        format!("Guard expression error: {reason}"),
                        start,
                    );
                }
            }
        }

        // Static file-scan tests bypass the step machinery entirely.
        if test.test_type == Some(TestType::Static)
            && let Some(files) = &test.files
        {
            return self.run_scan_test(test, files, ctx, start);
        }

        let (steps, saved, abort) = match executor {
            Some(backend) if !test.steps.is_empty() => {
                self.execute_steps(backend, runner_spec, ctx, &test.id, &test.steps, timeout_ms)
            }
            Some(_) | None => {
                if ast.is_some() && !test.steps.is_empty() {
                    return finished(
                        test,
                        TestStatus::Error,
                        "Static tests must have no steps".to_string(),
                        start,
                    );
                }
                (Vec::new(), Map::new(), None)
            }
        };

        if let Some(message) = abort {
            let mut record = finished(test, TestStatus::Error, message, start);
            record.steps = steps;
            return record;
        }

        let context = assertion_context(ctx, &steps, &saved, ast);
        let assertions = run_assertions(&context, &test.assertions, &ctx.work_dir);
        let (status, message) = status_from_assertions(&assertions);

        let mut record = finished(test, status, message, start);
        record.assertions = assertions;
        record.steps = steps;
        record
    }

    /// Runs a static file-scan test.
    fn run_scan_test(
        &self,
        test: &TestSpec,
        files: &Value,
        ctx: &RunContext,
        start: Instant,
    ) -> TestRecord {
        let outcome = run_file_scan(files, &test.assertions, &ctx.work_dir, &ctx.vars);
        let (status, message) = match (&outcome.error, outcome.failures.is_empty()) {
            (Some(error), _) => (TestStatus::Error, error.clone()),
            (None, true) => (
                TestStatus::Pass,
                format!("Scanned {} files", outcome.files_scanned),
            ),
            (None, false) => (
                TestStatus::Fail,
                format!(
                    "{} failures in {} files",
                    outcome.failures.len(),
                    outcome.files_scanned
                ),
            ),
        };
        let mut record = finished(test, status, message, start);
        record.assertions = outcome.failures;
        record.files_scanned = Some(outcome.files_scanned);
        record
    }

    /// Executes a test's steps under the shared timeout budget.
    ///
    /// Returns the envelopes, the `save_as` bindings, and an abort message
    /// when a fatal step error ended the test early.
    fn execute_steps(
        &self,
        executor: &mut dyn Executor,
        runner_spec: &RunnerSpec,
        ctx: &RunContext,
        test_id: &TestId,
        steps: &[StepSpec],
        timeout_ms: u64,
    ) -> (Vec<StepEnvelope>, Map<String, Value>, Option<String>) {
        let deadline = Instant::now() + Duration::from_millis(timeout_ms);
        let mut envelopes = Vec::new();
        let mut saved = Map::new();

        for step in steps {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                envelopes.push(StepEnvelope::failure(
                    "timeout",
                    format!("Test exceeded {timeout_ms}ms budget"),
                ));
                return (envelopes, saved, Some(format!("Timeout: test exceeded {timeout_ms}ms")));
            }

            let mut envelope = if step.action == StepAction::Wait {
                execute_wait(step, remaining)
            } else if executor.supports(step.action) {
                let step_start = Instant::now();
                let mut produced = executor.execute_step(
                    ctx,
                    runner_spec,
                    test_id,
                    step,
                    u64::try_from(remaining.as_millis()).unwrap_or(u64::MAX),
                );
                produced.record_duration_ms(elapsed_ms(step_start));
                produced
            } else {
                StepEnvelope::failure(
                    "invalid_action",
                    format!("Action not supported: {}", step.action.as_str()),
                )
            };
            envelope.record_duration_ms(0);

            let fatal = envelope
                .error_code
                .as_deref()
                .is_some_and(|code| FATAL_STEP_CODES.contains(&code));
            let abort_message = fatal.then(|| {
                envelope
                    .message
                    .clone()
                    .unwrap_or_else(|| "Step configuration error".to_string())
            });

            if let Some(name) = &step.save_as
                && !step.warmup
            {
                saved.insert(name.clone(), envelope.to_context_value());
            }
            envelopes.push(envelope);

            if let Some(message) = abort_message {
                return (envelopes, saved, Some(message));
            }
        }
        (envelopes, saved, None)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Executes a `wait` step inline, bounded by the remaining budget.
fn execute_wait(step: &StepSpec, remaining: Duration) -> StepEnvelope {
    let seconds = step.seconds.unwrap_or(0.0).max(0.0);
    let requested = Duration::from_secs_f64(seconds);
    if requested > remaining {
        return StepEnvelope::failure(
            "timeout",
            format!("wait of {seconds}s exceeds remaining test budget"),
        );
    }
    let start = Instant::now();
    std::thread::sleep(requested);
    let mut envelope = StepEnvelope::success(Value::Null);
    envelope.meta.insert("wait_s".to_string(), json!(seconds));
    envelope.record_duration_ms(elapsed_ms(start));
    envelope
}

/// Evaluates a `skip_if` guard against the env/vars namespaces.
fn evaluate_guard(expression: &str, ctx: &RunContext) -> Result<bool, String> {
    let expr = skip_logic::parse_expr(expression).map_err(|err| err.to_string())?;
    let context = json!({ "env": ctx.env, "vars": ctx.vars });
    skip_logic::evaluate(&expr, &context).map_err(|err| err.to_string())
}

/// Assembles the context snapshot assertions resolve against.
fn assertion_context(
    ctx: &RunContext,
    steps: &[StepEnvelope],
    saved: &Map<String, Value>,
    ast: Option<&Value>,
) -> Value {
    let mut store = ContextStore::new();
    store.insert("vars", Value::Object(ctx.vars.clone()));
    store.insert("env", Value::Object(ctx.env.clone()));
    store.insert("runner", Value::Object(ctx.runner.clone()));
    store.insert("contract", Value::Object(ctx.contract.clone()));
    store.insert(
        "steps",
        Value::Array(steps.iter().map(StepEnvelope::to_context_value).collect()),
    );
    store.insert("ast", ast.cloned().unwrap_or(Value::Null));
    // Saved bindings sit at the root so `$.name.value` resolves directly.
    for (name, value) in saved {
        store.insert(name.clone(), value.clone());
    }
    store.snapshot()
}

/// Derives a test status from its assertion records.
fn status_from_assertions(records: &[AssertionRecord]) -> (TestStatus, String) {
    if let Some(first) = records.iter().find(|record| record.error.is_some()) {
        let tag = first.error.as_deref().unwrap_or("unknown");
        return (TestStatus::Error, format!("Assertion error: {tag}"));
    }
    if records.iter().any(|record| !record.pass) {
        return (TestStatus::Fail, "One or more assertions failed".to_string());
    }
    (TestStatus::Pass, "All assertions passed".to_string())
}

/// Builds a baseline record for a finished test.
fn finished(test: &TestSpec, status: TestStatus, message: String, start: Instant) -> TestRecord {
    TestRecord {
        id: test.id.clone(),
        name: test.display_name().to_string(),
        requirement: test.requirement.clone(),
        test_type: test.test_type,
        status,
        message,
        assertions: Vec::new(),
        steps: Vec::new(),
        duration_ms: Some(elapsed_ms(start)),
        files_scanned: None,
    }
}

/// Builds the error record used when run infrastructure fails.
fn infrastructure_error(id: &str, message: impl Into<String>) -> TestRecord {
    TestRecord {
        id: TestId::new(id),
        name: String::new(),
        requirement: None,
        test_type: None,
        status: TestStatus::Error,
        message: message.into(),
        assertions: Vec::new(),
        steps: Vec::new(),
        duration_ms: None,
        files_scanned: None,
    }
}

/// Builds the stub `$.ast` blob for the static backend.
fn static_ast_blob(runner_spec: &RunnerSpec, contract_path: &Path) -> Value {
    json!({
        "schema_version": "1.0",
        "calls": [],
        "bus_reads": {},
        "source_included": false,
        "parser": runner_spec.parser,
        "contract_file": contract_path.display().to_string(),
    })
}
