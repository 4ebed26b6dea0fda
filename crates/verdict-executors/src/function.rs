// crates/verdict-executors/src/function.rs
// ============================================================================
// Module: Verdict Function Executor
// Description: In-process call and call_n backend over a registered table.
// Purpose: Run named functions synchronously with watchdog timeouts and
//          aggregate repeated invocations into timing statistics.
// Dependencies: serde_json, verdict-core
// ============================================================================

//! ## Overview
//! The function backend invokes named closures from a [`FunctionTable`]
//! registered at process start. Call-target resolution is two-level: a
//! per-step `method` wins over the runner-level `symbol`; absence of both
//! is a configuration error that aborts the owning test. Every invocation
//! runs under a supervising watchdog bounded by the remaining test budget.
//! `call_n` collects per-call durations for successful calls only and
//! surfaces the first failure's diagnostics at the top of the envelope.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::mpsc;
use std::time::Duration;
use std::time::Instant;

use serde_json::Map;
use serde_json::Value;

use verdict_core::CallStats;
use verdict_core::Executor;
use verdict_core::ExecutorError;
use verdict_core::RunContext;
use verdict_core::RunnerSpec;
use verdict_core::StepAction;
use verdict_core::StepEnvelope;
use verdict_core::StepSpec;
use verdict_core::TestId;

// ============================================================================
// SECTION: Function Table
// ============================================================================

/// A registered step function: keyword arguments in, payload or error out.
pub type StepFn = Arc<dyn Fn(&Map<String, Value>) -> Result<Value, String> + Send + Sync>;

/// Named functions available to the function backend.
///
/// Registered once at process start; cloned per matrix binding so runs
/// never share executor state.
#[derive(Clone, Default)]
pub struct FunctionTable {
    /// Registered functions keyed by symbol name.
    functions: BTreeMap<String, StepFn>,
}

impl FunctionTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a function under a symbol name, replacing any previous one.
    pub fn register<F>(&mut self, symbol: impl Into<String>, function: F)
    where
        F: Fn(&Map<String, Value>) -> Result<Value, String> + Send + Sync + 'static,
    {
        self.functions.insert(symbol.into(), Arc::new(function));
    }

    /// Looks up a registered function.
    #[must_use]
    pub fn get(&self, symbol: &str) -> Option<StepFn> {
        self.functions.get(symbol).cloned()
    }

    /// Returns the registered symbol names in sorted order.
    #[must_use]
    pub fn symbols(&self) -> Vec<&str> {
        self.functions.keys().map(String::as_str).collect()
    }
}

impl std::fmt::Debug for FunctionTable {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("FunctionTable")
            .field("symbols", &self.symbols())
            .finish()
    }
}

// ============================================================================
// SECTION: Watchdog
// ============================================================================

/// Runs a job on a supervising thread bounded by a timeout.
///
/// Returns `None` on timeout; the worker thread is left to finish and its
/// result is discarded.
fn with_watchdog<T, F>(timeout_ms: u64, job: F) -> Option<T>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    let (sender, receiver) = mpsc::channel();
    std::thread::spawn(move || {
        let _ = sender.send(job());
    });
    receiver.recv_timeout(Duration::from_millis(timeout_ms)).ok()
}

// ============================================================================
// SECTION: Executor
// ============================================================================

/// The in-process function backend.
#[derive(Debug)]
pub struct FunctionExecutor {
    /// Registered functions.
    table: FunctionTable,
    /// Runner-level default call target, captured at setup.
    symbol: Option<String>,
}

impl FunctionExecutor {
    /// Creates a backend over a function table.
    #[must_use]
    pub fn new(table: FunctionTable) -> Self {
        Self {
            table,
            symbol: None,
        }
    }

    /// Resolves the call target: per-step `method` wins over the
    /// runner-level `symbol`.
    fn resolve_target(&self, step: &StepSpec) -> Result<String, StepEnvelope> {
        if let Some(method) = &step.method {
            return Ok(method.clone());
        }
        if let Some(symbol) = &self.symbol {
            return Ok(symbol.clone());
        }
        Err(StepEnvelope::failure(
            "missing_call_target",
            "No call target: set runner.symbol or step.method",
        ))
    }

    /// Looks up the function for a resolved target.
    fn lookup(&self, target: &str) -> Result<StepFn, StepEnvelope> {
        self.table.get(target).ok_or_else(|| {
            StepEnvelope::failure("symbol_not_found", format!("Symbol not found: {target}"))
        })
    }

    /// Executes a single `call` step under the watchdog.
    fn do_call(&self, step: &StepSpec, timeout_ms: u64) -> StepEnvelope {
        let function = match self.resolve_target(step).and_then(|t| self.lookup(&t)) {
            Ok(function) => function,
            Err(envelope) => return envelope,
        };
        let args = step.args.clone();

        let started = Instant::now();
        let outcome = with_watchdog(timeout_ms, move || function(&args));
        let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        let mut envelope = match outcome {
            None => {
                return StepEnvelope::failure(
                    "timeout",
                    format!("Call timed out after {timeout_ms}ms"),
                );
            }
            Some(Err(message)) => StepEnvelope::failure("exception", message),
            Some(Ok(value)) => normalize_return(value),
        };
        envelope.record_duration_ms(duration_ms);
        envelope
    }

    /// Executes a `call_n` step: N invocations aggregated into statistics.
    fn do_call_n(&self, step: &StepSpec, timeout_ms: u64) -> StepEnvelope {
        let n = step.n.unwrap_or(1);
        let function = match self.resolve_target(step).and_then(|t| self.lookup(&t)) {
            Ok(function) => function,
            Err(envelope) => return envelope,
        };
        let args = step.args.clone();

        // The whole batch shares one watchdog bounded by the test budget.
        let outcome = with_watchdog(timeout_ms, move || {
            let mut durations: Vec<f64> = Vec::new();
            let mut first_error: Option<String> = None;
            for _ in 0 .. n {
                let started = Instant::now();
                match function(&args) {
                    Ok(_) => durations.push(started.elapsed().as_secs_f64() * 1000.0),
                    Err(message) => {
                        if first_error.is_none() {
                            first_error = Some(message);
                        }
                    }
                }
            }
            (durations, first_error)
        });

        let Some((durations, first_error)) = outcome else {
            return StepEnvelope::failure(
                "timeout",
                format!("call_n timed out after {timeout_ms}ms"),
            );
        };

        if durations.is_empty() {
            let message = first_error.unwrap_or_else(|| "All iterations failed".to_string());
            let mut envelope = StepEnvelope::failure("exception", message);
            envelope.value = CallStats::from_durations(n, Vec::new()).to_value();
            return envelope;
        }

        let stats = CallStats::from_durations(n, durations);
        match first_error {
            None => StepEnvelope::success(stats.to_value()),
            Some(message) => {
                let mut envelope = StepEnvelope::failure("exception", message);
                envelope.value = stats.to_value();
                envelope
            }
        }
    }
}

/// Normalizes a function's return value into an envelope.
///
/// Objects that carry an `ok` key are treated as envelope-shaped; anything
/// else becomes the payload of a successful envelope.
fn normalize_return(value: Value) -> StepEnvelope {
    match value {
        Value::Object(fields) if fields.contains_key("ok") => {
            let ok = fields.get("ok").and_then(Value::as_bool).unwrap_or(true);
            let meta = fields
                .get("meta")
                .and_then(Value::as_object)
                .cloned()
                .unwrap_or_default();
            StepEnvelope {
                ok,
                value: fields.get("value").cloned().unwrap_or(Value::Null),
                error_code: fields
                    .get("error_code")
                    .and_then(Value::as_str)
                    .map(str::to_string),
                message: fields
                    .get("message")
                    .and_then(Value::as_str)
                    .map(str::to_string),
                meta,
                ..StepEnvelope::default()
            }
        }
        other => StepEnvelope::success(other),
    }
}

impl Executor for FunctionExecutor {
    fn supports(&self, action: StepAction) -> bool {
        matches!(action, StepAction::Call | StepAction::CallN)
    }

    fn setup(&mut self, _ctx: &RunContext, runner: &RunnerSpec) -> Result<(), ExecutorError> {
        self.symbol = runner.symbol.clone();
        Ok(())
    }

    fn execute_step(
        &mut self,
        _ctx: &RunContext,
        _runner: &RunnerSpec,
        _test_id: &TestId,
        step: &StepSpec,
        timeout_ms: u64,
    ) -> StepEnvelope {
        match step.action {
            StepAction::Call => self.do_call(step, timeout_ms),
            StepAction::CallN => self.do_call_n(step, timeout_ms),
            other => StepEnvelope::failure(
                "invalid_action",
                format!("Function backend cannot execute '{}'", other.as_str()),
            ),
        }
    }

    fn teardown(&mut self, _ctx: &RunContext, _runner: &RunnerSpec) -> Result<(), ExecutorError> {
        self.symbol = None;
        Ok(())
    }
}
