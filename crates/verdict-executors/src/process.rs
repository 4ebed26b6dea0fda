// crates/verdict-executors/src/process.rs
// ============================================================================
// Module: Verdict Process Executor
// Description: External process backend for the shell step action.
// Purpose: Run argv commands with injected environment, captured streams,
//          and a hard timeout.
// Dependencies: serde_json, verdict-core
// ============================================================================

//! ## Overview
//! The process backend runs one argv command per `shell` step. Commands
//! execute with the working directory fixed to the contract's declaring
//! location and inherit the parent environment plus the runner-declared
//! variables and the standard injected set (`VERDICT_CONTRACT`,
//! `VERDICT_RUN_ID`, `VERDICT_ARTIFACTS_DIR`). Variable references in the
//! command are interpolated before spawning. Stdout and stderr are
//! captured into the envelope; a nonzero exit becomes `nonzero_exit` and
//! exceeding the remaining test budget kills the child with `timeout`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Read;
use std::process::Command;
use std::process::Stdio;
use std::time::Duration;
use std::time::Instant;

use serde_json::Value;
use serde_json::json;

use verdict_core::Executor;
use verdict_core::ExecutorError;
use verdict_core::RunContext;
use verdict_core::RunnerSpec;
use verdict_core::StepAction;
use verdict_core::StepEnvelope;
use verdict_core::StepSpec;
use verdict_core::TestId;
use verdict_core::core::paths::interpolate_vars;

/// Poll interval while waiting for the child to exit.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

// ============================================================================
// SECTION: Executor
// ============================================================================

/// The external-process backend.
#[derive(Debug, Default)]
pub struct ProcessExecutor;

impl Executor for ProcessExecutor {
    fn supports(&self, action: StepAction) -> bool {
        matches!(action, StepAction::Shell)
    }

    fn setup(&mut self, ctx: &RunContext, _runner: &RunnerSpec) -> Result<(), ExecutorError> {
        std::fs::create_dir_all(&ctx.artifacts_dir)
            .map_err(|source| ExecutorError::Setup(source.to_string()))
    }

    fn execute_step(
        &mut self,
        ctx: &RunContext,
        runner: &RunnerSpec,
        _test_id: &TestId,
        step: &StepSpec,
        timeout_ms: u64,
    ) -> StepEnvelope {
        let Some(command) = step.command.as_deref().filter(|argv| !argv.is_empty()) else {
            return StepEnvelope::failure(
                "missing_command",
                "shell action requires a non-empty 'command' field",
            );
        };
        let argv: Vec<String> = command
            .iter()
            .map(|arg| render_argument(arg, ctx))
            .collect();

        let mut invocation = Command::new(&argv[0]);
        invocation
            .args(&argv[1 ..])
            .current_dir(&ctx.work_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        for (key, value) in &runner.env {
            invocation.env(key, render_env_value(value));
        }
        invocation
            .env("VERDICT_CONTRACT", contract_name(ctx))
            .env("VERDICT_RUN_ID", ctx.run_id.as_str())
            .env("VERDICT_ARTIFACTS_DIR", &ctx.artifacts_dir);

        let started = Instant::now();
        let mut child = match invocation.spawn() {
            Ok(child) => child,
            Err(source) => {
                return StepEnvelope::failure(
                    "exception",
                    format!("failed to spawn '{}': {source}", argv[0]),
                );
            }
        };

        // Pipes are drained on their own threads so a chatty child cannot
        // fill the pipe buffer and deadlock against the exit poll.
        let stdout_reader = child.stdout.take().map(drain_on_thread);
        let stderr_reader = child.stderr.take().map(drain_on_thread);

        let deadline = started + Duration::from_millis(timeout_ms);
        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) => {
                    if Instant::now() >= deadline {
                        let _ = child.kill();
                        let _ = child.wait();
                        return StepEnvelope::failure(
                            "timeout",
                            format!("Command timed out after {timeout_ms}ms"),
                        );
                    }
                    std::thread::sleep(POLL_INTERVAL);
                }
                Err(source) => {
                    return StepEnvelope::failure(
                        "exception",
                        format!("failed to wait for '{}': {source}", argv[0]),
                    );
                }
            }
        };

        let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        let returncode = status.code().unwrap_or(-1);
        let mut envelope = if status.success() {
            StepEnvelope::success(json!({ "returncode": returncode }))
        } else {
            let mut failed =
                StepEnvelope::failure("nonzero_exit", format!("Exit code: {returncode}"));
            failed.value = json!({ "returncode": returncode });
            failed
        };
        envelope.stdout = stdout_reader.map(join_reader).unwrap_or_default();
        envelope.stderr = stderr_reader.map(join_reader).unwrap_or_default();
        envelope.record_duration_ms(duration_ms);
        envelope
    }

    fn teardown(&mut self, _ctx: &RunContext, _runner: &RunnerSpec) -> Result<(), ExecutorError> {
        Ok(())
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Interpolates `{var}` and `$.vars.name` references in one argument.
fn render_argument(argument: &str, ctx: &RunContext) -> String {
    match interpolate_vars(&Value::String(argument.to_string()), &ctx.vars) {
        Value::String(rendered) => rendered,
        other => other.to_string(),
    }
}

/// Renders a runner-declared environment value as a string.
fn render_env_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Returns the contract identifier from the context metadata.
fn contract_name(ctx: &RunContext) -> String {
    ctx.contract
        .get("contract")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Drains a pipe to a string on a dedicated thread.
fn drain_on_thread<R>(mut pipe: R) -> std::thread::JoinHandle<String>
where
    R: Read + Send + 'static,
{
    std::thread::spawn(move || {
        let mut captured = String::new();
        let _ = pipe.read_to_string(&mut captured);
        captured
    })
}

/// Joins a reader thread, tolerating a panicked reader.
fn join_reader(handle: std::thread::JoinHandle<String>) -> String {
    handle.join().unwrap_or_default()
}
