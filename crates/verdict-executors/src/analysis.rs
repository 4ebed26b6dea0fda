// crates/verdict-executors/src/analysis.rs
// ============================================================================
// Module: Verdict Static Analysis Executor
// Description: Step-rejecting backend for assertion-only static tests.
// Purpose: Guarantee static contracts operate purely via declared
//          assertions against the pre-populated `$.ast` context.
// Dependencies: verdict-core
// ============================================================================

//! ## Overview
//! The static backend runs no steps by definition: static contracts assert
//! against the `$.ast` analysis blob the orchestrator pre-populates, or
//! scan file contents for `type: static` tests. Any step reaching this
//! backend is a contract authoring error and aborts the owning test.

use verdict_core::Executor;
use verdict_core::ExecutorError;
use verdict_core::RunContext;
use verdict_core::RunnerSpec;
use verdict_core::StepAction;
use verdict_core::StepEnvelope;
use verdict_core::StepSpec;
use verdict_core::TestId;

/// The step-rejecting static backend.
#[derive(Debug, Default)]
pub struct StaticExecutor;

impl Executor for StaticExecutor {
    fn supports(&self, _action: StepAction) -> bool {
        false
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
        StepEnvelope::failure(
            "static_no_steps",
            "Static executor does not execute steps; assert against $.ast or use type: static tests",
        )
    }

    fn teardown(&mut self, _ctx: &RunContext, _runner: &RunnerSpec) -> Result<(), ExecutorError> {
        Ok(())
    }
}
