// crates/verdict-executors/src/audio.rs
// ============================================================================
// Module: Verdict Audio Render Executor
// Description: Stub backend for the render_nrt step action.
// Purpose: Reserve the audio-render kind while always reporting
//          not-implemented envelopes.
// Dependencies: verdict-core
// ============================================================================

//! Stub audio backend. Accepts `render_nrt` steps and always returns a
//! not-implemented envelope in this version.

use verdict_core::Executor;
use verdict_core::ExecutorError;
use verdict_core::RunContext;
use verdict_core::RunnerSpec;
use verdict_core::StepAction;
use verdict_core::StepEnvelope;
use verdict_core::StepSpec;
use verdict_core::TestId;

/// The stub audio-render backend.
#[derive(Debug, Default)]
pub struct AudioRenderExecutor;

impl Executor for AudioRenderExecutor {
    fn supports(&self, action: StepAction) -> bool {
        matches!(action, StepAction::RenderNrt)
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
        StepEnvelope::not_implemented(format!(
            "audio-render backend does not yet implement '{}'",
            step.action.as_str()
        ))
    }

    fn teardown(&mut self, _ctx: &RunContext, _runner: &RunnerSpec) -> Result<(), ExecutorError> {
        Ok(())
    }
}
