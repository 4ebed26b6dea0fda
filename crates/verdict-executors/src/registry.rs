// crates/verdict-executors/src/registry.rs
// ============================================================================
// Module: Verdict Executor Registry
// Description: Kind-to-backend dispatch behind the executor factory.
// Purpose: Give the orchestrator one place to obtain fresh backends.
// Dependencies: verdict-core, crate::analysis, crate::audio,
//               crate::function, crate::process
// ============================================================================

//! ## Overview
//! The registry maps the closed [`ExecutorKind`] set onto backend
//! implementations. Kinds are added as variants and match arms, never by
//! reflection. Every `create` call returns a fresh backend so matrix
//! bindings never share executor state; the function table itself is
//! shared structure but immutable after registration.

use verdict_core::Executor;
use verdict_core::ExecutorError;
use verdict_core::ExecutorFactory;
use verdict_core::ExecutorKind;
use verdict_core::RunnerSpec;

use crate::analysis::StaticExecutor;
use crate::audio::AudioRenderExecutor;
use crate::function::FunctionExecutor;
use crate::function::FunctionTable;
use crate::process::ProcessExecutor;

/// Factory dispatching runner configurations onto backends.
#[derive(Debug, Default)]
pub struct ExecutorRegistry {
    /// Functions available to the function backend.
    functions: FunctionTable,
}

impl ExecutorRegistry {
    /// Creates a registry with an empty function table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry over a pre-registered function table.
    #[must_use]
    pub fn with_functions(functions: FunctionTable) -> Self {
        Self { functions }
    }
}

impl ExecutorFactory for ExecutorRegistry {
    fn create(&self, runner: &RunnerSpec) -> Result<Box<dyn Executor>, ExecutorError> {
        match runner.executor {
            None => Err(ExecutorError::Configuration(
                "runner.executor is required".to_string(),
            )),
            Some(ExecutorKind::Function) => {
                Ok(Box::new(FunctionExecutor::new(self.functions.clone())))
            }
            Some(ExecutorKind::Process) => Ok(Box::new(ProcessExecutor)),
            Some(ExecutorKind::Static) => Ok(Box::new(StaticExecutor)),
            Some(ExecutorKind::AudioRender) => Ok(Box::new(AudioRenderExecutor)),
        }
    }
}
