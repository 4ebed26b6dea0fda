// crates/verdict-core/src/interfaces/mod.rs
// ============================================================================
// Module: Verdict Interfaces
// Description: Backend-agnostic interfaces for step execution and discovery.
// Purpose: Define the contract surfaces between the runtime and its backends.
// Dependencies: thiserror, serde_json, crate::core
// ============================================================================

//! ## Overview
//! Interfaces define how the runtime talks to executor backends and matrix
//! discovery collaborators without embedding backend-specific details.
//! Executors may be stateful across one contract run (setup/teardown) but
//! must be deterministic for unit and static tests. Step failures travel
//! inside the envelope; only setup and teardown surface hard errors.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::PathBuf;

use serde_json::Map;
use serde_json::Value;
use thiserror::Error;

use crate::core::contract::RunnerSpec;
use crate::core::contract::StepAction;
use crate::core::contract::StepSpec;
use crate::core::envelope::StepEnvelope;
use crate::core::identifiers::RunId;
use crate::core::identifiers::TestId;

// ============================================================================
// SECTION: Run Context
// ============================================================================

/// Canonical runtime context exposed to path references as `$.env`,
/// `$.vars`, `$.runner`, and `$.contract`.
///
/// # Invariants
/// - Private to one run; never shared across matrix bindings.
/// - Values are snapshots; executors must not mutate them.
#[derive(Debug, Clone, PartialEq)]
pub struct RunContext {
    /// Artifacts directory exclusively owned by this run.
    pub artifacts_dir: PathBuf,
    /// Working-directory baseline: the contract's declaring location.
    pub work_dir: PathBuf,
    /// Run identifier.
    pub run_id: RunId,
    /// Injected and contract-declared variables.
    pub vars: Map<String, Value>,
    /// Environment facts (`os`, `os_family`, tool version triple).
    pub env: Map<String, Value>,
    /// Runner facts (tool version, flags).
    pub runner: Map<String, Value>,
    /// Contract metadata (name, version, status, path).
    pub contract: Map<String, Value>,
}

// ============================================================================
// SECTION: Executor
// ============================================================================

/// Executor errors raised outside step execution.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum ExecutorError {
    /// Backend setup failed before any step ran.
    #[error("executor setup failed: {0}")]
    Setup(String),
    /// Backend teardown failed after the last step.
    #[error("executor teardown failed: {0}")]
    Teardown(String),
    /// No backend is registered for the requested kind.
    #[error("no executor registered for kind '{kind}'")]
    UnknownKind {
        /// The requested kind's wire name.
        kind: String,
    },
    /// The runner configuration is missing a required field.
    #[error("executor configuration error: {0}")]
    Configuration(String),
}

/// Backend capability abstraction for running one step.
pub trait Executor: Send {
    /// Returns whether this backend handles the given action.
    fn supports(&self, action: StepAction) -> bool;

    /// Called once per contract run before the first step.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutorError`] when the backend cannot initialize.
    fn setup(&mut self, ctx: &RunContext, runner: &RunnerSpec) -> Result<(), ExecutorError>;

    /// Executes a single step and returns its envelope.
    ///
    /// Failures are carried inside the envelope (`ok = false` with an error
    /// code), never as a hard error; `timeout_ms` is the remaining share of
    /// the owning test's budget.
    fn execute_step(
        &mut self,
        ctx: &RunContext,
        runner: &RunnerSpec,
        test_id: &TestId,
        step: &StepSpec,
        timeout_ms: u64,
    ) -> StepEnvelope;

    /// Called once per contract run after the last step.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutorError`] when the backend cannot shut down cleanly.
    fn teardown(&mut self, ctx: &RunContext, runner: &RunnerSpec) -> Result<(), ExecutorError>;
}

/// Creates executors by kind; matrix bindings get independent instances.
pub trait ExecutorFactory: Sync {
    /// Creates a fresh executor for the runner configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutorError::UnknownKind`] for unregistered kinds and
    /// [`ExecutorError::Configuration`] when the configuration names no kind.
    fn create(&self, runner: &RunnerSpec) -> Result<Box<dyn Executor>, ExecutorError>;
}

// ============================================================================
// SECTION: Matrix Discovery
// ============================================================================

/// Discovery errors for matrix dimension resolution.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// The contract references a dimension the collaborator cannot resolve.
    #[error("unknown matrix dimension '{0}'")]
    UnknownDimension(String),
    /// The collaborator failed while resolving a dimension.
    #[error("matrix discovery failed: {0}")]
    Failed(String),
}

/// External collaborator resolving a discoverable matrix dimension.
///
/// Resolved once, before any test executes. Any collaborator-held state is
/// scoped to a single top-level orchestration call: `init` runs before the
/// first `discover` and `teardown` runs after the matrix completes.
pub trait MatrixDiscovery {
    /// Prepares collaborator state for one orchestration call.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError`] when initialization fails.
    fn init(&mut self) -> Result<(), DiscoveryError> {
        Ok(())
    }

    /// Resolves a dimension into its value set.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError`] when the dimension is unknown or
    /// resolution fails.
    fn discover(&mut self, dimension: &str) -> Result<Vec<Value>, DiscoveryError>;

    /// Releases collaborator state after the matrix completes.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError`] when release fails.
    fn teardown(&mut self) -> Result<(), DiscoveryError> {
        Ok(())
    }
}
