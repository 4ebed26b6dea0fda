// crates/verdict-core/src/lib.rs
// ============================================================================
// Module: Verdict Core
// Description: Data model, interfaces, and runtime for contract-driven tests.
// Purpose: Provide the engine that turns contract documents into run reports.
// Dependencies: serde, serde_json, regex, glob, sha2, skip-logic, thiserror, time
// ============================================================================

//! ## Overview
//! Verdict executes declarative test contracts: it resolves path references
//! against a per-run context, evaluates guard expressions for conditional
//! skipping, dispatches steps to pluggable executor backends, applies a
//! fixed assertion-operator set, expands matrix declarations into
//! independent runs, and assembles strictly shaped JSON reports.
//! Invariants:
//! - Assertion and guard evaluation is total; malformed inputs become
//!   tagged failing records or error-state tests, never panics.
//! - Reports come in exactly two tagged shapes (`single`, `matrix`), and a
//!   matrix summary never embeds full per-run results.
//! - The context store is private per run; matrix bindings never share it.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use crate::core::context::ContextStore;
pub use crate::core::contract::AssertionSpec;
pub use crate::core::contract::ContractDoc;
pub use crate::core::contract::ContractStatus;
pub use crate::core::contract::ExecutorKind;
pub use crate::core::contract::IoDecl;
pub use crate::core::contract::MatrixSpec;
pub use crate::core::contract::Priority;
pub use crate::core::contract::RequirementSpec;
pub use crate::core::contract::ResolvedContract;
pub use crate::core::contract::RunnerSpec;
pub use crate::core::contract::StepAction;
pub use crate::core::contract::StepSpec;
pub use crate::core::contract::TestSpec;
pub use crate::core::contract::TestType;
pub use crate::core::envelope::CallStats;
pub use crate::core::envelope::StepEnvelope;
pub use crate::core::identifiers::ContractId;
pub use crate::core::identifiers::RequirementId;
pub use crate::core::identifiers::RunId;
pub use crate::core::identifiers::TestId;
pub use crate::core::report::AssertionRecord;
pub use crate::core::report::Diagnostic;
pub use crate::core::report::MatrixReport;
pub use crate::core::report::REPORT_SCHEMA_VERSION;
pub use crate::core::report::RunReport;
pub use crate::core::report::RunSummary;
pub use crate::core::report::TargetStatus;
pub use crate::core::report::TargetSummary;
pub use crate::core::report::TestRecord;
pub use crate::core::report::TestStatus;
pub use crate::interfaces::DiscoveryError;
pub use crate::interfaces::Executor;
pub use crate::interfaces::ExecutorError;
pub use crate::interfaces::ExecutorFactory;
pub use crate::interfaces::MatrixDiscovery;
pub use crate::interfaces::RunContext;
pub use crate::runtime::matrix::BindingOutcome;
pub use crate::runtime::matrix::BindingRun;
pub use crate::runtime::matrix::MatrixBinding;
pub use crate::runtime::matrix::MatrixError;
pub use crate::runtime::matrix::MatrixOptions;
pub use crate::runtime::runner::RunOrchestrator;
pub use crate::runtime::runner::RunnerError;
pub use crate::runtime::runner::RunnerOptions;
