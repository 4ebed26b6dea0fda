// crates/verdict-core/src/runtime/mod.rs
// ============================================================================
// Module: Verdict Runtime
// Description: Assertion engine, orchestrator, matrix controller, reports.
// Purpose: Group the execution machinery that turns contracts into reports.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! The runtime sequences one contract run end to end: guard evaluation,
//! step dispatch through an executor backend, assertion evaluation, matrix
//! expansion, and report assembly. All shapes it produces live in
//! [`crate::core`].

/// Fixed-operator assertion evaluation.
pub mod assertions;
/// Matrix expansion and fail-fast scheduling.
pub mod matrix;
/// Report validation, aggregation, and persistence.
pub mod report;
/// The per-run orchestrator.
pub mod runner;
/// Static file-content scanning.
pub mod scan;
