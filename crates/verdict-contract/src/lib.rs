// crates/verdict-contract/src/lib.rs
// ============================================================================
// Module: Verdict Contract
// Description: Contract loading, `extends` resolution, lint, and coverage.
// Purpose: Everything that happens to a contract document before a run.
// Dependencies: serde, serde_yaml, skip-logic, thiserror, verdict-core
// ============================================================================

//! ## Overview
//! This crate owns the pre-run half of the contract lifecycle: discovering
//! and parsing YAML documents, resolving `extends` chains into effective
//! contracts with field-specific merge rules, and the lint and coverage
//! gates the CLI exposes. The runtime engine in `verdict-core` consumes
//! only the effective [`verdict_core::ResolvedContract`] this crate
//! produces.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod coverage;
pub mod lint;
pub mod load;
pub mod resolve;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use crate::coverage::CoverageReport;
pub use crate::coverage::RequirementCoverage;
pub use crate::coverage::compute_coverage;
pub use crate::lint::LintOptions;
pub use crate::lint::LintReport;
pub use crate::lint::lint_path;
pub use crate::load::LoadError;
pub use crate::load::collect_contract_files;
pub use crate::load::load_document;
pub use crate::resolve::ResolveError;
pub use crate::resolve::merge_documents;
pub use crate::resolve::resolve_contract;
