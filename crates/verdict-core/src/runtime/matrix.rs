// crates/verdict-core/src/runtime/matrix.rs
// ============================================================================
// Module: Verdict Matrix Controller
// Description: Parameterized run expansion, scheduling, and fail-fast control.
// Purpose: Expand one contract into independent runs and aggregate outcomes.
// Dependencies: serde_json, thiserror, crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! A matrix declaration expands a contract into one independent run per
//! bound value, either from an explicit list or via a discovery
//! collaborator resolved once before any test executes. Bindings share a
//! run-id prefix and carry distinct suffixes so artifact paths never
//! collide. Bindings run on scoped worker threads bounded by a concurrency
//! limit; fail-fast is a cooperative check that stops not-yet-started
//! bindings without interrupting running ones.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Mutex;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use serde_json::Value;
use thiserror::Error;

use crate::core::contract::MatrixSpec;
use crate::core::identifiers::RunId;
use crate::core::report::RunReport;
use crate::interfaces::DiscoveryError;
use crate::interfaces::MatrixDiscovery;

// ============================================================================
// SECTION: Options and Errors
// ============================================================================

/// Options controlling matrix scheduling.
#[derive(Debug, Clone)]
pub struct MatrixOptions {
    /// Stop not-yet-started bindings after the first failing binding.
    pub fail_fast: bool,
    /// Maximum concurrently running bindings; at least one.
    pub jobs: usize,
}

impl Default for MatrixOptions {
    fn default() -> Self {
        Self {
            fail_fast: false,
            jobs: 1,
        }
    }
}

/// Errors raised while expanding a matrix declaration.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum MatrixError {
    /// The declaration names neither explicit values nor a dimension.
    #[error("matrix for '{var}' declares no values and no discovery dimension")]
    EmptyDeclaration {
        /// The declared matrix variable.
        var: String,
    },
    /// Discovery resolved the dimension to an empty value set.
    #[error("matrix dimension '{dimension}' resolved to no values")]
    EmptyDimension {
        /// The discovery dimension.
        dimension: String,
    },
    /// The discovery collaborator failed.
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),
}

// ============================================================================
// SECTION: Bindings
// ============================================================================

/// One parameter binding expanded from a matrix declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct MatrixBinding {
    /// The variable name bound for this run.
    pub var: String,
    /// The bound value.
    pub value: Value,
    /// Display label derived from the value.
    pub label: String,
    /// Run identifier: shared prefix plus a distinct suffix.
    pub run_id: RunId,
}

/// Renders a bound value as a display label.
fn value_label(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Expands a matrix declaration into its bindings.
///
/// Explicit values win over discovery; the discovery collaborator is
/// consulted only when the value list is empty, and exactly once.
///
/// # Errors
///
/// Returns [`MatrixError`] when the declaration is empty or discovery
/// fails; discovery teardown runs even on the error path.
pub fn expand_bindings(
    spec: &MatrixSpec,
    discovery: Option<&mut dyn MatrixDiscovery>,
    run_prefix: &RunId,
) -> Result<Vec<MatrixBinding>, MatrixError> {
    let values = if spec.values.is_empty() {
        let Some(dimension) = &spec.discover else {
            return Err(MatrixError::EmptyDeclaration {
                var: spec.var.clone(),
            });
        };
        let Some(collaborator) = discovery else {
            return Err(DiscoveryError::UnknownDimension(dimension.clone()).into());
        };
        collaborator.init()?;
        let resolved = collaborator.discover(dimension);
        collaborator.teardown()?;
        let resolved = resolved?;
        if resolved.is_empty() {
            return Err(MatrixError::EmptyDimension {
                dimension: dimension.clone(),
            });
        }
        resolved
    } else {
        spec.values.clone()
    };

    Ok(values
        .into_iter()
        .enumerate()
        .map(|(index, value)| {
            let label = value_label(&value);
            let run_id = RunId::new(format!("{}_{:02}", run_prefix.as_str(), index + 1));
            MatrixBinding {
                var: spec.var.clone(),
                value,
                label,
                run_id,
            }
        })
        .collect())
}

// ============================================================================
// SECTION: Scheduling
// ============================================================================

/// Outcome of one binding within a matrix.
#[derive(Debug, Clone, PartialEq)]
pub enum BindingOutcome {
    /// The binding ran to completion.
    Completed(RunReport),
    /// Fail-fast stopped the matrix before this binding started.
    NotAttempted,
}

/// A binding paired with its outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct BindingRun {
    /// The expanded binding.
    pub binding: MatrixBinding,
    /// What happened to it.
    pub outcome: BindingOutcome,
}

/// Runs every binding through `run_one`, honoring concurrency and fail-fast.
///
/// `run_one` executes one full contract run for a binding; it is called
/// from worker threads and must not share mutable state across bindings.
/// Outcomes return in declaration order regardless of completion order.
pub fn run_matrix<F>(
    bindings: Vec<MatrixBinding>,
    options: &MatrixOptions,
    run_one: F,
) -> Vec<BindingRun>
where
    F: Fn(&MatrixBinding) -> RunReport + Sync,
{
    let stop = AtomicBool::new(false);
    let next = AtomicUsize::new(0);
    let slots: Mutex<Vec<Option<BindingOutcome>>> = Mutex::new(vec![None; bindings.len()]);
    let workers = options.jobs.max(1).min(bindings.len().max(1));

    std::thread::scope(|scope| {
        for _ in 0 .. workers {
            scope.spawn(|| {
                loop {
                    let index = next.fetch_add(1, Ordering::SeqCst);
                    if index >= bindings.len() {
                        break;
                    }
                    // Cooperative fail-fast: bindings already running are
                    // never interrupted, only unstarted ones are stopped.
                    let outcome = if options.fail_fast && stop.load(Ordering::SeqCst) {
                        BindingOutcome::NotAttempted
                    } else {
                        let report = run_one(&bindings[index]);
                        if !report.summary.is_success() {
                            stop.store(true, Ordering::SeqCst);
                        }
                        BindingOutcome::Completed(report)
                    };
                    if let Ok(mut guard) = slots.lock() {
                        guard[index] = Some(outcome);
                    }
                }
            });
        }
    });

    let outcomes = slots
        .into_inner()
        .unwrap_or_else(std::sync::PoisonError::into_inner);
    bindings
        .into_iter()
        .zip(outcomes)
        .map(|(binding, outcome)| BindingRun {
            binding,
            outcome: outcome.unwrap_or(BindingOutcome::NotAttempted),
        })
        .collect()
}
