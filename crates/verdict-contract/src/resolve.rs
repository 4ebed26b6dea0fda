// crates/verdict-contract/src/resolve.rs
// ============================================================================
// Module: Verdict Contract Resolution
// Description: `extends` chain resolution with field-specific merge rules.
// Purpose: Produce the effective contract a run and lint operate on.
// Dependencies: verdict-core, thiserror, crate::load
// ============================================================================

//! ## Overview
//! A contract may name a parent via `extends` (a path relative to its own
//! file). Resolution walks the chain parent-first and merges each level:
//! requirement and test lists concatenate parent-then-child with child
//! entries overriding parent entries sharing an identifier, input and
//! output declarations override by name, the runner configuration merges
//! key-by-key, and every other field is replaced wholesale when the child
//! sets it. The merge is idempotent: resolving an already-effective
//! document is a no-op.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;

use thiserror::Error;

use verdict_core::ContractDoc;
use verdict_core::IoDecl;
use verdict_core::RequirementSpec;
use verdict_core::ResolvedContract;
use verdict_core::RunnerSpec;
use verdict_core::TestSpec;

use crate::load::LoadError;
use crate::load::load_document;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while resolving an `extends` chain.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// Loading a document in the chain failed.
    #[error(transparent)]
    Load(#[from] LoadError),
    /// A contract names a parent that cannot be found.
    #[error("{child} extends missing parent '{parent}'")]
    MissingParent {
        /// The child contract file.
        child: PathBuf,
        /// The declared parent reference.
        parent: String,
    },
    /// The `extends` chain loops back on itself.
    #[error("extends cycle through {path}")]
    Cycle {
        /// The file visited twice.
        path: PathBuf,
    },
}

// ============================================================================
// SECTION: Resolution
// ============================================================================

/// Resolves a contract file through its `extends` chain.
///
/// # Errors
///
/// Returns [`ResolveError`] when a document cannot be loaded, a parent is
/// missing, or the chain is cyclic.
pub fn resolve_contract(path: &Path) -> Result<ResolvedContract, ResolveError> {
    let mut visiting = Vec::new();
    let doc = resolve_document(path, &mut visiting)?;
    Ok(ResolvedContract::from_doc(doc))
}

/// Resolves one document, recursing into its parent chain first.
fn resolve_document(path: &Path, visiting: &mut Vec<PathBuf>) -> Result<ContractDoc, ResolveError> {
    let marker = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
    if visiting.contains(&marker) {
        return Err(ResolveError::Cycle { path: marker });
    }
    visiting.push(marker);

    let doc = load_document(path)?;
    let resolved = match &doc.extends {
        None => doc,
        Some(reference) => {
            let parent_path = path
                .parent()
                .unwrap_or_else(|| Path::new("."))
                .join(reference);
            if !parent_path.is_file() {
                return Err(ResolveError::MissingParent {
                    child: path.to_path_buf(),
                    parent: reference.clone(),
                });
            }
            let parent = resolve_document(&parent_path, visiting)?;
            merge_documents(&parent, &doc)
        }
    };

    visiting.pop();
    Ok(resolved)
}

// ============================================================================
// SECTION: Merge Rules
// ============================================================================

/// Merges a child document over its resolved parent.
///
/// The result carries no `extends` reference; resolution consumes the
/// chain.
#[must_use]
pub fn merge_documents(parent: &ContractDoc, child: &ContractDoc) -> ContractDoc {
    ContractDoc {
        contract: child.contract.clone().or_else(|| parent.contract.clone()),
        version: child.version.clone().or_else(|| parent.version.clone()),
        status: child.status.or(parent.status),
        description: child
            .description
            .clone()
            .or_else(|| parent.description.clone()),
        extends: None,
        runner: merge_runner(parent.runner.as_ref(), child.runner.as_ref()),
        vars: if child.vars.is_empty() {
            parent.vars.clone()
        } else {
            child.vars.clone()
        },
        inputs: merge_keyed(&parent.inputs, &child.inputs, |decl: &IoDecl| {
            decl.name.clone()
        }),
        outputs: merge_keyed(&parent.outputs, &child.outputs, |decl: &IoDecl| {
            decl.name.clone()
        }),
        requirements: merge_keyed(
            &parent.requirements,
            &child.requirements,
            |requirement: &RequirementSpec| requirement.id.as_str().to_string(),
        ),
        tests: merge_keyed(&parent.tests, &child.tests, |test: &TestSpec| {
            test.id.as_str().to_string()
        }),
        matrix: child.matrix.clone().or_else(|| parent.matrix.clone()),
    }
}

/// Concatenates parent-then-child with child override by key.
///
/// Overriding entries keep the parent's position; new child entries append
/// in declaration order.
fn merge_keyed<T, K>(parent: &[T], child: &[T], key: K) -> Vec<T>
where
    T: Clone,
    K: Fn(&T) -> String,
{
    let mut merged = parent.to_vec();
    for entry in child {
        let entry_key = key(entry);
        match merged.iter().position(|existing| key(existing) == entry_key) {
            Some(index) => merged[index] = entry.clone(),
            None => merged.push(entry.clone()),
        }
    }
    merged
}

/// Merges runner configurations key-by-key; child keys replace parent
/// keys, unspecified child keys retain parent values.
fn merge_runner(parent: Option<&RunnerSpec>, child: Option<&RunnerSpec>) -> Option<RunnerSpec> {
    match (parent, child) {
        (None, None) => None,
        (Some(only), None) | (None, Some(only)) => Some(only.clone()),
        (Some(parent), Some(child)) => {
            let mut env = parent.env.clone();
            env.extend(child.env.clone());
            let mut extra = parent.extra.clone();
            extra.extend(child.extra.clone());
            Some(RunnerSpec {
                executor: child.executor.or(parent.executor),
                entry: child.entry.clone().or_else(|| parent.entry.clone()),
                symbol: child.symbol.clone().or_else(|| parent.symbol.clone()),
                timeout_ms: child.timeout_ms.or(parent.timeout_ms),
                env,
                parser: child.parser.clone().or_else(|| parent.parser.clone()),
                extra,
            })
        }
    }
}
