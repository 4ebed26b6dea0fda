// crates/verdict-contract/src/coverage.rs
// ============================================================================
// Module: Verdict Requirement Coverage
// Description: Linked-test counting over effective contracts.
// Purpose: Report which requirements have test coverage.
// Dependencies: serde, verdict-core, crate::load, crate::resolve
// ============================================================================

//! ## Overview
//! Coverage counts linked tests per requirement over the effective
//! (parent-merged) contracts under a path. Tests without a `requirement`
//! back-reference are excluded from coverage; they still run and can still
//! fail a run. Unreadable or unresolvable documents are skipped here, they
//! are lint's concern.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::path::Path;

use serde::Serialize;

use crate::load::LoadError;
use crate::load::collect_contract_files;
use crate::load::is_contract_document;
use crate::load::load_raw;
use crate::resolve::resolve_contract;

// ============================================================================
// SECTION: Report Shapes
// ============================================================================

/// Coverage of one requirement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequirementCoverage {
    /// Requirement identifier.
    pub id: String,
    /// Number of tests linked to the requirement.
    pub linked_tests: usize,
}

/// Coverage over every contract under a path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoverageReport {
    /// Per-requirement coverage, sorted by identifier.
    pub requirements: Vec<RequirementCoverage>,
    /// Requirements with zero linked tests.
    pub uncovered_count: usize,
    /// Total requirements seen.
    pub total_count: usize,
}

impl CoverageReport {
    /// Returns whether every requirement has at least one linked test.
    #[must_use]
    pub const fn is_covered(&self) -> bool {
        self.uncovered_count == 0
    }
}

// ============================================================================
// SECTION: Computation
// ============================================================================

/// Computes requirement coverage over the contracts under a path.
///
/// # Errors
///
/// Returns [`LoadError`] when the path itself cannot be read; individual
/// malformed documents are skipped.
pub fn compute_coverage(path: &Path) -> Result<CoverageReport, LoadError> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();

    for file in collect_contract_files(path)? {
        let Ok(raw) = load_raw(&file) else {
            continue;
        };
        if !is_contract_document(&raw) {
            continue;
        }
        let Ok(resolved) = resolve_contract(&file) else {
            continue;
        };

        for requirement in &resolved.doc.requirements {
            counts.entry(requirement.id.as_str().to_string()).or_insert(0);
        }
        for test in &resolved.doc.tests {
            if let Some(requirement) = &test.requirement {
                if let Some(count) = counts.get_mut(requirement.as_str()) {
                    *count += 1;
                }
            }
        }
    }

    let requirements: Vec<RequirementCoverage> = counts
        .into_iter()
        .map(|(id, linked_tests)| RequirementCoverage { id, linked_tests })
        .collect();
    let uncovered_count = requirements
        .iter()
        .filter(|coverage| coverage.linked_tests == 0)
        .count();
    let total_count = requirements.len();

    Ok(CoverageReport {
        requirements,
        uncovered_count,
        total_count,
    })
}
