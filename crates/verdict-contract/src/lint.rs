// crates/verdict-contract/src/lint.rs
// ============================================================================
// Module: Verdict Contract Lint
// Description: Structural validation and coverage gates for contract files.
// Purpose: Reject malformed contracts before any run starts.
// Dependencies: serde, serde_yaml, skip-logic, verdict-core, crate::load,
//               crate::resolve
// ============================================================================

//! ## Overview
//! Lint runs in two passes per file. The structural pass inspects the raw
//! YAML value so a missing key becomes a coded diagnostic instead of a
//! deserialization failure. The effective pass resolves the `extends`
//! chain and applies the status-dependent gates: a frozen contract fails
//! when any effective requirement has zero linked tests or when any
//! `skip_if` guard does not parse; draft contracts get warnings for the
//! same findings. `--strict` promotes warnings to failures.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::path::Path;

use serde::Serialize;

use verdict_core::ContractDoc;
use verdict_core::ContractStatus;
use verdict_core::Diagnostic;

use crate::load::collect_contract_files;
use crate::load::is_project_document;
use crate::load::load_raw;
use crate::resolve::resolve_contract;

// ============================================================================
// SECTION: Options and Report
// ============================================================================

/// Options controlling lint severity.
#[derive(Debug, Clone, Copy, Default)]
pub struct LintOptions {
    /// Treat warnings as failures.
    pub strict: bool,
}

/// Outcome of linting one path.
#[derive(Debug, Clone, Serialize)]
pub struct LintReport {
    /// Whether the path passes under the given options.
    pub ok: bool,
    /// Findings that always fail lint.
    pub errors: Vec<Diagnostic>,
    /// Findings that fail lint only under `strict`.
    pub warnings: Vec<Diagnostic>,
    /// Number of contract documents inspected.
    pub contracts_checked: usize,
}

/// Required top-level keys of a contract document.
const REQUIRED_FIELDS: [&str; 7] = [
    "contract",
    "version",
    "status",
    "description",
    "runner",
    "requirements",
    "tests",
];

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// Lints every contract document under a path.
#[must_use]
pub fn lint_path(path: &Path, options: &LintOptions) -> LintReport {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();
    let mut contracts_checked = 0;

    match collect_contract_files(path) {
        Err(source) => {
            errors.push(Diagnostic::new("path_not_found", source.to_string()));
        }
        Ok(files) => {
            for file in files {
                lint_file(&file, &mut errors, &mut warnings, &mut contracts_checked);
            }
        }
    }

    let ok = errors.is_empty() && (!options.strict || warnings.is_empty());
    LintReport {
        ok,
        errors,
        warnings,
        contracts_checked,
    }
}

// ============================================================================
// SECTION: Per-File Passes
// ============================================================================

/// Lints one file: structural pass first, effective pass second.
fn lint_file(
    path: &Path,
    errors: &mut Vec<Diagnostic>,
    warnings: &mut Vec<Diagnostic>,
    contracts_checked: &mut usize,
) {
    let raw = match load_raw(path) {
        Ok(raw) => raw,
        Err(source) => {
            errors.push(Diagnostic::new("yaml_parse_error", source.to_string()));
            return;
        }
    };
    if is_project_document(&raw) {
        return;
    }
    *contracts_checked += 1;

    if !raw.is_mapping() {
        errors.push(Diagnostic::new(
            "invalid_yaml",
            format!("{}: document must be a mapping", path.display()),
        ));
        return;
    }

    let structural_before = errors.len();
    lint_structure(path, &raw, errors);
    if errors.len() > structural_before {
        // The effective pass would only repeat the structural findings.
        return;
    }

    match resolve_contract(path) {
        Ok(resolved) => lint_effective(path, &resolved.doc, errors, warnings),
        Err(source) => {
            errors.push(Diagnostic::new("extends_error", source.to_string()));
        }
    }
}

/// Checks required keys and field shapes on the raw document.
fn lint_structure(path: &Path, raw: &serde_yaml::Value, errors: &mut Vec<Diagnostic>) {
    for field in REQUIRED_FIELDS {
        if raw.get(field).is_none() {
            errors.push(Diagnostic::new(
                "missing_field",
                format!("{}: missing required field '{field}'", path.display()),
            ));
        }
    }

    if let Some(status) = raw.get("status") {
        let valid = status
            .as_str()
            .is_some_and(|name| matches!(name, "draft" | "frozen" | "deprecated"));
        if !valid {
            errors.push(Diagnostic::new(
                "invalid_status",
                format!("{}: status must be draft|frozen|deprecated", path.display()),
            ));
        }
    }

    if let Some(runner) = raw.get("runner") {
        if !runner.is_mapping() {
            errors.push(Diagnostic::new(
                "invalid_runner",
                format!("{}: runner must be a mapping", path.display()),
            ));
        } else if runner.get("executor").is_none() {
            errors.push(Diagnostic::new(
                "missing_executor",
                format!("{}: runner.executor is required", path.display()),
            ));
        }
    }

    if raw.get("requirements").is_some_and(|reqs| !reqs.is_sequence()) {
        errors.push(Diagnostic::new(
            "invalid_requirements",
            format!("{}: requirements must be a sequence", path.display()),
        ));
    }
    if raw.get("tests").is_some_and(|tests| !tests.is_sequence()) {
        errors.push(Diagnostic::new(
            "invalid_tests",
            format!("{}: tests must be a sequence", path.display()),
        ));
    }
}

/// Applies field and coverage gates to the effective document.
fn lint_effective(
    path: &Path,
    doc: &ContractDoc,
    errors: &mut Vec<Diagnostic>,
    warnings: &mut Vec<Diagnostic>,
) {
    let frozen = doc.status == Some(ContractStatus::Frozen);

    for requirement in &doc.requirements {
        for (field, present) in [
            ("priority", requirement.priority.is_some()),
            ("description", requirement.description.is_some()),
            (
                "acceptance_criteria",
                !requirement.acceptance_criteria.is_empty(),
            ),
        ] {
            if !present {
                errors.push(Diagnostic::new(
                    "missing_field",
                    format!(
                        "{}: requirement {} missing '{field}'",
                        path.display(),
                        requirement.id.as_str()
                    ),
                ));
            }
        }
    }

    let mut linked: BTreeSet<&str> = BTreeSet::new();
    for test in &doc.tests {
        for (field, present) in [
            ("name", test.name.is_some()),
            ("type", test.test_type.is_some()),
            ("assert", !test.assertions.is_empty()),
        ] {
            if !present {
                errors.push(Diagnostic::new(
                    "missing_field",
                    format!(
                        "{}: test {} missing '{field}'",
                        path.display(),
                        test.id.as_str()
                    ),
                ));
            }
        }

        match &test.requirement {
            Some(requirement) => {
                linked.insert(requirement.as_str());
            }
            None => {
                if frozen {
                    warnings.push(Diagnostic::new(
                        "unlinked_test",
                        format!(
                            "{}: test {} has no requirement link",
                            path.display(),
                            test.id.as_str()
                        ),
                    ));
                }
            }
        }

        if let Some(guard) = &test.skip_if {
            if let Err(source) = skip_logic::parse_expr(guard) {
                let finding = Diagnostic::new(
                    "invalid_guard",
                    format!(
                        "{}: test {} skip_if does not parse: {source}",
                        path.display(),
                        test.id.as_str()
                    ),
                );
                // Frozen contracts fail closed; drafts surface it at run time.
                if frozen {
                    errors.push(finding);
                } else {
                    warnings.push(finding);
                }
            }
        }
    }

    for requirement in &doc.requirements {
        if !linked.contains(requirement.id.as_str()) {
            let finding = Diagnostic::new(
                "uncovered_requirement",
                format!(
                    "{}: requirement {} has no linked tests",
                    path.display(),
                    requirement.id.as_str()
                ),
            );
            if frozen {
                errors.push(finding);
            } else {
                warnings.push(finding);
            }
        }
    }
}
