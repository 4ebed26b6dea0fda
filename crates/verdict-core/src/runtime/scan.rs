// crates/verdict-core/src/runtime/scan.rs
// ============================================================================
// Module: Verdict Static File Scan
// Description: Regex scanning of file contents for static tests.
// Purpose: Evaluate `matches` / `not_matches` assertions against file globs.
// Dependencies: glob, regex, serde_json, crate::core
// ============================================================================

//! ## Overview
//! Static tests declare file globs instead of steps. Each `not_matches`
//! assertion reports one failing record per regex match found, annotated
//! with file, line, and column; each `matches` assertion reports one failing
//! record per file with no match. A test with no matching files is an error
//! state, not a pass.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;

use regex::Regex;
use serde_json::Map;
use serde_json::Value;
use serde_json::json;

use crate::core::contract::AssertionSpec;
use crate::core::paths::interpolate_vars;
use crate::core::report::AssertionRecord;

// ============================================================================
// SECTION: Scan Outcome
// ============================================================================

/// Outcome of scanning one static test's file set.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanOutcome {
    /// Failing assertion records; empty means every check held.
    pub failures: Vec<AssertionRecord>,
    /// Number of files scanned.
    pub files_scanned: usize,
    /// Error description when the scan could not run at all.
    pub error: Option<String>,
}

// ============================================================================
// SECTION: Glob Expansion
// ============================================================================

/// Expands a files declaration (one glob or a list) into sorted paths.
///
/// Variables interpolate into patterns before expansion. Unreadable glob
/// patterns expand to nothing rather than failing the scan.
#[must_use]
pub fn expand_files(files: &Value, base_dir: &Path, vars: &Map<String, Value>) -> Vec<PathBuf> {
    let interpolated = interpolate_vars(files, vars);
    let patterns: Vec<String> = match interpolated {
        Value::String(pattern) => vec![pattern],
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(pattern) => Some(pattern),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    };

    let mut paths = Vec::new();
    for pattern in patterns {
        let anchored = base_dir.join(&pattern);
        let Some(anchored) = anchored.to_str() else {
            continue;
        };
        let Ok(entries) = glob::glob(anchored) else {
            continue;
        };
        for entry in entries.flatten() {
            if entry.is_file() {
                paths.push(entry);
            }
        }
    }
    paths.sort();
    paths.dedup();
    paths
}

// ============================================================================
// SECTION: Content Scanning
// ============================================================================

/// Runs scan assertions against one file's content, collecting failures.
fn scan_content(path: &Path, content: &str, specs: &[AssertionSpec]) -> Vec<AssertionRecord> {
    let mut failures = Vec::new();
    for spec in specs {
        let source = spec
            .pattern
            .clone()
            .or_else(|| match &spec.expected {
                Some(Value::String(text)) => Some(text.clone()),
                _ => None,
            })
            .unwrap_or_default();
        let Ok(regex) = Regex::new(&format!("(?m){source}")) else {
            let mut details = Map::new();
            details.insert("file".to_string(), json!(path.display().to_string()));
            failures.push(
                AssertionRecord::error(
                    spec.op.clone(),
                    Value::Null,
                    json!(format!("valid pattern /{source}/")),
                    "exception",
                )
                .with_details(details)
                .with_message(spec.message.clone()),
            );
            continue;
        };

        match spec.op.as_str() {
            "not_matches" => {
                for found in regex.find_iter(content) {
                    failures.push(
                        match_failure(path, content, &source, found).with_message(spec.message.clone()),
                    );
                }
            }
            "matches" => {
                if !regex.is_match(content) {
                    let mut details = Map::new();
                    details.insert("file".to_string(), json!(path.display().to_string()));
                    failures.push(
                        AssertionRecord::outcome(
                            "matches",
                            Value::Null,
                            json!(format!("match for /{source}/")),
                            false,
                        )
                        .with_details(details)
                        .with_message(spec.message.clone()),
                    );
                }
            }
            _ => {}
        }
    }
    failures
}

/// Builds the failing record for one forbidden-pattern match.
fn match_failure(
    path: &Path,
    content: &str,
    source: &str,
    found: regex::Match<'_>,
) -> AssertionRecord {
    let prefix = &content[.. found.start()];
    let line = prefix.matches('\n').count() + 1;
    let line_start = prefix.rfind('\n').map_or(0, |at| at + 1);
    let column = found.start() - line_start + 1;
    let snippet = content
        .lines()
        .nth(line - 1)
        .map(|text| text.chars().take(200).collect::<String>())
        .unwrap_or_default();

    let mut details = Map::new();
    details.insert("file".to_string(), json!(path.display().to_string()));
    details.insert("line".to_string(), json!(line));
    details.insert("col".to_string(), json!(column));
    details.insert("match".to_string(), json!(found.as_str()));
    details.insert("snippet".to_string(), json!(snippet.trim()));

    AssertionRecord::outcome(
        "not_matches",
        json!(found.as_str()),
        json!(format!("no match for /{source}/")),
        false,
    )
    .with_details(details)
}

// ============================================================================
// SECTION: Test Entry Point
// ============================================================================

/// Runs a static file-scan test: expand globs, scan each file, collect
/// failures.
#[must_use]
pub fn run_file_scan(
    files: &Value,
    specs: &[AssertionSpec],
    base_dir: &Path,
    vars: &Map<String, Value>,
) -> ScanOutcome {
    let paths = expand_files(files, base_dir, vars);
    if paths.is_empty() {
        return ScanOutcome {
            failures: Vec::new(),
            files_scanned: 0,
            error: Some(format!("No files matched: {files}")),
        };
    }

    let mut failures = Vec::new();
    for path in &paths {
        match std::fs::read_to_string(path) {
            Ok(content) => failures.extend(scan_content(path, &content, specs)),
            Err(err) => failures.push(AssertionRecord::error(
                "read",
                json!(path.display().to_string()),
                json!("readable file"),
                err.to_string(),
            )),
        }
    }

    ScanOutcome {
        failures,
        files_scanned: paths.len(),
        error: None,
    }
}
