// crates/verdict-contract/src/load.rs
// ============================================================================
// Module: Verdict Contract Loading
// Description: YAML document discovery and parsing for contract files.
// Purpose: Turn filesystem paths into typed contract documents.
// Dependencies: serde_yaml, thiserror, verdict-core
// ============================================================================

//! ## Overview
//! Loading is deliberately two-phase: a raw YAML value first, the typed
//! document second. Lint consumes the raw value to report missing keys as
//! structured diagnostics; the runtime consumes the typed document.
//! Directory discovery collects `*.yaml` files recursively in sorted order
//! so lint and coverage output is stable across platforms.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io;
use std::path::Path;
use std::path::PathBuf;

use thiserror::Error;

use verdict_core::ContractDoc;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while discovering or parsing contract files.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The given path does not exist.
    #[error("path not found: {path}")]
    NotFound {
        /// The missing path.
        path: PathBuf,
    },
    /// Reading a file or directory failed.
    #[error("failed to read {path}: {source}")]
    Io {
        /// The path being read.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
    /// The file is not well-formed YAML or does not fit the document shape.
    #[error("failed to parse {path}: {source}")]
    Parse {
        /// The file being parsed.
        path: PathBuf,
        /// Underlying parse error.
        source: serde_yaml::Error,
    },
}

impl LoadError {
    fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

// ============================================================================
// SECTION: Discovery
// ============================================================================

/// Collects contract files under a path.
///
/// A file path yields itself; a directory yields every `*.yaml` file below
/// it, recursively, in sorted order.
///
/// # Errors
///
/// Returns [`LoadError`] when the path does not exist or a directory
/// cannot be read.
pub fn collect_contract_files(path: &Path) -> Result<Vec<PathBuf>, LoadError> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }
    if !path.is_dir() {
        return Err(LoadError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let mut found = Vec::new();
    collect_yaml(path, &mut found)?;
    found.sort();
    Ok(found)
}

/// Recursively gathers `*.yaml` files below `dir`.
fn collect_yaml(dir: &Path, found: &mut Vec<PathBuf>) -> Result<(), LoadError> {
    let entries = std::fs::read_dir(dir).map_err(|source| LoadError::io(dir, source))?;
    for entry in entries {
        let entry = entry.map_err(|source| LoadError::io(dir, source))?;
        let entry_path = entry.path();
        if entry_path.is_dir() {
            collect_yaml(&entry_path, found)?;
        } else if entry_path.extension().is_some_and(|ext| ext == "yaml") {
            found.push(entry_path);
        }
    }
    Ok(())
}

// ============================================================================
// SECTION: Parsing
// ============================================================================

/// Parses a file into a raw YAML value.
///
/// # Errors
///
/// Returns [`LoadError`] when reading or parsing fails.
pub fn load_raw(path: &Path) -> Result<serde_yaml::Value, LoadError> {
    let text = std::fs::read_to_string(path).map_err(|source| LoadError::io(path, source))?;
    serde_yaml::from_str(&text).map_err(|source| LoadError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Returns whether a raw document is a contract document.
///
/// Workspace manifests carry a top-level `project` key instead of
/// `contract`; discovery skips them rather than flagging them.
#[must_use]
pub fn is_contract_document(raw: &serde_yaml::Value) -> bool {
    raw.is_mapping() && raw.get("contract").is_some()
}

/// Returns whether a raw document is a workspace manifest.
#[must_use]
pub fn is_project_document(raw: &serde_yaml::Value) -> bool {
    raw.is_mapping() && raw.get("project").is_some() && raw.get("contract").is_none()
}

/// Parses a file into a typed contract document.
///
/// # Errors
///
/// Returns [`LoadError`] when reading, parsing, or shaping fails.
pub fn load_document(path: &Path) -> Result<ContractDoc, LoadError> {
    let raw = load_raw(path)?;
    serde_yaml::from_value(raw).map_err(|source| LoadError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

// ============================================================================
// SECTION: Tests
// ============================================================================
