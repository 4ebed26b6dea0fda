// crates/verdict-core/src/core/identifiers.rs
// ============================================================================
// Module: Verdict Identifiers
// Description: Canonical opaque identifiers for contracts, tests, and runs.
// Purpose: Provide strongly typed, serializable identifiers with stable wire forms.
// Dependencies: serde, sha2
// ============================================================================

//! ## Overview
//! This module defines the canonical identifiers used throughout Verdict.
//! Identifiers are opaque UTF-8 strings that serialize transparently on the
//! wire. Run identifiers are derived deterministically from a seed so that
//! two runs of the same contract at the same instant share an identifier.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use sha2::Digest;
use sha2::Sha256;

// ============================================================================
// SECTION: Identifier Types
// ============================================================================

/// Contract identifier declared in a contract document.
///
/// # Invariants
/// - Opaque UTF-8 string; no normalization or validation is applied by this type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContractId(String);

impl ContractId {
    /// Creates a new contract identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContractId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Requirement identifier declared in a contract document.
///
/// # Invariants
/// - Opaque UTF-8 string; uniqueness within a contract is enforced by lint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequirementId(String);

impl RequirementId {
    /// Creates a new requirement identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequirementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Test identifier declared in a contract document.
///
/// # Invariants
/// - Opaque UTF-8 string; uniqueness within a contract is enforced by lint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TestId(String);

impl TestId {
    /// Creates a new test identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Run identifier assigned to a single contract execution.
///
/// # Invariants
/// - Derived identifiers are deterministic for a given seed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(String);

impl RunId {
    /// Creates a run identifier from an existing string.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Derives a run identifier from a seed string.
    ///
    /// The identifier is `run_` followed by the first ten hex characters of
    /// the SHA-256 digest of the seed. Callers include the contract path and
    /// a timestamp in the seed so concurrent runs stay distinguishable.
    #[must_use]
    pub fn derive(seed: &str) -> Self {
        let digest = Sha256::digest(seed.as_bytes());
        let mut hex = String::with_capacity(10);
        for byte in digest.iter().take(5) {
            hex.push_str(&format!("{byte:02x}"));
        }
        Self(format!("run_{hex}"))
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, reason = "Test-only assertions are permitted.")]

    use super::*;

    #[test]
    fn run_id_derivation_is_deterministic() {
        let first = RunId::derive("contracts/io.yaml@2026-01-01T00:00:00Z");
        let second = RunId::derive("contracts/io.yaml@2026-01-01T00:00:00Z");
        assert_eq!(first, second);
        assert!(first.as_str().starts_with("run_"));
        assert_eq!(first.as_str().len(), "run_".len() + 10);
    }

    #[test]
    fn identifiers_serialize_transparently() {
        let id = TestId::new("t_checksum");
        let wire = serde_json::to_string(&id).unwrap();
        assert_eq!(wire, "\"t_checksum\"");
    }
}
