// crates/verdict-core/src/core/context.rs
// ============================================================================
// Module: Verdict Context Store
// Description: Named JSON values accumulated during a single run.
// Purpose: Provide the lookup/insert surface paths and assertions resolve against.
// Dependencies: serde_json
// ============================================================================

//! ## Overview
//! The context store holds the named roots visible to path references:
//! `vars`, `env`, `runner`, `contract`, `steps`, `ast`, plus one root per
//! `save_as` binding. It is private to one run; no run may read another
//! run's store. The store has no behavior beyond lookup and insert.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Map;
use serde_json::Value;

// ============================================================================
// SECTION: Context Store
// ============================================================================

/// Named JSON values accumulated during a run.
///
/// # Invariants
/// - Private per run; never shared across bindings.
/// - Inserting an existing name replaces the previous value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContextStore {
    /// Root object the path resolver traverses.
    roots: Map<String, Value>,
}

impl ContextStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a named root.
    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        self.roots.insert(name.into(), value);
    }

    /// Returns the value at a named root, if present.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.roots.get(name)
    }

    /// Returns the store as a single JSON object for path resolution.
    #[must_use]
    pub fn snapshot(&self) -> Value {
        Value::Object(self.roots.clone())
    }
}

impl From<Map<String, Value>> for ContextStore {
    fn from(roots: Map<String, Value>) -> Self {
        Self {
            roots,
        }
    }
}
