// crates/verdict-core/src/core/mod.rs
// ============================================================================
// Module: Verdict Core Data Model
// Description: Identifiers, contract shapes, context, envelopes, and reports.
// Purpose: Group the pure data types shared across the runtime and backends.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! The core data model is pure: no I/O, no wall-clock reads outside the
//! time helpers, and no executor-specific detail. Runtime behavior lives in
//! [`crate::runtime`]; backend interfaces live in [`crate::interfaces`].

/// Context store for named run values.
pub mod context;
/// Contract document shapes.
pub mod contract;
/// Step result envelope and call statistics.
pub mod envelope;
/// Opaque identifiers with stable wire forms.
pub mod identifiers;
/// Path resolution and variable interpolation.
pub mod paths;
/// Report document shapes.
pub mod report;
/// Timestamp and duration helpers.
pub mod time;
