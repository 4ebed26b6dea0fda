// crates/verdict-core/tests/paths.rs
// ============================================================================
// Module: Path Resolver Tests
// Description: Validate traversal, absence, mismatch, and interpolation.
// Purpose: Ensure path resolution is pure and never raises for missing data.
// Dependencies: verdict-core, serde_json
// ============================================================================

//! Path resolver behavior tests.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

use serde_json::Value;
use serde_json::json;
use verdict_core::core::paths::PathError;
use verdict_core::core::paths::Resolution;
use verdict_core::core::paths::interpolate_vars;
use verdict_core::core::paths::resolve_path;

fn context() -> Value {
    json!({
        "steps": [
            { "ok": true, "value": { "count": 7 } },
            { "ok": false, "value": null },
        ],
        "vars": { "pack_id": "alpha", "limit": 3 },
        "ast": { "bus_reads": { "bus.main": 2 } },
    })
}

#[test]
fn resolves_dotted_and_indexed_traversal() {
    let resolved = resolve_path(&context(), "$.steps[0].value.count").unwrap();
    assert_eq!(resolved, Resolution::Value(json!(7)));
}

#[test]
fn resolves_quoted_bracket_keys() {
    let resolved = resolve_path(&context(), "$.ast.bus_reads[\"bus.main\"]").unwrap();
    assert_eq!(resolved, Resolution::Value(json!(2)));
    let single = resolve_path(&context(), "$.ast.bus_reads['bus.main']").unwrap();
    assert_eq!(single, Resolution::Value(json!(2)));
}

#[test]
fn missing_segments_resolve_to_absent() {
    assert!(resolve_path(&context(), "$.vars.missing").unwrap().is_absent());
    assert!(resolve_path(&context(), "$.steps[9].ok").unwrap().is_absent());
    assert!(resolve_path(&context(), "$.steps[-1].ok").unwrap().is_absent());
}

#[test]
fn absent_renders_as_typed_null() {
    let value = resolve_path(&context(), "$.vars.missing").unwrap().into_value();
    assert_eq!(value, Value::Null);
}

#[test]
fn key_on_non_mapping_is_a_type_mismatch() {
    let err = resolve_path(&context(), "$.vars.limit.deeper").unwrap_err();
    assert_eq!(err, PathError::TypeMismatch);
    let err = resolve_path(&context(), "$.steps.count").unwrap_err();
    assert_eq!(err, PathError::TypeMismatch);
}

#[test]
fn index_on_non_sequence_is_a_type_mismatch() {
    let err = resolve_path(&context(), "$.vars[0]").unwrap_err();
    assert_eq!(err, PathError::TypeMismatch);
}

#[test]
fn malformed_references_are_invalid_paths() {
    assert_eq!(resolve_path(&context(), "vars.limit").unwrap_err(), PathError::InvalidPath);
    assert_eq!(resolve_path(&context(), "$.steps[0").unwrap_err(), PathError::InvalidPath);
    assert_eq!(resolve_path(&context(), "$.steps[zero]").unwrap_err(), PathError::InvalidPath);
}

#[test]
fn interpolation_replaces_both_reference_styles() {
    let vars = context()["vars"].as_object().unwrap().clone();
    let rendered = interpolate_vars(&json!("packs/{pack_id}/out/$.vars.limit"), &vars);
    assert_eq!(rendered, json!("packs/alpha/out/3"));
}

#[test]
fn interpolation_recurses_through_collections() {
    let vars = context()["vars"].as_object().unwrap().clone();
    let rendered = interpolate_vars(
        &json!({ "globs": ["{pack_id}/*.scd"], "depth": 2 }),
        &vars,
    );
    assert_eq!(rendered, json!({ "globs": ["alpha/*.scd"], "depth": 2 }));
}

#[test]
fn unknown_variables_render_empty() {
    let vars = serde_json::Map::new();
    let rendered = interpolate_vars(&json!("x/{nope}/y"), &vars);
    assert_eq!(rendered, json!("x//y"));
}
