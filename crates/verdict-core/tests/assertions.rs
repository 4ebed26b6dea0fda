// crates/verdict-core/tests/assertions.rs
// ============================================================================
// Module: Assertion Engine Tests
// Description: Validate the fixed operator set and its error tagging.
// Purpose: Ensure assertion evaluation is total and tags mismatches stably.
// Dependencies: verdict-core, serde_json, tempfile
// ============================================================================

//! Assertion engine behavior tests.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

use std::path::Path;

use serde_json::Value;
use serde_json::json;
use verdict_core::core::contract::AssertionSpec;
use verdict_core::core::report::AssertionRecord;
use verdict_core::runtime::assertions::run_assertions;

fn context() -> Value {
    json!({
        "result": {
            "value": { "a": 1, "b": 2, "c": 3 },
            "ok": true,
        },
        "timing": { "value": { "mean_ms": 10.0 } },
        "ast": { "calls": ["x", "a", "y", "b", "z", "c"] },
        "vars": { "greeting": "Hello, world" },
    })
}

fn spec(fields: Value) -> AssertionSpec {
    serde_json::from_value(fields).unwrap()
}

fn run_one(fields: Value) -> AssertionRecord {
    let records = run_assertions(&context(), &[spec(fields)], Path::new("."));
    records.into_iter().next().unwrap()
}

#[test]
fn eq_resolves_paths_on_both_sides() {
    let record = run_one(json!({ "op": "eq", "actual": "$.result.ok", "expected": true }));
    assert!(record.pass);
    assert_eq!(record.actual, json!(true));
}

#[test]
fn eq_against_absent_path_uses_typed_null() {
    assert!(run_one(json!({ "op": "eq", "actual": "$.result.missing", "expected": null })).pass);
    assert!(!run_one(json!({ "op": "eq", "actual": "$.result.missing", "expected": 0 })).pass);
    assert!(!run_one(json!({ "op": "eq", "actual": "$.result.missing", "expected": "" })).pass);
}

#[test]
fn integer_and_float_compare_equal() {
    assert!(run_one(json!({ "op": "eq", "actual": "$.result.value.a", "expected": 1.0 })).pass);
}

#[test]
fn ordering_requires_numeric_operands() {
    let record = run_one(json!({ "op": "lt", "actual": "$.vars.greeting", "expected": 5 }));
    assert!(!record.pass);
    assert_eq!(record.error.as_deref(), Some("type_mismatch"));
}

#[test]
fn ordering_on_absent_path_tags_path_not_found() {
    let record = run_one(json!({ "op": "gte", "actual": "$.result.nope", "expected": 5 }));
    assert!(!record.pass);
    assert_eq!(record.error.as_deref(), Some("path_not_found"));
}

#[test]
fn invalid_reference_tags_invalid_path() {
    let record = run_one(json!({ "op": "eq", "actual": "$.steps[", "expected": 1 }));
    assert_eq!(record.error.as_deref(), Some("invalid_path"));
}

#[test]
fn in_range_bounds_are_inclusive() {
    assert!(run_one(json!({ "op": "in_range", "actual": 5, "min": 5, "max": 9 })).pass);
    assert!(run_one(json!({ "op": "in_range", "actual": 9, "min": 5, "max": 9 })).pass);
    assert!(!run_one(json!({ "op": "in_range", "actual": 10, "min": 5, "max": 9 })).pass);
    let record = run_one(json!({ "op": "in_range", "actual": "low", "min": 5, "max": 9 }));
    assert_eq!(record.error.as_deref(), Some("type_mismatch"));
}

#[test]
fn approx_boundary_case_passes() {
    // |actual - expected| == tolerance must pass.
    assert!(run_one(json!({ "op": "approx", "actual": 10.5, "expected": 10.0, "tolerance": 0.5 })).pass);
    assert!(!run_one(json!({ "op": "approx", "actual": 10.6, "expected": 10.0, "tolerance": 0.5 })).pass);
}

#[test]
fn approx_requires_three_numeric_operands() {
    let record = run_one(json!({ "op": "approx", "actual": 10.0, "expected": 10.0 }));
    assert_eq!(record.error.as_deref(), Some("type_mismatch"));
}

#[test]
fn contains_handles_sequences_strings_and_rejects_mappings() {
    assert!(run_one(json!({ "op": "contains", "actual": ["a", "b"], "expected": "b" })).pass);
    assert!(!run_one(json!({ "op": "contains", "actual": ["a", "b"], "expected": "c" })).pass);
    assert!(run_one(json!({ "op": "contains", "actual": "$.vars.greeting", "expected": "world" })).pass);
    let record = run_one(json!({ "op": "contains", "actual": "$.result.value", "expected": "a" }));
    assert_eq!(record.error.as_deref(), Some("type_mismatch"));
}

#[test]
fn has_keys_allows_extra_keys() {
    assert!(run_one(json!({
        "op": "has_keys", "actual": "$.result.value", "expected": ["a", "b"],
    }))
    .pass);
    assert!(!run_one(json!({
        "op": "has_keys", "actual": "$.result.value", "expected": ["a", "d"],
    }))
    .pass);
}

#[test]
fn has_keys_on_non_mapping_tags_type_mismatch() {
    let record = run_one(json!({ "op": "has_keys", "actual": [1, 2], "expected": ["a"] }));
    assert!(!record.pass);
    assert_eq!(record.error.as_deref(), Some("type_mismatch"));
}

#[test]
fn matches_honors_inline_flags_and_pattern_field() {
    assert!(run_one(json!({
        "op": "matches", "actual": "$.vars.greeting", "pattern": "(?i)hello",
    }))
    .pass);
    assert!(run_one(json!({
        "op": "not_matches", "actual": "$.vars.greeting", "expected": "goodbye",
    }))
    .pass);
}

#[test]
fn invalid_regex_is_reported_not_raised() {
    let record = run_one(json!({ "op": "matches", "actual": "abc", "pattern": "(" }));
    assert_eq!(record.error.as_deref(), Some("exception"));
    assert!(record.details.contains_key("exception"));
}

#[test]
fn file_exists_renders_implicit_expected() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    std::fs::write(dir.path().join("out.json"), b"{}")?;
    let specs = [
        spec(json!({ "op": "file_exists", "actual": "out.json" })),
        spec(json!({ "op": "file_exists", "actual": "missing.json" })),
    ];
    let records = run_assertions(&context(), &specs, dir.path());
    assert!(records[0].pass);
    assert_eq!(records[0].expected, json!(true));
    assert!(!records[1].pass);
    assert_eq!(records[1].expected, json!(true));
    Ok(())
}

#[test]
fn call_order_is_a_greedy_subsequence_check() {
    assert!(run_one(json!({
        "op": "call_order", "actual": "$.ast.calls", "expected": ["a", "b", "c"],
    }))
    .pass);
    assert!(!run_one(json!({
        "op": "call_order", "actual": ["b", "a"], "expected": ["a", "b"],
    }))
    .pass);
    assert!(run_one(json!({
        "op": "call_order", "actual": ["a"], "expected": [],
    }))
    .pass);
}

#[test]
fn unknown_operator_tags_unknown_op() {
    let record = run_one(json!({ "op": "almost_eq", "actual": 1, "expected": 1 }));
    assert!(!record.pass);
    assert_eq!(record.error.as_deref(), Some("unknown_op"));
}

#[test]
fn user_message_is_attached_to_records() {
    let record = run_one(json!({
        "op": "eq", "actual": 1, "expected": 2, "message": "counts must agree",
    }));
    assert_eq!(record.message.as_deref(), Some("counts must agree"));
}
