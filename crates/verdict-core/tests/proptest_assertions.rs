// crates/verdict-core/tests/proptest_assertions.rs
// ============================================================================
// Module: Assertion Engine Property-Based Tests
// Description: Property tests for evaluation totality and operator algebra.
// Purpose: Detect panics and asymmetries across wide operand ranges.
// ============================================================================

//! Property-based tests for assertion-engine invariants.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

use std::path::Path;

use proptest::prelude::*;
use serde_json::Value;
use serde_json::json;
use verdict_core::core::contract::AssertionSpec;
use verdict_core::core::report::AssertionRecord;
use verdict_core::runtime::assertions::run_assertions;

/// Arbitrary JSON literals that are never `$.` path references.
fn literal_strategy() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|v| Value::Number(v.into())),
        "[a-z ]{0,12}".prop_map(Value::String),
    ];
    leaf.prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0 .. 4).prop_map(Value::Array),
            prop::collection::btree_map("[a-z]{1,4}", inner, 0 .. 4).prop_map(|entries| {
                Value::Object(entries.into_iter().collect())
            }),
        ]
    })
}

fn run_one(fields: Value) -> AssertionRecord {
    let spec: AssertionSpec = serde_json::from_value(fields).unwrap();
    run_assertions(&json!({}), &[spec], Path::new("."))
        .into_iter()
        .next()
        .unwrap()
}

proptest! {
    #[test]
    fn eq_is_reflexive_over_arbitrary_literals(value in literal_strategy()) {
        let record = run_one(json!({
            "op": "eq",
            "actual": value.clone(),
            "expected": value,
        }));
        prop_assert!(record.pass);
        prop_assert!(record.error.is_none());
    }

    #[test]
    fn ne_is_the_negation_of_eq(
        lhs in literal_strategy(),
        rhs in literal_strategy(),
    ) {
        let eq = run_one(json!({ "op": "eq", "actual": lhs.clone(), "expected": rhs.clone() }));
        let ne = run_one(json!({ "op": "ne", "actual": lhs, "expected": rhs }));
        prop_assert_eq!(eq.pass, !ne.pass);
    }

    #[test]
    fn evaluation_is_total_over_arbitrary_operator_pairs(
        op in prop_oneof![
            Just("eq"), Just("ne"), Just("lt"), Just("lte"), Just("gt"), Just("gte"),
            Just("contains"), Just("has_keys"), Just("bogus_op"),
        ],
        actual in literal_strategy(),
        expected in literal_strategy(),
    ) {
        // Every evaluation yields exactly one record; failures surface as
        // pass=false with a stable tag, never as a panic.
        let record = run_one(json!({ "op": op, "actual": actual, "expected": expected }));
        prop_assert_eq!(record.op, op);
        if op == "bogus_op" {
            prop_assert!(!record.pass);
            prop_assert_eq!(record.error.as_deref(), Some("unknown_op"));
        }
    }

    #[test]
    fn ordering_operators_agree_with_integer_order(
        lhs in -1_000_000_i64 .. 1_000_000,
        rhs in -1_000_000_i64 .. 1_000_000,
    ) {
        let lt = run_one(json!({ "op": "lt", "actual": lhs, "expected": rhs }));
        let lte = run_one(json!({ "op": "lte", "actual": lhs, "expected": rhs }));
        let gt = run_one(json!({ "op": "gt", "actual": lhs, "expected": rhs }));
        let gte = run_one(json!({ "op": "gte", "actual": lhs, "expected": rhs }));
        prop_assert_eq!(lt.pass, lhs < rhs);
        prop_assert_eq!(lte.pass, lhs <= rhs);
        prop_assert_eq!(gt.pass, lhs > rhs);
        prop_assert_eq!(gte.pass, lhs >= rhs);
    }

    #[test]
    fn in_range_holds_exactly_on_the_closed_interval(
        value in -1_000_000_i64 .. 1_000_000,
        min in -1_000_000_i64 .. 1_000_000,
        max in -1_000_000_i64 .. 1_000_000,
    ) {
        let record = run_one(json!({
            "op": "in_range",
            "actual": value,
            "min": min,
            "max": max,
        }));
        prop_assert_eq!(record.pass, min <= value && value <= max);
    }

    #[test]
    fn approx_is_symmetric_and_boundary_inclusive(
        lhs in -1_000_000_i64 .. 1_000_000,
        rhs in -1_000_000_i64 .. 1_000_000,
        tolerance in 0_i64 .. 1_000_000,
    ) {
        let forward = run_one(json!({
            "op": "approx",
            "actual": lhs,
            "expected": rhs,
            "tolerance": tolerance,
        }));
        let backward = run_one(json!({
            "op": "approx",
            "actual": rhs,
            "expected": lhs,
            "tolerance": tolerance,
        }));
        prop_assert_eq!(forward.pass, (lhs - rhs).abs() <= tolerance);
        prop_assert_eq!(forward.pass, backward.pass);
    }

    #[test]
    fn string_contains_agrees_with_substring_search(
        haystack in "[a-c]{0,16}",
        needle in "[a-c]{0,4}",
    ) {
        let record = run_one(json!({
            "op": "contains",
            "actual": haystack.clone(),
            "expected": needle.clone(),
        }));
        prop_assert_eq!(record.pass, haystack.contains(&needle));
    }
}
