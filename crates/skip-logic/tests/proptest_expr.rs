// crates/skip-logic/tests/proptest_expr.rs
// ============================================================================
// Module: Guard Expression Property-Based Tests
// Description: Property tests for parser totality and evaluator idempotence.
// Purpose: Detect panics and non-determinism across wide input ranges.
// ============================================================================

//! Property-based tests for guard-expression invariants.

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

use proptest::prelude::*;
use serde_json::Value;
use serde_json::json;
use skip_logic::evaluate;
use skip_logic::parse_expr;

fn context_strategy() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|v| Value::Number(v.into())),
        "[a-z]{0,8}".prop_map(Value::String),
    ];
    prop::collection::btree_map("[a-z]{1,4}", leaf, 0 .. 6).prop_map(|vars| {
        let mut object = serde_json::Map::new();
        for (key, value) in vars {
            object.insert(key, value);
        }
        json!({ "env": { "os_family": "linux" }, "vars": Value::Object(object) })
    })
}

proptest! {
    #[test]
    fn parser_never_panics_on_arbitrary_input(input in ".{0,200}") {
        let _ = parse_expr(&input);
    }

    #[test]
    fn evaluation_is_idempotent_over_random_contexts(
        context in context_strategy(),
        key in "[a-z]{1,4}",
        literal in any::<i64>(),
    ) {
        let source = format!("vars.{key} == {literal} or env.os_family == 'linux'");
        let expr = parse_expr(&source).unwrap();
        let first = evaluate(&expr, &context);
        let second = evaluate(&expr, &context);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn comparisons_never_error(
        context in context_strategy(),
        key in "[a-z]{1,4}",
        literal in any::<i64>(),
    ) {
        // Comparisons are total: missing paths become null and incompatible
        // types compare false, so a bare comparison cannot fail.
        let source = format!("vars.{key} <= {literal}");
        let expr = parse_expr(&source).unwrap();
        prop_assert!(evaluate(&expr, &context).is_ok());
    }
}
