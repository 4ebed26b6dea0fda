// crates/skip-logic/tests/parse.rs
// ============================================================================
// Module: Guard Parser Tests
// Description: Validate lexing, precedence, and parse-error diagnostics.
// Purpose: Ensure the closed grammar accepts exactly its documented forms.
// Dependencies: skip-logic, serde_json
// ============================================================================

//! Parser behavior tests for the guard-expression grammar.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

use serde_json::json;
use skip_logic::CompareOp;
use skip_logic::Expr;
use skip_logic::ExprError;
use skip_logic::parse_expr;

#[test]
fn parses_simple_comparison() {
    let expr = parse_expr("env.os_family == 'linux'").unwrap();
    let Expr::Compare {
        op,
        lhs,
        rhs,
    } = expr
    else {
        panic!("expected comparison");
    };
    assert_eq!(op, CompareOp::Eq);
    assert_eq!(*lhs, Expr::Path(skip_logic::PathRef::new(vec![
        "env".to_string(),
        "os_family".to_string()
    ])));
    assert_eq!(*rhs, Expr::Literal(json!("linux")));
}

#[test]
fn precedence_not_binds_tighter_than_and_and_or() {
    // not a == true and b == 1 or c == 2
    // parses as ((not a) == true and b == 1) or (c == 2)
    let expr =
        parse_expr("not vars.a == true and vars.b == 1 or vars.c == 2").unwrap();
    let Expr::Or(parts) = expr else {
        panic!("expected top-level or");
    };
    assert_eq!(parts.len(), 2);
    let Expr::And(and_parts) = &parts[0] else {
        panic!("expected and under or");
    };
    assert_eq!(and_parts.len(), 2);
    let Expr::Compare {
        lhs, ..
    } = &and_parts[0]
    else {
        panic!("expected comparison");
    };
    assert!(matches!(**lhs, Expr::Not(_)));
}

#[test]
fn parenthesized_grouping_overrides_precedence() {
    let expr = parse_expr("vars.a and (vars.b or vars.c)").unwrap();
    let Expr::And(parts) = expr else {
        panic!("expected and");
    };
    assert!(matches!(parts[1], Expr::Or(_)));
}

#[test]
fn numeric_literals_parse_as_integers_and_floats() {
    assert_eq!(parse_expr("1 == 1").is_ok(), true);
    assert_eq!(parse_expr("-2.5 < 0").is_ok(), true);
    assert!(matches!(
        parse_expr("1. == 1"),
        Err(ExprError::InvalidNumber { .. })
    ));
}

#[test]
fn rejects_unknown_namespace() {
    let err = parse_expr("steps.result == 1").unwrap_err();
    assert!(matches!(err, ExprError::UnknownNamespace { name, .. } if name == "steps"));
}

#[test]
fn rejects_bare_identifier_outside_namespaces() {
    let err = parse_expr("fast").unwrap_err();
    assert!(matches!(err, ExprError::UnknownNamespace { name, .. } if name == "fast"));
}

#[test]
fn rejects_empty_and_trailing_input() {
    assert!(matches!(parse_expr("   "), Err(ExprError::EmptyInput)));
    assert!(matches!(
        parse_expr("vars.a == 1 vars.b"),
        Err(ExprError::TrailingInput { .. })
    ));
}

#[test]
fn rejects_single_equals_and_unterminated_string() {
    assert!(matches!(
        parse_expr("vars.a = 1"),
        Err(ExprError::UnexpectedToken { expected: "==", .. })
    ));
    assert!(matches!(
        parse_expr("vars.a == 'oops"),
        Err(ExprError::UnterminatedString { .. })
    ));
}

#[test]
fn rejects_function_call_syntax() {
    // The grammar has no function calls; `(` after a path is trailing input.
    let err = parse_expr("env.version(1)").unwrap_err();
    assert!(matches!(err, ExprError::TrailingInput { .. }));
}

#[test]
fn reports_nesting_limit() {
    let mut deep = String::new();
    for _ in 0 .. 64 {
        deep.push('(');
    }
    deep.push_str("true");
    for _ in 0 .. 64 {
        deep.push(')');
    }
    assert!(matches!(parse_expr(&deep), Err(ExprError::NestingTooDeep { .. })));
}

#[test]
fn error_positions_are_byte_offsets() {
    let err = parse_expr("vars.a == $").unwrap_err();
    let ExprError::UnexpectedToken {
        position, ..
    } = err
    else {
        panic!("expected unexpected-token error");
    };
    assert_eq!(position, 10);
}
