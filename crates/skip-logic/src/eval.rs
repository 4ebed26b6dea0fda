// crates/skip-logic/src/eval.rs
// ============================================================================
// Module: Guard Expression Evaluator
// Description: Pure evaluation of parsed guard expressions over a context.
// Purpose: Decide skip outcomes deterministically with typed-null semantics.
// Dependencies: crate::ast, serde_json
// ============================================================================

//! ## Overview
//! Evaluation is a pure function of the expression tree and a context
//! snapshot. Path references resolve through the [`Lookup`] trait; a missing
//! path yields JSON `null`, never an error. Comparisons apply no type
//! coercion: incompatible operand types compare as `false` (and as `true`
//! for `!=`). The only failure mode is a non-boolean value in a boolean
//! position, which callers surface as a test-level error state.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde_json::Value;

use crate::ast::CompareOp;
use crate::ast::Expr;
use crate::ast::PathRef;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors that can occur while evaluating a guard expression.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EvalError {
    /// A boolean position held a non-boolean value.
    NotBoolean {
        /// Description of the offending value.
        found: String,
    },
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotBoolean {
                found,
            } => {
                write!(f, "expression requires a boolean, found {found}")
            }
        }
    }
}

impl std::error::Error for EvalError {}

// ============================================================================
// SECTION: Context Lookup
// ============================================================================

/// Resolves path references against a run-context snapshot.
///
/// Implement this for your context shape so the evaluator can turn `env.*`
/// and `vars.*` references into values. Returning `None` means the path is
/// absent, which the evaluator treats as JSON `null`.
pub trait Lookup {
    /// Returns the value at the given path, or `None` when absent.
    fn lookup(&self, path: &PathRef) -> Option<Value>;
}

impl Lookup for Value {
    fn lookup(&self, path: &PathRef) -> Option<Value> {
        let mut cursor = self;
        for segment in &path.segments {
            cursor = cursor.as_object()?.get(segment)?;
        }
        Some(cursor.clone())
    }
}

impl<F> Lookup for F
where
    F: Fn(&PathRef) -> Option<Value>,
{
    fn lookup(&self, path: &PathRef) -> Option<Value> {
        (self)(path)
    }
}

// ============================================================================
// SECTION: Evaluation
// ============================================================================

/// Evaluates a guard expression to a boolean skip decision.
///
/// # Errors
///
/// Returns [`EvalError`] when a boolean position holds a non-boolean value
/// (for example `skip_if: vars.name` where `name` is a string).
pub fn evaluate<L: Lookup>(expr: &Expr, context: &L) -> Result<bool, EvalError> {
    match expr {
        Expr::And(parts) => {
            for part in parts {
                if !evaluate(part, context)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        Expr::Or(parts) => {
            for part in parts {
                if evaluate(part, context)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        Expr::Not(inner) => Ok(!evaluate(inner, context)?),
        Expr::Compare {
            op,
            lhs,
            rhs,
        } => {
            let left = resolve_operand(lhs, context)?;
            let right = resolve_operand(rhs, context)?;
            Ok(compare(*op, &left, &right))
        }
        Expr::Literal(value) => require_bool(value),
        Expr::Path(path) => {
            let value = context.lookup(path).unwrap_or(Value::Null);
            require_bool(&value)
        }
    }
}

/// Resolves a comparison operand to a plain JSON value.
fn resolve_operand<L: Lookup>(expr: &Expr, context: &L) -> Result<Value, EvalError> {
    match expr {
        Expr::Literal(value) => Ok(value.clone()),
        Expr::Path(path) => Ok(context.lookup(path).unwrap_or(Value::Null)),
        // Nested boolean sub-expressions are valid comparison operands.
        Expr::Compare {
            ..
        }
        | Expr::And(_)
        | Expr::Or(_)
        | Expr::Not(_) => Ok(Value::Bool(evaluate(expr, context)?)),
    }
}

/// Requires a boolean value in a boolean position.
fn require_bool(value: &Value) -> Result<bool, EvalError> {
    match value {
        Value::Bool(flag) => Ok(*flag),
        other => Err(EvalError::NotBoolean {
            found: describe_value(other),
        }),
    }
}

/// Compares two JSON values without type coercion.
///
/// Incompatible operand types yield `false` for every operator except `!=`,
/// which yields `true`. Ordering operators are defined only for numbers.
fn compare(op: CompareOp, left: &Value, right: &Value) -> bool {
    match op {
        CompareOp::Eq => values_equal(left, right),
        CompareOp::Ne => !values_equal(left, right),
        CompareOp::Lt | CompareOp::Lte | CompareOp::Gt | CompareOp::Gte => {
            let (Some(lhs), Some(rhs)) = (left.as_f64(), right.as_f64()) else {
                return false;
            };
            match op {
                CompareOp::Lt => lhs < rhs,
                CompareOp::Lte => lhs <= rhs,
                CompareOp::Gt => lhs > rhs,
                CompareOp::Gte => lhs >= rhs,
                CompareOp::Eq | CompareOp::Ne => false,
            }
        }
    }
}

/// Tests equality with numeric awareness and typed-null semantics.
fn values_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(lhs), Value::Number(rhs)) => match (lhs.as_f64(), rhs.as_f64()) {
            (Some(a), Some(b)) => (a - b).abs() == 0.0,
            _ => lhs == rhs,
        },
        _ => left == right,
    }
}

/// Describes a value's type for diagnostics.
fn describe_value(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(_) => "boolean".to_string(),
        Value::Number(number) => format!("number {number}"),
        Value::String(text) => format!("string '{text}'"),
        Value::Array(_) => "array".to_string(),
        Value::Object(_) => "object".to_string(),
    }
}
