// crates/verdict-core/src/runtime/assertions.rs
// ============================================================================
// Module: Verdict Assertion Engine
// Description: Fixed-operator assertion evaluation over resolved operands.
// Purpose: Produce structured pass/fail records without ever raising.
// Dependencies: regex, serde_json, crate::core
// ============================================================================

//! ## Overview
//! Each assertion names one operator from a fixed set and up to two
//! operands. Operands may be literals or `$.` path references resolved
//! against the run context; a reference resolving to absent is treated as a
//! typed null, not an error, except where the operator requires a concrete
//! value, in which case the record is tagged `path_not_found`. Operand
//! types that do not fit the operator produce a failing record tagged
//! `type_mismatch`. Evaluation is total: every input yields a record.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;

use regex::Regex;
use serde_json::Map;
use serde_json::Value;
use serde_json::json;

use crate::core::contract::AssertionSpec;
use crate::core::paths::Resolution;
use crate::core::paths::is_path_reference;
use crate::core::paths::resolve_path;
use crate::core::report::AssertionRecord;

// ============================================================================
// SECTION: Operand Resolution
// ============================================================================

/// A resolved operand with its provenance.
#[derive(Debug, Clone)]
struct Operand {
    /// The resolved value; null for absent paths and missing operands.
    value: Value,
    /// Whether the operand was a path reference that resolved to absent.
    absent: bool,
}

impl Operand {
    /// A literal (or missing) operand.
    fn literal(value: Value) -> Self {
        Self {
            value,
            absent: false,
        }
    }
}

/// Resolves one operand expression, which may be a literal or a `$.` path.
fn eval_operand(context: &Value, expr: Option<&Value>) -> Result<Operand, &'static str> {
    let Some(expr) = expr else {
        return Ok(Operand::literal(Value::Null));
    };
    if is_path_reference(expr) {
        let Value::String(path) = expr else {
            return Ok(Operand::literal(expr.clone()));
        };
        return match resolve_path(context, path) {
            Ok(Resolution::Value(value)) => Ok(Operand {
                value,
                absent: false,
            }),
            Ok(Resolution::Absent) => Ok(Operand {
                value: Value::Null,
                absent: true,
            }),
            Err(err) => Err(err.tag()),
        };
    }
    Ok(Operand::literal(expr.clone()))
}

/// Picks the error tag for an operand that failed an operator's type check.
///
/// An absent path used where a concrete value was required reports
/// `path_not_found`; a present value of the wrong shape reports
/// `type_mismatch`.
const fn shape_tag(operand: &Operand) -> &'static str {
    if operand.absent {
        "path_not_found"
    } else {
        "type_mismatch"
    }
}

// ============================================================================
// SECTION: Engine Entry Point
// ============================================================================

/// Evaluates a test's assertion list against a context snapshot.
///
/// `base_dir` anchors relative paths for `file_exists`. Returns one record
/// per assertion, in declaration order.
#[must_use]
pub fn run_assertions(
    context: &Value,
    specs: &[AssertionSpec],
    base_dir: &Path,
) -> Vec<AssertionRecord> {
    specs
        .iter()
        .map(|spec| run_one(context, spec, base_dir).with_message(spec.message.clone()))
        .collect()
}

/// Evaluates one assertion.
fn run_one(context: &Value, spec: &AssertionSpec, base_dir: &Path) -> AssertionRecord {
    let op = spec.op.as_str();

    let actual = match eval_operand(context, spec.actual.as_ref()) {
        Ok(operand) => operand,
        Err(tag) => {
            let expected = spec.expected.clone().unwrap_or(Value::Null);
            return AssertionRecord::error(op, Value::Null, expected, tag);
        }
    };
    let expected = match eval_operand(context, spec.expected.as_ref()) {
        Ok(operand) => operand,
        Err(tag) => return AssertionRecord::error(op, actual.value, Value::Null, tag),
    };
    let pattern = match eval_operand(context, spec.pattern.as_ref().map(|p| Value::String(p.clone())).as_ref()) {
        Ok(operand) => operand,
        Err(tag) => return AssertionRecord::error(op, actual.value, expected.value, tag),
    };

    match op {
        "eq" => {
            let pass = values_equal(&actual.value, &expected.value);
            AssertionRecord::outcome(op, actual.value, expected.value, pass)
        }
        "ne" => {
            let pass = !values_equal(&actual.value, &expected.value);
            AssertionRecord::outcome(op, actual.value, expected.value, pass)
        }
        "lt" => ordering(op, &actual, &expected, |a, e| a < e),
        "lte" => ordering(op, &actual, &expected, |a, e| a <= e),
        "gt" => ordering(op, &actual, &expected, |a, e| a > e),
        "gte" => ordering(op, &actual, &expected, |a, e| a >= e),
        "in_range" => in_range(spec, &actual),
        "approx" => approx(spec, &actual, &expected),
        "contains" => contains(&actual, &expected),
        "has_keys" => has_keys(&actual, &expected),
        "matches" => regex_match(op, &actual, &expected, &pattern, false),
        "not_matches" => regex_match(op, &actual, &expected, &pattern, true),
        "file_exists" => file_exists(&actual, base_dir),
        "call_order" => call_order(&actual, &expected),
        _ => AssertionRecord::error(op, actual.value, expected.value, "unknown_op"),
    }
}

// ============================================================================
// SECTION: Operators
// ============================================================================

/// Numeric-aware equality with typed-null semantics.
///
/// Integers and floats representing the same quantity compare equal; null
/// equals only null; no other coercion is applied.
fn values_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(lhs), Value::Number(rhs)) => match (lhs.as_f64(), rhs.as_f64()) {
            (Some(a), Some(b)) => (a - b).abs() == 0.0,
            _ => lhs == rhs,
        },
        _ => left == right,
    }
}

/// Extracts a numeric operand; booleans are not numbers.
fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        _ => None,
    }
}

/// Numeric ordering comparison; non-numeric operands fail with a tag.
fn ordering(
    op: &str,
    actual: &Operand,
    expected: &Operand,
    check: impl Fn(f64, f64) -> bool,
) -> AssertionRecord {
    let Some(a) = as_number(&actual.value) else {
        return AssertionRecord::error(
            op,
            actual.value.clone(),
            expected.value.clone(),
            shape_tag(actual),
        );
    };
    let Some(e) = as_number(&expected.value) else {
        return AssertionRecord::error(
            op,
            actual.value.clone(),
            expected.value.clone(),
            shape_tag(expected),
        );
    };
    AssertionRecord::outcome(op, actual.value.clone(), expected.value.clone(), check(a, e))
}

/// Inclusive numeric range check against declared `min` / `max` bounds.
fn in_range(spec: &AssertionSpec, actual: &Operand) -> AssertionRecord {
    let bounds = json!({ "min": spec.min, "max": spec.max });
    let numbers = (
        as_number(&actual.value),
        spec.min.as_ref().and_then(as_number),
        spec.max.as_ref().and_then(as_number),
    );
    let (Some(value), Some(min), Some(max)) = numbers else {
        return AssertionRecord::error("in_range", actual.value.clone(), bounds, shape_tag(actual));
    };
    let pass = min <= value && value <= max;
    AssertionRecord::outcome("in_range", actual.value.clone(), bounds, pass)
}

/// Absolute-tolerance numeric comparison; the boundary case passes.
fn approx(spec: &AssertionSpec, actual: &Operand, expected: &Operand) -> AssertionRecord {
    let numbers = (
        as_number(&actual.value),
        as_number(&expected.value),
        spec.tolerance.as_ref().and_then(as_number),
    );
    let (Some(a), Some(e), Some(tolerance)) = numbers else {
        let tag = if as_number(&actual.value).is_none() {
            shape_tag(actual)
        } else {
            shape_tag(expected)
        };
        return AssertionRecord::error("approx", actual.value.clone(), expected.value.clone(), tag);
    };
    let pass = (a - e).abs() <= tolerance;
    let mut details = Map::new();
    details.insert("tolerance".to_string(), json!(tolerance));
    AssertionRecord::outcome("approx", actual.value.clone(), expected.value.clone(), pass)
        .with_details(details)
}

/// Exact-element membership for sequences, substring for strings.
///
/// Mappings are explicitly invalid for this operator.
fn contains(actual: &Operand, expected: &Operand) -> AssertionRecord {
    match (&actual.value, &expected.value) {
        (Value::Array(items), needle) => {
            let pass = items.iter().any(|item| item == needle);
            AssertionRecord::outcome(
                "contains",
                actual.value.clone(),
                expected.value.clone(),
                pass,
            )
        }
        (Value::String(haystack), Value::String(needle)) => AssertionRecord::outcome(
            "contains",
            actual.value.clone(),
            expected.value.clone(),
            haystack.contains(needle),
        ),
        _ => AssertionRecord::error(
            "contains",
            actual.value.clone(),
            expected.value.clone(),
            shape_tag(actual),
        ),
    }
}

/// Subset check on mapping keys; extra keys are permitted.
fn has_keys(actual: &Operand, expected: &Operand) -> AssertionRecord {
    let Value::Object(map) = &actual.value else {
        return AssertionRecord::error(
            "has_keys",
            actual.value.clone(),
            expected.value.clone(),
            shape_tag(actual),
        );
    };
    let Value::Array(keys) = &expected.value else {
        return AssertionRecord::error(
            "has_keys",
            actual.value.clone(),
            expected.value.clone(),
            shape_tag(expected),
        );
    };
    let mut names = Vec::with_capacity(keys.len());
    for key in keys {
        let Value::String(name) = key else {
            return AssertionRecord::error(
                "has_keys",
                actual.value.clone(),
                expected.value.clone(),
                shape_tag(expected),
            );
        };
        names.push(name);
    }
    let pass = names.iter().all(|name| map.contains_key(name.as_str()));
    AssertionRecord::outcome("has_keys", actual.value.clone(), expected.value.clone(), pass)
}

/// Regular-expression search; `pattern:` wins over `expected:`.
///
/// Matching is multi-line to mirror scanning semantics; inline flag syntax
/// inside the pattern is honored by the regex engine.
fn regex_match(
    op: &str,
    actual: &Operand,
    expected: &Operand,
    pattern: &Operand,
    negate: bool,
) -> AssertionRecord {
    let pat = if pattern.value.is_null() {
        &expected.value
    } else {
        &pattern.value
    };
    let (Value::String(haystack), Value::String(source)) = (&actual.value, pat) else {
        return AssertionRecord::error(op, actual.value.clone(), pat.clone(), shape_tag(actual));
    };
    match Regex::new(&format!("(?m){source}")) {
        Ok(regex) => {
            let found = regex.is_match(haystack);
            let pass = if negate { !found } else { found };
            AssertionRecord::outcome(op, actual.value.clone(), pat.clone(), pass)
        }
        Err(err) => {
            let mut details = Map::new();
            details.insert("exception".to_string(), json!(err.to_string()));
            AssertionRecord::error(op, actual.value.clone(), pat.clone(), "exception")
                .with_details(details)
        }
    }
}

/// Filesystem existence check with an implicit expected of `true`.
fn file_exists(actual: &Operand, base_dir: &Path) -> AssertionRecord {
    let Value::String(path) = &actual.value else {
        return AssertionRecord::error(
            "file_exists",
            actual.value.clone(),
            Value::Bool(true),
            shape_tag(actual),
        );
    };
    let candidate = Path::new(path);
    let resolved = if candidate.is_absolute() {
        candidate.to_path_buf()
    } else {
        base_dir.join(candidate)
    };
    AssertionRecord::outcome(
        "file_exists",
        actual.value.clone(),
        Value::Bool(true),
        resolved.exists(),
    )
}

/// Greedy left-to-right subsequence check over string sequences.
///
/// Each expected element matches the first remaining actual occurrence
/// after the prior match point; non-matching actual elements are ignored.
fn call_order(actual: &Operand, expected: &Operand) -> AssertionRecord {
    let (Value::Array(actual_items), Value::Array(expected_items)) =
        (&actual.value, &expected.value)
    else {
        return AssertionRecord::error(
            "call_order",
            actual.value.clone(),
            expected.value.clone(),
            shape_tag(actual),
        );
    };
    let mut actual_names = Vec::with_capacity(actual_items.len());
    for item in actual_items {
        let Value::String(name) = item else {
            return AssertionRecord::error(
                "call_order",
                actual.value.clone(),
                expected.value.clone(),
                "type_mismatch",
            );
        };
        actual_names.push(name.as_str());
    }
    let mut position = 0;
    for want in expected_items {
        let Value::String(want) = want else {
            return AssertionRecord::error(
                "call_order",
                actual.value.clone(),
                expected.value.clone(),
                "type_mismatch",
            );
        };
        while position < actual_names.len() && actual_names[position] != want {
            position += 1;
        }
        if position >= actual_names.len() {
            return AssertionRecord::outcome(
                "call_order",
                actual.value.clone(),
                expected.value.clone(),
                false,
            );
        }
        position += 1;
    }
    AssertionRecord::outcome("call_order", actual.value.clone(), expected.value.clone(), true)
}
