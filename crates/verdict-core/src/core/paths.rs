// crates/verdict-core/src/core/paths.rs
// ============================================================================
// Module: Verdict Path Resolver
// Description: Dotted/bracketed reference resolution over a context snapshot.
// Purpose: Provide pure, never-raising lookup for assertions and guards.
// Dependencies: regex, serde_json
// ============================================================================

//! ## Overview
//! References take the form `$.key.nested[0]["quoted.key"]`. Resolution is a
//! pure lookup: a missing key or out-of-range index yields [`Resolution::Absent`]
//! (a typed null downstream), a key applied to a non-mapping or an index
//! applied to a non-sequence yields a type-mismatch error, and a reference
//! that does not start with `$.` or has a malformed bracket yields an
//! invalid-path error. No type coercion is ever applied.
//!
//! The module also provides variable interpolation for executor arguments:
//! `{name}` and `$.vars.name` occurrences inside strings are replaced with
//! the variable's rendered value, recursively through arrays and mappings.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde_json::Map;
use serde_json::Value;

// ============================================================================
// SECTION: Resolution Types
// ============================================================================

/// Outcome of resolving a path reference.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// The path resolved to a value.
    Value(Value),
    /// Some segment was missing; downstream consumers treat this as null.
    Absent,
}

impl Resolution {
    /// Returns the resolved value, mapping [`Resolution::Absent`] to null.
    #[must_use]
    pub fn into_value(self) -> Value {
        match self {
            Self::Value(value) => value,
            Self::Absent => Value::Null,
        }
    }

    /// Returns whether the path was absent.
    #[must_use]
    pub const fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }
}

/// Structural errors raised by path resolution.
///
/// # Invariants
/// - A missing segment is never an error; it resolves to [`Resolution::Absent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathError {
    /// The reference does not start with `$.` or has a malformed bracket.
    InvalidPath,
    /// A key was applied to a non-mapping or an index to a non-sequence.
    TypeMismatch,
}

impl PathError {
    /// Returns the stable error tag used in assertion records.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::InvalidPath => "invalid_path",
            Self::TypeMismatch => "type_mismatch",
        }
    }
}

impl fmt::Display for PathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl std::error::Error for PathError {}

// ============================================================================
// SECTION: Tokenization
// ============================================================================

/// One traversal segment.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    /// Mapping key.
    Key(String),
    /// Sequence index.
    Index(i64),
}

/// Splits `$.a.b[0]["quoted.key"]` into traversal segments.
fn tokenize(path: &str) -> Result<Vec<Segment>, PathError> {
    let body = path.strip_prefix("$.").ok_or(PathError::InvalidPath)?;
    let chars: Vec<char> = body.chars().collect();
    let mut segments = Vec::new();
    let mut buffer = String::new();
    let mut cursor = 0;

    while cursor < chars.len() {
        match chars[cursor] {
            '.' => {
                if !buffer.is_empty() {
                    segments.push(Segment::Key(std::mem::take(&mut buffer)));
                }
                cursor += 1;
            }
            '[' => {
                if !buffer.is_empty() {
                    segments.push(Segment::Key(std::mem::take(&mut buffer)));
                }
                let close = chars[cursor + 1 ..]
                    .iter()
                    .position(|&c| c == ']')
                    .ok_or(PathError::InvalidPath)?;
                let inner: String = chars[cursor + 1 .. cursor + 1 + close].iter().collect();
                segments.push(parse_bracket(inner.trim())?);
                cursor += close + 2;
            }
            ch => {
                buffer.push(ch);
                cursor += 1;
            }
        }
    }
    if !buffer.is_empty() {
        segments.push(Segment::Key(buffer));
    }
    Ok(segments)
}

/// Parses the interior of one bracket expression.
fn parse_bracket(inner: &str) -> Result<Segment, PathError> {
    let quoted = (inner.starts_with('"') && inner.ends_with('"') && inner.len() >= 2)
        || (inner.starts_with('\'') && inner.ends_with('\'') && inner.len() >= 2);
    if quoted {
        return Ok(Segment::Key(inner[1 .. inner.len() - 1].to_string()));
    }
    inner
        .parse::<i64>()
        .map(Segment::Index)
        .map_err(|_| PathError::InvalidPath)
}

// ============================================================================
// SECTION: Resolution
// ============================================================================

/// Resolves a path reference against a context snapshot.
///
/// # Errors
///
/// Returns [`PathError::InvalidPath`] for malformed references and
/// [`PathError::TypeMismatch`] when a segment's shape does not match the
/// value it traverses. A missing segment is not an error; it yields
/// [`Resolution::Absent`].
pub fn resolve_path(root: &Value, path: &str) -> Result<Resolution, PathError> {
    let segments = tokenize(path)?;
    let mut cursor = root;
    for segment in &segments {
        match segment {
            Segment::Key(key) => {
                let Value::Object(map) = cursor else {
                    return Err(PathError::TypeMismatch);
                };
                match map.get(key) {
                    Some(next) => cursor = next,
                    None => return Ok(Resolution::Absent),
                }
            }
            Segment::Index(index) => {
                let Value::Array(items) = cursor else {
                    return Err(PathError::TypeMismatch);
                };
                let position = usize::try_from(*index).ok();
                match position.and_then(|i| items.get(i)) {
                    Some(next) => cursor = next,
                    None => return Ok(Resolution::Absent),
                }
            }
        }
    }
    Ok(Resolution::Value(cursor.clone()))
}

/// Returns whether a value is a path reference rather than a literal.
#[must_use]
pub fn is_path_reference(value: &Value) -> bool {
    matches!(value, Value::String(text) if text.starts_with("$."))
}

// ============================================================================
// SECTION: Variable Interpolation
// ============================================================================

/// Compiles a pattern known to be valid at build time.
#[allow(clippy::unwrap_used, reason = "Patterns are compile-time constants.")]
fn compile_pattern(source: &str) -> Regex {
    Regex::new(source).unwrap()
}

/// Pattern for `{name}` references.
fn brace_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| compile_pattern(r"\{([a-zA-Z_][a-zA-Z0-9_]*)\}"))
}

/// Pattern for `$.vars.name` references.
fn vars_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| compile_pattern(r"\$\.vars\.([a-zA-Z_][a-zA-Z0-9_]*)"))
}

/// Renders a variable value into an interpolated string.
fn render_var(vars: &Map<String, Value>, name: &str) -> String {
    match vars.get(name) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
    }
}

/// Replaces `{name}` and `$.vars.name` references inside strings.
///
/// Applies recursively through arrays and mappings; non-string leaves pass
/// through unchanged. Unknown variables render as the empty string.
#[must_use]
pub fn interpolate_vars(value: &Value, vars: &Map<String, Value>) -> Value {
    match value {
        Value::String(text) => {
            let pass_one = brace_pattern()
                .replace_all(text, |captures: &regex::Captures<'_>| {
                    render_var(vars, &captures[1])
                })
                .into_owned();
            let pass_two = vars_pattern()
                .replace_all(&pass_one, |captures: &regex::Captures<'_>| {
                    render_var(vars, &captures[1])
                })
                .into_owned();
            Value::String(pass_two)
        }
        Value::Array(items) => {
            Value::Array(items.iter().map(|item| interpolate_vars(item, vars)).collect())
        }
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, item)| (key.clone(), interpolate_vars(item, vars)))
                .collect(),
        ),
        other => other.clone(),
    }
}
