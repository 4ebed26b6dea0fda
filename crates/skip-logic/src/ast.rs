// crates/skip-logic/src/ast.rs
// ============================================================================
// Module: Skip Logic AST
// Description: Immutable syntax tree for guard expressions.
// Purpose: Provide the closed expression shapes produced by the parser.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! The AST is a small, closed set of variants. Adding a node kind is a
//! breaking grammar change and requires a spec-version bump; the evaluator
//! matches exhaustively so new variants cannot slip in unevaluated.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

// ============================================================================
// SECTION: Path References
// ============================================================================

/// Dotted path reference restricted to the `env` and `vars` namespaces.
///
/// # Invariants
/// - `segments` is non-empty and `segments[0]` is `"env"` or `"vars"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathRef {
    /// Path segments, head first.
    pub segments: Vec<String>,
}

impl PathRef {
    /// Creates a path reference from pre-validated segments.
    #[must_use]
    pub const fn new(segments: Vec<String>) -> Self {
        Self {
            segments,
        }
    }

    /// Returns the namespace head segment.
    #[must_use]
    pub fn namespace(&self) -> &str {
        self.segments.first().map_or("", String::as_str)
    }
}

impl fmt::Display for PathRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("."))
    }
}

// ============================================================================
// SECTION: Comparison Operators
// ============================================================================

/// Binary comparison operators supported by the grammar.
///
/// # Invariants
/// - Variants are stable for serialization and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompareOp {
    /// Equality comparison.
    Eq,
    /// Inequality comparison.
    Ne,
    /// Numeric less-than.
    Lt,
    /// Numeric less-than-or-equal.
    Lte,
    /// Numeric greater-than.
    Gt,
    /// Numeric greater-than-or-equal.
    Gte,
}

impl CompareOp {
    /// Returns the operator's source spelling.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Lte => "<=",
            Self::Gt => ">",
            Self::Gte => ">=",
        }
    }
}

// ============================================================================
// SECTION: Expression Nodes
// ============================================================================

/// Guard expression node.
///
/// # Invariants
/// - `And`/`Or` hold two or more operands in source order.
/// - Trees are immutable once produced by the parser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    /// Literal JSON value (number, string, boolean, or null).
    Literal(Value),
    /// Path reference resolved against the run context at evaluation time.
    Path(PathRef),
    /// Binary comparison of two operands.
    Compare {
        /// Comparison operator.
        op: CompareOp,
        /// Left operand.
        lhs: Box<Expr>,
        /// Right operand.
        rhs: Box<Expr>,
    },
    /// Short-circuit conjunction over two or more operands.
    And(Vec<Expr>),
    /// Short-circuit disjunction over two or more operands.
    Or(Vec<Expr>),
    /// Boolean negation.
    Not(Box<Expr>),
}
