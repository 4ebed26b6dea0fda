// crates/skip-logic/src/lib.rs
// ============================================================================
// Module: Skip Logic Crate Root
// Description: Restricted boolean-expression language for conditional skipping.
// Purpose: Parse and evaluate `skip_if` guard expressions deterministically.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//!
//! Skip Logic implements the closed guard-expression grammar used to decide
//! whether a contract test is skipped before any of its steps run. The
//! grammar is deliberately tiny: literals, path references into the `env.*`
//! and `vars.*` namespaces, six comparison operators, and the boolean
//! connectives `and`, `or`, `not` with parenthesized grouping. There are no
//! function calls, no arithmetic, and no host callbacks, so evaluation is
//! side-effect free and idempotent by construction.
//!
//! Evaluation never coerces types: comparing incompatible operands yields
//! `false` rather than an error, and a reference whose path is missing
//! resolves to JSON `null`. The only evaluation failure mode is an
//! expression whose boolean position holds a non-boolean value.
//!
//! ### Grammar (informal)
//! - **Literals**: `42`, `-1.5`, `"linux"`, `'linux'`, `true`, `false`, `null`
//! - **Paths**: `env.os_family`, `vars.target` (heads are restricted)
//! - **Comparisons**: `==`, `!=`, `<`, `<=`, `>`, `>=`
//! - **Connectives**: `not a`, `a and b`, `a or b`, `( ... )`
//!
//! Precedence is `not` > comparison > `and` > `or`, with short-circuit
//! boolean evaluation.

pub mod ast;
pub mod eval;
pub mod parse;

pub use ast::CompareOp;
pub use ast::Expr;
pub use ast::PathRef;
pub use eval::EvalError;
pub use eval::Lookup;
pub use eval::evaluate;
pub use parse::ExprError;
pub use parse::parse_expr;
