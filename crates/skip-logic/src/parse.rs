// crates/skip-logic/src/parse.rs
// ============================================================================
// Module: Guard Expression Parser
// Description: Lexer and recursive-descent parser for skip_if expressions.
// Purpose: Turn guard strings into immutable `Expr` trees with validation.
// Dependencies: crate::ast
// ============================================================================

//! ## Overview
//!
//! The parser is a conventional hand-written recursive-descent parser over a
//! spanned token stream. It enforces input-size and nesting limits so that
//! untrusted contract documents cannot exhaust the host, and it rejects any
//! path reference whose head is not `env` or `vars` — the grammar is closed
//! by design to preserve the injection-safety property.
//!
//! Precedence, loosest first: `or`, `and`, comparison, `not`, primary.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde_json::Number;
use serde_json::Value;

use crate::ast::CompareOp;
use crate::ast::Expr;
use crate::ast::PathRef;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum allowed expression input size in bytes.
const MAX_EXPR_INPUT_BYTES: usize = 64 * 1024;
/// Maximum supported nesting depth for parenthesized expressions.
const MAX_EXPR_NESTING: usize = 32;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors that can occur while parsing a guard expression.
///
/// # Invariants
/// - None. Variants capture structured parse failures with byte offsets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExprError {
    /// Input was empty or contained only whitespace.
    EmptyInput,
    /// Input exceeded the configured size limit.
    InputTooLarge {
        /// Maximum allowed bytes.
        max_bytes: usize,
        /// Actual input length in bytes.
        actual_bytes: usize,
    },
    /// Input exceeded the configured nesting depth.
    NestingTooDeep {
        /// Maximum allowed nesting depth.
        max_depth: usize,
        /// Actual nesting depth when the error occurred.
        actual_depth: usize,
        /// Byte offset in the original input.
        position: usize,
    },
    /// Unexpected token encountered during parsing.
    UnexpectedToken {
        /// Human-friendly expectation summary.
        expected: &'static str,
        /// The token that was actually seen.
        found: String,
        /// Byte offset in the original input.
        position: usize,
    },
    /// Path reference head was not `env` or `vars`.
    UnknownNamespace {
        /// The offending head segment.
        name: String,
        /// Byte offset in the original input.
        position: usize,
    },
    /// Numeric literal failed to parse.
    InvalidNumber {
        /// The raw numeric text.
        raw: String,
        /// Byte offset in the original input.
        position: usize,
    },
    /// String literal was not terminated before end of input.
    UnterminatedString {
        /// Byte offset where the string literal begins.
        position: usize,
    },
    /// Unexpected trailing input after a complete expression.
    TrailingInput {
        /// Byte offset where unexpected input begins.
        position: usize,
    },
}

impl fmt::Display for ExprError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyInput => write!(f, "expression is empty"),
            Self::InputTooLarge {
                max_bytes,
                actual_bytes,
            } => {
                write!(f, "expression exceeds size limit: {actual_bytes} bytes (max {max_bytes})")
            }
            Self::NestingTooDeep {
                max_depth,
                actual_depth,
                position,
            } => write!(
                f,
                "expression nesting exceeds limit: depth {actual_depth} (max {max_depth}) at {position}"
            ),
            Self::UnexpectedToken {
                expected,
                found,
                position,
            } => {
                write!(f, "unexpected token `{found}` at {position}, expected {expected}")
            }
            Self::UnknownNamespace {
                name,
                position,
            } => {
                write!(f, "unknown namespace `{name}` at {position}, expected `env` or `vars`")
            }
            Self::InvalidNumber {
                raw,
                position,
            } => {
                write!(f, "invalid number `{raw}` at {position}")
            }
            Self::UnterminatedString {
                position,
            } => {
                write!(f, "unterminated string literal at {position}")
            }
            Self::TrailingInput {
                position,
            } => {
                write!(f, "unexpected trailing input at {position}")
            }
        }
    }
}

impl std::error::Error for ExprError {}

// ============================================================================
// SECTION: Public API
// ============================================================================

/// Parses a guard expression into an immutable [`Expr`] tree.
///
/// # Arguments
/// * `input` - Guard string (e.g., `"env.os_family == 'linux' and vars.fast"`).
///
/// # Errors
/// Returns [`ExprError`] for syntax issues, namespace violations, invalid
/// numbers, unterminated strings, or trailing input.
pub fn parse_expr(input: &str) -> Result<Expr, ExprError> {
    if input.len() > MAX_EXPR_INPUT_BYTES {
        return Err(ExprError::InputTooLarge {
            max_bytes: MAX_EXPR_INPUT_BYTES,
            actual_bytes: input.len(),
        });
    }
    let mut lexer = Lexer::new(input);
    let tokens = lexer.lex()?;

    let mut parser = Parser::new(tokens);
    let expr = parser.parse_or()?;
    parser.expect_eof()?;
    Ok(expr)
}

// ============================================================================
// SECTION: Lexer
// ============================================================================

/// Lexer token produced from the guard input.
#[derive(Debug, Clone, PartialEq)]
enum Token {
    /// Dotted path reference (already split into segments).
    Path(Vec<String>),
    /// Numeric literal.
    Number(String),
    /// String literal with quotes removed.
    Str(String),
    /// Boolean literal `true`.
    True,
    /// Boolean literal `false`.
    False,
    /// Null literal.
    Null,
    /// Logical AND keyword.
    And,
    /// Logical OR keyword.
    Or,
    /// Logical NOT keyword.
    Not,
    /// Comparison operator.
    Compare(CompareOp),
    /// Left parenthesis.
    LParen,
    /// Right parenthesis.
    RParen,
    /// End-of-input marker.
    Eof,
}

impl Token {
    /// Returns a short, human-friendly description for diagnostics.
    fn describe(&self) -> String {
        match self {
            Self::Path(segments) => segments.join("."),
            Self::Number(raw) => raw.clone(),
            Self::Str(value) => format!("'{value}'"),
            Self::True => "true".to_string(),
            Self::False => "false".to_string(),
            Self::Null => "null".to_string(),
            Self::And => "and".to_string(),
            Self::Or => "or".to_string(),
            Self::Not => "not".to_string(),
            Self::Compare(op) => op.symbol().to_string(),
            Self::LParen => "(".to_string(),
            Self::RParen => ")".to_string(),
            Self::Eof => "end of input".to_string(),
        }
    }
}

/// Token paired with its byte offset.
#[derive(Debug, Clone, PartialEq)]
struct SpannedToken {
    /// Token value.
    token: Token,
    /// Byte offset into the input.
    position: usize,
}

/// Lexer for guard expressions.
struct Lexer<'a> {
    /// Source input being tokenized.
    input: &'a str,
    /// Current byte offset into the input.
    offset: usize,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer for the given input.
    const fn new(input: &'a str) -> Self {
        Self {
            input,
            offset: 0,
        }
    }

    /// Lexes the input into a sequence of tokens.
    fn lex(&mut self) -> Result<Vec<SpannedToken>, ExprError> {
        let mut tokens = Vec::new();
        let bytes = self.input.as_bytes();

        while self.offset < bytes.len() {
            let start = self.offset;
            let ch = bytes[self.offset];
            match ch {
                b' ' | b'\t' | b'\n' | b'\r' => {
                    self.offset += 1;
                }
                b'(' => {
                    tokens.push(SpannedToken {
                        token: Token::LParen,
                        position: start,
                    });
                    self.offset += 1;
                }
                b')' => {
                    tokens.push(SpannedToken {
                        token: Token::RParen,
                        position: start,
                    });
                    self.offset += 1;
                }
                b'=' => {
                    if self.peek(bytes) == Some(b'=') {
                        tokens.push(SpannedToken {
                            token: Token::Compare(CompareOp::Eq),
                            position: start,
                        });
                        self.offset += 2;
                    } else {
                        return Err(ExprError::UnexpectedToken {
                            expected: "==",
                            found: "=".to_string(),
                            position: start,
                        });
                    }
                }
                b'!' => {
                    if self.peek(bytes) == Some(b'=') {
                        tokens.push(SpannedToken {
                            token: Token::Compare(CompareOp::Ne),
                            position: start,
                        });
                        self.offset += 2;
                    } else {
                        return Err(ExprError::UnexpectedToken {
                            expected: "!=",
                            found: "!".to_string(),
                            position: start,
                        });
                    }
                }
                b'<' => {
                    let op = if self.peek(bytes) == Some(b'=') {
                        self.offset += 2;
                        CompareOp::Lte
                    } else {
                        self.offset += 1;
                        CompareOp::Lt
                    };
                    tokens.push(SpannedToken {
                        token: Token::Compare(op),
                        position: start,
                    });
                }
                b'>' => {
                    let op = if self.peek(bytes) == Some(b'=') {
                        self.offset += 2;
                        CompareOp::Gte
                    } else {
                        self.offset += 1;
                        CompareOp::Gt
                    };
                    tokens.push(SpannedToken {
                        token: Token::Compare(op),
                        position: start,
                    });
                }
                b'\'' | b'"' => {
                    tokens.push(self.lex_string(bytes, ch)?);
                }
                b'0' ..= b'9' | b'-' => {
                    tokens.push(self.lex_number(bytes)?);
                }
                b'a' ..= b'z' | b'A' ..= b'Z' | b'_' => {
                    tokens.push(self.lex_word(bytes)?);
                }
                _ => {
                    return Err(ExprError::UnexpectedToken {
                        expected: "literal, path, or operator",
                        found: char::from(ch).to_string(),
                        position: start,
                    });
                }
            }
        }

        if tokens.is_empty() {
            return Err(ExprError::EmptyInput);
        }

        tokens.push(SpannedToken {
            token: Token::Eof,
            position: self.offset,
        });
        Ok(tokens)
    }

    /// Returns the next byte without advancing.
    fn peek(&self, bytes: &[u8]) -> Option<u8> {
        bytes.get(self.offset + 1).copied()
    }

    /// Lexes a quoted string literal.
    fn lex_string(&mut self, bytes: &[u8], quote: u8) -> Result<SpannedToken, ExprError> {
        let start = self.offset;
        self.offset += 1;
        let body_start = self.offset;
        while let Some(&b) = bytes.get(self.offset) {
            if b == quote {
                let value = self.input[body_start .. self.offset].to_string();
                self.offset += 1;
                return Ok(SpannedToken {
                    token: Token::Str(value),
                    position: start,
                });
            }
            self.offset += 1;
        }
        Err(ExprError::UnterminatedString {
            position: start,
        })
    }

    /// Lexes a numeric literal (integer or decimal, optional leading minus).
    fn lex_number(&mut self, bytes: &[u8]) -> Result<SpannedToken, ExprError> {
        let start = self.offset;
        if bytes[self.offset] == b'-' {
            self.offset += 1;
        }
        self.consume_while(bytes, |b| b.is_ascii_digit());
        if bytes.get(self.offset) == Some(&b'.') {
            self.offset += 1;
            self.consume_while(bytes, |b| b.is_ascii_digit());
        }
        let raw = &self.input[start .. self.offset];
        if raw == "-" || raw.ends_with('.') {
            return Err(ExprError::InvalidNumber {
                raw: raw.to_string(),
                position: start,
            });
        }
        Ok(SpannedToken {
            token: Token::Number(raw.to_string()),
            position: start,
        })
    }

    /// Lexes a keyword or dotted path reference.
    fn lex_word(&mut self, bytes: &[u8]) -> Result<SpannedToken, ExprError> {
        let start = self.offset;
        let mut segments = Vec::new();
        loop {
            let seg_start = self.offset;
            self.consume_while(bytes, |b| b.is_ascii_alphanumeric() || b == b'_');
            if self.offset == seg_start {
                return Err(ExprError::UnexpectedToken {
                    expected: "path segment",
                    found: ".".to_string(),
                    position: seg_start,
                });
            }
            segments.push(self.input[seg_start .. self.offset].to_string());
            if bytes.get(self.offset) == Some(&b'.') {
                self.offset += 1;
            } else {
                break;
            }
        }

        if segments.len() == 1 {
            let token = match segments[0].as_str() {
                "and" => Token::And,
                "or" => Token::Or,
                "not" => Token::Not,
                "true" => Token::True,
                "false" => Token::False,
                "null" => Token::Null,
                other => {
                    return Err(ExprError::UnknownNamespace {
                        name: other.to_string(),
                        position: start,
                    });
                }
            };
            return Ok(SpannedToken {
                token,
                position: start,
            });
        }

        if segments[0] != "env" && segments[0] != "vars" {
            return Err(ExprError::UnknownNamespace {
                name: segments[0].clone(),
                position: start,
            });
        }

        Ok(SpannedToken {
            token: Token::Path(segments),
            position: start,
        })
    }

    /// Advances while the condition matches the current byte.
    fn consume_while<F>(&mut self, bytes: &[u8], condition: F)
    where
        F: Fn(u8) -> bool,
    {
        while let Some(&b) = bytes.get(self.offset) {
            if condition(b) {
                self.offset += 1;
            } else {
                break;
            }
        }
    }
}

// ============================================================================
// SECTION: Parser
// ============================================================================

/// Recursive-descent parser for guard expressions.
struct Parser {
    /// Token stream with source positions.
    tokens: Vec<SpannedToken>,
    /// Current token index.
    index: usize,
    /// Current nesting depth for parenthesized expressions.
    nesting: usize,
}

impl Parser {
    /// Creates a parser over the token stream.
    const fn new(tokens: Vec<SpannedToken>) -> Self {
        Self {
            tokens,
            index: 0,
            nesting: 0,
        }
    }

    /// Parses OR expressions (loosest precedence).
    fn parse_or(&mut self) -> Result<Expr, ExprError> {
        let mut parts = Vec::new();
        parts.push(self.parse_and()?);

        while self.matches(&Token::Or) {
            parts.push(self.parse_and()?);
        }

        if parts.len() == 1 { Ok(parts.remove(0)) } else { Ok(Expr::Or(parts)) }
    }

    /// Parses AND expressions.
    fn parse_and(&mut self) -> Result<Expr, ExprError> {
        let mut parts = Vec::new();
        parts.push(self.parse_comparison()?);

        while self.matches(&Token::And) {
            parts.push(self.parse_comparison()?);
        }

        if parts.len() == 1 { Ok(parts.remove(0)) } else { Ok(Expr::And(parts)) }
    }

    /// Parses an optional binary comparison.
    fn parse_comparison(&mut self) -> Result<Expr, ExprError> {
        let lhs = self.parse_unary()?;
        if let Token::Compare(op) = self.current().token {
            self.advance();
            let rhs = self.parse_unary()?;
            return Ok(Expr::Compare {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            });
        }
        Ok(lhs)
    }

    /// Parses unary expressions, including NOT.
    fn parse_unary(&mut self) -> Result<Expr, ExprError> {
        if self.matches(&Token::Not) {
            let inner = self.parse_unary()?;
            return Ok(Expr::Not(Box::new(inner)));
        }
        self.parse_primary()
    }

    /// Parses a primary expression.
    fn parse_primary(&mut self) -> Result<Expr, ExprError> {
        let SpannedToken {
            token,
            position,
        } = self.current().clone();

        match token {
            Token::Path(segments) => {
                self.advance();
                Ok(Expr::Path(PathRef::new(segments)))
            }
            Token::Number(raw) => {
                self.advance();
                parse_number_literal(&raw, position)
            }
            Token::Str(value) => {
                self.advance();
                Ok(Expr::Literal(Value::String(value)))
            }
            Token::True => {
                self.advance();
                Ok(Expr::Literal(Value::Bool(true)))
            }
            Token::False => {
                self.advance();
                Ok(Expr::Literal(Value::Bool(false)))
            }
            Token::Null => {
                self.advance();
                Ok(Expr::Literal(Value::Null))
            }
            Token::LParen => {
                self.advance();
                self.with_nesting(position, |parser| {
                    let expr = parser.parse_or()?;
                    parser.expect_rparen()?;
                    Ok(expr)
                })
            }
            Token::Compare(_) | Token::RParen | Token::And | Token::Or | Token::Not | Token::Eof => {
                Err(ExprError::UnexpectedToken {
                    expected: "literal, path, or `(`",
                    found: token.describe(),
                    position,
                })
            }
        }
    }

    /// Runs a parser step while enforcing the nesting limit.
    fn with_nesting<T>(
        &mut self,
        position: usize,
        f: impl FnOnce(&mut Self) -> Result<T, ExprError>,
    ) -> Result<T, ExprError> {
        let next_depth = self.nesting + 1;
        if next_depth > MAX_EXPR_NESTING {
            return Err(ExprError::NestingTooDeep {
                max_depth: MAX_EXPR_NESTING,
                actual_depth: next_depth,
                position,
            });
        }
        self.nesting = next_depth;
        let result = f(self);
        self.nesting = self.nesting.saturating_sub(1);
        result
    }

    /// Returns the current token without advancing.
    fn current(&self) -> &SpannedToken {
        self.tokens.get(self.index).unwrap_or_else(|| {
            // The token stream always ends with Eof; index never passes it.
            &self.tokens[self.tokens.len() - 1]
        })
    }

    /// Advances past the current token.
    fn advance(&mut self) {
        if self.index + 1 < self.tokens.len() {
            self.index += 1;
        }
    }

    /// Consumes the given token when it matches, returning whether it did.
    fn matches(&mut self, token: &Token) -> bool {
        if &self.current().token == token {
            self.advance();
            return true;
        }
        false
    }

    /// Consumes a closing parenthesis or returns an error.
    fn expect_rparen(&mut self) -> Result<(), ExprError> {
        if self.matches(&Token::RParen) {
            return Ok(());
        }
        Err(ExprError::UnexpectedToken {
            expected: "`)`",
            found: self.current().token.describe(),
            position: self.current().position,
        })
    }

    /// Verifies the full input was consumed.
    fn expect_eof(&self) -> Result<(), ExprError> {
        if self.current().token == Token::Eof {
            return Ok(());
        }
        Err(ExprError::TrailingInput {
            position: self.current().position,
        })
    }
}

/// Parses a numeric literal token into a JSON number.
fn parse_number_literal(raw: &str, position: usize) -> Result<Expr, ExprError> {
    if raw.contains('.') {
        let parsed: f64 = raw.parse().map_err(|_| ExprError::InvalidNumber {
            raw: raw.to_string(),
            position,
        })?;
        let number = Number::from_f64(parsed).ok_or_else(|| ExprError::InvalidNumber {
            raw: raw.to_string(),
            position,
        })?;
        return Ok(Expr::Literal(Value::Number(number)));
    }
    let parsed: i64 = raw.parse().map_err(|_| ExprError::InvalidNumber {
        raw: raw.to_string(),
        position,
    })?;
    Ok(Expr::Literal(Value::Number(Number::from(parsed))))
}
