//! Expression language error types.

use thiserror::Error;

use tally_core::ValueError;

use crate::scope::SymbolKind;

/// Error returned when tokenizing expression text fails.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("lex error at position {offset}: {kind}")]
pub struct LexError {
    /// The kind of error.
    pub kind: LexErrorKind,
    /// Byte offset in the input where the error occurred.
    pub offset: usize,
}

/// The kind of lex error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexErrorKind {
    /// A delimited literal ran past the end of the input.
    #[error("unterminated literal opened by '{0}'")]
    UnterminatedLiteral(char),
    /// A bracketed date literal did not parse.
    #[error("invalid date literal '{0}'")]
    BadDate(String),
    /// A braced or bare amount literal did not parse.
    #[error("invalid amount literal '{0}'")]
    BadAmount(String),
    /// A mask literal failed regex compilation.
    #[error("invalid mask pattern: {0}")]
    BadMask(String),
    /// A character no token can start with.
    #[error("unexpected character '{0}'")]
    UnexpectedChar(char),
}

impl LexError {
    /// Create a new lex error.
    pub const fn new(kind: LexErrorKind, offset: usize) -> Self {
        Self { kind, offset }
    }
}

/// Error returned when parsing an expression fails.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("parse error at position {offset}: {kind}")]
pub struct ParseError {
    /// The kind of error.
    pub kind: ParseErrorKind,
    /// Byte offset in the input where the error occurred.
    pub offset: usize,
}

/// The kind of parse error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    /// A token that cannot appear at this position.
    #[error("unexpected {0}")]
    UnexpectedToken(String),
    /// A `(` without its matching `)`.
    #[error("unmatched parenthesis")]
    UnmatchedParen,
    /// `()` or a missing operand where a sub-expression is required.
    #[error("empty sub-expression")]
    EmptyExpression,
    /// A ternary `?` without its `:`.
    #[error("ternary '?' without matching ':'")]
    IncompleteTernary,
    /// Tokenization failed.
    #[error(transparent)]
    Lex(LexErrorKind),
}

impl ParseError {
    /// Create a new parse error.
    pub const fn new(kind: ParseErrorKind, offset: usize) -> Self {
        Self { kind, offset }
    }
}

impl From<LexError> for ParseError {
    fn from(err: LexError) -> Self {
        Self {
            kind: ParseErrorKind::Lex(err.kind),
            offset: err.offset,
        }
    }
}

/// Error returned when evaluating an expression fails.
#[derive(Debug, Error)]
pub enum EvalError {
    /// No scope in the chain resolved the name.
    #[error("unbound {kind} '{name}'")]
    UnboundSymbol {
        /// The symbol kind that was requested.
        kind: SymbolKind,
        /// The unresolved name.
        name: String,
    },
    /// A call target resolved to a plain value.
    #[error("'{0}' is not a function")]
    NotAFunction(String),
    /// A function received arguments it cannot accept.
    #[error("invalid arguments for '{name}': {reason}")]
    InvalidArguments {
        /// The function name.
        name: String,
        /// Human-readable cause.
        reason: String,
    },
    /// Arithmetic or comparison failed.
    #[error(transparent)]
    Value(#[from] ValueError),
}
