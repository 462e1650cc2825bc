//! Lexical tokens of the expression language.

use std::fmt;

use tally_core::Value;

/// The kind of a lexical token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// A literal carrying a parsed [`Value`].
    Value,
    /// An identifier, resolved against a scope at evaluation time.
    Ident,
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `==`
    Equal,
    /// `!=`
    NotEqual,
    /// `<`
    Less,
    /// `<=`
    LessEq,
    /// `>`
    Greater,
    /// `>=`
    GreaterEq,
    /// `=`
    Assign,
    /// `=~`
    Match,
    /// `!~`
    NotMatch,
    /// `-`
    Minus,
    /// `+`
    Plus,
    /// `*`
    Star,
    /// `/` in operator position
    Slash,
    /// `->`
    Arrow,
    /// `!` or the reserved word `not`
    Exclam,
    /// The reserved word `and`, or `&`/`&&`
    KwAnd,
    /// The reserved word `or`, or `|`/`||`
    KwOr,
    /// The reserved word `div`
    KwDiv,
    /// The reserved word `if`
    KwIf,
    /// The reserved word `else`
    KwElse,
    /// `?`
    Query,
    /// `:`
    Colon,
    /// `.`
    Dot,
    /// `,`
    Comma,
    /// `;`
    Semi,
    /// End of input.
    Eof,
    /// A token the scanner could not classify.
    Error,
}

impl TokenKind {
    /// The canonical spelling of this kind.
    #[must_use]
    pub const fn to_str(self) -> &'static str {
        match self {
            Self::Value => "<value>",
            Self::Ident => "<ident>",
            Self::LParen => "(",
            Self::RParen => ")",
            Self::Equal => "==",
            Self::NotEqual => "!=",
            Self::Less => "<",
            Self::LessEq => "<=",
            Self::Greater => ">",
            Self::GreaterEq => ">=",
            Self::Assign => "=",
            Self::Match => "=~",
            Self::NotMatch => "!~",
            Self::Minus => "-",
            Self::Plus => "+",
            Self::Star => "*",
            Self::Slash => "/",
            Self::Arrow => "->",
            Self::Exclam => "!",
            Self::KwAnd => "and",
            Self::KwOr => "or",
            Self::KwDiv => "div",
            Self::KwIf => "if",
            Self::KwElse => "else",
            Self::Query => "?",
            Self::Colon => ":",
            Self::Dot => ".",
            Self::Comma => ",",
            Self::Semi => ";",
            Self::Eof => "<end of input>",
            Self::Error => "<error token>",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_str())
    }
}

/// One lexical unit.
///
/// `length` is the number of bytes consumed from the input, including the
/// delimiters of a literal. `symbol` is the raw text used in error
/// messages: the opening delimiter for delimited literals, the first
/// character for identifiers and bare amounts, and the reserved-word
/// table's symbol for keywords (`and` carries `&`, `not` carries `!`).
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// The token kind.
    pub kind: TokenKind,
    /// Bytes of input consumed by this token.
    pub length: usize,
    /// The carried value; [`Value::Void`] unless `kind` is
    /// [`TokenKind::Value`] or [`TokenKind::Ident`].
    pub value: Value,
    /// Raw symbol text for error messages.
    pub symbol: String,
}

impl Token {
    /// Create a token with no carried value.
    #[must_use]
    pub fn new(kind: TokenKind, length: usize, symbol: impl Into<String>) -> Self {
        Self {
            kind,
            length,
            value: Value::Void,
            symbol: symbol.into(),
        }
    }

    /// Create a literal token carrying a value.
    #[must_use]
    pub fn value(length: usize, value: Value, symbol: impl Into<String>) -> Self {
        Self {
            kind: TokenKind::Value,
            length,
            value,
            symbol: symbol.into(),
        }
    }

    /// Create an identifier token.
    #[must_use]
    pub fn ident(length: usize, name: &str) -> Self {
        let symbol = name.chars().next().map(String::from).unwrap_or_default();
        Self {
            kind: TokenKind::Ident,
            length,
            value: Value::string(name),
            symbol,
        }
    }

    /// Create an end-of-input token.
    #[must_use]
    pub fn eof() -> Self {
        Self::new(TokenKind::Eof, 0, "")
    }

    /// The identifier name, when this token is an [`TokenKind::Ident`].
    #[must_use]
    pub fn ident_name(&self) -> Option<&str> {
        match (&self.kind, &self.value) {
            (TokenKind::Ident, Value::String(name)) => Some(name),
            _ => None,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.kind, &self.value) {
            (TokenKind::Value, Value::Mask(mask)) => write!(f, "<mask '{mask}'>"),
            (TokenKind::Value, value) => write!(f, "<value '{value}'>"),
            (TokenKind::Ident, Value::String(name)) => write!(f, "<ident '{name}'>"),
            (kind, _) => f.write_str(kind.to_str()),
        }
    }
}
