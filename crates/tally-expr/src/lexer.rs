//! Hand-rolled tokenizer for the expression language.
//!
//! The tokenizer produces one [`Token`] at a time from a byte cursor; the
//! grammar never retains more than one token of lookahead. Four delimited
//! literal sub-grammars are scanned inline: `[date]`, quoted strings,
//! `/mask/` and `{amount}`. Each consumes through its matching closing
//! delimiter with no nesting; an unterminated literal is a [`LexError`]
//! positioned at end of input.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;

use tally_core::{parse_amount, Amount, CommodityPool, Mask, Value};

use crate::error::{LexError, LexErrorKind};
use crate::token::{Token, TokenKind};

/// Context flags passed to each [`Tokenizer::next_token`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseFlags {
    /// The cursor sits in operator position: a `/` is division, not the
    /// start of a mask literal.
    pub op_context: bool,
    /// Amount literals must not widen commodity display precision.
    pub no_migrate: bool,
}

impl ParseFlags {
    /// Flags for a token expected in operand position.
    pub const OPERAND: Self = Self {
        op_context: false,
        no_migrate: false,
    };
    /// Flags for a token expected in operator position.
    pub const OPERATOR: Self = Self {
        op_context: true,
        no_migrate: false,
    };
}

/// Outcome of the reserved-word scan.
#[derive(Debug, Clone, PartialEq)]
pub enum ReservedScan {
    /// A reserved word was recognized and consumed.
    Matched(Token),
    /// No reserved content applies here; the caller falls through to
    /// generic scanning.
    Fallthrough,
    /// The cursor is at end of input.
    EndOfInput,
}

/// A cursor over expression text producing typed tokens.
#[derive(Debug)]
pub struct Tokenizer<'a> {
    source: &'a str,
    offset: usize,
    pool: &'a CommodityPool,
}

const fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

const fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

impl<'a> Tokenizer<'a> {
    /// Create a tokenizer over `source`, interning commodities in `pool`.
    #[must_use]
    pub const fn new(source: &'a str, pool: &'a CommodityPool) -> Self {
        Self {
            source,
            offset: 0,
            pool,
        }
    }

    /// Current byte offset into the source.
    #[must_use]
    pub const fn offset(&self) -> usize {
        self.offset
    }

    /// The next character without skipping whitespace.
    ///
    /// Used by the parser to bind `ident(` as a call only when the
    /// parenthesis is adjacent.
    #[must_use]
    pub fn peek_immediate(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn rest(&self) -> &'a str {
        &self.source[self.offset..]
    }

    fn skip_whitespace(&mut self) {
        let trimmed = self.rest().trim_start();
        self.offset = self.source.len() - trimmed.len();
    }

    /// Scan a reserved word at the cursor, if one applies.
    ///
    /// Reserved words require a non-identifier boundary: `anything` falls
    /// through as a plain identifier rather than partially matching `and`.
    pub fn scan_reserved(&mut self) -> ReservedScan {
        self.skip_whitespace();
        let rest = self.rest();
        let Some(first) = rest.chars().next() else {
            return ReservedScan::EndOfInput;
        };
        if !is_ident_start(first) {
            return ReservedScan::Fallthrough;
        }
        let word_len = rest
            .char_indices()
            .find(|&(_, c)| !is_ident_char(c))
            .map_or(rest.len(), |(i, _)| i);
        let word = &rest[..word_len];

        let token = match word {
            "and" => Token::new(TokenKind::KwAnd, word_len, "&"),
            "or" => Token::new(TokenKind::KwOr, word_len, "|"),
            "not" => Token::new(TokenKind::Exclam, word_len, "!"),
            "div" => Token::new(TokenKind::KwDiv, word_len, "/"),
            "if" => Token::new(TokenKind::KwIf, word_len, "if"),
            "else" => Token::new(TokenKind::KwElse, word_len, "else"),
            "true" => Token::value(word_len, Value::Bool(true), "true"),
            "false" => Token::value(word_len, Value::Bool(false), "false"),
            _ => return ReservedScan::Fallthrough,
        };
        self.offset += word_len;
        ReservedScan::Matched(token)
    }

    /// Produce the next token.
    ///
    /// # Errors
    ///
    /// Returns a [`LexError`] for malformed or unterminated literals and
    /// for characters no token can start with.
    pub fn next_token(&mut self, flags: ParseFlags) -> Result<Token, LexError> {
        match self.scan_reserved() {
            ReservedScan::Matched(token) => return Ok(token),
            ReservedScan::EndOfInput => return Ok(Token::eof()),
            ReservedScan::Fallthrough => {}
        }

        let start = self.offset;
        let rest = self.rest();
        let first = rest.chars().next().unwrap_or_default();

        if is_ident_start(first) {
            let len = rest
                .char_indices()
                .find(|&(_, c)| !is_ident_char(c))
                .map_or(rest.len(), |(i, _)| i);
            self.offset += len;
            return Ok(Token::ident(len, &rest[..len]));
        }
        if first.is_ascii_digit() {
            return self.scan_bare_amount();
        }

        match first {
            '[' => self.scan_date(),
            '\'' | '"' => self.scan_string(first),
            '{' => self.scan_braced_amount(flags),
            '/' if !flags.op_context => self.scan_mask(),
            _ => {
                let token = self.scan_operator(first, start)?;
                Ok(token)
            }
        }
    }

    fn scan_operator(&mut self, first: char, start: usize) -> Result<Token, LexError> {
        let second = self.rest().chars().nth(1);
        let (kind, len) = match (first, second) {
            ('=', Some('=')) => (TokenKind::Equal, 2),
            ('=', Some('~')) => (TokenKind::Match, 2),
            ('=', _) => (TokenKind::Assign, 1),
            ('!', Some('=')) => (TokenKind::NotEqual, 2),
            ('!', Some('~')) => (TokenKind::NotMatch, 2),
            ('!', _) => (TokenKind::Exclam, 1),
            ('<', Some('=')) => (TokenKind::LessEq, 2),
            ('<', _) => (TokenKind::Less, 1),
            ('>', Some('=')) => (TokenKind::GreaterEq, 2),
            ('>', _) => (TokenKind::Greater, 1),
            ('-', Some('>')) => (TokenKind::Arrow, 2),
            ('-', _) => (TokenKind::Minus, 1),
            ('&', Some('&')) => (TokenKind::KwAnd, 2),
            ('&', _) => (TokenKind::KwAnd, 1),
            ('|', Some('|')) => (TokenKind::KwOr, 2),
            ('|', _) => (TokenKind::KwOr, 1),
            ('+', _) => (TokenKind::Plus, 1),
            ('*', _) => (TokenKind::Star, 1),
            ('/', _) => (TokenKind::Slash, 1),
            ('(', _) => (TokenKind::LParen, 1),
            (')', _) => (TokenKind::RParen, 1),
            ('?', _) => (TokenKind::Query, 1),
            (':', _) => (TokenKind::Colon, 1),
            ('.', _) => (TokenKind::Dot, 1),
            (',', _) => (TokenKind::Comma, 1),
            (';', _) => (TokenKind::Semi, 1),
            _ => {
                return Err(LexError::new(LexErrorKind::UnexpectedChar(first), start));
            }
        };
        self.offset += len;
        let symbol = match kind {
            TokenKind::KwAnd => "&".to_string(),
            TokenKind::KwOr => "|".to_string(),
            _ => kind.to_str().to_string(),
        };
        Ok(Token::new(kind, len, symbol))
    }

    /// Consume a delimited literal's body, returning it without the
    /// delimiters. `open` has not been consumed yet.
    fn scan_delimited(&mut self, open: char, close: char) -> Result<&'a str, LexError> {
        let body_start = self.offset + open.len_utf8();
        let body = &self.source[body_start..];
        match body.find(close) {
            Some(end) => {
                self.offset = body_start + end + close.len_utf8();
                Ok(&body[..end])
            }
            None => Err(LexError::new(
                LexErrorKind::UnterminatedLiteral(open),
                self.source.len(),
            )),
        }
    }

    fn scan_date(&mut self) -> Result<Token, LexError> {
        let start = self.offset;
        let body = self.scan_delimited('[', ']')?;
        let text = body.trim();
        let length = self.offset - start;

        for format in ["%Y/%m/%d %H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
            if let Ok(datetime) = NaiveDateTime::parse_from_str(text, format) {
                return Ok(Token::value(length, Value::DateTime(datetime), "["));
            }
        }
        for format in ["%Y/%m/%d", "%Y-%m-%d"] {
            if let Ok(date) = NaiveDate::parse_from_str(text, format) {
                return Ok(Token::value(length, Value::Date(date), "["));
            }
        }
        Err(LexError::new(
            LexErrorKind::BadDate(text.to_string()),
            start,
        ))
    }

    fn scan_string(&mut self, quote: char) -> Result<Token, LexError> {
        let start = self.offset;
        let body = self.scan_delimited(quote, quote)?;
        Ok(Token::value(
            self.offset - start,
            Value::string(body),
            quote.to_string(),
        ))
    }

    fn scan_mask(&mut self) -> Result<Token, LexError> {
        let start = self.offset;
        let body = self.scan_delimited('/', '/')?;
        let length = self.offset - start;
        // An empty mask is an empty string, never Void
        if body.is_empty() {
            return Ok(Token::value(length, Value::string(""), "/"));
        }
        let mask = Mask::new(body)
            .map_err(|e| LexError::new(LexErrorKind::BadMask(e.to_string()), start))?;
        Ok(Token::value(length, Value::Mask(mask), "/"))
    }

    fn scan_braced_amount(&mut self, flags: ParseFlags) -> Result<Token, LexError> {
        let start = self.offset;
        let body = self.scan_delimited('{', '}')?;
        let amount = parse_amount(body.trim(), self.pool, flags.no_migrate)
            .map_err(|_| LexError::new(LexErrorKind::BadAmount(body.trim().to_string()), start))?;
        Ok(Token::value(
            self.offset - start,
            Value::Amount(amount),
            "{",
        ))
    }

    fn scan_bare_amount(&mut self) -> Result<Token, LexError> {
        let start = self.offset;
        let rest = self.rest();
        let len = rest
            .char_indices()
            .find(|&(_, c)| !(c.is_ascii_digit() || c == '.' || c == ','))
            .map_or(rest.len(), |(i, _)| i);
        let text = &rest[..len];
        let digits: String = text.chars().filter(|&c| c != ',').collect();
        let quantity: Decimal = digits
            .parse()
            .map_err(|_| LexError::new(LexErrorKind::BadAmount(text.to_string()), start))?;
        self.offset += len;
        let symbol = text.chars().next().map(String::from).unwrap_or_default();
        Ok(Token::value(len, Value::Amount(Amount::new(quantity)), symbol))
    }
}
