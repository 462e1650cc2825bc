//! Precedence-climbing parser for the expression language.
//!
//! Binding levels, loosest to tightest: comma sequence; ternary `?:`
//! (right-associative); `or`; `and`; `not`; equality `== != =~ !~`;
//! relational `< <= > >=`; additive `+ -`; multiplicative `* / div`;
//! unary minus; primary. All binary operators except ternary are
//! left-associative.
//!
//! Parsing either fully succeeds or reports a [`ParseError`] carrying the
//! offending token's source offset; no partial tree is returned.

use tally_core::CommodityPool;

use crate::error::{ParseError, ParseErrorKind};
use crate::lexer::{ParseFlags, Tokenizer};
use crate::op::{BinaryOp, ExprOp, UnaryOp};
use crate::token::{Token, TokenKind};

/// A single-use parser over one expression's text.
#[derive(Debug)]
pub struct Parser<'a> {
    lexer: Tokenizer<'a>,
    peeked: Option<Token>,
    no_migrate: bool,
}

impl<'a> Parser<'a> {
    /// Create a parser over `source`, interning commodities in `pool`.
    #[must_use]
    pub const fn new(source: &'a str, pool: &'a CommodityPool) -> Self {
        Self {
            lexer: Tokenizer::new(source, pool),
            peeked: None,
            no_migrate: false,
        }
    }

    /// As [`Self::new`], but amount literals leave commodity display
    /// precision untouched.
    #[must_use]
    pub const fn new_no_migrate(source: &'a str, pool: &'a CommodityPool) -> Self {
        Self {
            lexer: Tokenizer::new(source, pool),
            peeked: None,
            no_migrate: true,
        }
    }

    /// Parse the whole input as one expression.
    pub fn parse(mut self) -> Result<ExprOp, ParseError> {
        let op = self.parse_sequence()?;
        let trailing = self.next(true)?;
        if trailing.kind == TokenKind::Eof {
            Ok(op)
        } else {
            Err(self.error_at(&trailing, ParseErrorKind::UnexpectedToken(trailing.to_string())))
        }
    }

    fn flags(&self, op_context: bool) -> ParseFlags {
        ParseFlags {
            op_context,
            no_migrate: self.no_migrate,
        }
    }

    fn peek(&mut self, op_context: bool) -> Result<&Token, ParseError> {
        if self.peeked.is_none() {
            let flags = self.flags(op_context);
            self.peeked = Some(self.lexer.next_token(flags)?);
        }
        Ok(self.peeked.as_ref().unwrap())
    }

    fn next(&mut self, op_context: bool) -> Result<Token, ParseError> {
        match self.peeked.take() {
            Some(token) => Ok(token),
            None => {
                let flags = self.flags(op_context);
                Ok(self.lexer.next_token(flags)?)
            }
        }
    }

    /// Source offset of a token just returned by [`Self::next`] or
    /// [`Self::peek`]: the cursor sits right past it.
    fn error_at(&self, token: &Token, kind: ParseErrorKind) -> ParseError {
        ParseError::new(kind, self.lexer.offset() - token.length)
    }

    fn parse_sequence(&mut self) -> Result<ExprOp, ParseError> {
        let first = self.parse_ternary()?;
        if self.peek(true)?.kind != TokenKind::Comma {
            return Ok(first);
        }
        let mut items = vec![first];
        while self.peek(true)?.kind == TokenKind::Comma {
            self.next(true)?;
            items.push(self.parse_ternary()?);
        }
        Ok(ExprOp::Sequence(items))
    }

    fn parse_ternary(&mut self) -> Result<ExprOp, ParseError> {
        let cond = self.parse_or()?;
        if self.peek(true)?.kind != TokenKind::Query {
            return Ok(cond);
        }
        self.next(true)?;
        let then = self.parse_ternary()?;
        let colon = self.next(true)?;
        if colon.kind != TokenKind::Colon {
            return Err(self.error_at(&colon, ParseErrorKind::IncompleteTernary));
        }
        let otherwise = self.parse_ternary()?;
        Ok(ExprOp::Ternary {
            cond: Box::new(cond),
            then: Box::new(then),
            otherwise: Box::new(otherwise),
        })
    }

    fn parse_or(&mut self) -> Result<ExprOp, ParseError> {
        let mut left = self.parse_and()?;
        while self.peek(true)?.kind == TokenKind::KwOr {
            self.next(true)?;
            let right = self.parse_and()?;
            left = ExprOp::Binary(BinaryOp::Or, Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<ExprOp, ParseError> {
        let mut left = self.parse_not()?;
        while self.peek(true)?.kind == TokenKind::KwAnd {
            self.next(true)?;
            let right = self.parse_not()?;
            left = ExprOp::Binary(BinaryOp::And, Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_not(&mut self) -> Result<ExprOp, ParseError> {
        if self.peek(false)?.kind == TokenKind::Exclam {
            self.next(false)?;
            let child = self.parse_not()?;
            return Ok(ExprOp::Unary(UnaryOp::Not, Box::new(child)));
        }
        self.parse_equality()
    }

    fn parse_equality(&mut self) -> Result<ExprOp, ParseError> {
        let mut left = self.parse_relational()?;
        loop {
            let op = match self.peek(true)?.kind {
                TokenKind::Equal => BinaryOp::Eq,
                TokenKind::NotEqual => BinaryOp::NotEq,
                TokenKind::Match => BinaryOp::Match,
                TokenKind::NotMatch => BinaryOp::NotMatch,
                _ => return Ok(left),
            };
            self.next(true)?;
            let right = self.parse_relational()?;
            left = ExprOp::Binary(op, Box::new(left), Box::new(right));
        }
    }

    fn parse_relational(&mut self) -> Result<ExprOp, ParseError> {
        let mut left = self.parse_additive()?;
        loop {
            let op = match self.peek(true)?.kind {
                TokenKind::Less => BinaryOp::Less,
                TokenKind::LessEq => BinaryOp::LessEq,
                TokenKind::Greater => BinaryOp::Greater,
                TokenKind::GreaterEq => BinaryOp::GreaterEq,
                _ => return Ok(left),
            };
            self.next(true)?;
            let right = self.parse_additive()?;
            left = ExprOp::Binary(op, Box::new(left), Box::new(right));
        }
    }

    fn parse_additive(&mut self) -> Result<ExprOp, ParseError> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = match self.peek(true)?.kind {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                _ => return Ok(left),
            };
            self.next(true)?;
            let right = self.parse_multiplicative()?;
            left = ExprOp::Binary(op, Box::new(left), Box::new(right));
        }
    }

    fn parse_multiplicative(&mut self) -> Result<ExprOp, ParseError> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.peek(true)?.kind {
                TokenKind::Star => BinaryOp::Mul,
                TokenKind::Slash | TokenKind::KwDiv => BinaryOp::Div,
                _ => return Ok(left),
            };
            self.next(true)?;
            let right = self.parse_unary()?;
            left = ExprOp::Binary(op, Box::new(left), Box::new(right));
        }
    }

    fn parse_unary(&mut self) -> Result<ExprOp, ParseError> {
        if self.peek(false)?.kind == TokenKind::Minus {
            self.next(false)?;
            let child = self.parse_unary()?;
            return Ok(ExprOp::Unary(UnaryOp::Neg, Box::new(child)));
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<ExprOp, ParseError> {
        let token = self.next(false)?;
        match token.kind {
            TokenKind::Value => Ok(ExprOp::Constant(token.value)),
            TokenKind::Ident => {
                let name = token.ident_name().unwrap_or_default().to_string();
                // A call only when the parenthesis is adjacent; otherwise
                // the identifier is a late-bound symbol reference. The
                // lookahead cache is empty here, so the lexer cursor sits
                // right after the identifier.
                if self.lexer.peek_immediate() == Some('(') {
                    self.next(false)?;
                    return self.parse_call(name);
                }
                Ok(ExprOp::Ident(name))
            }
            TokenKind::LParen => {
                if self.peek(false)?.kind == TokenKind::RParen {
                    let close = self.next(true)?;
                    return Err(self.error_at(&close, ParseErrorKind::EmptyExpression));
                }
                let inner = self.parse_sequence()?;
                let close = self.next(true)?;
                if close.kind != TokenKind::RParen {
                    return Err(self.error_at(&close, ParseErrorKind::UnmatchedParen));
                }
                Ok(inner)
            }
            TokenKind::Eof => Err(ParseError::new(
                ParseErrorKind::EmptyExpression,
                self.lexer.offset(),
            )),
            _ => Err(self.error_at(
                &token,
                ParseErrorKind::UnexpectedToken(token.to_string()),
            )),
        }
    }

    fn parse_call(&mut self, name: String) -> Result<ExprOp, ParseError> {
        if self.peek(false)?.kind == TokenKind::RParen {
            self.next(true)?;
            return Ok(ExprOp::Call {
                name,
                args: Vec::new(),
            });
        }
        let inner = self.parse_sequence()?;
        let close = self.next(true)?;
        if close.kind != TokenKind::RParen {
            return Err(self.error_at(&close, ParseErrorKind::UnmatchedParen));
        }
        let args = match inner {
            ExprOp::Sequence(items) => items,
            single => vec![single],
        };
        Ok(ExprOp::Call { name, args })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use tally_core::{Amount, Value};

    fn parse(input: &str) -> ExprOp {
        let pool = CommodityPool::new();
        Parser::new(input, &pool).parse().unwrap()
    }

    fn parse_err(input: &str) -> ParseError {
        let pool = CommodityPool::new();
        Parser::new(input, &pool).parse().unwrap_err()
    }

    fn num(q: rust_decimal::Decimal) -> ExprOp {
        ExprOp::Constant(Value::Amount(Amount::new(q)))
    }

    #[test]
    fn test_multiplication_binds_tighter_than_addition() {
        let op = parse("1 + 2 * 3");
        assert_eq!(
            op,
            ExprOp::Binary(
                BinaryOp::Add,
                Box::new(num(dec!(1))),
                Box::new(ExprOp::Binary(
                    BinaryOp::Mul,
                    Box::new(num(dec!(2))),
                    Box::new(num(dec!(3))),
                )),
            )
        );
    }

    #[test]
    fn test_left_associativity() {
        let op = parse("1 - 2 - 3");
        assert_eq!(
            op,
            ExprOp::Binary(
                BinaryOp::Sub,
                Box::new(ExprOp::Binary(
                    BinaryOp::Sub,
                    Box::new(num(dec!(1))),
                    Box::new(num(dec!(2))),
                )),
                Box::new(num(dec!(3))),
            )
        );
    }

    #[test]
    fn test_parentheses_override_precedence() {
        let op = parse("(1 + 2) * 3");
        assert_eq!(
            op,
            ExprOp::Binary(
                BinaryOp::Mul,
                Box::new(ExprOp::Binary(
                    BinaryOp::Add,
                    Box::new(num(dec!(1))),
                    Box::new(num(dec!(2))),
                )),
                Box::new(num(dec!(3))),
            )
        );
    }

    #[test]
    fn test_div_keyword_is_division() {
        assert_eq!(parse("4 div 2"), parse("4 / 2"));
    }

    #[test]
    fn test_ternary_is_right_associative() {
        let op = parse("true ? 1 : false ? 2 : 3");
        let ExprOp::Ternary { otherwise, .. } = op else {
            panic!("expected ternary");
        };
        assert!(matches!(*otherwise, ExprOp::Ternary { .. }));
    }

    #[test]
    fn test_comma_builds_sequence() {
        let op = parse("1, 2, 3");
        let ExprOp::Sequence(items) = op else {
            panic!("expected sequence");
        };
        assert_eq!(items.len(), 3);
    }

    #[test]
    fn test_adjacent_paren_is_a_call() {
        let op = parse("total(1, 2)");
        let ExprOp::Call { name, args } = op else {
            panic!("expected call");
        };
        assert_eq!(name, "total");
        assert_eq!(args.len(), 2);
    }

    #[test]
    fn test_bare_identifier_is_late_bound() {
        assert_eq!(parse("amount"), ExprOp::Ident("amount".to_string()));
    }

    #[test]
    fn test_detached_paren_is_not_a_call() {
        // Whitespace between identifier and parenthesis breaks the call
        // form; the leftover parenthesis is a trailing-token error.
        let err = parse_err("total (1)");
        assert!(matches!(err.kind, ParseErrorKind::UnexpectedToken(_)));
    }

    #[test]
    fn test_nullary_call() {
        let op = parse("now()");
        assert_eq!(
            op,
            ExprOp::Call {
                name: "now".to_string(),
                args: Vec::new(),
            }
        );
    }

    #[test]
    fn test_not_and_unary_minus() {
        assert_eq!(
            parse("!true"),
            ExprOp::Unary(
                UnaryOp::Not,
                Box::new(ExprOp::Constant(Value::Bool(true))),
            )
        );
        assert_eq!(parse("not true"), parse("!true"));
        assert!(matches!(parse("-1"), ExprOp::Unary(UnaryOp::Neg, _)));
    }

    #[test]
    fn test_slash_is_division_after_operand_and_mask_before() {
        assert_eq!(parse("4 / 2"), parse("4 div 2"));
        let op = parse("account =~ /Food/");
        let ExprOp::Binary(BinaryOp::Match, _, right) = op else {
            panic!("expected match");
        };
        assert!(matches!(
            *right,
            ExprOp::Constant(Value::Mask(ref m)) if m.pattern() == "Food"
        ));
    }

    #[test]
    fn test_empty_sub_expression_is_an_error() {
        assert_eq!(parse_err("()").kind, ParseErrorKind::EmptyExpression);
        assert_eq!(parse_err("").kind, ParseErrorKind::EmptyExpression);
    }

    #[test]
    fn test_unmatched_paren_is_an_error() {
        assert_eq!(parse_err("(1 + 2").kind, ParseErrorKind::UnmatchedParen);
    }

    #[test]
    fn test_trailing_token_is_an_error() {
        let err = parse_err("1 2");
        assert!(matches!(err.kind, ParseErrorKind::UnexpectedToken(_)));
        assert_eq!(err.offset, 2);
    }

    #[test]
    fn test_ternary_without_colon() {
        assert_eq!(
            parse_err("true ? 1").kind,
            ParseErrorKind::IncompleteTernary
        );
    }

    #[test]
    fn test_lex_errors_surface_with_offset() {
        let err = parse_err("1 + 'abc");
        assert!(matches!(err.kind, ParseErrorKind::Lex(_)));
        assert_eq!(err.offset, 8);
    }
}
