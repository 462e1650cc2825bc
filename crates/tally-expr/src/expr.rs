//! A compiled expression: parse once, evaluate many times.

use std::fmt;

use tracing::debug;

use tally_core::{CommodityPool, Value};

use crate::error::{EvalError, ParseError};
use crate::eval::evaluate;
use crate::op::ExprOp;
use crate::parser::Parser;
use crate::scope::Scope;

/// An expression's source text together with its parsed operator tree.
///
/// The tree is immutable and may be evaluated repeatedly against
/// different scopes.
///
/// # Example
///
/// ```
/// use tally_core::{CommodityPool, Value};
/// use tally_expr::{Expr, SymbolScope};
///
/// let pool = CommodityPool::new();
/// let expr = Expr::parse("x + 1", &pool).unwrap();
///
/// let mut scope = SymbolScope::new();
/// scope.define_value("x", Value::integer(41));
///
/// assert_eq!(expr.calc(&scope).unwrap().to_string(), "42");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    source: String,
    op: ExprOp,
}

impl Expr {
    /// Parse `source` into a reusable expression.
    pub fn parse(source: &str, pool: &CommodityPool) -> Result<Self, ParseError> {
        let op = Parser::new(source, pool).parse()?;
        debug!(source, "compiled expression");
        Ok(Self {
            source: source.to_string(),
            op,
        })
    }

    /// As [`Self::parse`], but amount literals leave commodity display
    /// precision untouched.
    pub fn parse_no_migrate(source: &str, pool: &CommodityPool) -> Result<Self, ParseError> {
        let op = Parser::new_no_migrate(source, pool).parse()?;
        debug!(source, "compiled expression");
        Ok(Self {
            source: source.to_string(),
            op,
        })
    }

    /// The original source text.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The parsed operator tree.
    #[must_use]
    pub const fn op(&self) -> &ExprOp {
        &self.op
    }

    /// Evaluate against a scope.
    pub fn calc(&self, scope: &dyn Scope) -> Result<Value, EvalError> {
        evaluate(&self.op, scope)
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scope::SymbolScope;

    #[test]
    fn test_parse_once_evaluate_many() {
        let pool = CommodityPool::new();
        let expr = Expr::parse("x * 2", &pool).unwrap();

        for n in [1i64, 5, 100] {
            let mut scope = SymbolScope::new();
            scope.define_value("x", Value::integer(n));
            // The bare literal 2 is an Amount, so the product is one too
            let value = expr.calc(&scope).unwrap();
            assert!(value.eq_value(&Value::integer(n * 2)).unwrap());
        }
    }

    #[test]
    fn test_display_is_source_text() {
        let pool = CommodityPool::new();
        let expr = Expr::parse("1 + 2 * 3", &pool).unwrap();
        assert_eq!(expr.to_string(), "1 + 2 * 3");
    }

    #[test]
    fn test_parse_failure_reports_offset() {
        let pool = CommodityPool::new();
        let err = Expr::parse("1 + )", &pool).unwrap_err();
        assert_eq!(err.offset, 4);
    }
}
