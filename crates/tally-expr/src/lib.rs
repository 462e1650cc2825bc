//! Expression language for tally.
//!
//! This crate provides the expression engine used for filters, formats,
//! and computed columns:
//!
//! - [`Tokenizer`] - hand-rolled scanner with embedded literal
//!   sub-grammars (dates, strings, masks, amounts)
//! - [`Parser`] / [`ExprOp`] - precedence-climbing parser producing an
//!   immutable operator tree
//! - [`evaluate`] / [`Expr`] - tree-walking evaluator; parse once,
//!   evaluate against many scopes
//! - [`Scope`] - chained symbol resolution, with a plain table
//!   ([`SymbolScope`]) and a host-object bridge ([`ObjectScope`])
//!
//! # Example
//!
//! ```
//! use tally_core::{CommodityPool, Value};
//! use tally_expr::{Expr, SymbolScope};
//!
//! let pool = CommodityPool::new();
//! let expr = Expr::parse("account =~ /Food/ and total > 10", &pool).unwrap();
//!
//! let mut scope = SymbolScope::new();
//! scope.define_value("account", Value::string("Expenses:Food"));
//! scope.define_value("total", Value::integer(25));
//!
//! assert_eq!(expr.calc(&scope).unwrap(), Value::Bool(true));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod eval;
pub mod expr;
pub mod lexer;
pub mod op;
pub mod parser;
pub mod scope;
pub mod token;

pub use error::{EvalError, LexError, LexErrorKind, ParseError, ParseErrorKind};
pub use eval::evaluate;
pub use expr::Expr;
pub use lexer::{ParseFlags, ReservedScan, Tokenizer};
pub use op::{BinaryOp, ExprOp, UnaryOp};
pub use parser::Parser;
pub use scope::{Binding, NativeFn, ObjectScope, Scope, SymbolKind, SymbolScope};
pub use token::{Token, TokenKind};
