//! The operator tree produced by the parser.
//!
//! Trees are immutable once built and may be evaluated repeatedly against
//! different scopes; identifier nodes are resolved at evaluation time, not
//! at parse time.

use std::fmt;

use tally_core::Value;

/// A unary operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// Arithmetic negation.
    Neg,
    /// Logical negation of truthiness.
    Not,
}

impl UnaryOp {
    /// The source spelling.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Neg => "-",
            Self::Not => "!",
        }
    }
}

/// A binary operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/` or `div`
    Div,
    /// `==`
    Eq,
    /// `!=`
    NotEq,
    /// `=~`
    Match,
    /// `!~`
    NotMatch,
    /// `<`
    Less,
    /// `<=`
    LessEq,
    /// `>`
    Greater,
    /// `>=`
    GreaterEq,
    /// `and`, short-circuiting
    And,
    /// `or`, short-circuiting
    Or,
}

impl BinaryOp {
    /// The source spelling.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Eq => "==",
            Self::NotEq => "!=",
            Self::Match => "=~",
            Self::NotMatch => "!~",
            Self::Less => "<",
            Self::LessEq => "<=",
            Self::Greater => ">",
            Self::GreaterEq => ">=",
            Self::And => "and",
            Self::Or => "or",
        }
    }
}

/// One node of the operator tree.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprOp {
    /// A literal value.
    Constant(Value),
    /// A symbol reference, resolved against the scope at evaluation time.
    Ident(String),
    /// A function call, `name(args…)`.
    Call {
        /// The function name.
        name: String,
        /// Arguments in source order.
        args: Vec<ExprOp>,
    },
    /// A unary operation.
    Unary(UnaryOp, Box<ExprOp>),
    /// A binary operation.
    Binary(BinaryOp, Box<ExprOp>, Box<ExprOp>),
    /// The ternary conditional `cond ? then : otherwise`.
    Ternary {
        /// The condition.
        cond: Box<ExprOp>,
        /// Evaluated when the condition is truthy.
        then: Box<ExprOp>,
        /// Evaluated when the condition is falsy.
        otherwise: Box<ExprOp>,
    },
    /// A comma sequence.
    Sequence(Vec<ExprOp>),
}

impl ExprOp {
    /// The carried value of a constant node.
    #[must_use]
    pub const fn as_constant(&self) -> Option<&Value> {
        match self {
            Self::Constant(value) => Some(value),
            _ => None,
        }
    }
}

impl fmt::Display for ExprOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Constant(value) => match value {
                Value::String(s) => write!(f, "'{s}'"),
                Value::Mask(m) => write!(f, "/{m}/"),
                Value::Date(_) | Value::DateTime(_) => write!(f, "[{value}]"),
                // A commodity needs its braces back to reparse as one token
                Value::Amount(a) if a.commodity().is_some() => write!(f, "{{{a}}}"),
                other => write!(f, "{other}"),
            },
            Self::Ident(name) => f.write_str(name),
            Self::Call { name, args } => {
                write!(f, "{name}(")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                write!(f, ")")
            }
            Self::Unary(op, child) => write!(f, "{}{child}", op.symbol()),
            Self::Binary(op, left, right) => {
                write!(f, "({left} {} {right})", op.symbol())
            }
            Self::Ternary {
                cond,
                then,
                otherwise,
            } => write!(f, "({cond} ? {then} : {otherwise})"),
            Self::Sequence(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                Ok(())
            }
        }
    }
}
