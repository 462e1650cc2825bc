//! Error types for value arithmetic and comparison.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The kind tag of a [`crate::Value`], used in error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValueKind {
    /// No value.
    Void,
    /// Boolean.
    Boolean,
    /// Arbitrary-precision integer.
    Integer,
    /// Magnitude with optional commodity.
    Amount,
    /// Commodity-to-magnitude mapping.
    Balance,
    /// Text.
    String,
    /// Calendar date.
    Date,
    /// Date with time of day.
    DateTime,
    /// Compiled regular expression.
    Mask,
    /// Ordered, heterogeneous list of values.
    Sequence,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Void => "void",
            Self::Boolean => "boolean",
            Self::Integer => "integer",
            Self::Amount => "amount",
            Self::Balance => "balance",
            Self::String => "string",
            Self::Date => "date",
            Self::DateTime => "datetime",
            Self::Mask => "mask",
            Self::Sequence => "sequence",
        };
        write!(f, "{name}")
    }
}

/// Error raised by value arithmetic and comparison.
///
/// None of these corrupt shared state: the commodity pool and any scope
/// chain remain consistent after a failed operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    /// An operator was applied to an incompatible pair of value kinds.
    #[error("operator '{op}' not supported between {left} and {right}")]
    TypeMismatch {
        /// The operator's source spelling.
        op: &'static str,
        /// Kind of the left operand.
        left: ValueKind,
        /// Kind of the right operand.
        right: ValueKind,
    },
    /// A unary operator was applied to an unsupported value kind.
    #[error("operator '{op}' not supported for {kind}")]
    UnsupportedUnary {
        /// The operator's source spelling.
        op: &'static str,
        /// Kind of the operand.
        kind: ValueKind,
    },
    /// Amounts of different commodities cannot be ordered.
    #[error("cannot order amounts of different commodities: {left} vs {right}")]
    CommodityMismatch {
        /// Commodity symbol of the left operand ("" when none).
        left: String,
        /// Commodity symbol of the right operand ("" when none).
        right: String,
    },
    /// Division by a zero magnitude.
    #[error("division by zero")]
    DivideByZero,
    /// An integer magnitude does not fit the decimal coercion range.
    #[error("integer magnitude out of range for amount arithmetic")]
    IntegerOverflow,
    /// A textual amount could not be parsed.
    #[error("invalid amount literal '{0}'")]
    BadAmount(String),
}
