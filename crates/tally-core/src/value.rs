//! The universal runtime datum.
//!
//! [`Value`] is a tagged union over every shape the expression language
//! can produce. Arithmetic and comparison are total over a fixed coercion
//! table (Integer ↔ Amount ↔ Balance, Date ↔ DateTime); applying an
//! operator to any other kind pair fails with a
//! [`ValueError::TypeMismatch`] naming both kinds.
//!
//! Two invariants worth calling out:
//!
//! - adding two Amounts of different (non-null) commodities yields a
//!   [`Balance`] holding both entries; neither side is ever dropped;
//! - a Balance never collapses back to an Amount implicitly. Callers use
//!   [`Value::simplified`] when they want the reduction.

use std::cmp::Ordering;
use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use num_bigint::BigInt;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::amount::Amount;
use crate::balance::Balance;
use crate::error::{ValueError, ValueKind};
use crate::mask::Mask;

/// A dynamically-typed but statically-kinded runtime value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// No value.
    Void,
    /// Boolean.
    Bool(bool),
    /// Arbitrary-precision integer.
    Integer(BigInt),
    /// Decimal magnitude with optional commodity.
    Amount(Amount),
    /// Commodity-to-magnitude mapping.
    Balance(Balance),
    /// Text.
    String(String),
    /// Calendar date.
    Date(NaiveDate),
    /// Date with time of day.
    DateTime(NaiveDateTime),
    /// Compiled regular expression.
    Mask(Mask),
    /// Ordered, heterogeneous list.
    Sequence(Vec<Value>),
}

impl Value {
    /// Build an integer value from a machine integer.
    #[must_use]
    pub fn integer(n: i64) -> Self {
        Self::Integer(BigInt::from(n))
    }

    /// Build a string value.
    #[must_use]
    pub fn string(s: impl Into<String>) -> Self {
        Self::String(s.into())
    }

    /// The kind tag, used for error reporting and dispatch.
    #[must_use]
    pub const fn kind(&self) -> ValueKind {
        match self {
            Self::Void => ValueKind::Void,
            Self::Bool(_) => ValueKind::Boolean,
            Self::Integer(_) => ValueKind::Integer,
            Self::Amount(_) => ValueKind::Amount,
            Self::Balance(_) => ValueKind::Balance,
            Self::String(_) => ValueKind::String,
            Self::Date(_) => ValueKind::Date,
            Self::DateTime(_) => ValueKind::DateTime,
            Self::Mask(_) => ValueKind::Mask,
            Self::Sequence(_) => ValueKind::Sequence,
        }
    }

    /// Truthiness: Void, zero numerics, empty strings/sequences and empty
    /// balances are false; everything else is true.
    #[must_use]
    pub fn truthy(&self) -> bool {
        match self {
            Self::Void => false,
            Self::Bool(b) => *b,
            Self::Integer(n) => *n != BigInt::ZERO,
            Self::Amount(a) => !a.is_zero(),
            Self::Balance(b) => !b.is_zero(),
            Self::String(s) => !s.is_empty(),
            Self::Date(_) | Self::DateTime(_) | Self::Mask(_) => true,
            Self::Sequence(items) => !items.is_empty(),
        }
    }

    /// Explicit Balance-to-Amount simplification.
    ///
    /// An empty balance reduces to `Integer(0)`; a single-commodity
    /// balance reduces to that Amount; everything else passes through
    /// unchanged. Arithmetic never performs this implicitly.
    #[must_use]
    pub fn simplified(self) -> Self {
        match self {
            Self::Balance(balance) => {
                if balance.is_zero() {
                    Self::integer(0)
                } else if let Some(amount) = balance.simplify() {
                    Self::Amount(amount)
                } else {
                    Self::Balance(balance)
                }
            }
            other => other,
        }
    }

    fn mismatch(&self, op: &'static str, other: &Self) -> ValueError {
        ValueError::TypeMismatch {
            op,
            left: self.kind(),
            right: other.kind(),
        }
    }

    /// Addition per the coercion table.
    pub fn add(&self, other: &Self) -> Result<Self, ValueError> {
        match (self, other) {
            (Self::Integer(a), Self::Integer(b)) => Ok(Self::Integer(a + b)),
            (Self::String(a), Self::String(b)) => {
                let mut s = a.clone();
                s.push_str(b);
                Ok(Self::String(s))
            }
            (Self::Balance(a), _) => {
                let mut result = a.clone();
                match other {
                    Self::Balance(b) => result.merge(b),
                    _ => result.add_amount(&other.coerce_amount("+", self, other)?),
                }
                Ok(Self::Balance(result))
            }
            (_, Self::Balance(b)) => {
                let mut result = Balance::from(self.coerce_amount("+", self, other)?);
                result.merge(b);
                Ok(Self::Balance(result))
            }
            _ => {
                let a = self.coerce_amount("+", self, other)?;
                let b = other.coerce_amount("+", self, other)?;
                Ok(a.checked_add(&b).map_or_else(
                    || {
                        let mut balance = Balance::from(a.clone());
                        balance.add_amount(&b);
                        Self::Balance(balance)
                    },
                    Self::Amount,
                ))
            }
        }
    }

    /// Subtraction per the coercion table.
    pub fn sub(&self, other: &Self) -> Result<Self, ValueError> {
        match (self, other) {
            (Self::Integer(a), Self::Integer(b)) => Ok(Self::Integer(a - b)),
            (Self::Balance(a), _) => {
                let mut result = a.clone();
                match other {
                    Self::Balance(b) => result.subtract(b),
                    _ => result.sub_amount(&other.coerce_amount("-", self, other)?),
                }
                Ok(Self::Balance(result))
            }
            (_, Self::Balance(b)) => {
                let mut result = Balance::from(self.coerce_amount("-", self, other)?);
                result.subtract(b);
                Ok(Self::Balance(result))
            }
            _ => {
                let a = self.coerce_amount("-", self, other)?;
                let b = other.coerce_amount("-", self, other)?;
                Ok(a.checked_sub(&b).map_or_else(
                    || {
                        let mut balance = Balance::from(a.clone());
                        balance.sub_amount(&b);
                        Self::Balance(balance)
                    },
                    Self::Amount,
                ))
            }
        }
    }

    /// Multiplication. At most one operand may carry a commodity;
    /// commodity × commodity is a type mismatch.
    pub fn mul(&self, other: &Self) -> Result<Self, ValueError> {
        match (self, other) {
            (Self::Integer(a), Self::Integer(b)) => Ok(Self::Integer(a * b)),
            (Self::Balance(b), _) => Ok(Self::Balance(
                b.scaled(other.plain_factor("*", self, other)?),
            )),
            (_, Self::Balance(b)) => Ok(Self::Balance(
                b.scaled(self.plain_factor("*", self, other)?),
            )),
            _ => {
                let a = self.coerce_amount("*", self, other)?;
                let b = other.coerce_amount("*", self, other)?;
                if a.commodity().is_some() && b.commodity().is_some() {
                    return Err(self.mismatch("*", other));
                }
                if a.commodity().is_some() {
                    Ok(Self::Amount(a.scaled(b.quantity())))
                } else {
                    Ok(Self::Amount(b.scaled(a.quantity())))
                }
            }
        }
    }

    /// Division. Commodity rules as for [`Self::mul`]; dividing by a zero
    /// magnitude fails. Integer ÷ Integer truncates.
    pub fn div(&self, other: &Self) -> Result<Self, ValueError> {
        match (self, other) {
            (Self::Integer(a), Self::Integer(b)) => {
                if *b == BigInt::ZERO {
                    Err(ValueError::DivideByZero)
                } else {
                    Ok(Self::Integer(a / b))
                }
            }
            (Self::Balance(b), _) => Ok(Self::Balance(
                b.divided(other.plain_factor("/", self, other)?)?,
            )),
            (_, Self::Balance(_)) => Err(self.mismatch("/", other)),
            _ => {
                let a = self.coerce_amount("/", self, other)?;
                let b = other.coerce_amount("/", self, other)?;
                if a.commodity().is_some() && b.commodity().is_some() {
                    return Err(self.mismatch("/", other));
                }
                if b.is_zero() {
                    return Err(ValueError::DivideByZero);
                }
                let quantity = a.quantity() / b.quantity();
                let commodity = a.commodity().or_else(|| b.commodity()).cloned();
                Ok(Self::Amount(match commodity {
                    Some(c) => Amount::with_commodity(quantity, c),
                    None => Amount::new(quantity),
                }))
            }
        }
    }

    /// Arithmetic negation for Integer, Amount and Balance.
    pub fn negated(&self) -> Result<Self, ValueError> {
        match self {
            Self::Integer(n) => Ok(Self::Integer(-n)),
            Self::Amount(a) => Ok(Self::Amount(-a)),
            Self::Balance(b) => Ok(Self::Balance(b.negated())),
            _ => Err(ValueError::UnsupportedUnary {
                op: "-",
                kind: self.kind(),
            }),
        }
    }

    /// Equality per the coercion table.
    ///
    /// Amounts compare by value *and* commodity; String ↔ Mask equality
    /// performs a regex match, not a literal comparison. Kind pairs
    /// outside the table fail rather than answering `false`.
    pub fn eq_value(&self, other: &Self) -> Result<bool, ValueError> {
        match (self, other) {
            (Self::Void, Self::Void) => Ok(true),
            (Self::Bool(a), Self::Bool(b)) => Ok(a == b),
            (Self::Integer(a), Self::Integer(b)) => Ok(a == b),
            (Self::String(a), Self::String(b)) => Ok(a == b),
            (Self::String(s), Self::Mask(m)) | (Self::Mask(m), Self::String(s)) => {
                Ok(m.is_match(s))
            }
            (Self::Mask(a), Self::Mask(b)) => Ok(a == b),
            (Self::Date(a), Self::Date(b)) => Ok(a == b),
            (Self::DateTime(a), Self::DateTime(b)) => Ok(a == b),
            (Self::Date(d), Self::DateTime(t)) | (Self::DateTime(t), Self::Date(d)) => {
                Ok(d.and_time(NaiveTime::MIN) == *t)
            }
            (Self::Sequence(a), Self::Sequence(b)) => {
                if a.len() != b.len() {
                    return Ok(false);
                }
                for (x, y) in a.iter().zip(b) {
                    if !x.eq_value(y)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            (Self::Balance(a), Self::Balance(b)) => Ok(a == b),
            (Self::Balance(balance), v) | (v, Self::Balance(balance)) => {
                let amount = v.coerce_amount("==", self, other)?;
                match balance.simplify() {
                    Some(entry) => Ok(entry.commensurable(&amount)
                        && entry.quantity() == amount.quantity()),
                    None => Ok(balance.is_zero() && amount.is_zero()),
                }
            }
            (Self::Integer(_) | Self::Amount(_), Self::Integer(_) | Self::Amount(_)) => {
                let a = self.coerce_amount("==", self, other)?;
                let b = other.coerce_amount("==", self, other)?;
                Ok(a.commensurable(&b) && a.quantity() == b.quantity())
            }
            _ => Err(self.mismatch("==", other)),
        }
    }

    /// Ordering per the coercion table.
    ///
    /// `op` is the source operator spelling, used only in error messages.
    /// Ordering across different non-null commodities fails, as does
    /// ordering a multi-commodity balance.
    pub fn compare(&self, op: &'static str, other: &Self) -> Result<Ordering, ValueError> {
        match (self, other) {
            (Self::Integer(a), Self::Integer(b)) => Ok(a.cmp(b)),
            (Self::String(a), Self::String(b)) => Ok(a.cmp(b)),
            (Self::Date(a), Self::Date(b)) => Ok(a.cmp(b)),
            (Self::DateTime(a), Self::DateTime(b)) => Ok(a.cmp(b)),
            (Self::Date(d), Self::DateTime(t)) => Ok(d.and_time(NaiveTime::MIN).cmp(t)),
            (Self::DateTime(t), Self::Date(d)) => Ok(t.cmp(&d.and_time(NaiveTime::MIN))),
            (
                Self::Integer(_) | Self::Amount(_) | Self::Balance(_),
                Self::Integer(_) | Self::Amount(_) | Self::Balance(_),
            ) => {
                let a = self.ordering_amount(op, self, other)?;
                let b = other.ordering_amount(op, self, other)?;
                if a.commodity().is_some()
                    && b.commodity().is_some()
                    && !a.same_commodity(&b)
                {
                    return Err(ValueError::CommodityMismatch {
                        left: a.symbol().to_string(),
                        right: b.symbol().to_string(),
                    });
                }
                Ok(a.quantity().cmp(&b.quantity()))
            }
            _ => Err(self.mismatch(op, other)),
        }
    }

    /// Regex matching for the `=~` / `!~` operators: one side a String,
    /// the other a Mask.
    pub fn matches(&self, other: &Self) -> Result<bool, ValueError> {
        match (self, other) {
            (Self::String(s), Self::Mask(m)) | (Self::Mask(m), Self::String(s)) => {
                Ok(m.is_match(s))
            }
            _ => Err(self.mismatch("=~", other)),
        }
    }

    /// Coerce Integer or Amount into an [`Amount`] operand.
    ///
    /// `left` and `right` are the source-ordered operands, used only so a
    /// mismatch reports the kinds the way the expression reads.
    fn coerce_amount(
        &self,
        op: &'static str,
        left: &Self,
        right: &Self,
    ) -> Result<Amount, ValueError> {
        match self {
            Self::Amount(a) => Ok(a.clone()),
            Self::Integer(n) => Ok(Amount::new(integer_to_decimal(n)?)),
            _ => Err(ValueError::TypeMismatch {
                op,
                left: left.kind(),
                right: right.kind(),
            }),
        }
    }

    /// As [`Self::coerce_amount`], but a Balance is allowed when it holds
    /// at most one commodity.
    fn ordering_amount(
        &self,
        op: &'static str,
        left: &Self,
        right: &Self,
    ) -> Result<Amount, ValueError> {
        match self {
            Self::Balance(balance) => {
                if balance.is_zero() {
                    Ok(Amount::new(Decimal::ZERO))
                } else {
                    balance.simplify().ok_or(ValueError::TypeMismatch {
                        op,
                        left: left.kind(),
                        right: right.kind(),
                    })
                }
            }
            _ => self.coerce_amount(op, left, right),
        }
    }

    /// A plain scaling factor: Integer or commodity-less Amount.
    fn plain_factor(
        &self,
        op: &'static str,
        left: &Self,
        right: &Self,
    ) -> Result<Decimal, ValueError> {
        let amount = self.coerce_amount(op, left, right)?;
        if amount.commodity().is_some() {
            return Err(ValueError::TypeMismatch {
                op,
                left: left.kind(),
                right: right.kind(),
            });
        }
        Ok(amount.quantity())
    }
}

/// Convert an arbitrary-precision integer into the decimal range used by
/// amount arithmetic.
fn integer_to_decimal(n: &BigInt) -> Result<Decimal, ValueError> {
    i64::try_from(n)
        .map(Decimal::from)
        .map_err(|_| ValueError::IntegerOverflow)
}

impl Default for Value {
    fn default() -> Self {
        Self::Void
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Void => Ok(()),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Integer(n) => write!(f, "{n}"),
            Self::Amount(a) => write!(f, "{a}"),
            Self::Balance(b) => write!(f, "{b}"),
            Self::String(s) => write!(f, "{s}"),
            Self::Date(d) => write!(f, "{}", d.format("%Y/%m/%d")),
            Self::DateTime(t) => write!(f, "{}", t.format("%Y/%m/%d %H:%M:%S")),
            Self::Mask(m) => write!(f, "{m}"),
            Self::Sequence(items) => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, ")")
            }
        }
    }
}
