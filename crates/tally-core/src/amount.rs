//! Amount type: a decimal magnitude with an optional commodity.
//!
//! An [`Amount`] is the fundamental quantity in the evaluation core. Unlike
//! a plain decimal it may carry one interned [`Commodity`]; arithmetic that
//! would mix two commodities is decided one level up, in
//! [`crate::Value`], where mixed additions promote to a [`crate::Balance`].

use std::fmt;
use std::ops::Neg;
use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::commodity::{Commodity, CommodityPool};
use crate::error::ValueError;

/// A decimal magnitude optionally tagged with one commodity.
///
/// # Examples
///
/// ```
/// use tally_core::{Amount, CommodityPool};
/// use rust_decimal_macros::dec;
///
/// let pool = CommodityPool::new();
/// let usd = pool.find_or_create("USD");
///
/// let amount = Amount::with_commodity(dec!(100.00), usd);
/// assert_eq!(amount.quantity(), dec!(100.00));
/// assert_eq!(amount.symbol(), "USD");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Amount {
    quantity: Decimal,
    commodity: Option<Arc<Commodity>>,
}

impl Amount {
    /// Create a commodity-less amount.
    #[must_use]
    pub const fn new(quantity: Decimal) -> Self {
        Self {
            quantity,
            commodity: None,
        }
    }

    /// Create an amount carrying a commodity.
    #[must_use]
    pub const fn with_commodity(quantity: Decimal, commodity: Arc<Commodity>) -> Self {
        Self {
            quantity,
            commodity: Some(commodity),
        }
    }

    /// Create a zero amount with the given commodity.
    #[must_use]
    pub const fn zero(commodity: Arc<Commodity>) -> Self {
        Self::with_commodity(Decimal::ZERO, commodity)
    }

    /// The decimal magnitude.
    #[must_use]
    pub const fn quantity(&self) -> Decimal {
        self.quantity
    }

    /// The commodity, if any.
    #[must_use]
    pub const fn commodity(&self) -> Option<&Arc<Commodity>> {
        self.commodity.as_ref()
    }

    /// The commodity symbol, or `""` for a commodity-less amount.
    #[must_use]
    pub fn symbol(&self) -> &str {
        self.commodity.as_deref().map_or("", Commodity::symbol)
    }

    /// Check if the magnitude is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.quantity.is_zero()
    }

    /// Check if the magnitude is strictly positive.
    #[must_use]
    pub fn is_positive(&self) -> bool {
        self.quantity.is_sign_positive() && !self.quantity.is_zero()
    }

    /// Check if the magnitude is negative.
    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.quantity.is_sign_negative() && !self.quantity.is_zero()
    }

    /// The absolute value, keeping the commodity.
    #[must_use]
    pub fn abs(&self) -> Self {
        Self {
            quantity: self.quantity.abs(),
            commodity: self.commodity.clone(),
        }
    }

    /// The number of decimal places of the magnitude.
    #[must_use]
    pub const fn scale(&self) -> u32 {
        self.quantity.scale()
    }

    /// Check whether both amounts reference the same commodity
    /// (including both referencing none).
    #[must_use]
    pub fn same_commodity(&self, other: &Self) -> bool {
        self.symbol() == other.symbol()
    }

    /// Check whether the amounts may combine into one: same commodity, or
    /// at least one side commodity-less. Two different non-null
    /// commodities never combine; they promote to a [`crate::Balance`].
    #[must_use]
    pub fn commensurable(&self, other: &Self) -> bool {
        self.commodity.is_none() || other.commodity.is_none() || self.same_commodity(other)
    }

    /// Add another amount.
    ///
    /// Returns `None` when both sides carry different non-null
    /// commodities; the caller promotes to a [`crate::Balance`] in that
    /// case. The result's precision is the max of both operands' scales,
    /// which `Decimal` addition preserves.
    #[must_use]
    pub fn checked_add(&self, other: &Self) -> Option<Self> {
        if !self.commensurable(other) {
            return None;
        }
        Some(Self {
            quantity: self.quantity + other.quantity,
            commodity: self.commodity.clone().or_else(|| other.commodity.clone()),
        })
    }

    /// Subtract another amount.
    ///
    /// Returns `None` when both sides carry different non-null
    /// commodities, as for [`Self::checked_add`].
    #[must_use]
    pub fn checked_sub(&self, other: &Self) -> Option<Self> {
        if !self.commensurable(other) {
            return None;
        }
        Some(Self {
            quantity: self.quantity - other.quantity,
            commodity: self.commodity.clone().or_else(|| other.commodity.clone()),
        })
    }

    /// Scale the magnitude by a plain decimal, keeping the commodity.
    #[must_use]
    pub fn scaled(&self, factor: Decimal) -> Self {
        Self {
            quantity: self.quantity * factor,
            commodity: self.commodity.clone(),
        }
    }

    /// Divide the magnitude by a plain decimal, keeping the commodity.
    pub fn divided(&self, divisor: Decimal) -> Result<Self, ValueError> {
        if divisor.is_zero() {
            return Err(ValueError::DivideByZero);
        }
        Ok(Self {
            quantity: self.quantity / divisor,
            commodity: self.commodity.clone(),
        })
    }
}

impl Neg for &Amount {
    type Output = Amount;

    fn neg(self) -> Amount {
        Amount {
            quantity: -self.quantity,
            commodity: self.commodity.clone(),
        }
    }
}

impl Neg for Amount {
    type Output = Self;

    fn neg(self) -> Self {
        -&self
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.commodity {
            Some(c) => write!(f, "{} {}", self.quantity, c.symbol()),
            None => write!(f, "{}", self.quantity),
        }
    }
}

/// Parse a textual amount, interning its commodity through `pool`.
///
/// Accepted forms: `"12.50"`, `"12.50 USD"`, `"USD 12.50"`. Thousands
/// separators (`,`) in the number are ignored. Unless `no_migrate` is set,
/// the literal's scale widens the commodity's recorded display precision.
///
/// # Errors
///
/// Returns [`ValueError::BadAmount`] when no number can be extracted or
/// trailing input remains.
pub fn parse_amount(
    input: &str,
    pool: &CommodityPool,
    no_migrate: bool,
) -> Result<Amount, ValueError> {
    let bad = || ValueError::BadAmount(input.to_string());
    let text = input.trim();
    if text.is_empty() {
        return Err(bad());
    }

    let (number_part, symbol_part) = split_amount(text);
    let number_part = number_part.ok_or_else(bad)?;

    let cleaned = number_part.replace(',', "");
    let quantity: Decimal = cleaned.parse().map_err(|_| bad())?;

    let commodity = match symbol_part {
        Some(symbol) => {
            let symbol = symbol.trim();
            if symbol.is_empty() || !is_symbol(symbol) {
                return Err(bad());
            }
            let commodity = pool.find_or_create(symbol);
            if !no_migrate {
                commodity.upgrade_precision(quantity.scale());
            }
            Some(commodity)
        }
        None => None,
    };

    Ok(Amount {
        quantity,
        commodity,
    })
}

/// Split `text` into its number part and optional commodity part,
/// accepting either `NUMBER SYM` or `SYM NUMBER` order.
fn split_amount(text: &str) -> (Option<&str>, Option<&str>) {
    let starts_number =
        |s: &str| s.starts_with(|c: char| c.is_ascii_digit() || c == '-' || c == '.');

    if starts_number(text) {
        let end = text
            .find(|c: char| !(c.is_ascii_digit() || c == '.' || c == ',' || c == '-'))
            .unwrap_or(text.len());
        let (number, rest) = text.split_at(end);
        let rest = rest.trim();
        (Some(number), (!rest.is_empty()).then_some(rest))
    } else {
        // Commodity-first form: SYM 12.50
        match text.find(|c: char| c.is_ascii_digit() || c == '-') {
            Some(pos) if pos > 0 => (Some(text[pos..].trim()), Some(text[..pos].trim())),
            _ => (None, None),
        }
    }
}

/// A commodity symbol contains no digits, quotes or expression
/// punctuation.
fn is_symbol(s: &str) -> bool {
    !s.is_empty()
        && !s.chars().any(|c| {
            c.is_ascii_digit()
                || c.is_whitespace()
                || matches!(c, '-' | '.' | ',' | '"' | '\'' | '{' | '}' | '/' | '@' | ';')
        })
}
