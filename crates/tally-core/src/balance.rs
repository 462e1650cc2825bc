//! Balance type: a mapping from commodity to magnitude.
//!
//! A [`Balance`] is produced whenever arithmetic must keep several
//! commodities apart, e.g. `1 USD + 1 EUR`. Entries whose magnitude
//! reaches zero are dropped on every mutation, but a balance never
//! collapses back to an [`Amount`] on its own; callers decide when to
//! [`Balance::simplify`].

use std::collections::BTreeMap;
use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::amount::Amount;
use crate::error::ValueError;

/// A set of amounts keyed by commodity symbol.
///
/// The empty symbol keys commodity-less amounts. Iteration order is the
/// symbols' lexical order, which keeps Display output deterministic.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Balance {
    amounts: BTreeMap<String, Amount>,
}

impl Balance {
    /// Create an empty balance.
    #[must_use]
    pub fn new() -> Self {
        Self {
            amounts: BTreeMap::new(),
        }
    }

    /// Add an amount, merging with any existing entry of the same
    /// commodity and dropping the entry if it cancels to zero.
    pub fn add_amount(&mut self, amount: &Amount) {
        let symbol = amount.symbol().to_string();
        let merged = match self.amounts.get(&symbol) {
            Some(existing) => existing
                .checked_add(amount)
                .unwrap_or_else(|| amount.clone()),
            None => amount.clone(),
        };
        if merged.is_zero() {
            self.amounts.remove(&symbol);
        } else {
            self.amounts.insert(symbol, merged);
        }
    }

    /// Subtract an amount; the negation of [`Self::add_amount`].
    pub fn sub_amount(&mut self, amount: &Amount) {
        self.add_amount(&-amount);
    }

    /// Merge another balance into this one.
    pub fn merge(&mut self, other: &Self) {
        for amount in other.amounts.values() {
            self.add_amount(amount);
        }
    }

    /// Subtract another balance from this one.
    pub fn subtract(&mut self, other: &Self) {
        for amount in other.amounts.values() {
            self.sub_amount(amount);
        }
    }

    /// The balance with every magnitude negated.
    #[must_use]
    pub fn negated(&self) -> Self {
        let amounts = self
            .amounts
            .iter()
            .map(|(symbol, amount)| (symbol.clone(), -amount))
            .collect();
        Self { amounts }
    }

    /// Scale every entry by a plain decimal factor.
    #[must_use]
    pub fn scaled(&self, factor: Decimal) -> Self {
        let mut result = Self::new();
        for amount in self.amounts.values() {
            result.add_amount(&amount.scaled(factor));
        }
        result
    }

    /// Divide every entry by a plain decimal.
    pub fn divided(&self, divisor: Decimal) -> Result<Self, ValueError> {
        if divisor.is_zero() {
            return Err(ValueError::DivideByZero);
        }
        let mut result = Self::new();
        for amount in self.amounts.values() {
            result.add_amount(&amount.divided(divisor)?);
        }
        Ok(result)
    }

    /// Check if no entries remain.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.amounts.is_empty()
    }

    /// The number of distinct commodities held.
    #[must_use]
    pub fn commodity_count(&self) -> usize {
        self.amounts.len()
    }

    /// The entry for a commodity symbol, if present.
    #[must_use]
    pub fn amount_for(&self, symbol: &str) -> Option<&Amount> {
        self.amounts.get(symbol)
    }

    /// Iterate over the held amounts in symbol order.
    pub fn iter(&self) -> impl Iterator<Item = &Amount> {
        self.amounts.values()
    }

    /// Reduce to a single [`Amount`] when exactly one entry remains.
    ///
    /// This is the explicit simplification step: arithmetic never calls
    /// it implicitly. Returns `None` when the balance is empty or still
    /// holds several commodities.
    #[must_use]
    pub fn simplify(&self) -> Option<Amount> {
        if self.amounts.len() == 1 {
            self.amounts.values().next().cloned()
        } else {
            None
        }
    }
}

impl From<Amount> for Balance {
    fn from(amount: Amount) -> Self {
        let mut balance = Self::new();
        balance.add_amount(&amount);
        balance
    }
}

impl FromIterator<Amount> for Balance {
    fn from_iter<I: IntoIterator<Item = Amount>>(iter: I) -> Self {
        let mut balance = Self::new();
        for amount in iter {
            balance.add_amount(&amount);
        }
        balance
    }
}

impl fmt::Display for Balance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for amount in self.amounts.values() {
            if !first {
                write!(f, ", ")?;
            }
            write!(f, "{amount}")?;
            first = false;
        }
        Ok(())
    }
}
