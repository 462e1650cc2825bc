//! Core value types for tally
//!
//! This crate provides the fundamental types used throughout the tally
//! evaluation core:
//!
//! - [`Value`] - The universal runtime datum: a tagged, arithmetic- and
//!   comparison-capable union
//! - [`Amount`] - A decimal magnitude optionally tagged with one commodity
//! - [`Balance`] - A mapping from commodity to magnitude, used when
//!   multiple commodities must coexist in one value
//! - [`Commodity`] / [`CommodityPool`] - Interned units of account
//! - [`Mask`] - A compiled regular expression plus its source pattern
//! - [`Posting`] - One entry of a transaction, as consumed by the
//!   posting pipeline
//!
//! # Example
//!
//! ```
//! use tally_core::{Amount, CommodityPool, Value};
//! use rust_decimal_macros::dec;
//!
//! let pool = CommodityPool::new();
//! let usd = pool.find_or_create("USD");
//! let eur = pool.find_or_create("EUR");
//!
//! let a = Value::Amount(Amount::with_commodity(dec!(1), usd));
//! let b = Value::Amount(Amount::with_commodity(dec!(1), eur));
//!
//! // Mixing commodities promotes to a Balance; neither side is dropped.
//! let sum = a.add(&b).unwrap();
//! assert!(matches!(sum, Value::Balance(_)));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod amount;
pub mod balance;
pub mod commodity;
pub mod error;
pub mod mask;
pub mod posting;
pub mod value;

pub use amount::{parse_amount, Amount};
pub use balance::Balance;
pub use commodity::{Commodity, CommodityFlags, CommodityPool};
pub use error::{ValueError, ValueKind};
pub use mask::Mask;
pub use posting::Posting;
pub use value::Value;

// Re-export commonly used external types
pub use chrono::{NaiveDate, NaiveDateTime};
pub use num_bigint::BigInt;
pub use rust_decimal::Decimal;
