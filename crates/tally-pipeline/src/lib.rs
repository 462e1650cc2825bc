//! Posting pipeline for tally.
//!
//! A pipeline is an ordered chain of stages, each owning its successor.
//! Postings enter at the head via [`PostingHandler::handle`] and the
//! stream ends with an explicit [`PostingHandler::flush`]. Stages are
//! either pass-through ([`FilterPostings`], [`CalcPostings`]) or
//! accumulating ([`SortPostings`]); [`CollectPostings`] terminates a
//! chain and [`UnreachedSink`] terminates one that must never see direct
//! delivery. The input sequence is never reordered except through an
//! explicit sort stage.
//!
//! # Example
//!
//! ```
//! use chrono::NaiveDate;
//! use rust_decimal::Decimal;
//! use tally_core::{Amount, CommodityPool, Posting};
//! use tally_expr::Expr;
//! use tally_pipeline::{CollectPostings, FilterPostings, PostingHandler, SortPostings};
//!
//! let pool = CommodityPool::new();
//! let predicate = Expr::parse("account =~ /Expenses:/", &pool).unwrap();
//! let key = Expr::parse("date", &pool).unwrap();
//!
//! // Built bottom-up: collector <- sort <- filter
//! let mut head = FilterPostings::new(
//!     predicate,
//!     SortPostings::new(key, CollectPostings::new()),
//! );
//!
//! head.handle(Posting::new(
//!     NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
//!     "Expenses:Food",
//!     Amount::new(Decimal::from(12)),
//! ))
//! .unwrap();
//! head.flush().unwrap();
//!
//! let collected = head.into_next().into_next();
//! assert_eq!(collected.len(), 1);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod calc;
pub mod collect;
pub mod error;
pub mod filter;
pub mod handler;
pub mod scope;
pub mod sort;

pub use calc::CalcPostings;
pub use collect::{CollectPostings, UnreachedSink};
pub use error::PipelineError;
pub use filter::FilterPostings;
pub use handler::PostingHandler;
pub use scope::PostingScope;
pub use sort::SortPostings;
