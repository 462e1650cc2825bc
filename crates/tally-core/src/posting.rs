//! Posting: one account entry flowing through the report pipeline.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::amount::Amount;
use crate::value::Value;

/// A single account entry.
///
/// Postings are the records the report pipeline filters, computes over
/// and sorts. Expression evaluation sees a posting through a scope that
/// exposes its fields as named variables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Posting {
    /// Primary date
    pub date: NaiveDate,
    /// Auxiliary (effective) date, if recorded
    pub aux_date: Option<NaiveDate>,
    /// Full account name, colon-separated
    pub account: String,
    /// The posted amount
    pub amount: Amount,
    /// Free-form note
    pub note: Option<String>,
    /// Tags attached to this posting
    pub tags: Vec<String>,
    /// Typed metadata keyed by tag name
    pub meta: BTreeMap<String, Value>,
}

impl Posting {
    /// Create a new posting with the given date, account and amount.
    #[must_use]
    pub fn new(date: NaiveDate, account: impl Into<String>, amount: Amount) -> Self {
        Self {
            date,
            aux_date: None,
            account: account.into(),
            amount,
            note: None,
            tags: Vec::new(),
            meta: BTreeMap::new(),
        }
    }

    /// Attach a note.
    #[must_use]
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// Attach a tag.
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Attach a metadata entry.
    #[must_use]
    pub fn with_meta(mut self, key: impl Into<String>, value: Value) -> Self {
        self.meta.insert(key.into(), value);
        self
    }

    /// Check whether the posting carries a given tag.
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag) || self.meta.contains_key(tag)
    }

    /// The date reports should use: the auxiliary date when present.
    #[must_use]
    pub fn effective_date(&self) -> NaiveDate {
        self.aux_date.unwrap_or(self.date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_builder() {
        let posting = Posting::new(date(2024, 3, 1), "Expenses:Food", Amount::new(dec!(12)))
            .with_note("lunch")
            .with_tag("trip")
            .with_meta("category", Value::string("meals"));

        assert_eq!(posting.account, "Expenses:Food");
        assert_eq!(posting.note.as_deref(), Some("lunch"));
        assert!(posting.has_tag("trip"));
        assert!(posting.has_tag("category"));
        assert!(!posting.has_tag("absent"));
    }

    #[test]
    fn test_effective_date_prefers_aux() {
        let mut posting = Posting::new(date(2024, 3, 1), "Assets:Bank", Amount::new(dec!(1)));
        assert_eq!(posting.effective_date(), date(2024, 3, 1));

        posting.aux_date = Some(date(2024, 3, 5));
        assert_eq!(posting.effective_date(), date(2024, 3, 5));
    }
}
