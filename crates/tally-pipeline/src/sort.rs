//! Sorting stage.

use std::cmp::Ordering;

use tracing::debug;

use tally_core::Posting;
use tally_expr::Expr;

use crate::error::PipelineError;
use crate::handler::PostingHandler;
use crate::scope::PostingScope;

/// An accumulating stage that sorts the whole stream by a key expression.
///
/// Postings are buffered during `handle`; on `flush` the batch is
/// stably sorted ascending by the key evaluated under a [`PostingScope`]
/// and delivered downstream in order, followed by the `flush` signal.
/// Postings whose keys compare equal (or are not mutually orderable)
/// retain their arrival order.
pub struct SortPostings<H: PostingHandler> {
    key: Expr,
    posts: Vec<Posting>,
    next: H,
}

impl<H: PostingHandler> SortPostings<H> {
    /// Create a sort stage keyed by `key`, delivering into `next`.
    pub const fn new(key: Expr, next: H) -> Self {
        Self {
            key,
            posts: Vec::new(),
            next,
        }
    }

    /// Consume the stage, returning its successor.
    pub fn into_next(self) -> H {
        self.next
    }

    /// Sort the buffered batch and deliver it downstream.
    ///
    /// Called by [`PostingHandler::flush`]; public so callers driving a
    /// stage directly can deliver the batch without ending the stream.
    pub fn post_accumulated_posts(&mut self) -> Result<(), PipelineError> {
        let mut keyed = Vec::with_capacity(self.posts.len());
        for posting in self.posts.drain(..) {
            let scope = PostingScope::new(&posting);
            let key = self.key.calc(&scope)?;
            keyed.push((key, posting));
        }
        debug!(count = keyed.len(), key = %self.key, "sorting accumulated postings");

        keyed.sort_by(|(a, _), (b, _)| a.compare("<", b).unwrap_or(Ordering::Equal));

        for (_, posting) in keyed {
            self.next.handle(posting)?;
        }
        Ok(())
    }
}

impl<H: PostingHandler> PostingHandler for SortPostings<H> {
    fn handle(&mut self, posting: Posting) -> Result<(), PipelineError> {
        self.posts.push(posting);
        Ok(())
    }

    fn flush(&mut self) -> Result<(), PipelineError> {
        self.post_accumulated_posts()?;
        self.next.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collect::CollectPostings;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use tally_core::{Amount, CommodityPool, Value};

    fn posting(day: u32, tag: i64) -> Posting {
        Posting::new(
            NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            "Expenses:Food",
            Amount::new(dec!(1)),
        )
        .with_meta("tag", Value::integer(tag))
    }

    #[test]
    fn test_sort_by_date_is_stable() {
        let pool = CommodityPool::new();
        let key = Expr::parse("date", &pool).unwrap();
        let mut sort = SortPostings::new(key, CollectPostings::new());

        // Keys [8, 5, 5, 3] tagged [1, 2, 3, 4]
        for (day, tag) in [(8, 1), (5, 2), (5, 3), (3, 4)] {
            sort.handle(posting(day, tag)).unwrap();
        }
        sort.flush().unwrap();

        let tags: Vec<Value> = sort
            .into_next()
            .into_postings()
            .iter()
            .map(|p| p.meta["tag"].clone())
            .collect();
        assert_eq!(
            tags,
            vec![
                Value::integer(4),
                Value::integer(2),
                Value::integer(3),
                Value::integer(1),
            ]
        );
    }

    #[test]
    fn test_nothing_emitted_before_flush() {
        let pool = CommodityPool::new();
        let key = Expr::parse("date", &pool).unwrap();
        let mut sort = SortPostings::new(key, CollectPostings::new());

        sort.handle(posting(1, 1)).unwrap();
        sort.handle(posting(2, 2)).unwrap();
        assert!(sort.next.is_empty());

        sort.flush().unwrap();
        assert_eq!(sort.into_next().into_postings().len(), 2);
    }

    #[test]
    fn test_key_eval_errors_propagate_on_flush() {
        let pool = CommodityPool::new();
        let key = Expr::parse("missing_symbol", &pool).unwrap();
        let mut sort = SortPostings::new(key, CollectPostings::new());

        sort.handle(posting(1, 1)).unwrap();
        assert!(matches!(sort.flush(), Err(PipelineError::Eval(_))));
    }
}
