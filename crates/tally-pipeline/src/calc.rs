//! Running-total stage.

use tracing::trace;

use tally_core::{Balance, BigInt, Posting, Value};

use crate::error::PipelineError;
use crate::handler::PostingHandler;

/// A pass-through stage attaching a running total and sequence index.
///
/// The total is a [`Balance`] so postings in mixed commodities
/// accumulate without loss; it lands in each posting's metadata under
/// `total`, the 1-based arrival index under `index`. Identity-bearing
/// fields (date, account) are never touched.
pub struct CalcPostings<H: PostingHandler> {
    next: H,
    total: Balance,
    count: usize,
}

impl<H: PostingHandler> CalcPostings<H> {
    /// Create a calc stage delivering into `next`.
    pub fn new(next: H) -> Self {
        Self {
            next,
            total: Balance::new(),
            count: 0,
        }
    }

    /// Consume the stage, returning its successor.
    pub fn into_next(self) -> H {
        self.next
    }

    /// The total accumulated so far.
    #[must_use]
    pub const fn total(&self) -> &Balance {
        &self.total
    }
}

impl<H: PostingHandler> PostingHandler for CalcPostings<H> {
    fn handle(&mut self, posting: Posting) -> Result<(), PipelineError> {
        self.total.add_amount(&posting.amount);
        self.count += 1;
        trace!(index = self.count, total = %self.total, "calculated running total");

        let posting = posting
            .with_meta("total", Value::Balance(self.total.clone()))
            .with_meta("index", Value::Integer(BigInt::from(self.count)));
        self.next.handle(posting)
    }

    fn flush(&mut self) -> Result<(), PipelineError> {
        self.next.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collect::CollectPostings;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use tally_core::Amount;

    fn posting(quantity: rust_decimal::Decimal) -> Posting {
        Posting::new(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            "Expenses:Food",
            Amount::new(quantity),
        )
    }

    #[test]
    fn test_attaches_running_total_and_index() {
        let mut calc = CalcPostings::new(CollectPostings::new());
        calc.handle(posting(dec!(10))).unwrap();
        calc.handle(posting(dec!(5))).unwrap();
        calc.flush().unwrap();

        let collected = calc.into_next().into_postings();
        assert_eq!(collected[0].meta["index"], Value::integer(1));
        assert_eq!(collected[1].meta["index"], Value::integer(2));

        let Value::Balance(total) = &collected[1].meta["total"] else {
            panic!("expected balance");
        };
        assert_eq!(total.amount_for("").unwrap().quantity(), dec!(15));
    }

    #[test]
    fn test_totals_keep_commodities_apart() {
        let pool = tally_core::CommodityPool::new();
        let mut calc = CalcPostings::new(CollectPostings::new());

        let mut p = posting(dec!(0));
        p.amount = Amount::with_commodity(dec!(1), pool.find_or_create("USD"));
        calc.handle(p).unwrap();
        let mut p = posting(dec!(0));
        p.amount = Amount::with_commodity(dec!(2), pool.find_or_create("EUR"));
        calc.handle(p).unwrap();

        assert_eq!(calc.total().commodity_count(), 2);
    }
}
