//! Terminal stages.

use tally_core::Posting;

use crate::error::PipelineError;
use crate::handler::PostingHandler;

/// A terminal collector accumulating every delivered posting.
#[derive(Debug, Default)]
pub struct CollectPostings {
    postings: Vec<Posting>,
}

impl CollectPostings {
    /// Create an empty collector.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            postings: Vec::new(),
        }
    }

    /// The postings collected so far, in delivery order.
    #[must_use]
    pub fn postings(&self) -> &[Posting] {
        &self.postings
    }

    /// The number of postings collected.
    #[must_use]
    pub fn len(&self) -> usize {
        self.postings.len()
    }

    /// Check if nothing has been delivered yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.postings.is_empty()
    }

    /// Consume the collector, returning the collected postings.
    #[must_use]
    pub fn into_postings(self) -> Vec<Posting> {
        self.postings
    }
}

impl PostingHandler for CollectPostings {
    fn handle(&mut self, posting: Posting) -> Result<(), PipelineError> {
        self.postings.push(posting);
        Ok(())
    }

    fn flush(&mut self) -> Result<(), PipelineError> {
        Ok(())
    }
}

/// A terminal stage that must never receive direct posting delivery.
///
/// Used behind an accumulating stage that consumes the whole stream
/// itself; a delivery reaching this stage is a wiring error and fails
/// with [`PipelineError::ContractViolation`] rather than being silently
/// ignored.
#[derive(Debug, Default)]
pub struct UnreachedSink;

impl UnreachedSink {
    /// Create the sink.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl PostingHandler for UnreachedSink {
    fn handle(&mut self, _posting: Posting) -> Result<(), PipelineError> {
        Err(PipelineError::ContractViolation {
            stage: "UnreachedSink",
        })
    }

    fn flush(&mut self) -> Result<(), PipelineError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use tally_core::Amount;

    fn posting() -> Posting {
        Posting::new(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            "Assets:Bank",
            Amount::new(dec!(1)),
        )
    }

    #[test]
    fn test_collects_in_delivery_order() {
        let mut collector = CollectPostings::new();
        assert!(collector.is_empty());

        collector.handle(posting()).unwrap();
        collector.handle(posting()).unwrap();
        collector.flush().unwrap();

        assert_eq!(collector.len(), 2);
    }

    #[test]
    fn test_unreached_sink_rejects_delivery() {
        let mut sink = UnreachedSink::new();
        assert!(matches!(
            sink.handle(posting()),
            Err(PipelineError::ContractViolation {
                stage: "UnreachedSink"
            })
        ));
        // Flush alone is within contract
        sink.flush().unwrap();
    }
}
