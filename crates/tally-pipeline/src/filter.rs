//! Predicate filtering stage.

use tracing::trace;

use tally_core::Posting;
use tally_expr::Expr;

use crate::error::PipelineError;
use crate::handler::PostingHandler;
use crate::scope::PostingScope;

/// A pass-through stage forwarding postings whose predicate is truthy.
pub struct FilterPostings<H: PostingHandler> {
    predicate: Expr,
    next: H,
}

impl<H: PostingHandler> FilterPostings<H> {
    /// Create a filter over `predicate` delivering into `next`.
    pub const fn new(predicate: Expr, next: H) -> Self {
        Self { predicate, next }
    }

    /// Consume the stage, returning its successor.
    pub fn into_next(self) -> H {
        self.next
    }
}

impl<H: PostingHandler> PostingHandler for FilterPostings<H> {
    fn handle(&mut self, posting: Posting) -> Result<(), PipelineError> {
        let scope = PostingScope::new(&posting);
        if self.predicate.calc(&scope)?.truthy() {
            self.next.handle(posting)
        } else {
            trace!(account = %posting.account, "filtered out posting");
            Ok(())
        }
    }

    fn flush(&mut self) -> Result<(), PipelineError> {
        self.next.flush()
    }
}
