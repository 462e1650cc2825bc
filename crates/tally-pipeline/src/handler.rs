//! The stage contract.

use tally_core::Posting;

use crate::error::PipelineError;

/// One link in the posting-processing chain.
///
/// A stage receives postings via [`Self::handle`] and an explicit
/// end-of-stream signal via [`Self::flush`]. Pass-through stages forward
/// each posting immediately and forward `flush` unchanged; accumulating
/// stages buffer during `handle` and only emit downstream in `flush`
/// after a whole-batch transform. Each stage owns its successor; the
/// chain is linear, built bottom-up once, and fixed for the run.
pub trait PostingHandler {
    /// Receive one posting.
    fn handle(&mut self, posting: Posting) -> Result<(), PipelineError>;

    /// Receive the end-of-stream signal.
    fn flush(&mut self) -> Result<(), PipelineError>;
}

impl PostingHandler for Box<dyn PostingHandler> {
    fn handle(&mut self, posting: Posting) -> Result<(), PipelineError> {
        (**self).handle(posting)
    }

    fn flush(&mut self) -> Result<(), PipelineError> {
        (**self).flush()
    }
}
