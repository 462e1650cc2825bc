//! Pipeline error types.

use thiserror::Error;

use tally_expr::EvalError;

/// Error returned when a pipeline stage fails.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A stage was invoked outside its declared discipline.
    ///
    /// This is a programming error in pipeline wiring, not a data
    /// problem; it always propagates.
    #[error("contract violation: stage '{stage}' invoked outside its discipline")]
    ContractViolation {
        /// Name of the offending stage.
        stage: &'static str,
    },
    /// An expression evaluated by a stage failed.
    #[error(transparent)]
    Eval(#[from] EvalError),
}
