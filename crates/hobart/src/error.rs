//! Errors of a pipeline run.

use thiserror::Error;

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Errors that abort a run.
///
/// Per-factor failures are not errors; they surface as
/// [`crate::FactorOutcome::Skipped`].
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Panel construction or column access failed
    #[error("Data error: {0}")]
    Data(#[from] hobart_data::DataError),

    /// Invalid cleaning options
    #[error("Factor error: {0}")]
    Factor(#[from] hobart_factors::FactorError),

    /// Invalid evaluation parameters or evaluation failure
    #[error("Evaluation error: {0}")]
    Eval(#[from] hobart_eval::EvalError),

    /// Writing results failed
    #[error("Export error: {0}")]
    Export(#[from] hobart_output::ExportError),

    /// Subscriber installation failed
    #[error("Logging error: {0}")]
    Logging(#[from] crate::logging::LoggingError),

    /// Run configuration could not be parsed
    #[error("Invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error
    #[error("Polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),
}
