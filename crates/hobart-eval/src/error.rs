//! Evaluation errors.

use hobart_data::DataError;
use thiserror::Error;

/// Result type for evaluation.
pub type Result<T> = std::result::Result<T, EvalError>;

/// Errors raised by the evaluator.
#[derive(Debug, Error)]
pub enum EvalError {
    /// Evaluation parameters out of range
    #[error("Invalid evaluation config: {0}")]
    InvalidConfig(String),

    /// A column the evaluation reads is absent
    #[error("Missing column: {0}")]
    MissingColumn(String),

    /// Panel access failed
    #[error("Data error: {0}")]
    Data(#[from] DataError),

    /// Polars error
    #[error("Polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),
}
