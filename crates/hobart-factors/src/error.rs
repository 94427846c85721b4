//! Error types for factor construction and computation.

use hobart_data::DataError;
use thiserror::Error;

/// Result type for factor operations.
pub type Result<T> = std::result::Result<T, FactorError>;

/// Errors raised while building or computing a factor.
#[derive(Debug, Error)]
pub enum FactorError {
    /// No constructor is registered under this name
    #[error("Unknown factor: {0}")]
    UnknownFactor(String),

    /// The panel lacks columns the factor reads
    #[error("Factor {factor} is missing columns: {}", missing.join(", "))]
    MissingColumns {
        /// Factor name
        factor: String,
        /// Absent columns
        missing: Vec<String>,
    },

    /// A parameter value is out of range
    #[error("Invalid parameter {name}={value} for factor {factor}: {reason}")]
    InvalidParameter {
        /// Factor name
        factor: String,
        /// Parameter name
        name: String,
        /// Supplied value
        value: f64,
        /// Why it was rejected
        reason: String,
    },

    /// Cleaning options are inconsistent
    #[error("Invalid cleaning options: {0}")]
    InvalidOptions(String),

    /// Panel access failed
    #[error("Data error: {0}")]
    Data(#[from] DataError),

    /// Polars error
    #[error("Polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),

    /// Formula failed for another reason
    #[error("Computation error: {0}")]
    Computation(String),
}
