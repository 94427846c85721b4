//! Error types for panel operations.

use thiserror::Error;

/// Result type for panel operations.
pub type Result<T> = std::result::Result<T, DataError>;

/// Errors that can occur while building or reading a panel.
#[derive(Debug, Error)]
pub enum DataError {
    /// A required column is absent
    #[error("Missing column: {0}")]
    MissingColumn(String),

    /// An identity column contains a null
    #[error("Null value in identity column {column} at row {row}")]
    NullIdentity {
        /// Column holding the null
        column: String,
        /// Row index (after sorting)
        row: usize,
    },

    /// Timestamps are not strictly increasing within an asset
    #[error("Timestamps for asset {asset} are not strictly increasing at {timestamp}")]
    NonChronological {
        /// Asset whose rows are out of order or duplicated
        asset: String,
        /// Offending timestamp (physical Int64 value)
        timestamp: i64,
    },

    /// A column has a type the panel cannot interpret
    #[error("Column {column} has unsupported type {dtype}")]
    UnsupportedType {
        /// Column name
        column: String,
        /// Polars data type, rendered
        dtype: String,
    },

    /// A derived column does not match the panel height
    #[error("Length mismatch for {column}: expected {expected}, got {actual}")]
    LengthMismatch {
        /// Column being appended
        column: String,
        /// Panel height
        expected: usize,
        /// Length of the supplied values
        actual: usize,
    },

    /// Polars error
    #[error("Polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
