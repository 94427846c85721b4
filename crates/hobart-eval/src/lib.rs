#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/hobart/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod buckets;
pub mod correlation;
pub mod error;
pub mod evaluator;
mod read;
pub mod returns;

pub use buckets::{BucketReturns, assign_buckets, quantile_bucket_returns};
pub use correlation::{
    CorrelationSeries, CorrelationSummary, rank_correlation_series, rank_correlation_series_with,
};
pub use error::{EvalError, Result};
pub use evaluator::{EvaluationConfig, EvaluationReport, FactorEvaluator, sort_reports};
pub use returns::{FORWARD_RETURN, forward_returns, prepare};
