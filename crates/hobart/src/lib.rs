#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/hobart/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod logging;
pub mod pipeline;

// Re-export main types from sub-crates
pub use hobart_data as data;
pub use hobart_eval as eval;
pub use hobart_factors as factors;
pub use hobart_output as output;

pub use config::RunConfig;
pub use error::{PipelineError, Result};
pub use logging::{LoggingError, init_logging};
pub use pipeline::{FactorOutcome, Pipeline, RunOutput};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
