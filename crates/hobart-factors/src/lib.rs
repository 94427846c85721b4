#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/hobart/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod clean;
pub mod correlation;
pub mod error;
pub mod expr;
pub mod liquidity;
pub mod momentum;
pub mod oscillator;
pub mod params;
pub mod registry;
pub mod statistical;
pub mod traits;
pub mod volatility;

#[cfg(test)]
mod testing;

pub use clean::{CleanOptions, CrossSectionalCleaner};
pub use error::{FactorError, Result};
pub use params::{FactorParams, FactorSpec};
pub use registry::{FactorConstructor, FactorInfo, FactorRegistry};
pub use traits::{ConfigurableFactor, Factor, FactorCategory, FactorConfig};
