//! Run configuration.
//!
//! A run is described by one JSON document:
//!
//! ```json
//! {
//!   "factors": [
//!     {"name": "rsi", "params": {"window": 10}, "lag": 1},
//!     {"name": "pvt", "lag": 1}
//!   ],
//!   "cleaning": {"standardize": true},
//!   "evaluation": {"horizon": 10, "n_buckets": 5}
//! }
//! ```
//!
//! Every section is optional; absent sections take their defaults.

use std::fs;
use std::path::Path;

use hobart_eval::EvaluationConfig;
use hobart_factors::{CleanOptions, FactorParams, FactorSpec};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;

/// Factors, cleaning and evaluation settings of one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Factor descriptors, computed in order
    pub factors: Vec<FactorSpec>,
    /// Cleaning applied to every factor
    pub cleaning: CleanOptions,
    /// Forward-return horizon, bucket count and correlation settings
    pub evaluation: EvaluationConfig,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            factors: default_factors(),
            cleaning: CleanOptions::default(),
            evaluation: EvaluationConfig::default(),
        }
    }
}

/// Ten-row windows, each lagged by one row.
fn default_factors() -> Vec<FactorSpec> {
    let windowed = |name: &str| {
        FactorSpec::new(name)
            .with_params(FactorParams::new().with("window", 10.0))
            .with_lag(1)
    };

    vec![
        windowed("rsi"),
        windowed("efficiency_ratio"),
        FactorSpec::new("macd")
            .with_params(
                FactorParams::new()
                    .with("fast", 12.0)
                    .with("slow", 26.0)
                    .with("signal", 9.0),
            )
            .with_lag(1),
        FactorSpec::new("pvt").with_lag(1),
        windowed("turnover_stability"),
        windowed("ret_turnover_corr"),
        windowed("capital_gain_overhang"),
        windowed("ts_momentum"),
        windowed("volume_price_corr"),
        windowed("individual_volatility"),
    ]
}

impl RunConfig {
    /// Parse a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a JSON file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let config = Self::from_json_str(&fs::read_to_string(path)?)?;
        debug!(
            path = %path.display(),
            factors = config.factors.len(),
            "loaded run configuration"
        );
        Ok(config)
    }

    /// Replace the forward-return horizon.
    pub const fn with_horizon(mut self, horizon: usize) -> Self {
        self.evaluation.horizon = horizon;
        self
    }

    /// Replace the bucket count.
    pub const fn with_buckets(mut self, n_buckets: usize) -> Self {
        self.evaluation.n_buckets = n_buckets;
        self
    }

    /// Check the cleaning and evaluation settings.
    pub fn validate(&self) -> Result<()> {
        self.cleaning.validate()?;
        self.evaluation.validate()?;
        Ok(())
    }
}
