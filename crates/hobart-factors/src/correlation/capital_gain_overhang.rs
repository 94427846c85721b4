//! Capital gain overhang
//!
//! Reference price `avg = Σturnover / (Σvolume + 1e-8)` over the window, the
//! average cost of recently traded shares when turnover is traded value.
//! The factor is the unrealized gain `(close - avg) / avg`, with undefined
//! values reported as 0.

use hobart_data::{
    Panel,
    columns::{CLOSE, TURNOVER, VOLUME},
};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::expr::{finite, num, per_asset, window};
use crate::params::FactorParams;
use crate::traits::{ConfigurableFactor, Factor, FactorCategory, FactorConfig};

const NAME: &str = "capital_gain_overhang";

/// Configuration for the capital gain overhang factor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapitalGainOverhangConfig {
    /// Window (default: 10)
    pub window: usize,
}

impl Default for CapitalGainOverhangConfig {
    fn default() -> Self {
        Self { window: 10 }
    }
}

impl FactorConfig for CapitalGainOverhangConfig {
    fn from_params(params: &FactorParams) -> Result<Self> {
        Ok(Self {
            window: params.window(NAME, "window", Self::default().window)?,
        })
    }
}

/// Unrealized gain relative to the recent average cost
#[derive(Debug, Clone)]
pub struct CapitalGainOverhangFactor {
    config: CapitalGainOverhangConfig,
}

impl Factor for CapitalGainOverhangFactor {
    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        "Gain of the close over the recent volume-weighted cost basis"
    }

    fn category(&self) -> FactorCategory {
        FactorCategory::Correlation
    }

    fn required_columns(&self) -> &[&str] {
        &[CLOSE, VOLUME, TURNOVER]
    }

    fn compute(&self, panel: &Panel) -> Result<Vec<f64>> {
        let span = window(self.config.window);
        let cost = num(TURNOVER).rolling_sum(span.clone())
            / (num(VOLUME).rolling_sum(span) + lit(1e-8));

        let close = num(CLOSE);
        let gain = finite((close - cost.clone()) / cost).fill_null(lit(0.0));
        Ok(panel.evaluate(per_asset(gain))?)
    }
}

impl ConfigurableFactor for CapitalGainOverhangFactor {
    type Config = CapitalGainOverhangConfig;

    fn with_config(config: Self::Config) -> Self {
        Self { config }
    }

    fn config(&self) -> &Self::Config {
        &self.config
    }
}

impl Default for CapitalGainOverhangFactor {
    fn default() -> Self {
        Self::with_config(CapitalGainOverhangConfig::default())
    }
}
