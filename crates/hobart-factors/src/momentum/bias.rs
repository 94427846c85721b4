//! Bias: distance of the close from its moving average,
//! `(close - ma) / (ma + 1e-8)`.

use hobart_data::{Panel, columns::CLOSE};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::expr::{num, per_asset, window};
use crate::params::FactorParams;
use crate::traits::{ConfigurableFactor, Factor, FactorCategory, FactorConfig};

const NAME: &str = "bias";

/// Configuration for the bias factor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BiasConfig {
    /// Moving-average window (default: 20)
    pub window: usize,
}

impl Default for BiasConfig {
    fn default() -> Self {
        Self { window: 20 }
    }
}

impl FactorConfig for BiasConfig {
    fn from_params(params: &FactorParams) -> Result<Self> {
        Ok(Self {
            window: params.window(NAME, "window", Self::default().window)?,
        })
    }
}

/// Relative deviation from the moving average
#[derive(Debug, Clone)]
pub struct BiasFactor {
    config: BiasConfig,
}

impl Factor for BiasFactor {
    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        "Relative deviation of the close from its moving average"
    }

    fn category(&self) -> FactorCategory {
        FactorCategory::Momentum
    }

    fn required_columns(&self) -> &[&str] {
        &[CLOSE]
    }

    fn compute(&self, panel: &Panel) -> Result<Vec<f64>> {
        let close = num(CLOSE);
        let ma = close.clone().rolling_mean(window(self.config.window));
        let bias = (close - ma.clone()) / (ma + lit(1e-8));
        Ok(panel.evaluate(per_asset(bias))?)
    }
}

impl ConfigurableFactor for BiasFactor {
    type Config = BiasConfig;

    fn with_config(config: Self::Config) -> Self {
        Self { config }
    }

    fn config(&self) -> &Self::Config {
        &self.config
    }
}

impl Default for BiasFactor {
    fn default() -> Self {
        Self::with_config(BiasConfig::default())
    }
}
