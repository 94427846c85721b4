//! Rolling standard deviation of simple returns.

use hobart_data::{Panel, columns::CLOSE};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::expr::{num, pct_change, per_asset, window};
use crate::params::FactorParams;
use crate::traits::{ConfigurableFactor, Factor, FactorCategory, FactorConfig};

const NAME: &str = "return_std";

/// Configuration for the return volatility factor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReturnStdConfig {
    /// Window (default: 20)
    pub window: usize,
}

impl Default for ReturnStdConfig {
    fn default() -> Self {
        Self { window: 20 }
    }
}

impl FactorConfig for ReturnStdConfig {
    fn from_params(params: &FactorParams) -> Result<Self> {
        Ok(Self {
            window: params.window(NAME, "window", Self::default().window)?,
        })
    }
}

/// Realized return volatility
#[derive(Debug, Clone)]
pub struct ReturnStdFactor {
    config: ReturnStdConfig,
}

impl Factor for ReturnStdFactor {
    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        "Sample standard deviation of simple returns"
    }

    fn category(&self) -> FactorCategory {
        FactorCategory::Volatility
    }

    fn required_columns(&self) -> &[&str] {
        &[CLOSE]
    }

    fn compute(&self, panel: &Panel) -> Result<Vec<f64>> {
        let returns = pct_change(num(CLOSE), 1);
        let std = returns.rolling_std(window(self.config.window));
        Ok(panel.evaluate(per_asset(std))?)
    }
}

impl ConfigurableFactor for ReturnStdFactor {
    type Config = ReturnStdConfig;

    fn with_config(config: Self::Config) -> Self {
        Self { config }
    }

    fn config(&self) -> &Self::Config {
        &self.config
    }
}

impl Default for ReturnStdFactor {
    fn default() -> Self {
        Self::with_config(ReturnStdConfig::default())
    }
}
