//! Relative Strength Index
//!
//! Gains and losses come from the one-step close difference, with the first
//! difference of each asset counted as zero, and are smoothed with a rolling
//! mean. `RSI = 100 - 100 / (1 + gain / loss)`. A window without any loss is
//! undefined rather than pinned at 100.

use hobart_data::{Panel, columns::CLOSE};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::expr::{diff, first_row, num, per_asset, ratio, window};
use crate::params::FactorParams;
use crate::traits::{ConfigurableFactor, Factor, FactorCategory, FactorConfig};

const NAME: &str = "rsi";

/// Configuration for the RSI factor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RsiConfig {
    /// Smoothing window (default: 14)
    pub window: usize,
}

impl Default for RsiConfig {
    fn default() -> Self {
        Self { window: 14 }
    }
}

impl FactorConfig for RsiConfig {
    fn from_params(params: &FactorParams) -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            window: params.window(NAME, "window", defaults.window)?,
        })
    }
}

/// RSI momentum oscillator on closing prices
#[derive(Debug, Clone)]
pub struct RsiFactor {
    config: RsiConfig,
}

impl Factor for RsiFactor {
    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        "Relative strength index of closing prices"
    }

    fn category(&self) -> FactorCategory {
        FactorCategory::Momentum
    }

    fn required_columns(&self) -> &[&str] {
        &[CLOSE]
    }

    fn compute(&self, panel: &Panel) -> Result<Vec<f64>> {
        let span = window(self.config.window);
        let delta = when(first_row())
            .then(lit(0.0))
            .otherwise(diff(num(CLOSE), 1));

        let gain = when(delta.clone().gt(lit(0.0)))
            .then(delta.clone())
            .otherwise(lit(0.0))
            .rolling_mean(span.clone());
        let loss = when(delta.clone().lt(lit(0.0)))
            .then(lit(0.0) - delta)
            .otherwise(lit(0.0))
            .rolling_mean(span);

        let rsi = lit(100.0) - lit(100.0) / (lit(1.0) + ratio(gain, loss));
        Ok(panel.evaluate(per_asset(rsi))?)
    }
}

impl ConfigurableFactor for RsiFactor {
    type Config = RsiConfig;

    fn with_config(config: Self::Config) -> Self {
        Self { config }
    }

    fn config(&self) -> &Self::Config {
        &self.config
    }
}

impl Default for RsiFactor {
    fn default() -> Self {
        Self::with_config(RsiConfig::default())
    }
}
