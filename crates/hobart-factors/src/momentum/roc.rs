//! Rate of change: `(close - close[t - window]) / close[t - window]`.

use hobart_data::{Panel, columns::CLOSE};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::expr::{num, pct_change, per_asset};
use crate::params::FactorParams;
use crate::traits::{ConfigurableFactor, Factor, FactorCategory, FactorConfig};

const NAME: &str = "roc";

/// Configuration for the rate-of-change factor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RocConfig {
    /// Lookback in rows (default: 12)
    pub window: usize,
}

impl Default for RocConfig {
    fn default() -> Self {
        Self { window: 12 }
    }
}

impl FactorConfig for RocConfig {
    fn from_params(params: &FactorParams) -> Result<Self> {
        Ok(Self {
            window: params.window(NAME, "window", Self::default().window)?,
        })
    }
}

/// Percentage price change over a lookback
#[derive(Debug, Clone)]
pub struct RocFactor {
    config: RocConfig,
}

impl Factor for RocFactor {
    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        "Percentage change of the close over a lookback"
    }

    fn category(&self) -> FactorCategory {
        FactorCategory::Momentum
    }

    fn required_columns(&self) -> &[&str] {
        &[CLOSE]
    }

    fn compute(&self, panel: &Panel) -> Result<Vec<f64>> {
        let change = pct_change(num(CLOSE), self.config.window);
        Ok(panel.evaluate(per_asset(change))?)
    }
}

impl ConfigurableFactor for RocFactor {
    type Config = RocConfig;

    fn with_config(config: Self::Config) -> Self {
        Self { config }
    }

    fn config(&self) -> &Self::Config {
        &self.config
    }
}

impl Default for RocFactor {
    fn default() -> Self {
        Self::with_config(RocConfig::default())
    }
}
