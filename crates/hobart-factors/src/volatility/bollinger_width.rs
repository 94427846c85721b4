//! Bollinger band width: `(upper - lower) / ma` with bands at `ma ± k·std`.

use hobart_data::{Panel, columns::CLOSE};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::expr::{num, per_asset, window};
use crate::params::FactorParams;
use crate::traits::{ConfigurableFactor, Factor, FactorCategory, FactorConfig};

const NAME: &str = "bollinger_width";

/// Configuration for the Bollinger width factor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BollingerWidthConfig {
    /// Window (default: 20)
    pub window: usize,
    /// Band width in standard deviations (default: 2.0)
    pub k: f64,
}

impl Default for BollingerWidthConfig {
    fn default() -> Self {
        Self { window: 20, k: 2.0 }
    }
}

impl FactorConfig for BollingerWidthConfig {
    fn from_params(params: &FactorParams) -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            window: params.window(NAME, "window", defaults.window)?,
            k: params.number(NAME, "k", defaults.k)?,
        })
    }
}

/// Normalized Bollinger band width
#[derive(Debug, Clone)]
pub struct BollingerWidthFactor {
    config: BollingerWidthConfig,
}

impl Factor for BollingerWidthFactor {
    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        "Width of the Bollinger bands relative to the moving average"
    }

    fn category(&self) -> FactorCategory {
        FactorCategory::Volatility
    }

    fn required_columns(&self) -> &[&str] {
        &[CLOSE]
    }

    fn compute(&self, panel: &Panel) -> Result<Vec<f64>> {
        let close = num(CLOSE);
        let span = window(self.config.window);
        let k = lit(self.config.k);

        let ma = close.clone().rolling_mean(span.clone());
        let std = close.rolling_std(span);
        let upper = ma.clone() + k.clone() * std.clone();
        let lower = ma.clone() - k * std;
        Ok(panel.evaluate(per_asset((upper - lower) / ma))?)
    }
}

impl ConfigurableFactor for BollingerWidthFactor {
    type Config = BollingerWidthConfig;

    fn with_config(config: Self::Config) -> Self {
        Self { config }
    }

    fn config(&self) -> &Self::Config {
        &self.config
    }
}

impl Default for BollingerWidthFactor {
    fn default() -> Self {
        Self::with_config(BollingerWidthConfig::default())
    }
}
