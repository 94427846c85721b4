//! MACD histogram
//!
//! `dif = ema(close, fast) - ema(close, slow)`, `dea = ema(dif, signal)`,
//! factor value `2 * (dif - dea)`.

use hobart_data::{Panel, columns::CLOSE};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::expr::{ema, num, per_asset};
use crate::params::FactorParams;
use crate::traits::{ConfigurableFactor, Factor, FactorCategory, FactorConfig};

const NAME: &str = "macd";

/// Configuration for the MACD factor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MacdConfig {
    /// Fast EMA span (default: 12)
    pub fast: usize,
    /// Slow EMA span (default: 26)
    pub slow: usize,
    /// Signal EMA span (default: 9)
    pub signal: usize,
}

impl Default for MacdConfig {
    fn default() -> Self {
        Self {
            fast: 12,
            slow: 26,
            signal: 9,
        }
    }
}

impl FactorConfig for MacdConfig {
    fn from_params(params: &FactorParams) -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            fast: params.window(NAME, "fast", defaults.fast)?,
            slow: params.window(NAME, "slow", defaults.slow)?,
            signal: params.window(NAME, "signal", defaults.signal)?,
        })
    }
}

/// MACD histogram on closing prices
#[derive(Debug, Clone)]
pub struct MacdFactor {
    config: MacdConfig,
}

impl Factor for MacdFactor {
    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        "Twice the gap between the MACD line and its signal line"
    }

    fn category(&self) -> FactorCategory {
        FactorCategory::Momentum
    }

    fn required_columns(&self) -> &[&str] {
        &[CLOSE]
    }

    fn compute(&self, panel: &Panel) -> Result<Vec<f64>> {
        let MacdConfig { fast, slow, signal } = self.config;
        let close = num(CLOSE);

        let dif = ema(close.clone(), fast) - ema(close, slow);
        let dea = ema(dif.clone(), signal);
        Ok(panel.evaluate(per_asset(lit(2.0) * (dif - dea)))?)
    }
}

impl ConfigurableFactor for MacdFactor {
    type Config = MacdConfig;

    fn with_config(config: Self::Config) -> Self {
        Self { config }
    }

    fn config(&self) -> &Self::Config {
        &self.config
    }
}

impl Default for MacdFactor {
    fn default() -> Self {
        Self::with_config(MacdConfig::default())
    }
}
