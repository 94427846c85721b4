//! VWAP bias: `close / vwap - 1` with a rolling volume-weighted average price.

use hobart_data::{
    Panel,
    columns::{CLOSE, VOLUME},
};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::expr::{num, per_asset, ratio, window};
use crate::params::FactorParams;
use crate::traits::{ConfigurableFactor, Factor, FactorCategory, FactorConfig};

const NAME: &str = "vwap_bias";

/// Configuration for the VWAP bias factor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VwapBiasConfig {
    /// Window (default: 20)
    pub window: usize,
}

impl Default for VwapBiasConfig {
    fn default() -> Self {
        Self { window: 20 }
    }
}

impl FactorConfig for VwapBiasConfig {
    fn from_params(params: &FactorParams) -> Result<Self> {
        Ok(Self {
            window: params.window(NAME, "window", Self::default().window)?,
        })
    }
}

/// Premium of the close over its rolling VWAP
#[derive(Debug, Clone)]
pub struct VwapBiasFactor {
    config: VwapBiasConfig,
}

impl Factor for VwapBiasFactor {
    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        "Relative premium of the close over the rolling volume-weighted price"
    }

    fn category(&self) -> FactorCategory {
        FactorCategory::Liquidity
    }

    fn required_columns(&self) -> &[&str] {
        &[CLOSE, VOLUME]
    }

    fn compute(&self, panel: &Panel) -> Result<Vec<f64>> {
        let close = num(CLOSE);
        let volume = num(VOLUME);
        let span = window(self.config.window);

        let traded = (close.clone() * volume.clone()).rolling_sum(span.clone());
        let total = volume.rolling_sum(span);
        let bias = close / ratio(traded, total) - lit(1.0);
        Ok(panel.evaluate(per_asset(bias))?)
    }
}

impl ConfigurableFactor for VwapBiasFactor {
    type Config = VwapBiasConfig;

    fn with_config(config: Self::Config) -> Self {
        Self { config }
    }

    fn config(&self) -> &Self::Config {
        &self.config
    }
}

impl Default for VwapBiasFactor {
    fn default() -> Self {
        Self::with_config(VwapBiasConfig::default())
    }
}
