//! Amihud Illiquidity Factor
//!
//! Average absolute return per unit of dollar volume:
//! `scale · mean(|return| / (close · volume))`.
//! Higher values indicate lower liquidity. Rows with zero dollar volume are
//! missing, so any window that contains one is missing too.

use hobart_data::{
    Panel,
    columns::{CLOSE, VOLUME},
};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::expr::{num, pct_change, per_asset, ratio, window};
use crate::params::FactorParams;
use crate::traits::{ConfigurableFactor, Factor, FactorCategory, FactorConfig};

const NAME: &str = "amihud";

/// Configuration for the Amihud factor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmihudConfig {
    /// Rolling window for average illiquidity (default: 20)
    pub window: usize,
    /// Scale factor for readability (default: 1e6)
    pub scale: f64,
}

impl Default for AmihudConfig {
    fn default() -> Self {
        Self {
            window: 20,
            scale: 1_000_000.0,
        }
    }
}

impl FactorConfig for AmihudConfig {
    fn from_params(params: &FactorParams) -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            window: params.window(NAME, "window", defaults.window)?,
            scale: params.number(NAME, "scale", defaults.scale)?,
        })
    }
}

/// Amihud computes illiquidity as price impact per unit of volume
#[derive(Debug, Clone)]
pub struct AmihudFactor {
    config: AmihudConfig,
}

impl Factor for AmihudFactor {
    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        "Amihud illiquidity - price impact per unit volume"
    }

    fn category(&self) -> FactorCategory {
        FactorCategory::Liquidity
    }

    fn required_columns(&self) -> &[&str] {
        &[CLOSE, VOLUME]
    }

    fn compute(&self, panel: &Panel) -> Result<Vec<f64>> {
        let close = num(CLOSE);
        let dollar_volume = close.clone() * num(VOLUME);

        let daily = ratio(pct_change(close, 1).abs(), dollar_volume);
        let illiquidity = daily.rolling_mean(window(self.config.window)) * lit(self.config.scale);
        Ok(panel.evaluate(per_asset(illiquidity))?)
    }
}

impl ConfigurableFactor for AmihudFactor {
    type Config = AmihudConfig;

    fn with_config(config: Self::Config) -> Self {
        Self { config }
    }

    fn config(&self) -> &Self::Config {
        &self.config
    }
}

impl Default for AmihudFactor {
    fn default() -> Self {
        Self::with_config(AmihudConfig::default())
    }
}
