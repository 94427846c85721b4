//! Volume ratio
//!
//! Splits volume by the direction of the close: rising, falling or flat
//! (the first row of each asset has no direction and counts as none).
//! `scale · (up + 0.5·flat) / (down + 0.5·flat + 1e-8)` over rolling sums.

use hobart_data::{
    Panel,
    columns::{CLOSE, VOLUME},
};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::expr::{diff, num, per_asset, window};
use crate::params::FactorParams;
use crate::traits::{ConfigurableFactor, Factor, FactorCategory, FactorConfig};

const NAME: &str = "volume_ratio";

/// Configuration for the volume ratio factor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VolumeRatioConfig {
    /// Window (default: 26)
    pub window: usize,
    /// Output scale (default: 100)
    pub scale: f64,
}

impl Default for VolumeRatioConfig {
    fn default() -> Self {
        Self {
            window: 26,
            scale: 100.0,
        }
    }
}

impl FactorConfig for VolumeRatioConfig {
    fn from_params(params: &FactorParams) -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            window: params.window(NAME, "window", defaults.window)?,
            scale: params.number(NAME, "scale", defaults.scale)?,
        })
    }
}

/// Up-volume to down-volume ratio
#[derive(Debug, Clone)]
pub struct VolumeRatioFactor {
    config: VolumeRatioConfig,
}

impl Factor for VolumeRatioFactor {
    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        "Ratio of volume on rising days to volume on falling days"
    }

    fn category(&self) -> FactorCategory {
        FactorCategory::Liquidity
    }

    fn required_columns(&self) -> &[&str] {
        &[CLOSE, VOLUME]
    }

    fn compute(&self, panel: &Panel) -> Result<Vec<f64>> {
        let change = diff(num(CLOSE), 1);
        let span = window(self.config.window);
        let volume_when = |moved: Expr| {
            when(moved)
                .then(num(VOLUME))
                .otherwise(lit(0.0))
                .rolling_sum(span.clone())
        };

        let up = volume_when(change.clone().gt(lit(0.0)));
        let down = volume_when(change.clone().lt(lit(0.0)));
        let flat = volume_when(change.eq(lit(0.0)));

        let ratio = lit(self.config.scale) * (up + lit(0.5) * flat.clone())
            / (down + lit(0.5) * flat + lit(1e-8));
        Ok(panel.evaluate(per_asset(ratio))?)
    }
}

impl ConfigurableFactor for VolumeRatioFactor {
    type Config = VolumeRatioConfig;

    fn with_config(config: Self::Config) -> Self {
        Self { config }
    }

    fn config(&self) -> &Self::Config {
        &self.config
    }
}

impl Default for VolumeRatioFactor {
    fn default() -> Self {
        Self::with_config(VolumeRatioConfig::default())
    }
}
