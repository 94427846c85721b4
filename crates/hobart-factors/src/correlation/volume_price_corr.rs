//! Rolling correlation between price changes and volume changes.
//!
//! Undefined correlations (warm-up, constant windows) are reported as 0.

use hobart_data::{
    Panel,
    columns::{CLOSE, VOLUME},
};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::expr::{num, pct_change, per_asset, rolling_corr};
use crate::params::FactorParams;
use crate::traits::{ConfigurableFactor, Factor, FactorCategory, FactorConfig};

const NAME: &str = "volume_price_corr";

/// Configuration for the volume-price correlation factor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VolumePriceCorrConfig {
    /// Window (default: 10)
    pub window: usize,
}

impl Default for VolumePriceCorrConfig {
    fn default() -> Self {
        Self { window: 10 }
    }
}

impl FactorConfig for VolumePriceCorrConfig {
    fn from_params(params: &FactorParams) -> Result<Self> {
        Ok(Self {
            window: params.window(NAME, "window", Self::default().window)?,
        })
    }
}

/// Co-movement of price and volume
#[derive(Debug, Clone)]
pub struct VolumePriceCorrFactor {
    config: VolumePriceCorrConfig,
}

impl Factor for VolumePriceCorrFactor {
    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        "Rolling correlation of price changes with volume changes"
    }

    fn category(&self) -> FactorCategory {
        FactorCategory::Correlation
    }

    fn required_columns(&self) -> &[&str] {
        &[CLOSE, VOLUME]
    }

    fn compute(&self, panel: &Panel) -> Result<Vec<f64>> {
        let returns = pct_change(num(CLOSE), 1);
        let volume_change = pct_change(num(VOLUME), 1);
        let corr = rolling_corr(returns, volume_change, self.config.window).fill_null(lit(0.0));
        Ok(panel.evaluate(per_asset(corr))?)
    }
}

impl ConfigurableFactor for VolumePriceCorrFactor {
    type Config = VolumePriceCorrConfig;

    fn with_config(config: Self::Config) -> Self {
        Self { config }
    }

    fn config(&self) -> &Self::Config {
        &self.config
    }
}

impl Default for VolumePriceCorrFactor {
    fn default() -> Self {
        Self::with_config(VolumePriceCorrConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{panel, zigzag};

    #[test]
    fn test_bounded_and_filled() {
        let values = VolumePriceCorrFactor::default()
            .compute(&panel(&zigzag(30)))
            .unwrap();
        assert_eq!(values[0], 0.0);
        assert!(values.iter().all(|v| (-1.0..=1.0).contains(v)));
    }
}
