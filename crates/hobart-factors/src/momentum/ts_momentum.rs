//! Time-series momentum: `close / close[t - window]`.

use hobart_data::{Panel, columns::CLOSE};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::expr::{lagged, num, per_asset};
use crate::params::FactorParams;
use crate::traits::{ConfigurableFactor, Factor, FactorCategory, FactorConfig};

const NAME: &str = "ts_momentum";

/// Configuration for the time-series momentum factor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TsMomentumConfig {
    /// Lookback in rows (default: 10)
    pub window: usize,
}

impl Default for TsMomentumConfig {
    fn default() -> Self {
        Self { window: 10 }
    }
}

impl FactorConfig for TsMomentumConfig {
    fn from_params(params: &FactorParams) -> Result<Self> {
        Ok(Self {
            window: params.window(NAME, "window", Self::default().window)?,
        })
    }
}

/// Price relative over a fixed lookback
#[derive(Debug, Clone)]
pub struct TsMomentumFactor {
    config: TsMomentumConfig,
}

impl Factor for TsMomentumFactor {
    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        "Close relative to the close a fixed number of rows earlier"
    }

    fn category(&self) -> FactorCategory {
        FactorCategory::Momentum
    }

    fn required_columns(&self) -> &[&str] {
        &[CLOSE]
    }

    fn compute(&self, panel: &Panel) -> Result<Vec<f64>> {
        let close = num(CLOSE);
        let momentum = close.clone() / lagged(close, self.config.window);
        Ok(panel.evaluate(per_asset(momentum))?)
    }
}

impl ConfigurableFactor for TsMomentumFactor {
    type Config = TsMomentumConfig;

    fn with_config(config: Self::Config) -> Self {
        Self { config }
    }

    fn config(&self) -> &Self::Config {
        &self.config
    }
}

impl Default for TsMomentumFactor {
    fn default() -> Self {
        Self::with_config(TsMomentumConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::multi_asset;
    use approx::assert_relative_eq;

    #[test]
    fn test_no_leakage_across_assets() {
        let a = [1.0, 2.0, 3.0, 4.0];
        let b = [10.0, 5.0, 2.5];
        let panel = multi_asset(&[("A", &a), ("B", &b)]);

        let factor = TsMomentumFactor::with_config(TsMomentumConfig { window: 2 });
        let values = factor.compute(&panel).unwrap();

        assert!(values[0].is_nan() && values[1].is_nan());
        assert_relative_eq!(values[2], 3.0);
        assert_relative_eq!(values[3], 2.0);
        // B restarts its warm-up.
        assert!(values[4].is_nan() && values[5].is_nan());
        assert_relative_eq!(values[6], 0.25);
    }
}
