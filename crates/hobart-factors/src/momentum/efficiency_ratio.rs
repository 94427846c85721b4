//! Kaufman efficiency ratio
//!
//! Net price change over the window divided by the total path length,
//! `|close - close[t - w]| / Σ|Δclose|`. A window with no movement is
//! undefined, and undefined values (warm-up included) are reported as 0.

use hobart_data::{Panel, columns::CLOSE};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::expr::{diff, num, per_asset, ratio, window};
use crate::params::FactorParams;
use crate::traits::{ConfigurableFactor, Factor, FactorCategory, FactorConfig};

const NAME: &str = "efficiency_ratio";

/// Configuration for the efficiency ratio factor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EfficiencyRatioConfig {
    /// Window (default: 10)
    pub window: usize,
}

impl Default for EfficiencyRatioConfig {
    fn default() -> Self {
        Self { window: 10 }
    }
}

impl FactorConfig for EfficiencyRatioConfig {
    fn from_params(params: &FactorParams) -> Result<Self> {
        Ok(Self {
            window: params.window(NAME, "window", Self::default().window)?,
        })
    }
}

/// Trend efficiency of the price path
#[derive(Debug, Clone)]
pub struct EfficiencyRatioFactor {
    config: EfficiencyRatioConfig,
}

impl Factor for EfficiencyRatioFactor {
    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        "Net price change relative to the total path travelled"
    }

    fn category(&self) -> FactorCategory {
        FactorCategory::Momentum
    }

    fn required_columns(&self) -> &[&str] {
        &[CLOSE]
    }

    fn compute(&self, panel: &Panel) -> Result<Vec<f64>> {
        let close = num(CLOSE);
        let window_size = self.config.window;

        let change = diff(close.clone(), window_size).abs();
        let path = diff(close, 1).abs().rolling_sum(window(window_size));
        let efficiency = ratio(change, path).fill_null(lit(0.0));
        Ok(panel.evaluate(per_asset(efficiency))?)
    }
}

impl ConfigurableFactor for EfficiencyRatioFactor {
    type Config = EfficiencyRatioConfig;

    fn with_config(config: Self::Config) -> Self {
        Self { config }
    }

    fn config(&self) -> &Self::Config {
        &self.config
    }
}

impl Default for EfficiencyRatioFactor {
    fn default() -> Self {
        Self::with_config(EfficiencyRatioConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{flat, panel};
    use approx::assert_relative_eq;

    #[test]
    fn test_straight_line_is_one() {
        let prices: Vec<f64> = (1..=12).map(f64::from).collect();
        let values = EfficiencyRatioFactor::default()
            .compute(&panel(&prices))
            .unwrap();
        assert_eq!(values[0], 0.0);
        assert_relative_eq!(values[11], 1.0);
    }

    #[test]
    fn test_choppy_path() {
        let factor = EfficiencyRatioFactor::with_config(EfficiencyRatioConfig { window: 3 });
        let values = factor.compute(&panel(&[10.0, 12.0, 11.0, 13.0])).unwrap();
        assert_relative_eq!(values[3], 3.0 / 5.0);
    }

    #[test]
    fn test_flat_is_zero() {
        let values = EfficiencyRatioFactor::default()
            .compute(&panel(&flat(15)))
            .unwrap();
        assert!(values.iter().all(|v| *v == 0.0));
    }
}
