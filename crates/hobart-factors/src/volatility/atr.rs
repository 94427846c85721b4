//! Average True Range
//!
//! True range is `max(high - low, |high - prev_close|, |low - prev_close|)`;
//! the first row of each asset has no previous close and uses `high - low`.
//! The factor is the rolling mean of the true range.

use hobart_data::{
    Panel,
    columns::{CLOSE, HIGH, LOW},
};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::expr::{lagged, num, per_asset, window};
use crate::params::FactorParams;
use crate::traits::{ConfigurableFactor, Factor, FactorCategory, FactorConfig};

const NAME: &str = "atr";

/// Configuration for the ATR factor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AtrConfig {
    /// Averaging window (default: 14)
    pub window: usize,
}

impl Default for AtrConfig {
    fn default() -> Self {
        Self { window: 14 }
    }
}

impl FactorConfig for AtrConfig {
    fn from_params(params: &FactorParams) -> Result<Self> {
        Ok(Self {
            window: params.window(NAME, "window", Self::default().window)?,
        })
    }
}

/// Average true range
#[derive(Debug, Clone)]
pub struct AtrFactor {
    config: AtrConfig,
}

impl Factor for AtrFactor {
    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        "Rolling mean of the true range"
    }

    fn category(&self) -> FactorCategory {
        FactorCategory::Volatility
    }

    fn required_columns(&self) -> &[&str] {
        &[HIGH, LOW, CLOSE]
    }

    fn compute(&self, panel: &Panel) -> Result<Vec<f64>> {
        let (high, low) = (num(HIGH), num(LOW));
        let previous = lagged(num(CLOSE), 1);

        let span = high.clone() - low.clone();
        let gap_up = (high - previous.clone()).abs();
        let gap_down = (low - previous.clone()).abs();
        let widest = when(gap_up.clone().gt(span.clone()))
            .then(gap_up)
            .otherwise(span.clone());
        let widest = when(gap_down.clone().gt(widest.clone()))
            .then(gap_down)
            .otherwise(widest);

        // No previous close on the first row of an asset.
        let true_range = when(previous.is_null()).then(span).otherwise(widest);
        let atr = true_range.rolling_mean(window(self.config.window));
        Ok(panel.evaluate(per_asset(atr))?)
    }
}

impl ConfigurableFactor for AtrFactor {
    type Config = AtrConfig;

    fn with_config(config: Self::Config) -> Self {
        Self { config }
    }

    fn config(&self) -> &Self::Config {
        &self.config
    }
}

impl Default for AtrFactor {
    fn default() -> Self {
        Self::with_config(AtrConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::panel;
    use approx::assert_relative_eq;

    #[test]
    fn test_gap_uses_previous_close() {
        // high/low are ±1% of close.
        let factor = AtrFactor::with_config(AtrConfig { window: 2 });
        let values = factor.compute(&panel(&[100.0, 110.0])).unwrap();

        let first = 101.0 - 99.0;
        let second = 111.1 - 100.0;
        assert!(values[0].is_nan());
        assert_relative_eq!(values[1], (first + second) / 2.0, epsilon = 1e-9);
    }
}
