//! Return skewness factor - asymmetry measure.
//!
//! Bias-corrected sample skewness of simple returns over a rolling window.
//! Negative skewness indicates a longer left tail (crash risk).

use hobart_data::{Panel, columns::CLOSE};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{FactorError, Result};
use crate::expr::{num, pct_change, per_asset, rolling_skew};
use crate::params::FactorParams;
use crate::traits::{ConfigurableFactor, Factor, FactorCategory, FactorConfig};

const NAME: &str = "skewness";

/// Configuration for the ReturnSkewness factor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkewnessConfig {
    /// Number of returns in the window, at least 3 (default: 20).
    pub window: usize,
}

impl Default for SkewnessConfig {
    fn default() -> Self {
        Self { window: 20 }
    }
}

impl FactorConfig for SkewnessConfig {
    fn from_params(params: &FactorParams) -> Result<Self> {
        let window = params.window(NAME, "window", Self::default().window)?;
        if window < 3 {
            return Err(FactorError::InvalidParameter {
                factor: NAME.to_string(),
                name: "window".to_string(),
                value: window as f64,
                reason: "must be at least 3".to_string(),
            });
        }
        Ok(Self { window })
    }
}

/// Return skewness factor.
///
/// # Required Columns
/// - `close`: Closing price
#[derive(Debug, Clone)]
pub struct SkewnessFactor {
    config: SkewnessConfig,
}

impl Factor for SkewnessFactor {
    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        "Rolling skewness of simple returns"
    }

    fn category(&self) -> FactorCategory {
        FactorCategory::Statistical
    }

    fn required_columns(&self) -> &[&str] {
        &[CLOSE]
    }

    fn compute(&self, panel: &Panel) -> Result<Vec<f64>> {
        let skew = rolling_skew(pct_change(num(CLOSE), 1), self.config.window);
        Ok(panel.evaluate(per_asset(skew))?)
    }
}

impl ConfigurableFactor for SkewnessFactor {
    type Config = SkewnessConfig;

    fn with_config(config: Self::Config) -> Self {
        Self { config }
    }

    fn config(&self) -> &Self::Config {
        &self.config
    }
}

impl Default for SkewnessFactor {
    fn default() -> Self {
        Self::with_config(SkewnessConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::panel;

    #[test]
    fn test_crash_is_negative() {
        let mut prices = vec![100.0];
        for t in 1..12 {
            let step = if t == 10 { 0.7 } else { 1.01 };
            prices.push(prices[t - 1] * step);
        }
        let values = SkewnessFactor::with_config(SkewnessConfig { window: 10 })
            .compute(&panel(&prices))
            .unwrap();

        assert!(values[9].is_nan());
        assert!(values[10] < 0.0);
    }

    #[test]
    fn test_window_too_small() {
        assert!(SkewnessConfig::from_params(&FactorParams::new().with("window", 2.0)).is_err());
    }
}
