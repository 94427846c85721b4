//! Commodity Channel Index
//!
//! Typical price `tp = (high + low + close) / 3`;
//! `CCI = (tp - ma(tp)) / (0.015 * mad(tp))` where `mad` is the mean absolute
//! deviation over the same window. A window with zero deviation is undefined.

use hobart_data::{
    Panel,
    columns::{CLOSE, HIGH, LOW},
};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::expr::{num, per_asset, rolling_kernel, window};
use crate::params::FactorParams;
use crate::traits::{ConfigurableFactor, Factor, FactorCategory, FactorConfig};

const NAME: &str = "cci";

/// Lambert's scaling constant.
const SCALE: f64 = 0.015;

/// Configuration for the CCI factor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CciConfig {
    /// Window (default: 14)
    pub window: usize,
}

impl Default for CciConfig {
    fn default() -> Self {
        Self { window: 14 }
    }
}

impl FactorConfig for CciConfig {
    fn from_params(params: &FactorParams) -> Result<Self> {
        Ok(Self {
            window: params.window(NAME, "window", Self::default().window)?,
        })
    }
}

/// Commodity channel index on the typical price
#[derive(Debug, Clone)]
pub struct CciFactor {
    config: CciConfig,
}

impl Factor for CciFactor {
    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        "Deviation of the typical price from its mean, in mean absolute deviations"
    }

    fn category(&self) -> FactorCategory {
        FactorCategory::Oscillator
    }

    fn required_columns(&self) -> &[&str] {
        &[HIGH, LOW, CLOSE]
    }

    fn compute(&self, panel: &Panel) -> Result<Vec<f64>> {
        let typical = (num(HIGH) + num(LOW) + num(CLOSE)) / lit(3.0);
        let ma = typical.clone().rolling_mean(window(self.config.window));

        let deviation = panel.evaluate(per_asset(typical.clone() - ma))?;
        let mad = rolling_kernel(
            panel,
            &panel.evaluate(typical)?,
            self.config.window,
            mean_absolute_deviation,
        );

        Ok(deviation
            .iter()
            .zip(mad)
            .map(|(d, m)| if m == 0.0 { f64::NAN } else { d / (SCALE * m) })
            .collect())
    }
}

/// Mean absolute deviation around the window mean.
fn mean_absolute_deviation(window: &[f64]) -> f64 {
    let n = window.len() as f64;
    let mean = window.iter().sum::<f64>() / n;
    window.iter().map(|v| (v - mean).abs()).sum::<f64>() / n
}

impl ConfigurableFactor for CciFactor {
    type Config = CciConfig;

    fn with_config(config: Self::Config) -> Self {
        Self { config }
    }

    fn config(&self) -> &Self::Config {
        &self.config
    }
}

impl Default for CciFactor {
    fn default() -> Self {
        Self::with_config(CciConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{flat, panel};
    use approx::assert_relative_eq;

    #[test]
    fn test_required_columns() {
        assert_eq!(CciFactor::default().required_columns(), &["high", "low", "close"]);
    }

    #[test]
    fn test_linear_trend() {
        // tp is a scaled copy of close, so the ratio does not depend on the scale.
        let factor = CciFactor::with_config(CciConfig { window: 3 });
        let values = factor.compute(&panel(&[1.0, 2.0, 3.0])).unwrap();
        // (3 - 2) / (0.015 * 2/3)
        assert_relative_eq!(values[2], 100.0, epsilon = 1e-9);
    }

    #[test]
    fn test_flat_is_missing() {
        let values = CciFactor::default().compute(&panel(&flat(20))).unwrap();
        assert!(values.iter().all(|v| v.is_nan()));
    }
}
