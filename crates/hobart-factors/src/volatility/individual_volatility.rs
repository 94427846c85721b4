//! Individual volatility
//!
//! Negated rolling standard deviation of the close's relative deviation from
//! its moving average. Calmer assets score higher.

use hobart_data::{Panel, columns::CLOSE};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::expr::{num, per_asset, window};
use crate::params::FactorParams;
use crate::traits::{ConfigurableFactor, Factor, FactorCategory, FactorConfig};

const NAME: &str = "individual_volatility";

/// Configuration for the individual volatility factor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndividualVolatilityConfig {
    /// Window for both the moving average and the deviation (default: 10)
    pub window: usize,
}

impl Default for IndividualVolatilityConfig {
    fn default() -> Self {
        Self { window: 10 }
    }
}

impl FactorConfig for IndividualVolatilityConfig {
    fn from_params(params: &FactorParams) -> Result<Self> {
        Ok(Self {
            window: params.window(NAME, "window", Self::default().window)?,
        })
    }
}

/// Negated dispersion around the moving average
#[derive(Debug, Clone)]
pub struct IndividualVolatilityFactor {
    config: IndividualVolatilityConfig,
}

impl Factor for IndividualVolatilityFactor {
    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        "Negated volatility of the close around its moving average"
    }

    fn category(&self) -> FactorCategory {
        FactorCategory::Volatility
    }

    fn required_columns(&self) -> &[&str] {
        &[CLOSE]
    }

    fn compute(&self, panel: &Panel) -> Result<Vec<f64>> {
        let close = num(CLOSE);
        let span = window(self.config.window);

        let ma = close.clone().rolling_mean(span.clone());
        let deviation = (close - ma.clone()) / ma;
        let volatility = lit(0.0) - deviation.rolling_std(span);
        Ok(panel.evaluate(per_asset(volatility))?)
    }
}

impl ConfigurableFactor for IndividualVolatilityFactor {
    type Config = IndividualVolatilityConfig;

    fn with_config(config: Self::Config) -> Self {
        Self { config }
    }

    fn config(&self) -> &Self::Config {
        &self.config
    }
}

impl Default for IndividualVolatilityFactor {
    fn default() -> Self {
        Self::with_config(IndividualVolatilityConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{leading_nan, panel, zigzag};

    #[test]
    fn test_sign_and_warm_up() {
        let factor = IndividualVolatilityFactor::with_config(IndividualVolatilityConfig {
            window: 4,
        });
        let values = factor.compute(&panel(&zigzag(20))).unwrap();
        assert_eq!(leading_nan(&values), 6);
        assert!(values[6..].iter().all(|v| *v <= 0.0));
    }
}
