//! Williams %R: `-100 * (hh - close) / (hh - ll)` over the window.

use hobart_data::{
    Panel,
    columns::{CLOSE, HIGH, LOW},
};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::expr::{num, per_asset, ratio, window};
use crate::params::FactorParams;
use crate::traits::{ConfigurableFactor, Factor, FactorCategory, FactorConfig};

const NAME: &str = "williams_r";

/// Configuration for the Williams %R factor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WilliamsRConfig {
    /// Window (default: 14)
    pub window: usize,
}

impl Default for WilliamsRConfig {
    fn default() -> Self {
        Self { window: 14 }
    }
}

impl FactorConfig for WilliamsRConfig {
    fn from_params(params: &FactorParams) -> Result<Self> {
        Ok(Self {
            window: params.window(NAME, "window", Self::default().window)?,
        })
    }
}

/// Williams %R
#[derive(Debug, Clone)]
pub struct WilliamsRFactor {
    config: WilliamsRConfig,
}

impl Factor for WilliamsRFactor {
    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        "Distance of the close below the window high, as a share of the range"
    }

    fn category(&self) -> FactorCategory {
        FactorCategory::Oscillator
    }

    fn required_columns(&self) -> &[&str] {
        &[HIGH, LOW, CLOSE]
    }

    fn compute(&self, panel: &Panel) -> Result<Vec<f64>> {
        let span = window(self.config.window);
        let highest = num(HIGH).rolling_max(span.clone());
        let lowest = num(LOW).rolling_min(span);

        let percent = lit(-100.0) * ratio(highest.clone() - num(CLOSE), highest - lowest);
        Ok(panel.evaluate(per_asset(percent))?)
    }
}

impl ConfigurableFactor for WilliamsRFactor {
    type Config = WilliamsRConfig;

    fn with_config(config: Self::Config) -> Self {
        Self { config }
    }

    fn config(&self) -> &Self::Config {
        &self.config
    }
}

impl Default for WilliamsRFactor {
    fn default() -> Self {
        Self::with_config(WilliamsRConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{panel, zigzag};

    #[test]
    fn test_bounds() {
        let values = WilliamsRFactor::default().compute(&panel(&zigzag(40))).unwrap();
        assert!(values[..13].iter().all(|v| v.is_nan()));
        assert!(values[13..].iter().all(|v| (-100.0..=0.0).contains(v)));
    }
}
