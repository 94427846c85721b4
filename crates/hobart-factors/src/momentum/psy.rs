//! Psychological line: share of up-moves in the window, as a percentage.

use hobart_data::{Panel, columns::CLOSE};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::expr::{diff, num, per_asset, window};
use crate::params::FactorParams;
use crate::traits::{ConfigurableFactor, Factor, FactorCategory, FactorConfig};

const NAME: &str = "psy";

/// Configuration for the psychological line factor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PsyConfig {
    /// Window (default: 12)
    pub window: usize,
}

impl Default for PsyConfig {
    fn default() -> Self {
        Self { window: 12 }
    }
}

impl FactorConfig for PsyConfig {
    fn from_params(params: &FactorParams) -> Result<Self> {
        Ok(Self {
            window: params.window(NAME, "window", Self::default().window)?,
        })
    }
}

/// Psychological line
#[derive(Debug, Clone)]
pub struct PsyFactor {
    config: PsyConfig,
}

impl Factor for PsyFactor {
    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        "Percentage of rising closes in the window"
    }

    fn category(&self) -> FactorCategory {
        FactorCategory::Momentum
    }

    fn required_columns(&self) -> &[&str] {
        &[CLOSE]
    }

    fn compute(&self, panel: &Panel) -> Result<Vec<f64>> {
        // The first row has no previous close and counts as not rising.
        let rising = when(diff(num(CLOSE), 1).gt(lit(0.0)))
            .then(lit(1.0))
            .otherwise(lit(0.0));
        let share = rising.rolling_mean(window(self.config.window)) * lit(100.0);
        Ok(panel.evaluate(per_asset(share))?)
    }
}

impl ConfigurableFactor for PsyFactor {
    type Config = PsyConfig;

    fn with_config(config: Self::Config) -> Self {
        Self { config }
    }

    fn config(&self) -> &Self::Config {
        &self.config
    }
}

impl Default for PsyFactor {
    fn default() -> Self {
        Self::with_config(PsyConfig::default())
    }
}
