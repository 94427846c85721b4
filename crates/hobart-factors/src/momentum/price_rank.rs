//! Price rank within the window.
//!
//! Share of the window's closes strictly below the latest close,
//! `count / (window - 1)`, so 1 marks a new high and 0 a new low.

use hobart_data::{Panel, columns::CLOSE};
use serde::{Deserialize, Serialize};

use crate::error::{FactorError, Result};
use crate::expr::rolling_kernel;
use crate::params::FactorParams;
use crate::traits::{ConfigurableFactor, Factor, FactorCategory, FactorConfig};

const NAME: &str = "price_rank";

/// Configuration for the price rank factor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceRankConfig {
    /// Window, at least 2 (default: 20)
    pub window: usize,
}

impl Default for PriceRankConfig {
    fn default() -> Self {
        Self { window: 20 }
    }
}

impl FactorConfig for PriceRankConfig {
    fn from_params(params: &FactorParams) -> Result<Self> {
        let window = params.window(NAME, "window", Self::default().window)?;
        if window < 2 {
            return Err(FactorError::InvalidParameter {
                factor: NAME.to_string(),
                name: "window".to_string(),
                value: window as f64,
                reason: "must be at least 2".to_string(),
            });
        }
        Ok(Self { window })
    }
}

/// Relative position of the close within its recent history
#[derive(Debug, Clone)]
pub struct PriceRankFactor {
    config: PriceRankConfig,
}

impl Factor for PriceRankFactor {
    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        "Share of recent closes below the latest close"
    }

    fn category(&self) -> FactorCategory {
        FactorCategory::Momentum
    }

    fn required_columns(&self) -> &[&str] {
        &[CLOSE]
    }

    fn compute(&self, panel: &Panel) -> Result<Vec<f64>> {
        let close = panel.column_f64(CLOSE)?;

        Ok(rolling_kernel(panel, &close, self.config.window, |w| {
            let last = w[w.len() - 1];
            let below = w.iter().filter(|v| **v < last).count();
            below as f64 / (w.len() - 1) as f64
        }))
    }
}

impl ConfigurableFactor for PriceRankFactor {
    type Config = PriceRankConfig;

    fn with_config(config: Self::Config) -> Self {
        Self { config }
    }

    fn config(&self) -> &Self::Config {
        &self.config
    }
}

impl Default for PriceRankFactor {
    fn default() -> Self {
        Self::with_config(PriceRankConfig::default())
    }
}
