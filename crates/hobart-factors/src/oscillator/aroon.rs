//! Aroon oscillator
//!
//! Over the trailing window, `up = 100 * (argmax(high) + 1) / w` and
//! `down = 100 * (argmin(low) + 1) / w`, where the arg positions count from
//! the oldest row and ties resolve to the first occurrence. The factor is
//! `up - down`: positive when the latest extreme is a high.

use hobart_data::{
    Panel,
    columns::{HIGH, LOW},
};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::expr::rolling_kernel;
use crate::params::FactorParams;
use crate::traits::{ConfigurableFactor, Factor, FactorCategory, FactorConfig};

const NAME: &str = "aroon";

/// Configuration for the Aroon factor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AroonConfig {
    /// Window (default: 25)
    pub window: usize,
}

impl Default for AroonConfig {
    fn default() -> Self {
        Self { window: 25 }
    }
}

impl FactorConfig for AroonConfig {
    fn from_params(params: &FactorParams) -> Result<Self> {
        Ok(Self {
            window: params.window(NAME, "window", Self::default().window)?,
        })
    }
}

/// Aroon up minus Aroon down
#[derive(Debug, Clone)]
pub struct AroonFactor {
    config: AroonConfig,
}

fn arg_extreme(window: &[f64], better: impl Fn(f64, f64) -> bool) -> usize {
    let mut best = 0;
    for (i, value) in window.iter().enumerate().skip(1) {
        if better(*value, window[best]) {
            best = i;
        }
    }
    best
}

impl Factor for AroonFactor {
    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        "Recency of the window high minus recency of the window low"
    }

    fn category(&self) -> FactorCategory {
        FactorCategory::Oscillator
    }

    fn required_columns(&self) -> &[&str] {
        &[HIGH, LOW]
    }

    fn compute(&self, panel: &Panel) -> Result<Vec<f64>> {
        let high = panel.column_f64(HIGH)?;
        let low = panel.column_f64(LOW)?;
        let window = self.config.window;
        let scale = 100.0 / window as f64;

        let up = rolling_kernel(panel, &high, window, |w| {
            (arg_extreme(w, |a, b| a > b) + 1) as f64 * scale
        });
        let down = rolling_kernel(panel, &low, window, |w| {
            (arg_extreme(w, |a, b| a < b) + 1) as f64 * scale
        });
        Ok(up.iter().zip(down).map(|(u, d)| u - d).collect())
    }
}

impl ConfigurableFactor for AroonFactor {
    type Config = AroonConfig;

    fn with_config(config: Self::Config) -> Self {
        Self { config }
    }

    fn config(&self) -> &Self::Config {
        &self.config
    }
}

impl Default for AroonFactor {
    fn default() -> Self {
        Self::with_config(AroonConfig::default())
    }
}
