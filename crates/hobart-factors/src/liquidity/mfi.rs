//! Money Flow Index
//!
//! Raw money flow is `typical_price × volume`. It counts as positive when the
//! typical price rose against the previous row and negative when it fell;
//! the first row of each asset counts as neither.
//! `MFI = 100 - 100 / (1 + Σpositive / Σnegative)`, undefined when the window
//! holds no negative flow.

use hobart_data::{
    Panel,
    columns::{CLOSE, HIGH, LOW, VOLUME},
};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::expr::{lagged, num, per_asset, ratio, window};
use crate::params::FactorParams;
use crate::traits::{ConfigurableFactor, Factor, FactorCategory, FactorConfig};

const NAME: &str = "mfi";

/// Configuration for the MFI factor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MfiConfig {
    /// Window (default: 14)
    pub window: usize,
}

impl Default for MfiConfig {
    fn default() -> Self {
        Self { window: 14 }
    }
}

impl FactorConfig for MfiConfig {
    fn from_params(params: &FactorParams) -> Result<Self> {
        Ok(Self {
            window: params.window(NAME, "window", Self::default().window)?,
        })
    }
}

/// Volume-weighted RSI on the typical price
#[derive(Debug, Clone)]
pub struct MfiFactor {
    config: MfiConfig,
}

impl Factor for MfiFactor {
    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        "Money flow index: volume-weighted relative strength of the typical price"
    }

    fn category(&self) -> FactorCategory {
        FactorCategory::Liquidity
    }

    fn required_columns(&self) -> &[&str] {
        &[HIGH, LOW, CLOSE, VOLUME]
    }

    fn compute(&self, panel: &Panel) -> Result<Vec<f64>> {
        let span = window(self.config.window);
        let typical = (num(HIGH) + num(LOW) + num(CLOSE)) / lit(3.0);
        let flow = typical.clone() * num(VOLUME);
        let previous = lagged(typical.clone(), 1);

        let positive = when(typical.clone().gt(previous.clone()))
            .then(flow.clone())
            .otherwise(lit(0.0))
            .rolling_sum(span.clone());
        let negative = when(typical.lt(previous))
            .then(flow)
            .otherwise(lit(0.0))
            .rolling_sum(span);

        let mfi = lit(100.0) - lit(100.0) / (lit(1.0) + ratio(positive, negative));
        Ok(panel.evaluate(per_asset(mfi))?)
    }
}

impl ConfigurableFactor for MfiFactor {
    type Config = MfiConfig;

    fn with_config(config: Self::Config) -> Self {
        Self { config }
    }

    fn config(&self) -> &Self::Config {
        &self.config
    }
}

impl Default for MfiFactor {
    fn default() -> Self {
        Self::with_config(MfiConfig::default())
    }
}
