//! Rolling correlation between returns and turnover.
//!
//! Undefined correlations are reported as 0.

use hobart_data::{
    Panel,
    columns::{CLOSE, TURNOVER},
};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::expr::{num, pct_change, per_asset, rolling_corr};
use crate::params::FactorParams;
use crate::traits::{ConfigurableFactor, Factor, FactorCategory, FactorConfig};

const NAME: &str = "ret_turnover_corr";

/// Configuration for the return-turnover correlation factor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetTurnoverCorrConfig {
    /// Window (default: 10)
    pub window: usize,
}

impl Default for RetTurnoverCorrConfig {
    fn default() -> Self {
        Self { window: 10 }
    }
}

impl FactorConfig for RetTurnoverCorrConfig {
    fn from_params(params: &FactorParams) -> Result<Self> {
        Ok(Self {
            window: params.window(NAME, "window", Self::default().window)?,
        })
    }
}

/// Return-turnover correlation
#[derive(Debug, Clone)]
pub struct RetTurnoverCorrFactor {
    config: RetTurnoverCorrConfig,
}

impl Factor for RetTurnoverCorrFactor {
    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        "Rolling correlation of returns with turnover"
    }

    fn category(&self) -> FactorCategory {
        FactorCategory::Correlation
    }

    fn required_columns(&self) -> &[&str] {
        &[CLOSE, TURNOVER]
    }

    fn compute(&self, panel: &Panel) -> Result<Vec<f64>> {
        let returns = pct_change(num(CLOSE), 1);
        let corr = rolling_corr(returns, num(TURNOVER), self.config.window).fill_null(lit(0.0));
        Ok(panel.evaluate(per_asset(corr))?)
    }
}

impl ConfigurableFactor for RetTurnoverCorrFactor {
    type Config = RetTurnoverCorrConfig;

    fn with_config(config: Self::Config) -> Self {
        Self { config }
    }

    fn config(&self) -> &Self::Config {
        &self.config
    }
}

impl Default for RetTurnoverCorrFactor {
    fn default() -> Self {
        Self::with_config(RetTurnoverCorrConfig::default())
    }
}
