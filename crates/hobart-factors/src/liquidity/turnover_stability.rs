//! Turnover stability: negated coefficient of variation of turnover.

use hobart_data::{Panel, columns::TURNOVER};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::expr::{num, per_asset, window};
use crate::params::FactorParams;
use crate::traits::{ConfigurableFactor, Factor, FactorCategory, FactorConfig};

const NAME: &str = "turnover_stability";

/// Configuration for the turnover stability factor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnoverStabilityConfig {
    /// Window (default: 10)
    pub window: usize,
}

impl Default for TurnoverStabilityConfig {
    fn default() -> Self {
        Self { window: 10 }
    }
}

impl FactorConfig for TurnoverStabilityConfig {
    fn from_params(params: &FactorParams) -> Result<Self> {
        Ok(Self {
            window: params.window(NAME, "window", Self::default().window)?,
        })
    }
}

/// Steadiness of trading activity
#[derive(Debug, Clone)]
pub struct TurnoverStabilityFactor {
    config: TurnoverStabilityConfig,
}

impl Factor for TurnoverStabilityFactor {
    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        "Negated coefficient of variation of turnover"
    }

    fn category(&self) -> FactorCategory {
        FactorCategory::Liquidity
    }

    fn required_columns(&self) -> &[&str] {
        &[TURNOVER]
    }

    fn compute(&self, panel: &Panel) -> Result<Vec<f64>> {
        let turnover = num(TURNOVER);
        let span = window(self.config.window);

        let std = turnover.clone().rolling_std(span.clone());
        let mean = turnover.rolling_mean(span);
        let stability = lit(0.0) - std / (mean + lit(1e-8));
        Ok(panel.evaluate(per_asset(stability))?)
    }
}

impl ConfigurableFactor for TurnoverStabilityFactor {
    type Config = TurnoverStabilityConfig;

    fn with_config(config: Self::Config) -> Self {
        Self { config }
    }

    fn config(&self) -> &Self::Config {
        &self.config
    }
}

impl Default for TurnoverStabilityFactor {
    fn default() -> Self {
        Self::with_config(TurnoverStabilityConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{panel, zigzag};

    #[test]
    fn test_required_columns() {
        assert_eq!(TurnoverStabilityFactor::default().required_columns(), &["turnover"]);
    }

    #[test]
    fn test_non_positive() {
        let values = TurnoverStabilityFactor::default()
            .compute(&panel(&zigzag(20)))
            .unwrap();
        assert!(values[..9].iter().all(|v| v.is_nan()));
        assert!(values[9..].iter().all(|v| *v < 0.0));
    }
}
