//! Price-volume trend: running sum of `return × volume`.

use hobart_data::{
    Panel,
    columns::{CLOSE, VOLUME},
};
use polars::prelude::*;

use crate::error::Result;
use crate::expr::{num, pct_change, per_asset};
use crate::traits::{ConfigurableFactor, Factor, FactorCategory};

const NAME: &str = "pvt";

/// Price-volume trend
///
/// Missing terms (the first row of each asset) are skipped by the running
/// sum and stay missing themselves.
#[derive(Debug, Clone, Default)]
pub struct PvtFactor;

impl Factor for PvtFactor {
    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        "Cumulative volume-weighted returns"
    }

    fn category(&self) -> FactorCategory {
        FactorCategory::Liquidity
    }

    fn required_columns(&self) -> &[&str] {
        &[CLOSE, VOLUME]
    }

    fn compute(&self, panel: &Panel) -> Result<Vec<f64>> {
        let flow = pct_change(num(CLOSE), 1) * num(VOLUME);
        Ok(panel.evaluate(per_asset(flow.cum_sum(false)))?)
    }
}

impl ConfigurableFactor for PvtFactor {
    type Config = ();

    fn with_config(_config: Self::Config) -> Self {
        Self
    }

    fn config(&self) -> &Self::Config {
        &()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::FactorParams;
    use approx::assert_relative_eq;
    use polars::prelude::*;

    #[test]
    fn test_pvt_skips_missing_terms() {
        let frame = df!(
            "asset" => ["A", "A", "A", "A"],
            "timestamp" => [1i64, 2, 3, 4],
            "close" => [10.0, 11.0, 11.0, 9.9],
            "volume" => [100.0, 200.0, f64::NAN, 50.0],
        )
        .unwrap();
        let panel = Panel::new(frame).unwrap();

        let values = PvtFactor::from_params(&FactorParams::new())
            .unwrap()
            .compute(&panel)
            .unwrap();
        assert!(values[0].is_nan());
        assert_relative_eq!(values[1], 20.0);
        assert!(values[2].is_nan());
        assert_relative_eq!(values[3], 20.0 - 5.0, epsilon = 1e-9);
    }
}
