//! Core trait definitions for factors.
//!
//! Every factor implements [`Factor`]: it declares the columns it reads and
//! maps a [`Panel`] to one value per row, `NaN` where undefined. Factors with
//! tunable parameters also implement [`ConfigurableFactor`], whose config is
//! parsed from a [`FactorParams`] mapping.

use derive_more::Display;
use hobart_data::Panel;
use serde::Serialize;

use crate::error::Result;
use crate::params::FactorParams;

/// Factor family, used for grouping and listing.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FactorCategory {
    /// Momentum - trend persistence and price position
    Momentum,
    /// Oscillator - bounded overbought/oversold indicators
    Oscillator,
    /// Volatility - dispersion of prices and returns
    Volatility,
    /// Liquidity - volume and turnover based signals
    Liquidity,
    /// Correlation - joint behaviour of price and activity
    Correlation,
    /// Statistical - higher moments of returns
    Statistical,
}

/// A time-series signal computed per asset over a panel.
pub trait Factor: Send + Sync + std::fmt::Debug {
    /// Registry key, snake_case.
    fn name(&self) -> &str;

    /// Human-readable description of what this factor measures.
    fn description(&self) -> &str;

    /// Factor family.
    fn category(&self) -> FactorCategory;

    /// Columns read by [`Self::compute`], besides `asset` and `timestamp`.
    ///
    /// The caller must ensure these columns exist before calling `compute`.
    fn required_columns(&self) -> &[&str];

    /// Compute the raw factor, aligned to the panel's row order.
    ///
    /// Rolling windows never cross asset boundaries. Values are `NaN` during
    /// warm-up and wherever the formula is undefined; no value is infinite.
    fn compute(&self, panel: &Panel) -> Result<Vec<f64>>;
}

/// Configuration of a [`ConfigurableFactor`].
pub trait FactorConfig: Default + Clone + Send + Sync + std::fmt::Debug {
    /// Parse from parameters; absent entries take their defaults.
    fn from_params(params: &FactorParams) -> Result<Self>;
}

/// Factors without parameters use the unit config.
impl FactorConfig for () {
    fn from_params(_params: &FactorParams) -> Result<Self> {
        Ok(())
    }
}

/// A factor that supports runtime configuration.
pub trait ConfigurableFactor: Factor + Sized {
    /// Configuration type for this factor.
    type Config: FactorConfig;

    /// Create a new factor with the given configuration.
    fn with_config(config: Self::Config) -> Self;

    /// Returns the current configuration.
    fn config(&self) -> &Self::Config;

    /// Create a factor from raw parameters.
    fn from_params(params: &FactorParams) -> Result<Self> {
        Ok(Self::with_config(Self::Config::from_params(params)?))
    }
}
