//! Momentum factors - trend persistence and price position
//!
//! Signals built from the path of closing prices alone: relative strength,
//! moving-average crossovers, lookback returns and the position of the
//! latest close within its recent range.

pub mod bias;
pub mod efficiency_ratio;
pub mod macd;
pub mod price_rank;
pub mod psy;
pub mod roc;
pub mod rsi;
pub mod ts_momentum;

pub use bias::BiasFactor;
pub use efficiency_ratio::EfficiencyRatioFactor;
pub use macd::MacdFactor;
pub use price_rank::PriceRankFactor;
pub use psy::PsyFactor;
pub use roc::RocFactor;
pub use rsi::RsiFactor;
pub use ts_momentum::TsMomentumFactor;
