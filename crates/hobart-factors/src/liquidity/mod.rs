//! Liquidity factors - volume and turnover based signals
//!
//! These factors weigh price moves by trading activity or measure the
//! activity itself. Most read `volume`; turnover stability reads `turnover`.

pub mod amihud;
pub mod mfi;
pub mod pvt;
pub mod turnover_stability;
pub mod volume_ratio;
pub mod vwap_bias;

pub use amihud::AmihudFactor;
pub use mfi::MfiFactor;
pub use pvt::PvtFactor;
pub use turnover_stability::TurnoverStabilityFactor;
pub use volume_ratio::VolumeRatioFactor;
pub use vwap_bias::VwapBiasFactor;
