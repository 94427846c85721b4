//! Correlation factors - joint behaviour of price and trading activity

pub mod capital_gain_overhang;
pub mod ret_turnover_corr;
pub mod volume_price_corr;

pub use capital_gain_overhang::CapitalGainOverhangFactor;
pub use ret_turnover_corr::RetTurnoverCorrFactor;
pub use volume_price_corr::VolumePriceCorrFactor;
