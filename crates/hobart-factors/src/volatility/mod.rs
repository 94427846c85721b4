//! Volatility factors - dispersion of prices and returns

pub mod atr;
pub mod bollinger_width;
pub mod individual_volatility;
pub mod return_std;

pub use atr::AtrFactor;
pub use bollinger_width::BollingerWidthFactor;
pub use individual_volatility::IndividualVolatilityFactor;
pub use return_std::ReturnStdFactor;
