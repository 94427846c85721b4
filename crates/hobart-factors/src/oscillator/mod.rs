//! Oscillator factors - bounded overbought/oversold indicators

pub mod aroon;
pub mod cci;
pub mod williams_r;

pub use aroon::AroonFactor;
pub use cci::CciFactor;
pub use williams_r::WilliamsRFactor;
