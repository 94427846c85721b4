//! Statistical factors - higher moments of returns

pub mod skewness;

pub use skewness::SkewnessFactor;
