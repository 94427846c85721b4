//! Factor Registry
//!
//! Maps factor names to constructors. A constructor takes a
//! [`FactorParams`] mapping and returns a fresh boxed [`Factor`]; each
//! [`FactorSpec`] gets its own instance.
//!
//! Names are case-sensitive. The default registry also answers to the
//! mixed-case names common in factor configurations (`RSI`, `TSMOM`,
//! `Boll_Width`, ...) through aliases.
//!
//! The registry is a plain value: build it once with
//! [`FactorRegistry::with_defaults`], extend it with [`FactorRegistry::register`]
//! and pass it by reference.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::correlation::{CapitalGainOverhangFactor, RetTurnoverCorrFactor, VolumePriceCorrFactor};
use crate::error::{FactorError, Result};
use crate::liquidity::{
    AmihudFactor, MfiFactor, PvtFactor, TurnoverStabilityFactor, VolumeRatioFactor, VwapBiasFactor,
};
use crate::momentum::{
    BiasFactor, EfficiencyRatioFactor, MacdFactor, PriceRankFactor, PsyFactor, RocFactor,
    RsiFactor, TsMomentumFactor,
};
use crate::oscillator::{AroonFactor, CciFactor, WilliamsRFactor};
use crate::params::{FactorParams, FactorSpec};
use crate::statistical::SkewnessFactor;
use crate::traits::{ConfigurableFactor, Factor, FactorCategory};
use crate::volatility::{
    AtrFactor, BollingerWidthFactor, IndividualVolatilityFactor, ReturnStdFactor,
};

/// Builds a factor from its parameters.
pub type FactorConstructor = Arc<dyn Fn(&FactorParams) -> Result<Box<dyn Factor>> + Send + Sync>;

/// Factor metadata
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FactorInfo {
    /// Registry key
    pub name: String,
    /// Factor category
    pub category: FactorCategory,
    /// Brief description of what the factor measures
    pub description: String,
    /// Panel columns the factor reads
    pub required_columns: Vec<String>,
}

/// Name → constructor table.
#[derive(Clone, Default)]
pub struct FactorRegistry {
    constructors: HashMap<String, FactorConstructor>,
    aliases: HashMap<String, String>,
}

impl fmt::Debug for FactorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FactorRegistry")
            .field("names", &self.names())
            .finish()
    }
}

impl FactorRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every factor of the library.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();

        // Momentum
        registry.register_factor::<RsiFactor>("rsi");
        registry.register_factor::<MacdFactor>("macd");
        registry.register_factor::<TsMomentumFactor>("ts_momentum");
        registry.register_factor::<RocFactor>("roc");
        registry.register_factor::<BiasFactor>("bias");
        registry.register_factor::<PsyFactor>("psy");
        registry.register_factor::<EfficiencyRatioFactor>("efficiency_ratio");
        registry.register_factor::<PriceRankFactor>("price_rank");

        // Oscillators
        registry.register_factor::<CciFactor>("cci");
        registry.register_factor::<WilliamsRFactor>("williams_r");
        registry.register_factor::<AroonFactor>("aroon");

        // Volatility
        registry.register_factor::<AtrFactor>("atr");
        registry.register_factor::<BollingerWidthFactor>("bollinger_width");
        registry.register_factor::<ReturnStdFactor>("return_std");
        registry.register_factor::<IndividualVolatilityFactor>("individual_volatility");

        // Liquidity
        registry.register_factor::<PvtFactor>("pvt");
        registry.register_factor::<MfiFactor>("mfi");
        registry.register_factor::<AmihudFactor>("amihud");
        registry.register_factor::<VwapBiasFactor>("vwap_bias");
        registry.register_factor::<VolumeRatioFactor>("volume_ratio");
        registry.register_factor::<TurnoverStabilityFactor>("turnover_stability");

        // Correlation
        registry.register_factor::<VolumePriceCorrFactor>("volume_price_corr");
        registry.register_factor::<RetTurnoverCorrFactor>("ret_turnover_corr");
        registry.register_factor::<CapitalGainOverhangFactor>("capital_gain_overhang");

        // Statistical
        registry.register_factor::<SkewnessFactor>("skewness");

        for (alias, name) in [
            ("RSI", "rsi"),
            ("MACD", "macd"),
            ("TSMOM", "ts_momentum"),
            ("ROC", "roc"),
            ("BIAS", "bias"),
            ("PSY", "psy"),
            ("ER", "efficiency_ratio"),
            ("PriceRank", "price_rank"),
            ("CCI", "cci"),
            ("WilliamsR", "williams_r"),
            ("Aroon", "aroon"),
            ("ATR", "atr"),
            ("Boll_Width", "bollinger_width"),
            ("Return_Std", "return_std"),
            ("Individual_VOL", "individual_volatility"),
            ("PVT", "pvt"),
            ("MFI", "mfi"),
            ("Amihud", "amihud"),
            ("VWAP_Bias", "vwap_bias"),
            ("VR", "volume_ratio"),
            ("Turnover_Stability", "turnover_stability"),
            ("Volume_Price_Corr", "volume_price_corr"),
            ("Ret_Turnover_Corr", "ret_turnover_corr"),
            ("Capital_Gain_Overhang", "capital_gain_overhang"),
            ("Skewness", "skewness"),
        ] {
            registry.alias(alias, name);
        }

        registry
    }

    /// Associate `name` with a constructor. An existing entry is replaced.
    pub fn register<F>(&mut self, name: impl Into<String>, constructor: F)
    where
        F: Fn(&FactorParams) -> Result<Box<dyn Factor>> + Send + Sync + 'static,
    {
        let name = name.into();
        if self
            .constructors
            .insert(name.clone(), Arc::new(constructor))
            .is_some()
        {
            debug!(factor = %name, "replaced registered factor");
        }
    }

    /// Register a [`ConfigurableFactor`] under `name`.
    pub fn register_factor<T>(&mut self, name: impl Into<String>)
    where
        T: ConfigurableFactor + 'static,
    {
        self.register(name, |params| {
            let factor: Box<dyn Factor> = Box::new(T::from_params(params)?);
            Ok(factor)
        });
    }

    /// Let `alias` stand for the factor registered as `name`.
    ///
    /// Aliases are not listed by [`Self::names`] or [`Self::info`]. A
    /// registered name always wins over an alias of the same spelling.
    pub fn alias(&mut self, alias: impl Into<String>, name: impl Into<String>) {
        self.aliases.insert(alias.into(), name.into());
    }

    /// The registered name `name` refers to, following aliases.
    pub fn resolve<'a>(&'a self, name: &'a str) -> Option<&'a str> {
        if self.constructors.contains_key(name) {
            return Some(name);
        }
        self.aliases
            .get(name)
            .map(String::as_str)
            .filter(|target| self.constructors.contains_key(*target))
    }

    /// Constructor registered under `name` or one of its aliases.
    pub fn lookup(&self, name: &str) -> Option<&FactorConstructor> {
        self.resolve(name).and_then(|name| self.constructors.get(name))
    }

    /// Whether `name` is registered or an alias of a registered factor.
    pub fn contains(&self, name: &str) -> bool {
        self.resolve(name).is_some()
    }

    /// Instantiate the factor a descriptor names.
    ///
    /// # Errors
    ///
    /// [`FactorError::UnknownFactor`] when the name is not registered, or the
    /// constructor's error for invalid parameters.
    pub fn build(&self, spec: &FactorSpec) -> Result<Box<dyn Factor>> {
        let constructor = self
            .lookup(&spec.name)
            .ok_or_else(|| FactorError::UnknownFactor(spec.name.clone()))?;
        constructor(&spec.params)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.constructors.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of registered factors.
    pub fn len(&self) -> usize {
        self.constructors.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.constructors.is_empty()
    }

    /// Metadata of every factor constructible with default parameters,
    /// sorted by name.
    pub fn info(&self) -> Vec<FactorInfo> {
        self.names()
            .into_iter()
            .filter_map(|name| {
                let factor = self.build(&FactorSpec::new(name)).ok()?;
                Some(FactorInfo {
                    name: name.to_string(),
                    category: factor.category(),
                    description: factor.description().to_string(),
                    required_columns: factor
                        .required_columns()
                        .iter()
                        .map(|column| column.to_string())
                        .collect(),
                })
            })
            .collect()
    }

    /// Metadata of the factors in one category.
    pub fn info_by_category(&self, category: FactorCategory) -> Vec<FactorInfo> {
        self.info()
            .into_iter()
            .filter(|info| info.category == category)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_defaults() {
        let registry = FactorRegistry::with_defaults();
        assert_eq!(registry.len(), 25);
        assert!(registry.contains("rsi"));
        assert!(registry.lookup("nope").is_none());
    }

    #[test]
    fn test_names_sorted() {
        let registry = FactorRegistry::with_defaults();
        let names = registry.names();
        let mut sorted = names.clone();
        sorted.sort_unstable();
        assert_eq!(names, sorted);
    }

    #[test]
    fn test_registered_name_matches_factor_name() {
        let registry = FactorRegistry::with_defaults();
        for info in registry.info() {
            let factor = registry.build(&FactorSpec::new(info.name.clone())).unwrap();
            assert_eq!(factor.name(), info.name);
        }
    }

    #[rstest]
    #[case("RSI", "rsi")]
    #[case("TSMOM", "ts_momentum")]
    #[case("ER", "efficiency_ratio")]
    #[case("Boll_Width", "bollinger_width")]
    #[case("VR", "volume_ratio")]
    #[case("Individual_VOL", "individual_volatility")]
    #[case("PVT", "pvt")]
    fn test_aliases_build_the_named_factor(#[case] alias: &str, #[case] name: &str) {
        let registry = FactorRegistry::with_defaults();
        assert_eq!(registry.resolve(alias), Some(name));
        let factor = registry.build(&FactorSpec::new(alias)).unwrap();
        assert_eq!(factor.name(), name);
    }

    #[test]
    fn test_aliases_are_not_listed() {
        let registry = FactorRegistry::with_defaults();
        assert!(registry.contains("MACD"));
        assert!(!registry.names().contains(&"MACD"));
        assert_eq!(registry.info().len(), 25);
        assert!(!registry.contains("rsI"));
    }

    #[test]
    fn test_alias_to_missing_factor() {
        let mut registry = FactorRegistry::new();
        registry.alias("RSI", "rsi");
        assert_eq!(registry.resolve("RSI"), None);
        assert!(matches!(
            registry.build(&FactorSpec::new("RSI")),
            Err(FactorError::UnknownFactor(name)) if name == "RSI"
        ));
    }

    #[test]
    fn test_build_unknown() {
        let registry = FactorRegistry::new();
        assert!(registry.is_empty());
        assert!(matches!(
            registry.build(&FactorSpec::new("rsi")),
            Err(FactorError::UnknownFactor(name)) if name == "rsi"
        ));
    }

    #[test]
    fn test_build_invalid_params() {
        let registry = FactorRegistry::with_defaults();
        let spec = FactorSpec::new("rsi").with_params(FactorParams::new().with("window", 0.0));
        assert!(matches!(
            registry.build(&spec),
            Err(FactorError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_register_overwrites() {
        let mut registry = FactorRegistry::new();
        registry.register_factor::<RsiFactor>("signal");
        registry.register_factor::<RocFactor>("signal");

        assert_eq!(registry.len(), 1);
        let factor = registry.build(&FactorSpec::new("signal")).unwrap();
        assert_eq!(factor.name(), "roc");
    }

    #[test]
    fn test_info_by_category() {
        let registry = FactorRegistry::with_defaults();
        let oscillators: Vec<String> = registry
            .info_by_category(FactorCategory::Oscillator)
            .into_iter()
            .map(|info| info.name)
            .collect();
        assert_eq!(oscillators, vec!["aroon", "cci", "williams_r"]);
    }
}
