//! Factor parameters and descriptors.
//!
//! [`FactorParams`] is an ordered name → number mapping. Order matters: the
//! parameter values, in insertion order, form the suffix of the factor's
//! output column, so `{"fast": 5, "slow": 10}` yields `factor_macd_5_10`.
//! Deserialization keeps the order of the JSON object.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{FactorError, Result};

/// Ordered numeric parameters of a factor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FactorParams {
    entries: Vec<(String, f64)>,
}

impl FactorParams {
    /// Empty parameter set.
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Builder form of [`Self::insert`].
    pub fn with(mut self, name: impl Into<String>, value: f64) -> Self {
        self.insert(name, value);
        self
    }

    /// Set a parameter. An existing entry keeps its position.
    pub fn insert(&mut self, name: impl Into<String>, value: f64) {
        let name = name.into();
        match self.entries.iter_mut().find(|(key, _)| *key == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Look up a parameter.
    pub fn get(&self, name: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| *value)
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), *value))
    }

    /// Number of parameters.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no parameter is set.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Read a window length, falling back to `default` when absent.
    ///
    /// # Errors
    ///
    /// The value must be a positive integer.
    pub fn window(&self, factor: &str, name: &str, default: usize) -> Result<usize> {
        let Some(value) = self.get(name) else {
            return Ok(default);
        };

        if !value.is_finite() || value < 1.0 || value.fract() != 0.0 {
            return Err(FactorError::InvalidParameter {
                factor: factor.to_string(),
                name: name.to_string(),
                value,
                reason: "must be a positive integer".to_string(),
            });
        }
        Ok(value as usize)
    }

    /// Read a real-valued parameter, falling back to `default` when absent.
    ///
    /// # Errors
    ///
    /// The value must be finite.
    pub fn number(&self, factor: &str, name: &str, default: f64) -> Result<f64> {
        match self.get(name) {
            None => Ok(default),
            Some(value) if value.is_finite() => Ok(value),
            Some(value) => Err(FactorError::InvalidParameter {
                factor: factor.to_string(),
                name: name.to_string(),
                value,
                reason: "must be finite".to_string(),
            }),
        }
    }

    /// Column-name suffix: `_v1_v2...` in insertion order, empty when no
    /// parameter is set.
    pub fn suffix(&self) -> String {
        self.entries
            .iter()
            .map(|(_, value)| format!("_{}", format_value(*value)))
            .collect()
    }
}

fn format_value(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for FactorParams {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (name, value) in iter {
            params.insert(name, value);
        }
        params
    }
}

impl Serialize for FactorParams {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for FactorParams {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct ParamsVisitor;

        impl<'de> Visitor<'de> for ParamsVisitor {
            type Value = FactorParams;

            fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                formatter.write_str("a map of parameter names to numbers")
            }

            fn visit_map<A: MapAccess<'de>>(
                self,
                mut access: A,
            ) -> std::result::Result<Self::Value, A::Error> {
                let mut params = FactorParams::new();
                while let Some((name, value)) = access.next_entry::<String, f64>()? {
                    params.insert(name, value);
                }
                Ok(params)
            }
        }

        deserializer.deserialize_map(ParamsVisitor)
    }
}

/// A factor descriptor: registry name, parameters and lag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorSpec {
    /// Registry key
    pub name: String,
    /// Constructor parameters
    #[serde(default)]
    pub params: FactorParams,
    /// Rows to shift the raw factor forward within each asset
    #[serde(default, alias = "shift")]
    pub lag: usize,
}

impl FactorSpec {
    /// Descriptor with default parameters and no lag.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: FactorParams::new(),
            lag: 0,
        }
    }

    /// Replace the parameters.
    pub fn with_params(mut self, params: FactorParams) -> Self {
        self.params = params;
        self
    }

    /// Set the lag.
    pub const fn with_lag(mut self, lag: usize) -> Self {
        self.lag = lag;
        self
    }

    /// Name plus parameter suffix, e.g. `rsi_6`.
    pub fn label(&self) -> String {
        format!("{}{}", self.name, self.params.suffix())
    }

    /// Raw output column, e.g. `factor_rsi_6`.
    pub fn column_name(&self) -> String {
        format!("factor_{}", self.label())
    }

    /// Cleaned output column, e.g. `alpha_rsi_6`.
    pub fn alpha_name(&self) -> String {
        format!("alpha_{}", self.label())
    }
}

impl fmt::Display for FactorSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())?;
        if self.lag > 0 {
            write!(f, " (lag {})", self.lag)?;
        }
        Ok(())
    }
}
