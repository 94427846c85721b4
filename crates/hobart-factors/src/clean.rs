//! Cross-sectional cleaning.
//!
//! Raw factor values are only comparable across assets once they are put on
//! a common footing. [`CrossSectionalCleaner`] does this one timestamp at a
//! time, in a fixed order:
//!
//! 1. impute missing values with the timestamp mean (0 when all are missing);
//! 2. optionally clip to quantile bounds;
//! 3. optionally subtract the mean of each group-key category;
//! 4. optionally standardize to zero mean and unit sample deviation.
//!
//! Timestamps never influence each other.

use hobart_data::{
    Panel,
    columns::{SECTOR, TIMESTAMP},
};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{FactorError, Result};
use crate::expr::per_timestamp;

const INPUT: &str = "__clean_input";

/// Deviation, relative to the root mean square, below which a cross-section
/// is treated as constant.
const CONSTANT_TOLERANCE: f64 = 1e-10;

/// Cleaning toggles and bounds, shared by every factor of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanOptions {
    /// Clamp to the `[clip_lower, clip_upper]` quantiles
    pub clip_outliers: bool,
    /// Subtract per-category means
    pub neutralize: bool,
    /// Scale to zero mean and unit standard deviation
    pub standardize: bool,
    /// Categorical column used by neutralization
    pub group_key: String,
    /// Lower clipping quantile
    pub clip_lower: f64,
    /// Upper clipping quantile
    pub clip_upper: f64,
}

impl Default for CleanOptions {
    fn default() -> Self {
        Self {
            clip_outliers: false,
            neutralize: false,
            standardize: false,
            group_key: SECTOR.to_string(),
            clip_lower: 0.01,
            clip_upper: 0.99,
        }
    }
}

impl CleanOptions {
    /// Check that the clipping quantiles satisfy `0 <= lower <= upper <= 1`.
    pub fn validate(&self) -> Result<()> {
        let ordered = 0.0 <= self.clip_lower
            && self.clip_lower <= self.clip_upper
            && self.clip_upper <= 1.0;
        if !ordered {
            return Err(FactorError::InvalidOptions(format!(
                "clip quantiles must satisfy 0 <= lower <= upper <= 1, got {} and {}",
                self.clip_lower, self.clip_upper
            )));
        }
        Ok(())
    }
}

/// Per-timestamp factor cleaner.
#[derive(Debug, Clone, Default)]
pub struct CrossSectionalCleaner {
    options: CleanOptions,
}

impl CrossSectionalCleaner {
    /// Cleaner applying `options`.
    pub const fn new(options: CleanOptions) -> Self {
        Self { options }
    }

    /// Active options.
    pub const fn options(&self) -> &CleanOptions {
        &self.options
    }

    /// Clean the panel column `column`.
    pub fn process(&self, panel: &Panel, column: &str) -> Result<Vec<f64>> {
        let raw = panel.column_f64(column)?;
        self.process_values(panel, &raw)
    }

    /// Clean a series aligned to the panel's rows.
    ///
    /// # Errors
    ///
    /// Fails on invalid options or when `raw` does not match the panel height.
    pub fn process_values(&self, panel: &Panel, raw: &[f64]) -> Result<Vec<f64>> {
        self.options.validate()?;
        if raw.len() != panel.height() {
            return Err(FactorError::Computation(format!(
                "series has {} values, panel has {} rows",
                raw.len(),
                panel.height()
            )));
        }

        let staged = panel.with_column(INPUT, raw)?;
        let value = col(INPUT);
        let mut frame = staged.lazy().with_column(impute(value.clone()).alias(INPUT));

        if self.options.clip_outliers {
            let clipped = clip(value.clone(), self.options.clip_lower, self.options.clip_upper);
            frame = frame.with_column(clipped.alias(INPUT));
        }
        if self.options.neutralize {
            if staged.has_column(&self.options.group_key) {
                let neutral = neutralize(value.clone(), &self.options.group_key);
                frame = frame.with_column(neutral.alias(INPUT));
            } else {
                debug!(
                    group_key = %self.options.group_key,
                    "group key absent, skipping neutralization"
                );
            }
        }
        if self.options.standardize {
            frame = frame.with_column(standardize(value.clone()).alias(INPUT));
        }

        let out = staged.collect_values(frame, value)?;
        debug!(
            rows = out.len(),
            timestamps = panel.timestamp_groups().len(),
            "cleaned factor"
        );
        Ok(out)
    }
}

/// Missing values take the timestamp mean, or 0 when the whole
/// cross-section is missing.
fn impute(value: Expr) -> Expr {
    value
        .clone()
        .fill_null(per_timestamp(value.mean()))
        .fill_null(lit(0.0))
}

/// Clamp to the `lower`/`upper` quantiles of the timestamp.
fn clip(value: Expr, lower: f64, upper: f64) -> Expr {
    let lo = per_timestamp(value.clone().quantile(lit(lower), QuantileMethod::Linear));
    let hi = per_timestamp(value.clone().quantile(lit(upper), QuantileMethod::Linear));
    when(value.clone().lt(lo.clone()))
        .then(lo)
        .when(value.clone().gt(hi.clone()))
        .then(hi)
        .otherwise(value)
}

/// Subtract the mean of each `group_key` category within the timestamp.
/// Rows without a category are left as is.
fn neutralize(value: Expr, group_key: &str) -> Expr {
    let group_mean = value.clone().mean().over([col(TIMESTAMP), col(group_key)]);
    when(col(group_key).is_null())
        .then(value.clone())
        .otherwise(value - group_mean)
}

/// Zero mean and unit sample deviation per timestamp; all zeros when the
/// deviation is zero or undefined.
fn standardize(value: Expr) -> Expr {
    let mean = per_timestamp(value.clone().mean());
    let std = per_timestamp(value.clone().std(1));
    let rms = per_timestamp((value.clone() * value.clone()).mean().sqrt());
    when(std.clone().gt(rms * lit(CONSTANT_TOLERANCE)))
        .then((value - mean) / std)
        .otherwise(lit(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use polars::prelude::*;

    fn cross_section() -> Panel {
        let frame = df!(
            "asset" => ["A", "B", "C", "D", "A", "B", "C", "D"],
            "timestamp" => [1i64, 1, 1, 1, 2, 2, 2, 2],
            "close" => [1.0; 8],
            "sector" => ["x", "x", "y", "y", "x", "x", "y", "y"],
        )
        .unwrap();
        Panel::new(frame).unwrap()
    }

    /// Clean `values` as a single cross-section of assets `S00`, `S01`, ...
    fn clean(options: CleanOptions, values: &[f64]) -> Vec<f64> {
        let assets: Vec<String> = (0..values.len()).map(|i| format!("S{i:02}")).collect();
        let frame = df!(
            "asset" => assets,
            "timestamp" => vec![1i64; values.len()],
            "close" => vec![1.0; values.len()],
        )
        .unwrap();
        let panel = Panel::new(frame).unwrap();
        CrossSectionalCleaner::new(options)
            .process_values(&panel, values)
            .unwrap()
    }

    fn mean(values: &[f64]) -> f64 {
        values.iter().sum::<f64>() / values.len() as f64
    }

    fn sample_std(values: &[f64]) -> f64 {
        let m = mean(values);
        let square: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
        (square / (values.len() - 1) as f64).sqrt()
    }

    fn by_timestamp(panel: &Panel, values: &[f64]) -> Vec<Vec<f64>> {
        panel
            .timestamp_groups()
            .iter()
            .map(|group| group.rows.iter().map(|&row| values[row]).collect())
            .collect()
    }

    #[test]
    fn test_default_options() {
        let options = CleanOptions::default();
        assert!(!options.clip_outliers && !options.neutralize && !options.standardize);
        assert_eq!(options.group_key, "sector");
        assert_eq!((options.clip_lower, options.clip_upper), (0.01, 0.99));
    }

    #[test]
    fn test_options_from_partial_json() {
        let options: CleanOptions = serde_json::from_str(r#"{"standardize": true}"#).unwrap();
        assert!(options.standardize);
        assert_eq!(options.clip_upper, 0.99);
    }

    #[test]
    fn test_invalid_quantiles() {
        let options = CleanOptions {
            clip_lower: 0.9,
            clip_upper: 0.1,
            ..CleanOptions::default()
        };
        assert!(options.validate().is_err());
    }

    #[test]
    fn test_impute() {
        let cleaned = clean(CleanOptions::default(), &[1.0, f64::NAN, 3.0]);
        assert_eq!(cleaned, vec![1.0, 2.0, 3.0]);

        let missing = clean(CleanOptions::default(), &[f64::NAN, f64::NAN]);
        assert_eq!(missing, vec![0.0, 0.0]);
    }

    #[test]
    fn test_clip_is_idempotent() {
        let values: Vec<f64> = (0..50).map(|i| f64::from(i).powi(3)).collect();
        let clipping = |lower, upper| CleanOptions {
            clip_outliers: true,
            clip_lower: lower,
            clip_upper: upper,
            ..CleanOptions::default()
        };

        let once = clean(clipping(0.05, 0.95), &values);
        assert!(once[0] > values[0] && once[0] < values[3]);
        assert!(once[49] < values[49] && once[49] > values[46]);
        // The clipped values span exactly the bounds, so clamping to their
        // extremes changes nothing.
        assert_eq!(clean(clipping(0.0, 1.0), &once), once);
    }

    #[test]
    fn test_standardize() {
        let standardizing = CleanOptions {
            standardize: true,
            ..CleanOptions::default()
        };

        let values = clean(standardizing.clone(), &[1.0, 2.0, 3.0, 10.0]);
        assert_abs_diff_eq!(mean(&values), 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(sample_std(&values), 1.0, epsilon = 1e-12);

        assert_eq!(clean(standardizing.clone(), &[4.0, 4.0, 4.0]), vec![0.0; 3]);
        assert_eq!(clean(standardizing, &[7.0]), vec![0.0]);
    }

    #[test]
    fn test_process_groups_are_independent() {
        let panel = cross_section();
        let raw = [1.0, 2.0, f64::NAN, f64::INFINITY, 100.0, 200.0, 300.0, 400.0];
        let cleaner = CrossSectionalCleaner::default();
        let cleaned = cleaner.process_values(&panel, &raw).unwrap();

        // Rows are ordered by asset, so timestamp 1 is rows 0, 2, 4, 6.
        assert_abs_diff_eq!(cleaned[2], (1.0 + 100.0 + 300.0) / 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(cleaned[3], (2.0 + 200.0 + 400.0) / 3.0, epsilon = 1e-12);
        assert_eq!(cleaned[4], 100.0);
    }

    #[test]
    fn test_neutralize_sums_to_zero_per_category() {
        let panel = cross_section();
        let raw = [1.0, 5.0, 2.0, 7.0, 3.0, 11.0, 4.0, 13.0];
        let cleaner = CrossSectionalCleaner::new(CleanOptions {
            neutralize: true,
            ..CleanOptions::default()
        });
        let cleaned = cleaner.process_values(&panel, &raw).unwrap();
        let sectors = panel.column_labels("sector").unwrap();

        for group in panel.timestamp_groups() {
            for sector in ["x", "y"] {
                let total: f64 = group
                    .rows
                    .iter()
                    .filter(|&&row| sectors[row].as_deref() == Some(sector))
                    .map(|&row| cleaned[row])
                    .sum();
                assert_abs_diff_eq!(total, 0.0, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_neutralize_without_group_column_is_noop() {
        let frame = df!(
            "asset" => ["A", "B"],
            "timestamp" => [1i64, 1],
            "close" => [1.0, 1.0],
        )
        .unwrap();
        let panel = Panel::new(frame).unwrap();
        let cleaner = CrossSectionalCleaner::new(CleanOptions {
            neutralize: true,
            ..CleanOptions::default()
        });
        assert_eq!(cleaner.process_values(&panel, &[1.0, 3.0]).unwrap(), vec![1.0, 3.0]);
    }

    #[test]
    fn test_full_pipeline_standardizes_each_timestamp() {
        let panel = cross_section();
        let raw = [1.0, 50.0, 2.0, 7.0, f64::NAN, 11.0, 4.0, -13.0];
        let cleaner = CrossSectionalCleaner::new(CleanOptions {
            clip_outliers: true,
            neutralize: true,
            standardize: true,
            ..CleanOptions::default()
        });
        let cleaned = cleaner.process_values(&panel, &raw).unwrap();

        for values in by_timestamp(&panel, &cleaned) {
            assert_abs_diff_eq!(mean(&values), 0.0, epsilon = 1e-12);
            assert_abs_diff_eq!(sample_std(&values), 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_length_mismatch() {
        let panel = cross_section();
        assert!(CrossSectionalCleaner::default()
            .process_values(&panel, &[1.0])
            .is_err());
    }
}
