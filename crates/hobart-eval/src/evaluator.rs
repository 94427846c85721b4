//! Factor evaluation reports.

use std::cmp::Ordering;

use hobart_data::Panel;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::buckets::{BucketReturns, quantile_bucket_returns};
use crate::correlation::{CorrelationSummary, rank_correlation_series_with};
use crate::error::{EvalError, Result};

/// Evaluation parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluationConfig {
    /// Forward-return horizon in rows (default: 10)
    pub horizon: usize,
    /// Number of quantile buckets (default: 5)
    pub n_buckets: usize,
    /// Paired rows needed for a per-timestamp correlation (default: 5)
    pub min_observations: usize,
    /// Window of the rolling mean correlation (default: 20)
    pub rolling_window: usize,
    /// Trailing rolling means kept in the report (default: 5)
    pub rolling_tail: usize,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            horizon: 10,
            n_buckets: 5,
            min_observations: 5,
            rolling_window: 20,
            rolling_tail: 5,
        }
    }
}

impl EvaluationConfig {
    /// Check parameter ranges.
    pub fn validate(&self) -> Result<()> {
        if self.horizon < 1 {
            return Err(EvalError::InvalidConfig("horizon must be at least 1".to_string()));
        }
        if self.n_buckets < 2 {
            return Err(EvalError::InvalidConfig(
                "bucket count must be at least 2".to_string(),
            ));
        }
        if self.min_observations < 2 {
            return Err(EvalError::InvalidConfig(
                "min_observations must be at least 2".to_string(),
            ));
        }
        if self.rolling_window < 1 {
            return Err(EvalError::InvalidConfig(
                "rolling_window must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// One evaluated factor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationReport {
    /// Evaluated column
    pub factor: String,
    /// Mean per-timestamp rank correlation
    pub correlation_mean: f64,
    /// Deviation of the per-timestamp rank correlation
    pub correlation_std: f64,
    /// `correlation_mean / correlation_std`, 0 when undefined
    pub information_ratio: f64,
    /// Share of positive correlations
    pub win_rate: f64,
    /// Timestamps with a defined correlation
    pub observations: usize,
    /// Latest rolling means of the correlation, oldest first
    pub rolling_correlation: Vec<f64>,
    /// Mean forward return per bucket, bottom first
    pub bucket_average: Vec<f64>,
    /// Compounded forward return per bucket
    pub bucket_cumulative: Vec<f64>,
    /// Top minus bottom bucket average
    pub long_short: f64,
}

impl EvaluationReport {
    fn new(
        factor: &str,
        summary: CorrelationSummary,
        rolling: Vec<f64>,
        buckets: BucketReturns,
    ) -> Self {
        Self {
            factor: factor.to_string(),
            correlation_mean: summary.mean,
            correlation_std: summary.std,
            information_ratio: summary.information_ratio,
            win_rate: summary.win_rate,
            observations: summary.observations,
            rolling_correlation: rolling,
            long_short: buckets.long_short(),
            bucket_average: buckets.average,
            bucket_cumulative: buckets.cumulative,
        }
    }

    /// Number of buckets.
    pub fn n_buckets(&self) -> usize {
        self.bucket_average.len()
    }
}

/// Evaluates cleaned factor columns against a forward-return column.
#[derive(Debug, Clone, Default)]
pub struct FactorEvaluator {
    config: EvaluationConfig,
}

impl FactorEvaluator {
    /// Evaluator with validated parameters.
    pub fn new(config: EvaluationConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Active parameters.
    pub const fn config(&self) -> &EvaluationConfig {
        &self.config
    }

    /// Rank correlation and bucket analysis of one factor column.
    ///
    /// The panel must already carry `return_column`, see [`crate::prepare`].
    pub fn evaluate(
        &self,
        panel: &Panel,
        factor_column: &str,
        return_column: &str,
    ) -> Result<EvaluationReport> {
        for column in [factor_column, return_column] {
            if !panel.has_column(column) {
                return Err(EvalError::MissingColumn(column.to_string()));
            }
        }

        let series = rank_correlation_series_with(
            panel,
            factor_column,
            return_column,
            self.config.min_observations,
        )?;
        let summary = series.summary();

        let rolling: Vec<f64> = series
            .rolling_mean(self.config.rolling_window)?
            .into_iter()
            .filter(|v| v.is_finite())
            .collect();
        let tail = rolling.len().saturating_sub(self.config.rolling_tail);
        let rolling = rolling[tail..].to_vec();

        let buckets =
            quantile_bucket_returns(panel, factor_column, return_column, self.config.n_buckets)?;

        info!(
            factor = factor_column,
            correlation_mean = summary.mean,
            information_ratio = summary.information_ratio,
            observations = summary.observations,
            long_short = buckets.long_short(),
            "evaluated factor"
        );
        Ok(EvaluationReport::new(factor_column, summary, rolling, buckets))
    }
}

/// Sort by mean correlation, descending; undefined means go last.
pub fn sort_reports(reports: &mut [EvaluationReport]) {
    reports.sort_by(|a, b| {
        match (a.correlation_mean.is_nan(), b.correlation_mean.is_nan()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => b.correlation_mean.total_cmp(&a.correlation_mean),
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::returns::{FORWARD_RETURN, prepare};
    use approx::assert_relative_eq;
    use polars::prelude::*;

    /// Ten assets over six timestamps; asset `i` grows at `i` percent per row
    /// and carries `i` as its factor value.
    fn ranked_panel() -> Panel {
        let mut asset = Vec::new();
        let mut timestamp = Vec::new();
        let mut close = Vec::new();
        let mut signal = Vec::new();
        for i in 0..10 {
            for t in 0..6 {
                asset.push(format!("S{i}"));
                timestamp.push(t as i64);
                close.push(100.0 * (1.0 + i as f64 / 100.0).powi(t));
                signal.push(i as f64);
            }
        }
        let frame = df!(
            "asset" => asset,
            "timestamp" => timestamp,
            "close" => close,
            "alpha_signal" => signal,
        )
        .unwrap();
        Panel::new(frame).unwrap()
    }

    fn report(factor: &str, mean: f64) -> EvaluationReport {
        EvaluationReport {
            factor: factor.to_string(),
            correlation_mean: mean,
            correlation_std: f64::NAN,
            information_ratio: 0.0,
            win_rate: f64::NAN,
            observations: 0,
            rolling_correlation: vec![],
            bucket_average: vec![],
            bucket_cumulative: vec![],
            long_short: f64::NAN,
        }
    }

    #[test]
    fn test_config_validation() {
        assert!(EvaluationConfig::default().validate().is_ok());
        let bad = EvaluationConfig {
            n_buckets: 1,
            ..EvaluationConfig::default()
        };
        assert!(FactorEvaluator::new(bad).is_err());
        let bad = EvaluationConfig {
            horizon: 0,
            ..EvaluationConfig::default()
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_perfect_factor() {
        let panel = prepare(&ranked_panel(), 1).unwrap();
        let evaluator = FactorEvaluator::new(EvaluationConfig {
            horizon: 1,
            n_buckets: 5,
            rolling_window: 2,
            ..EvaluationConfig::default()
        })
        .unwrap();

        let report = evaluator
            .evaluate(&panel, "alpha_signal", FORWARD_RETURN)
            .unwrap();

        assert_relative_eq!(report.correlation_mean, 1.0, epsilon = 1e-12);
        assert_eq!(report.observations, 5);
        assert_relative_eq!(report.win_rate, 1.0);
        // Zero deviation: the ratio falls back to 0.
        assert_eq!(report.information_ratio, 0.0);
        assert_eq!(report.n_buckets(), 5);
        assert!(report.long_short > 0.0);
        assert_eq!(report.rolling_correlation.len(), 4);
        for pair in report.bucket_average.windows(2) {
            assert!(pair[0] < pair[1]);
        }
        // Bucket 0 holds the 0% and 1% assets.
        assert_relative_eq!(report.bucket_average[0], 0.005, epsilon = 1e-12);
        assert_relative_eq!(
            report.bucket_cumulative[0],
            1.005_f64.powi(5) - 1.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_rolling_correlation_breaks_at_missing_timestamps() {
        let panel = ranked_panel();
        let signal: Vec<f64> = panel
            .column_f64("alpha_signal")
            .unwrap()
            .into_iter()
            .zip(panel.timestamps())
            .map(|(value, t)| if *t == 2 { f64::NAN } else { value })
            .collect();
        let panel = prepare(&panel.with_column("alpha_signal", &signal).unwrap(), 1).unwrap();

        let report = FactorEvaluator::new(EvaluationConfig {
            horizon: 1,
            rolling_window: 2,
            ..EvaluationConfig::default()
        })
        .unwrap()
        .evaluate(&panel, "alpha_signal", FORWARD_RETURN)
        .unwrap();

        // Correlations at 0, 1, 3, 4: only the windows ending at 1 and 4 are whole.
        assert_eq!(report.observations, 4);
        assert_relative_eq!(report.win_rate, 0.8);
        assert_eq!(report.rolling_correlation.len(), 2);
    }

    #[test]
    fn test_missing_column() {
        let panel = ranked_panel();
        assert!(matches!(
            FactorEvaluator::default().evaluate(&panel, "alpha_signal", FORWARD_RETURN),
            Err(EvalError::MissingColumn(name)) if name == FORWARD_RETURN
        ));
    }

    #[test]
    fn test_sort_reports() {
        let mut reports = vec![
            report("a", 0.01),
            report("b", f64::NAN),
            report("c", 0.05),
            report("d", -0.02),
        ];
        sort_reports(&mut reports);
        let order: Vec<&str> = reports.iter().map(|r| r.factor.as_str()).collect();
        assert_eq!(order, vec!["c", "a", "d", "b"]);
    }
}
