//! Per-timestamp rank correlation between a factor and forward returns.
//!
//! For each timestamp the rows where both the factor and the return are
//! present are ranked (ties share their average rank) and correlated. A
//! timestamp with fewer than `min_observations` such rows, or with a constant
//! side, yields a missing correlation.

use hobart_data::{Panel, columns::TIMESTAMP};
use hobart_factors::expr::{num, per_timestamp, window};
use polars::prelude::*;
use serde::Serialize;
use tracing::debug;

use crate::error::Result;
use crate::read::{floats, frame_of, integers};

/// Minimum number of paired observations for a correlation.
pub const DEFAULT_MIN_OBSERVATIONS: usize = 5;

const FACTOR_RANK: &str = "__factor_rank";
const RETURN_RANK: &str = "__return_rank";
const PAIRS: &str = "__pairs";
const CORRELATION: &str = "__correlation";

/// One correlation per timestamp, `NaN` where undefined.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationSeries {
    /// Timestamps, ascending
    pub timestamps: Vec<i64>,
    /// Correlation at each timestamp
    pub values: Vec<f64>,
}

/// Aggregate statistics of a [`CorrelationSeries`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CorrelationSummary {
    /// Mean correlation
    pub mean: f64,
    /// Sample standard deviation of the correlations
    pub std: f64,
    /// `mean / std`, 0 when the deviation is zero or undefined
    pub information_ratio: f64,
    /// Positive correlations over all timestamps, missing ones included
    pub win_rate: f64,
    /// Number of defined correlations
    pub observations: usize,
}

impl CorrelationSeries {
    /// Number of timestamps.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the series has no timestamps.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The defined correlations, in timestamp order.
    pub fn valid(&self) -> Vec<f64> {
        self.values.iter().copied().filter(|v| v.is_finite()).collect()
    }

    /// Mean, deviation and ratio over the defined correlations.
    ///
    /// The win rate counts a missing correlation as a timestamp that did not
    /// win.
    pub fn summary(&self) -> CorrelationSummary {
        let valid = Float64Chunked::from_vec("correlation".into(), self.valid());
        let mean = valid.mean().unwrap_or(f64::NAN);
        let std = valid.std(1).unwrap_or(f64::NAN);
        let information_ratio = if std.is_finite() && std > 0.0 { mean / std } else { 0.0 };
        let win_rate = if self.is_empty() {
            f64::NAN
        } else {
            self.values.iter().filter(|v| **v > 0.0).count() as f64 / self.len() as f64
        };

        CorrelationSummary {
            mean,
            std,
            information_ratio,
            win_rate,
            observations: valid.len(),
        }
    }

    /// Trailing mean over `window` timestamps.
    ///
    /// A window holding a missing correlation is missing itself.
    pub fn rolling_mean(&self, window_size: usize) -> Result<Vec<f64>> {
        let out = frame_of(CORRELATION, &self.values)?
            .lazy()
            .select([col(CORRELATION).rolling_mean(window(window_size))])
            .collect()?;
        floats(&out, CORRELATION)
    }
}

/// Spearman correlation per timestamp with the default minimum of five rows.
pub fn rank_correlation_series(
    panel: &Panel,
    factor_column: &str,
    return_column: &str,
) -> Result<CorrelationSeries> {
    rank_correlation_series_with(panel, factor_column, return_column, DEFAULT_MIN_OBSERVATIONS)
}

/// Spearman correlation per timestamp.
pub fn rank_correlation_series_with(
    panel: &Panel,
    factor_column: &str,
    return_column: &str,
    min_observations: usize,
) -> Result<CorrelationSeries> {
    let (factor, returns) = (num(factor_column), num(return_column));
    let paired = factor.clone().is_not_null().and(returns.clone().is_not_null());

    let out = panel
        .lazy()
        .select([
            col(TIMESTAMP).cast(DataType::Int64),
            average_rank(when(paired.clone()).then(factor).otherwise(lit(NULL)))
                .alias(FACTOR_RANK),
            average_rank(when(paired).then(returns).otherwise(lit(NULL))).alias(RETURN_RANK),
        ])
        .group_by([col(TIMESTAMP)])
        .agg([
            col(FACTOR_RANK).count().alias(PAIRS),
            pearson(col(FACTOR_RANK), col(RETURN_RANK)).alias(CORRELATION),
        ])
        .sort([TIMESTAMP], SortMultipleOptions::default())
        .select([
            col(TIMESTAMP),
            when(col(PAIRS).lt(lit(min_observations.max(2) as u32)))
                .then(lit(NULL))
                .otherwise(col(CORRELATION))
                .alias(CORRELATION),
        ])
        .collect()?;

    let series = CorrelationSeries {
        timestamps: integers(&out, TIMESTAMP)?
            .into_iter()
            .map(Option::unwrap_or_default)
            .collect(),
        values: floats(&out, CORRELATION)?,
    };
    debug!(
        factor = factor_column,
        timestamps = series.len(),
        defined = series.valid().len(),
        "computed rank correlations"
    );
    Ok(series)
}

/// Rank within the timestamp, ties sharing their average rank.
fn average_rank(value: Expr) -> Expr {
    per_timestamp(value.rank(
        RankOptions {
            method: RankMethod::Average,
            descending: false,
        },
        None,
    ))
}

/// Pearson correlation as a group aggregate, null when a side is constant.
fn pearson(x: Expr, y: Expr) -> Expr {
    let dx = x.clone() - x.mean();
    let dy = y.clone() - y.mean();
    let sxx = (dx.clone() * dx.clone()).sum();
    let syy = (dy.clone() * dy.clone()).sum();
    let sxy = (dx * dy).sum();

    when(sxx.clone().gt(lit(0.0)).and(syy.clone().gt(lit(0.0))))
        .then(sxy / (sxx * syy).sqrt())
        .otherwise(lit(NULL))
}
