//! Quantile-bucket returns.
//!
//! Each timestamp's factor values are split into equal-count buckets at the
//! quantiles `i / n` (linear interpolation). Identical edges collapse, so a
//! timestamp with many ties gets fewer buckets, labelled `0..k`. A timestamp
//! with fewer than two distinct edges is not bucketed at all.

use hobart_data::{Panel, columns::TIMESTAMP};
use hobart_factors::expr::{num, per_timestamp};
use polars::prelude::*;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{EvalError, Result};
use crate::read::{floats, frame_of, integers};

const FACTOR: &str = "__factor";
const RETURN: &str = "__return";
const BUCKET: &str = "__bucket";
const MEAN_RETURN: &str = "__mean_return";
const AVERAGE: &str = "__average";
const CUMULATIVE: &str = "__cumulative";
const PERIODS: &str = "__periods";

/// Per-bucket forward return statistics across timestamps.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BucketReturns {
    /// Mean across timestamps of each bucket's mean forward return
    pub average: Vec<f64>,
    /// Compounded bucket returns, `Π(1 + mean) - 1` across timestamps
    pub cumulative: Vec<f64>,
    /// Timestamps that could be bucketed
    pub periods: usize,
}

impl BucketReturns {
    /// Top bucket minus bottom bucket average return.
    pub fn long_short(&self) -> f64 {
        match (self.average.first(), self.average.last()) {
            (Some(bottom), Some(top)) => top - bottom,
            _ => f64::NAN,
        }
    }

    /// Whether no bucket holds any data.
    pub fn is_empty(&self) -> bool {
        self.average.iter().all(|v| v.is_nan())
    }
}

/// Bucket label of `value` within the cross-section `section` selects.
///
/// Buckets are `(e[j-1], e[j]]` over the distinct edges, the first one closed
/// on the left. Null for missing values and for cross-sections with fewer
/// than two distinct edges.
fn bucket_label(value: Expr, n_buckets: usize, section: fn(Expr) -> Expr) -> Expr {
    let edges: Vec<Expr> = (0..=n_buckets)
        .map(|i| {
            let q = i as f64 / n_buckets as f64;
            section(value.clone().quantile(lit(q), QuantileMethod::Linear))
        })
        .collect();

    let mut distinct = lit(0i32);
    let mut below = lit(0i32);
    for pair in edges.windows(2) {
        let new_edge = pair[1].clone().neq(pair[0].clone());
        distinct = distinct + new_edge.clone().cast(DataType::Int32);
        below = below + new_edge.and(pair[1].clone().lt(value.clone())).cast(DataType::Int32);
    }

    when(value.is_null().or(distinct.clone().eq(lit(0i32))))
        .then(lit(NULL))
        .when(below.clone().gt_eq(distinct.clone()))
        .then(distinct - lit(1i32))
        .otherwise(below)
}

/// Bucket label of every value, `None` for missing values.
///
/// All labels are `None` when the values have fewer than two distinct
/// quantile edges.
pub fn assign_buckets(values: &[f64], n_buckets: usize) -> Result<Vec<Option<usize>>> {
    if n_buckets == 0 {
        return Ok(vec![None; values.len()]);
    }
    let out = frame_of(FACTOR, values)?
        .lazy()
        .select([bucket_label(col(FACTOR), n_buckets, |whole| whole).alias(BUCKET)])
        .collect()?;
    Ok(integers(&out, BUCKET)?
        .into_iter()
        .map(|label| label.map(|label| label as usize))
        .collect())
}

/// Average and cumulative forward return per bucket.
pub fn quantile_bucket_returns(
    panel: &Panel,
    factor_column: &str,
    return_column: &str,
    n_buckets: usize,
) -> Result<BucketReturns> {
    if n_buckets < 2 {
        return Err(EvalError::InvalidConfig(format!(
            "bucket count must be at least 2, got {n_buckets}"
        )));
    }

    let (factor, returns) = (num(factor_column), num(return_column));
    let paired = factor.clone().is_not_null().and(returns.clone().is_not_null());
    let bucketed = panel
        .lazy()
        .select([
            col(TIMESTAMP),
            when(paired.clone()).then(factor).otherwise(lit(NULL)).alias(FACTOR),
            when(paired).then(returns).otherwise(lit(NULL)).alias(RETURN),
        ])
        .with_column(bucket_label(col(FACTOR), n_buckets, per_timestamp).alias(BUCKET))
        .filter(col(BUCKET).is_not_null());

    let periods = bucketed
        .clone()
        .select([col(TIMESTAMP).n_unique().alias(PERIODS)])
        .collect()?;
    let periods = integers(&periods, PERIODS)?
        .first()
        .copied()
        .flatten()
        .unwrap_or_default() as usize;

    let per_bucket = bucketed
        .group_by([col(TIMESTAMP), col(BUCKET)])
        .agg([col(RETURN).mean().alias(MEAN_RETURN)])
        .group_by([col(BUCKET)])
        .agg([
            col(MEAN_RETURN).mean().alias(AVERAGE),
            ((lit(1.0) + col(MEAN_RETURN)).product() - lit(1.0)).alias(CUMULATIVE),
        ])
        .collect()?;

    let mut average = vec![f64::NAN; n_buckets];
    let mut cumulative = vec![f64::NAN; n_buckets];
    let labels = integers(&per_bucket, BUCKET)?;
    let means = floats(&per_bucket, AVERAGE)?;
    let compounded = floats(&per_bucket, CUMULATIVE)?;
    for ((label, mean), total) in labels.into_iter().zip(means).zip(compounded) {
        if let Some(label) = label {
            average[label as usize] = mean;
            cumulative[label as usize] = total;
        }
    }

    if periods == 0 {
        warn!(factor = factor_column, "no timestamp could be bucketed");
    } else {
        debug!(factor = factor_column, periods, "bucketed factor");
    }

    Ok(BucketReturns {
        average,
        cumulative,
        periods,
    })
}
