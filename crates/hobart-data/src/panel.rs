//! The asset-by-time panel.
//!
//! A [`Panel`] wraps a polars `DataFrame` holding one row per
//! `(asset, timestamp)`. Construction sorts the frame by asset then timestamp
//! and validates that timestamps are strictly increasing within each asset.
//! Two indices are built once and shared by every clone:
//!
//! - contiguous row ranges per asset;
//! - row groups per distinct timestamp.
//!
//! Computations are expressed as polars expressions and evaluated with
//! [`Panel::evaluate`], which returns one `f64` per row with `NaN` marking
//! missing values. Appended columns are written back with non-finite values
//! as nulls.

use std::ops::Range;
use std::sync::Arc;

use polars::prelude::*;
use tracing::debug;

use crate::columns::{ASSET, REQUIRED, TIMESTAMP};
use crate::error::{DataError, Result};

const ROW: &str = "__row";
const STEP: &str = "__step";
const START: &str = "__start";
const ROWS: &str = "__rows";
const VALUE: &str = "__value";

/// Rows sharing one timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimestampGroup {
    /// Timestamp (physical Int64 value).
    pub timestamp: i64,
    /// Row indices of the group, ascending.
    pub rows: Vec<usize>,
}

#[derive(Debug)]
struct PanelIndex {
    assets: Vec<String>,
    asset_ranges: Vec<Range<usize>>,
    timestamps: Vec<i64>,
    timestamp_groups: Vec<TimestampGroup>,
}

impl PanelIndex {
    /// Index a frame already sorted by asset then timestamp.
    fn build(frame: &DataFrame) -> Result<Self> {
        check_timestamp_type(frame)?;
        for name in [ASSET, TIMESTAMP] {
            if let Some(row) = first_null(frame, name)? {
                return Err(DataError::NullIdentity {
                    column: name.to_string(),
                    row,
                });
            }
        }

        let keys = frame
            .clone()
            .lazy()
            .select([
                col(ASSET).cast(DataType::String),
                col(TIMESTAMP).cast(DataType::Int64),
            ])
            .with_row_index(ROW, None);

        let repeated = keys
            .clone()
            .with_column(
                (col(TIMESTAMP) - col(TIMESTAMP).shift(lit(1)).over([col(ASSET)])).alias(STEP),
            )
            .filter(col(STEP).lt_eq(lit(0)))
            .limit(1)
            .collect()?;
        if repeated.height() > 0 {
            let asset = string_values(&repeated, ASSET)?
                .into_iter()
                .flatten()
                .next()
                .unwrap_or_default();
            let timestamp = int_values(&repeated, TIMESTAMP)?
                .first()
                .copied()
                .unwrap_or_default();
            return Err(DataError::NonChronological { asset, timestamp });
        }

        let per_asset = keys
            .clone()
            .group_by_stable([col(ASSET)])
            .agg([col(ROW).first().alias(START), len().alias(ROWS)])
            .collect()?;
        let assets: Vec<String> = string_values(&per_asset, ASSET)?
            .into_iter()
            .flatten()
            .collect();
        let asset_ranges = index_values(per_asset.column(START)?.as_materialized_series())?
            .into_iter()
            .zip(index_values(per_asset.column(ROWS)?.as_materialized_series())?)
            .map(|(start, rows)| start..start + rows)
            .collect();

        let per_timestamp = keys
            .group_by([col(TIMESTAMP)])
            .agg([col(ROW)])
            .sort([TIMESTAMP], SortMultipleOptions::default())
            .collect()?;
        let stamps = int_values(&per_timestamp, TIMESTAMP)?;
        let lists = per_timestamp.column(ROW)?.as_materialized_series().list()?;
        let mut timestamp_groups = Vec::with_capacity(stamps.len());
        for (timestamp, rows) in stamps.into_iter().zip(lists) {
            let mut rows = match rows {
                Some(rows) => index_values(&rows)?,
                None => Vec::new(),
            };
            rows.sort_unstable();
            timestamp_groups.push(TimestampGroup { timestamp, rows });
        }

        Ok(Self {
            assets,
            asset_ranges,
            timestamps: int_values(frame, TIMESTAMP)?,
            timestamp_groups,
        })
    }
}

/// Validated, immutable asset-by-time table.
#[derive(Debug, Clone)]
pub struct Panel {
    frame: DataFrame,
    index: Arc<PanelIndex>,
}

impl Panel {
    /// Validate and sort a frame into a panel.
    ///
    /// # Errors
    ///
    /// Fails when `asset`, `timestamp` or `close` is missing, when an identity
    /// value is null, when the timestamp column is neither integer nor temporal,
    /// or when an asset has duplicate timestamps.
    pub fn new(frame: DataFrame) -> Result<Self> {
        for name in REQUIRED {
            if frame.get_column_index(name).is_none() {
                return Err(DataError::MissingColumn(name.to_string()));
            }
        }

        let frame = frame
            .lazy()
            .sort([ASSET, TIMESTAMP], SortMultipleOptions::default())
            .collect()?;
        let index = PanelIndex::build(&frame)?;

        debug!(
            rows = frame.height(),
            assets = index.assets.len(),
            timestamps = index.timestamp_groups.len(),
            "validated panel"
        );

        Ok(Self {
            frame,
            index: Arc::new(index),
        })
    }

    /// Underlying frame.
    pub const fn frame(&self) -> &DataFrame {
        &self.frame
    }

    /// Consume the panel, returning its frame.
    pub fn into_frame(self) -> DataFrame {
        self.frame
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.frame.height()
    }

    /// Whether the panel has no rows.
    pub fn is_empty(&self) -> bool {
        self.frame.height() == 0
    }

    /// Whether a column exists.
    pub fn has_column(&self, name: &str) -> bool {
        self.frame.get_column_index(name).is_some()
    }

    /// The subset of `names` absent from the panel.
    pub fn missing_columns(&self, names: &[&str]) -> Vec<String> {
        names
            .iter()
            .filter(|name| !self.has_column(name))
            .map(|name| name.to_string())
            .collect()
    }

    /// Asset identifiers in row order.
    pub fn assets(&self) -> &[String] {
        &self.index.assets
    }

    /// Contiguous row range of each asset, aligned with [`Self::assets`].
    pub fn asset_ranges(&self) -> &[Range<usize>] {
        &self.index.asset_ranges
    }

    /// Timestamp of every row.
    pub fn timestamps(&self) -> &[i64] {
        &self.index.timestamps
    }

    /// Rows grouped by timestamp, ascending.
    pub fn timestamp_groups(&self) -> &[TimestampGroup] {
        &self.index.timestamp_groups
    }

    /// Read a numeric column, with nulls as `NaN`.
    pub fn column_f64(&self, name: &str) -> Result<Vec<f64>> {
        float_values(&self.series(name)?.cast(&DataType::Float64)?)
    }

    /// Read a categorical column as optional labels.
    pub fn column_labels(&self, name: &str) -> Result<Vec<Option<String>>> {
        string_values(&self.frame, name)
    }

    /// Lazy view of the frame, for expression pipelines.
    pub fn lazy(&self) -> LazyFrame {
        self.frame.clone().lazy()
    }

    /// Evaluate `expr` row by row over the panel.
    ///
    /// Nulls and non-finite results come back as `NaN`.
    pub fn evaluate(&self, expr: Expr) -> Result<Vec<f64>> {
        self.collect_values(self.lazy(), expr)
    }

    /// Evaluate `expr` over `frame`, a row-for-row derivation of this panel.
    ///
    /// # Errors
    ///
    /// Fails when the result does not have one value per panel row.
    pub fn collect_values(&self, frame: LazyFrame, expr: Expr) -> Result<Vec<f64>> {
        let out = frame
            .select([expr.cast(DataType::Float64).alias(VALUE)])
            .collect()?;
        if out.height() != self.height() {
            return Err(DataError::LengthMismatch {
                column: VALUE.to_string(),
                expected: self.height(),
                actual: out.height(),
            });
        }
        float_values(out.column(VALUE)?.as_materialized_series())
    }

    /// Return a new panel with `values` appended (or replacing) as `name`.
    ///
    /// Non-finite values are stored as nulls.
    pub fn with_column(&self, name: &str, values: &[f64]) -> Result<Self> {
        if values.len() != self.height() {
            return Err(DataError::LengthMismatch {
                column: name.to_string(),
                expected: self.height(),
                actual: values.len(),
            });
        }

        let values: Vec<Option<f64>> = values
            .iter()
            .map(|value| value.is_finite().then_some(*value))
            .collect();
        let mut frame = self.frame.clone();
        frame.with_column(Column::new(name.into(), values))?;

        Ok(Self {
            frame,
            index: Arc::clone(&self.index),
        })
    }

    /// Keep the rows where `predicate` holds, rebuilding the indices.
    pub fn filter(&self, predicate: Expr) -> Result<Self> {
        Self::new(self.lazy().filter(predicate).collect()?)
    }

    /// Project the panel onto `columns`, in the given order.
    pub fn select(&self, columns: &[&str]) -> Result<DataFrame> {
        Ok(self.frame.select(columns.iter().copied())?)
    }

    fn series(&self, name: &str) -> Result<&Series> {
        self.frame
            .column(name)
            .map(Column::as_materialized_series)
            .map_err(|_| DataError::MissingColumn(name.to_string()))
    }
}

fn string_values(frame: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let series = frame
        .column(name)
        .map_err(|_| DataError::MissingColumn(name.to_string()))?
        .as_materialized_series()
        .cast(&DataType::String)?;

    Ok(series
        .str()?
        .into_iter()
        .map(|value| value.map(str::to_string))
        .collect())
}

fn float_values(series: &Series) -> Result<Vec<f64>> {
    Ok(series
        .f64()?
        .into_iter()
        .map(|value| value.filter(|v| v.is_finite()).unwrap_or(f64::NAN))
        .collect())
}

fn int_values(frame: &DataFrame, name: &str) -> Result<Vec<i64>> {
    let series = frame.column(name)?.as_materialized_series().cast(&DataType::Int64)?;
    Ok(series.i64()?.into_iter().map(Option::unwrap_or_default).collect())
}

fn index_values(series: &Series) -> Result<Vec<usize>> {
    let series = series.cast(&DataType::UInt64)?;
    Ok(series
        .u64()?
        .into_iter()
        .map(|value| value.unwrap_or_default() as usize)
        .collect())
}

fn first_null(frame: &DataFrame, name: &str) -> Result<Option<usize>> {
    let series = frame.column(name)?.as_materialized_series();
    if series.null_count() == 0 {
        return Ok(None);
    }
    Ok(series.is_null().into_iter().position(|null| null == Some(true)))
}

fn check_timestamp_type(frame: &DataFrame) -> Result<()> {
    let dtype = frame
        .column(TIMESTAMP)
        .map_err(|_| DataError::MissingColumn(TIMESTAMP.to_string()))?
        .dtype();
    if !(dtype.is_integer() || dtype.is_temporal()) {
        return Err(DataError::UnsupportedType {
            column: TIMESTAMP.to_string(),
            dtype: dtype.to_string(),
        });
    }
    Ok(())
}
