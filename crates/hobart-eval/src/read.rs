//! Column readers for collected evaluation frames.

use polars::prelude::*;

use crate::error::Result;

/// Float column with nulls and non-finite values as `NaN`.
pub(crate) fn floats(frame: &DataFrame, name: &str) -> Result<Vec<f64>> {
    let series = frame
        .column(name)?
        .as_materialized_series()
        .cast(&DataType::Float64)?;
    Ok(series
        .f64()?
        .into_iter()
        .map(|value| value.filter(|v| v.is_finite()).unwrap_or(f64::NAN))
        .collect())
}

/// Integer column, nulls kept.
pub(crate) fn integers(frame: &DataFrame, name: &str) -> Result<Vec<Option<i64>>> {
    let series = frame
        .column(name)?
        .as_materialized_series()
        .cast(&DataType::Int64)?;
    Ok(series.i64()?.into_iter().collect())
}

/// Single-column frame of `values`, non-finite values as nulls.
pub(crate) fn frame_of(name: &str, values: &[f64]) -> Result<DataFrame> {
    let values: Vec<Option<f64>> = values
        .iter()
        .map(|value| value.is_finite().then_some(*value))
        .collect();
    Ok(DataFrame::new(vec![Column::new(name.into(), values)])?)
}
