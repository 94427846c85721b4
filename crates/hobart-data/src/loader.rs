//! CSV ingestion with column harmonization and price repair.
//!
//! Source files name their columns inconsistently (`Close`, `code`, `Vol`,
//! ...). [`harmonize_columns`] renames known aliases onto the canonical
//! names in [`crate::columns`]. [`repair_prices`] then treats zero or
//! non-finite prices and activity values as missing, forward-fills them
//! within each asset and drops rows whose close is still missing.

use std::path::Path;

use polars::prelude::*;
use tracing::{debug, info};

use crate::columns::{
    ACTIVITY, AMOUNT, ASSET, CLOSE, HIGH, LOW, OPEN, PRICES, REQUIRED, TIMESTAMP, TURNOVER, VOLUME,
};
use crate::error::{DataError, Result};
use crate::panel::Panel;

/// Known column aliases, mapped onto canonical names.
const ALIASES: &[(&str, &str)] = &[
    ("date", TIMESTAMP),
    ("Date", TIMESTAMP),
    ("datetime", TIMESTAMP),
    ("time", TIMESTAMP),
    ("Time", TIMESTAMP),
    ("code", ASSET),
    ("Ticker", ASSET),
    ("ticker", ASSET),
    ("symbol", ASSET),
    ("Open", OPEN),
    ("High", HIGH),
    ("Low", LOW),
    ("Close", CLOSE),
    ("Volume", VOLUME),
    ("Vol", VOLUME),
    ("vol", VOLUME),
    ("Turnover", TURNOVER),
    ("Amount", AMOUNT),
    ("Amt", AMOUNT),
];

/// Read a CSV file into a validated panel.
///
/// Dates in the timestamp column are parsed when possible; aliases are
/// harmonized and prices repaired before validation.
pub fn load_csv<P: AsRef<Path>>(path: P) -> Result<Panel> {
    let path = path.as_ref();
    let frame = LazyCsvReader::new(path)
        .with_has_header(true)
        .with_try_parse_dates(true)
        .with_infer_schema_length(Some(10_000))
        .finish()?
        .collect()?;

    info!(path = %path.display(), rows = frame.height(), "loaded panel csv");

    let frame = harmonize_columns(frame)?;
    let frame = repair_prices(frame)?;
    Panel::new(frame)
}

/// Rename known aliases onto canonical column names.
///
/// An alias is only renamed when the canonical column is not already present.
pub fn harmonize_columns(mut frame: DataFrame) -> Result<DataFrame> {
    for (alias, canonical) in ALIASES {
        if frame.get_column_index(alias).is_some() && frame.get_column_index(canonical).is_none() {
            frame.rename(alias, (*canonical).into())?;
            // polars 0.46 `rename` leaves the cached schema stale.
            frame.clear_schema();
            debug!(alias, canonical, "renamed column");
        }
    }
    Ok(frame)
}

/// Replace zero and non-finite prices/activity with the previous valid value
/// of the same asset, then drop rows without a close.
pub fn repair_prices(frame: DataFrame) -> Result<DataFrame> {
    for name in REQUIRED {
        if frame.get_column_index(name).is_none() {
            return Err(DataError::MissingColumn(name.to_string()));
        }
    }

    let repairs: Vec<Expr> = PRICES
        .iter()
        .chain(ACTIVITY.iter())
        .filter(|name| frame.get_column_index(name).is_some())
        .map(|name| {
            let value = col(*name).cast(DataType::Float64);
            when(value.clone().is_finite().and(value.clone().neq(lit(0.0))))
                .then(value)
                .otherwise(lit(NULL))
                .forward_fill(None)
                .over([col(ASSET)])
                .alias(*name)
        })
        .collect();

    let repaired = frame
        .lazy()
        .sort([ASSET, TIMESTAMP], SortMultipleOptions::default())
        .with_columns(repairs)
        .collect()?;

    let before = repaired.height();
    let repaired = repaired
        .lazy()
        .filter(col(CLOSE).is_not_null())
        .collect()?;
    let dropped = before - repaired.height();
    if dropped > 0 {
        info!(dropped, "dropped rows without a usable close");
    }

    Ok(repaired)
}
