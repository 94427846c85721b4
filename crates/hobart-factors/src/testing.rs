//! Panel fixtures shared by the factor unit tests.

use hobart_data::Panel;
use polars::prelude::*;

/// One asset `A` with the given closes and derived OHLCV columns.
pub(crate) fn panel(close: &[f64]) -> Panel {
    multi_asset(&[("A", close)])
}

/// Several assets; each gets `high = 1.01·close`, `low = 0.99·close`, a
/// slowly rising volume and `turnover = close·volume`.
pub(crate) fn multi_asset(assets: &[(&str, &[f64])]) -> Panel {
    let mut asset = Vec::new();
    let mut timestamp = Vec::new();
    let mut close = Vec::new();
    let mut high = Vec::new();
    let mut low = Vec::new();
    let mut volume = Vec::new();
    let mut turnover = Vec::new();

    for (name, closes) in assets {
        for (t, c) in closes.iter().enumerate() {
            let v = 1_000.0 + 10.0 * t as f64 + if t % 2 == 0 { 50.0 } else { 0.0 };
            asset.push(name.to_string());
            timestamp.push(t as i64);
            close.push(*c);
            high.push(c * 1.01);
            low.push(c * 0.99);
            volume.push(v);
            turnover.push(c * v);
        }
    }

    let frame = df!(
        "asset" => asset,
        "timestamp" => timestamp,
        "open" => close.clone(),
        "high" => high,
        "low" => low,
        "close" => close,
        "volume" => volume,
        "turnover" => turnover,
    )
    .unwrap();
    Panel::new(frame).unwrap()
}

/// A zig-zag upward price path of length `n`.
pub(crate) fn zigzag(n: usize) -> Vec<f64> {
    (0..n)
        .map(|t| 100.0 + t as f64 + if t % 3 == 0 { -2.0 } else { 1.5 })
        .collect()
}

/// A constant price path.
pub(crate) fn flat(n: usize) -> Vec<f64> {
    vec![50.0; n]
}

pub(crate) fn leading_nan(values: &[f64]) -> usize {
    values.iter().take_while(|v| v.is_nan()).count()
}
