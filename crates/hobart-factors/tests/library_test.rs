//! Every registered factor against a realistic two-asset panel.

use hobart_data::Panel;
use hobart_factors::expr::lag_per_asset;
use hobart_factors::{FactorParams, FactorRegistry, FactorSpec};
use polars::prelude::*;
use rstest::rstest;

fn ohlcv_panel() -> Panel {
    let n = 60;
    let mut asset = Vec::new();
    let mut timestamp = Vec::new();
    let mut close = Vec::new();
    let mut volume = Vec::new();

    for (name, drift) in [("A", 0.004), ("B", -0.003)] {
        let mut price = 50.0;
        for t in 0..n {
            let wobble = if t % 4 == 0 { -0.012 } else { 0.006 };
            price *= 1.0 + drift + wobble;
            asset.push(name);
            timestamp.push(t as i64);
            close.push(price);
            volume.push(10_000.0 + 500.0 * ((t * 7) % 11) as f64);
        }
    }

    let high: Vec<f64> = close.iter().map(|c| c * 1.02).collect();
    let low: Vec<f64> = close.iter().map(|c| c * 0.97).collect();
    let turnover: Vec<f64> = close.iter().zip(&volume).map(|(c, v)| c * v).collect();

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

#[test]
fn every_default_factor_is_finite_or_missing() {
    let panel = ohlcv_panel();
    let registry = FactorRegistry::with_defaults();

    for name in registry.names() {
        let factor = registry.build(&FactorSpec::new(name)).unwrap();
        assert!(panel.missing_columns(factor.required_columns()).is_empty());

        let values = factor.compute(&panel).unwrap();
        assert_eq!(values.len(), panel.height(), "{name}");
        assert!(values.iter().all(|v| !v.is_infinite()), "{name}");
        assert!(
            values.iter().any(|v| v.is_finite()),
            "{name} produced no values"
        );
    }
}

#[test]
fn compute_does_not_touch_the_panel() {
    let panel = ohlcv_panel();
    let before = panel.frame().clone();
    let registry = FactorRegistry::with_defaults();

    for name in registry.names() {
        registry
            .build(&FactorSpec::new(name))
            .unwrap()
            .compute(&panel)
            .unwrap();
    }
    assert!(panel.frame().equals_missing(&before));
}

#[rstest]
#[case("bias", 5)]
#[case("rsi", 7)]
#[case("cci", 9)]
#[case("williams_r", 4)]
#[case("atr", 3)]
#[case("bollinger_width", 6)]
fn warm_up_is_window_minus_one(#[case] name: &str, #[case] window: usize) {
    let panel = ohlcv_panel();
    let spec = FactorSpec::new(name)
        .with_params(FactorParams::new().with("window", window as f64));
    let values = FactorRegistry::with_defaults()
        .build(&spec)
        .unwrap()
        .compute(&panel)
        .unwrap();

    for range in panel.asset_ranges() {
        let series = &values[range.clone()];
        assert!(series[..window - 1].iter().all(|v| v.is_nan()), "{name}");
        assert!(series[window - 1].is_finite(), "{name}");
    }
}

#[rstest]
#[case(1)]
#[case(3)]
fn lag_shifts_within_each_asset(#[case] lag: usize) {
    let panel = ohlcv_panel();
    let values = FactorRegistry::with_defaults()
        .build(&FactorSpec::new("roc"))
        .unwrap()
        .compute(&panel)
        .unwrap();
    let lagged = lag_per_asset(&panel, &values, lag).unwrap();

    for range in panel.asset_ranges() {
        for row in range.clone() {
            let offset = row - range.start;
            if offset < lag {
                assert!(lagged[row].is_nan());
            } else if values[row - lag].is_nan() {
                assert!(lagged[row].is_nan());
            } else {
                assert_eq!(lagged[row], values[row - lag]);
            }
        }
    }
}
