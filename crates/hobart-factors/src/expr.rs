//! Expression building blocks for the factor library.
//!
//! Factors are polars expressions over panel columns. Time-series parts are
//! wrapped in [`per_asset`] so that shifts and rolling windows restart at
//! every asset; cross-sectional parts use [`per_timestamp`]. Rolling windows
//! are trailing and fixed-length: an incomplete window, or one holding a
//! missing value, is null.
//!
//! A few window statistics have no polars counterpart (position of the
//! extreme, rank of the latest value, mean absolute deviation). They run as
//! plain kernels through [`rolling_kernel`].

use hobart_data::{
    Panel,
    columns::{ASSET, TIMESTAMP},
};
use polars::prelude::*;

use crate::error::Result;

/// Variance, relative to the mean square, below which a window is constant.
const CONSTANT_TOLERANCE: f64 = 1e-12;

const LAG_INPUT: &str = "__lag_input";

/// Numeric column as `f64`, non-finite values as null.
pub fn num(name: &str) -> Expr {
    finite(col(name).cast(DataType::Float64))
}

/// `expr` where finite, null elsewhere.
pub fn finite(expr: Expr) -> Expr {
    when(expr.clone().is_finite())
        .then(expr)
        .otherwise(lit(NULL))
}

/// Evaluate `expr` separately over each asset's history.
pub fn per_asset(expr: Expr) -> Expr {
    expr.over([col(ASSET)])
}

/// Evaluate `expr` separately over each timestamp's cross-section.
pub fn per_timestamp(expr: Expr) -> Expr {
    expr.over([col(TIMESTAMP)])
}

/// Trailing window of `size` rows that needs every row present.
pub fn window(size: usize) -> RollingOptionsFixedWindow {
    RollingOptionsFixedWindow {
        window_size: size,
        min_periods: size,
        ..Default::default()
    }
}

/// `expr[t - n]`.
pub fn lagged(expr: Expr, n: usize) -> Expr {
    expr.shift(lit(n as i64))
}

/// `expr[t + n]`.
pub fn lead(expr: Expr, n: usize) -> Expr {
    expr.shift(lit(-(n as i64)))
}

/// `expr[t] - expr[t - n]`.
pub fn diff(expr: Expr, n: usize) -> Expr {
    expr.clone() - lagged(expr, n)
}

/// `expr[t] / expr[t - n] - 1`, null where not finite.
pub fn pct_change(expr: Expr, n: usize) -> Expr {
    finite(expr.clone() / lagged(expr, n) - lit(1.0))
}

/// Whether the row is the first of its asset. Use inside [`per_asset`].
pub fn first_row() -> Expr {
    col(TIMESTAMP).shift(lit(1)).is_null()
}

/// `numerator / denominator`, null where the denominator is zero.
pub fn ratio(numerator: Expr, denominator: Expr) -> Expr {
    when(denominator.clone().eq(lit(0.0)))
        .then(lit(NULL))
        .otherwise(numerator / denominator)
}

/// Exponential moving average with `alpha = 2 / (span + 1)`.
///
/// Seeded with the first observation, no bias adjustment; missing inputs are
/// skipped.
pub fn ema(expr: Expr, span: usize) -> Expr {
    expr.ewm_mean(EWMOptions {
        alpha: 2.0 / (span as f64 + 1.0),
        adjust: false,
        min_periods: 1,
        ignore_nulls: true,
        ..Default::default()
    })
}

/// Rolling Pearson correlation over rows where both sides are present.
///
/// Null when either window is constant.
pub fn rolling_corr(x: Expr, y: Expr, size: usize) -> Expr {
    let paired = x.clone().is_not_null().and(y.clone().is_not_null());
    let x = when(paired.clone()).then(x).otherwise(lit(NULL));
    let y = when(paired).then(y).otherwise(lit(NULL));

    let mean_x = x.clone().rolling_mean(window(size));
    let mean_y = y.clone().rolling_mean(window(size));
    let square_x = (x.clone() * x.clone()).rolling_mean(window(size));
    let square_y = (y.clone() * y.clone()).rolling_mean(window(size));
    let cross = (x * y).rolling_mean(window(size));

    let var_x = square_x.clone() - mean_x.clone() * mean_x.clone();
    let var_y = square_y.clone() - mean_y.clone() * mean_y.clone();
    let cov = cross - mean_x * mean_y;

    let varying = var_x
        .clone()
        .gt(square_x * lit(CONSTANT_TOLERANCE))
        .and(var_y.clone().gt(square_y * lit(CONSTANT_TOLERANCE)));
    when(varying)
        .then(cov / (var_x * var_y).sqrt())
        .otherwise(lit(NULL))
}

/// Rolling bias-corrected sample skewness.
///
/// Null for constant windows, `NaN` for windows under three rows.
pub fn rolling_skew(expr: Expr, size: usize) -> Expr {
    let n = size as f64;
    let correction = if size < 3 {
        f64::NAN
    } else {
        (n * (n - 1.0)).sqrt() / (n - 2.0)
    };

    let mean = expr.clone().rolling_mean(window(size));
    let square = (expr.clone() * expr.clone()).rolling_mean(window(size));
    let cube = (expr.clone() * expr.clone() * expr).rolling_mean(window(size));

    let m2 = square.clone() - mean.clone() * mean.clone();
    let m3 = cube - lit(3.0) * mean.clone() * square.clone()
        + lit(2.0) * mean.clone() * mean.clone() * mean;

    when(m2.clone().gt(square * lit(CONSTANT_TOLERANCE)))
        .then(lit(correction) * m3 / (m2.clone() * m2.sqrt()))
        .otherwise(lit(NULL))
}

/// Shift `values` forward by `lag` rows within each asset.
///
/// The first `lag` rows of every asset become `NaN`.
pub fn lag_per_asset(panel: &Panel, values: &[f64], lag: usize) -> Result<Vec<f64>> {
    let staged = panel.with_column(LAG_INPUT, values)?;
    Ok(staged.evaluate(per_asset(lagged(col(LAG_INPUT), lag)))?)
}

/// Apply `f` to every complete trailing window of each asset.
///
/// Windows holding a missing value, and non-finite results, give `NaN`.
pub fn rolling_kernel<F>(panel: &Panel, values: &[f64], size: usize, f: F) -> Vec<f64>
where
    F: Fn(&[f64]) -> f64,
{
    let mut out = vec![f64::NAN; values.len()];
    if size == 0 {
        return out;
    }
    for range in panel.asset_ranges() {
        for end in range.start + size..=range.end {
            let slice = &values[end - size..end];
            if slice.iter().all(|v| v.is_finite()) {
                let value = f(slice);
                out[end - 1] = if value.is_finite() { value } else { f64::NAN };
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{multi_asset, panel};
    use approx::assert_relative_eq;
    use hobart_data::columns::{CLOSE, VOLUME};

    fn close(panel: &Panel, expr: impl FnOnce(Expr) -> Expr) -> Vec<f64> {
        panel.evaluate(per_asset(expr(num(CLOSE)))).unwrap()
    }

    fn assert_nan_prefix(values: &[f64], n: usize) {
        assert!(values[..n].iter().all(|v| v.is_nan()), "{values:?}");
        assert!(values[n..].iter().all(|v| !v.is_nan()), "{values:?}");
    }

    #[test]
    fn test_shift_restarts_per_asset() {
        let panel = multi_asset(&[("A", &[1.0, 2.0, 4.0][..]), ("B", &[7.0, 14.0, 21.0][..])]);

        let change = close(&panel, |c| diff(c, 1));
        assert!(change[0].is_nan());
        assert_eq!(change[1..3], [1.0, 2.0]);
        assert!(change[3].is_nan());

        let growth = close(&panel, |c| pct_change(c, 1));
        assert_relative_eq!(growth[4], 1.0);
        assert_relative_eq!(growth[5], 0.5);

        let ahead = close(&panel, |c| lead(c, 1));
        assert_eq!(ahead[1], 4.0);
        assert!(ahead[2].is_nan());
    }

    #[test]
    fn test_first_row() {
        let panel = multi_asset(&[("A", &[1.0, 2.0][..]), ("B", &[3.0, 4.0][..])]);
        let first = panel
            .evaluate(per_asset(first_row()).cast(DataType::Float64))
            .unwrap();
        assert_eq!(first, vec![1.0, 0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_pct_change_zero_base() {
        assert!(close(&panel(&[0.0, 1.0]), |c| pct_change(c, 1))[1].is_nan());
    }

    #[test]
    fn test_rolling_warm_up() {
        let means = close(&panel(&[1.0, 2.0, 3.0, 4.0, 5.0]), |c| {
            c.rolling_mean(window(3))
        });
        assert_nan_prefix(&means, 2);
        assert_relative_eq!(means[4], 4.0);
    }

    #[test]
    fn test_rolling_skips_missing_windows() {
        let sums = close(&panel(&[1.0, f64::NAN, 3.0, 4.0, 5.0]), |c| {
            c.rolling_sum(window(2))
        });
        assert!(sums[1].is_nan());
        assert!(sums[2].is_nan());
        assert_relative_eq!(sums[3], 7.0);
    }

    #[test]
    fn test_rolling_std_and_extremes() {
        let panel = panel(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        let std = close(&panel, |c| c.rolling_std(window(8)));
        assert_relative_eq!(std[7], 2.138_089_935_299_395, epsilon = 1e-12);
        assert_eq!(close(&panel, |c| c.rolling_max(window(3)))[7], 9.0);
        assert_eq!(close(&panel, |c| c.rolling_min(window(3)))[7], 5.0);
    }

    #[test]
    fn test_ema() {
        let ema = close(&panel(&[1.0, 2.0, f64::NAN, 3.0]), |c| ema(c, 3));
        assert_relative_eq!(ema[0], 1.0);
        assert_relative_eq!(ema[1], 1.5);
        assert_relative_eq!(ema[3], 2.25);
    }

    #[test]
    fn test_rolling_corr() {
        let panel = panel(&[1.0, 2.0, 4.0, 3.0, 5.0]);
        let with_double = close(&panel, |c| rolling_corr(c.clone(), c * lit(2.0), 3));
        assert_nan_prefix(&with_double, 2);
        for value in &with_double[2..] {
            assert_relative_eq!(*value, 1.0, epsilon = 1e-9);
        }

        let against_negated = close(&panel, |c| rolling_corr(c.clone(), c * lit(-1.0), 3));
        assert_relative_eq!(against_negated[4], -1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_rolling_corr_constant_window_is_missing() {
        let flat = panel(&[5.0; 6]);
        let corr = flat
            .evaluate(per_asset(rolling_corr(num(CLOSE), num(VOLUME), 3)))
            .unwrap();
        assert!(corr.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn test_rolling_skew() {
        let skew = close(&panel(&[1.0, 2.0, 10.0, 10.0, 10.0]), |c| rolling_skew(c, 3));
        assert_nan_prefix(&skew[..3], 2);
        assert_relative_eq!(skew[2], 1.652_316_740_332_990_8, epsilon = 1e-9);
        // The last window is constant.
        assert!(skew[4].is_nan());
    }

    #[test]
    fn test_lag_per_asset() {
        let panel = multi_asset(&[("A", &[1.0, 2.0, 3.0][..]), ("B", &[4.0, 5.0, 6.0][..])]);
        let lagged = lag_per_asset(&panel, &[10.0, 20.0, 30.0, 40.0, 50.0, 60.0], 1).unwrap();
        assert!(lagged[0].is_nan());
        assert_eq!(lagged[1..3], [10.0, 20.0]);
        assert!(lagged[3].is_nan());
        assert_eq!(lagged[5], 50.0);
    }

    #[test]
    fn test_rolling_kernel_stays_within_assets() {
        let panel = multi_asset(&[("A", &[1.0, 2.0, 3.0][..]), ("B", &[4.0, f64::NAN, 6.0][..])]);
        let values = panel.column_f64(CLOSE).unwrap();
        let sums = rolling_kernel(&panel, &values, 2, |w| w.iter().sum());

        assert!(sums[0].is_nan());
        assert_eq!(sums[1..3], [3.0, 5.0]);
        assert!(sums[3..].iter().all(|v| v.is_nan()));
    }
}
