//! Forward returns.

use hobart_data::{Panel, columns::CLOSE};
use hobart_factors::expr::{finite, lead, num, per_asset};
use polars::prelude::*;
use tracing::debug;

use crate::error::{EvalError, Result};

/// Column appended by [`prepare`].
pub const FORWARD_RETURN: &str = "forward_return";

fn forward_return(horizon: usize) -> Result<Expr> {
    if horizon == 0 {
        return Err(EvalError::InvalidConfig("horizon must be at least 1".to_string()));
    }
    let close = num(CLOSE);
    Ok(per_asset(finite(lead(close.clone(), horizon) / close - lit(1.0))))
}

/// `close[t + horizon] / close[t] - 1` within each asset.
///
/// The last `horizon` rows of every asset have no future close and are
/// `NaN`, as is any non-finite ratio.
pub fn forward_returns(panel: &Panel, horizon: usize) -> Result<Vec<f64>> {
    Ok(panel.evaluate(forward_return(horizon)?)?)
}

/// Append [`FORWARD_RETURN`] and drop rows where it is undefined.
pub fn prepare(panel: &Panel, horizon: usize) -> Result<Panel> {
    let frame = panel
        .lazy()
        .with_column(forward_return(horizon)?.alias(FORWARD_RETURN))
        .filter(col(FORWARD_RETURN).is_not_null())
        .collect()?;
    let prepared = Panel::new(frame)?;

    debug!(
        horizon,
        kept = prepared.height(),
        dropped = panel.height() - prepared.height(),
        "prepared forward returns"
    );
    Ok(prepared)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn two_assets() -> Panel {
        let frame = df!(
            "asset" => ["A", "A", "A", "B", "B", "B"],
            "timestamp" => [1i64, 2, 3, 1, 2, 3],
            "close" => [10.0, 11.0, 12.1, 20.0, 18.0, 0.0],
        )
        .unwrap();
        Panel::new(frame).unwrap()
    }

    #[test]
    fn test_forward_returns() {
        let returns = forward_returns(&two_assets(), 1).unwrap();
        assert_relative_eq!(returns[0], 0.1, epsilon = 1e-12);
        assert_relative_eq!(returns[1], 0.1, epsilon = 1e-12);
        assert!(returns[2].is_nan());
        assert_relative_eq!(returns[3], -0.1, epsilon = 1e-12);
        assert_relative_eq!(returns[4], -1.0);
        assert!(returns[5].is_nan());
    }

    #[test]
    fn test_zero_horizon_rejected() {
        assert!(matches!(
            forward_returns(&two_assets(), 0),
            Err(EvalError::InvalidConfig(_))
        ));
        assert!(prepare(&two_assets(), 0).is_err());
    }

    #[test]
    fn test_prepare_drops_tail() {
        let prepared = prepare(&two_assets(), 2).unwrap();
        assert_eq!(prepared.height(), 2);
        assert_eq!(prepared.timestamps(), &[1, 1]);
        assert!(prepared.has_column(FORWARD_RETURN));
    }

    #[test]
    fn test_prepare_keeps_total_loss() {
        // A fall to zero is a -100% return, not a missing one.
        let prepared = prepare(&two_assets(), 1).unwrap();
        assert_eq!(prepared.height(), 4);
        let returns = prepared.column_f64(FORWARD_RETURN).unwrap();
        assert_relative_eq!(returns[3], -1.0);
    }
}
