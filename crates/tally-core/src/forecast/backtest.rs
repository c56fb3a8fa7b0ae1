//! Holdout backtesting
//!
//! Fits a method on all but the last `holdout` months, forecasts those
//! months and scores the forecast against what actually happened.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ForecastConfig;
use crate::error::{Error, Result};

use super::types::ForecastMethod;
use super::{forecast_with_config, MonthlyPoint, MIN_SERIES_LEN};

/// Accuracy of one method over a holdout window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestReport {
    pub method: ForecastMethod,
    /// Number of held-back months scored
    pub holdout: usize,
    /// Mean absolute error
    pub mae: f64,
    /// Root mean squared error
    pub rmse: f64,
    /// Mean absolute percentage error over months with non-zero actuals
    pub mape: Option<f64>,
    /// Fraction of actuals that fell inside the forecast band
    pub coverage: f64,
}

/// Score `method` on the last `holdout` months of `series`
pub fn backtest(
    series: &[MonthlyPoint],
    method: ForecastMethod,
    holdout: usize,
    config: &ForecastConfig,
) -> Result<BacktestReport> {
    if holdout == 0 {
        return Err(Error::invalid_input("holdout", "must be at least 1"));
    }
    if series.len() < holdout + MIN_SERIES_LEN {
        return Err(Error::invalid_input(
            "holdout",
            format!(
                "{} months of history leaves fewer than {} to fit on",
                series.len(),
                MIN_SERIES_LEN
            ),
        ));
    }

    let split = series.len() - holdout;
    let (train, actual) = series.split_at(split);
    let result = forecast_with_config(train, holdout, method, config)?;

    let mut abs_sum = 0.0;
    let mut sq_sum = 0.0;
    let mut pct_sum = 0.0;
    let mut pct_count = 0usize;
    let mut covered = 0usize;

    for (point, actual) in result.forecasts.iter().zip(actual) {
        let err = actual.value - point.predicted;
        abs_sum += err.abs();
        sq_sum += err * err;
        if actual.value != 0.0 {
            pct_sum += (err / actual.value).abs();
            pct_count += 1;
        }
        if point.contains(actual.value) {
            covered += 1;
        }
    }

    let n = holdout as f64;
    let report = BacktestReport {
        method,
        holdout,
        mae: abs_sum / n,
        rmse: (sq_sum / n).sqrt(),
        mape: (pct_count > 0).then(|| 100.0 * pct_sum / pct_count as f64),
        coverage: covered as f64 / n,
    };

    debug!(
        method = method.as_str(),
        mae = report.mae,
        rmse = report.rmse,
        coverage = report.coverage,
        "Backtest complete"
    );

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forecast::test_series;

    #[test]
    fn test_linear_method_on_linear_data() {
        let series = test_series(&[10.0, 20.0, 30.0, 40.0, 50.0, 60.0, 70.0]);
        let report = backtest(&series, ForecastMethod::Linear, 2, &ForecastConfig::default())
            .unwrap();

        assert_eq!(report.holdout, 2);
        assert!(report.mae < 1e-9);
        assert!(report.rmse < 1e-9);
        assert!(report.mape.unwrap() < 1e-9);
    }

    #[test]
    fn test_mape_skips_zero_actuals() {
        let series = test_series(&[5.0, 5.0, 5.0, 0.0]);
        let report = backtest(
            &series,
            ForecastMethod::MovingAverage,
            1,
            &ForecastConfig::default(),
        )
        .unwrap();

        assert!((report.mae - 5.0).abs() < 1e-9);
        assert!(report.mape.is_none());
        assert_eq!(report.coverage, 0.0);
    }

    #[test]
    fn test_holdout_validation() {
        let series = test_series(&[1.0, 2.0, 3.0, 4.0]);
        let config = ForecastConfig::default();

        assert!(matches!(
            backtest(&series, ForecastMethod::Linear, 0, &config),
            Err(Error::InvalidInput { .. })
        ));
        assert!(matches!(
            backtest(&series, ForecastMethod::Linear, 2, &config),
            Err(Error::InvalidInput { .. })
        ));
        assert!(backtest(&series, ForecastMethod::Linear, 1, &config).is_ok());
    }
}
