//! Moving-Average Estimator
//!
//! Projects the trailing window average forward. The band is a fixed
//! multiple of the window's standard deviation and does not widen with
//! distance: this estimator models mean reversion, not long-range drift.

use tracing::debug;

use crate::config::ForecastConfig;
use crate::error::Result;

use super::seasonality::detect_seasonality;
use super::stats::{
    check_projection, classify_trend, ensure_finite, forecast_dates, mean, std_dev,
    validate_series,
};
use super::types::{ForecastMethod, ForecastPoint, ForecastResult, MonthlyPoint, Trend};
use super::Estimator;

/// Trailing window average forecaster
#[derive(Debug, Clone, Default)]
pub struct MovingAverage {
    config: ForecastConfig,
}

impl MovingAverage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ForecastConfig) -> Self {
        Self { config }
    }
}

impl Estimator for MovingAverage {
    fn method(&self) -> ForecastMethod {
        ForecastMethod::MovingAverage
    }

    fn forecast(&self, series: &[MonthlyPoint], horizon: usize) -> Result<ForecastResult> {
        validate_series(series)?;

        let values: Vec<f64> = series.iter().map(|p| p.value).collect();
        let n = values.len();
        let window = self.config.window.clamp(1, n);

        let recent_window = &values[n - window..];
        let recent = mean(recent_window);

        // The window ending one month earlier, when there is history for it
        let delta = if n > window {
            recent - mean(&values[n - window - 1..n - 1])
        } else {
            0.0
        };

        let trend = classify_trend(delta, mean(&values), self.config.trend_threshold);
        let half_width = self.config.band_multiplier * std_dev(recent_window);
        ensure_finite("moving average", &[recent, delta, half_width])?;

        debug!(
            window,
            average = recent,
            delta,
            trend = trend.as_str(),
            "Computed moving average"
        );

        let forecasts: Vec<ForecastPoint> = forecast_dates(series[n - 1].date, horizon)?
            .into_iter()
            .enumerate()
            .map(|(step, date)| {
                let predicted = match trend {
                    Trend::Stable => recent,
                    _ => recent + delta * (step + 1) as f64,
                };
                ForecastPoint::symmetric(date, predicted, half_width)
            })
            .collect();
        check_projection(&forecasts)?;

        Ok(ForecastResult {
            method: self.method(),
            trend,
            seasonality: detect_seasonality(&values, &self.config),
            forecasts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forecast::test_series;

    #[test]
    fn test_flat_at_window_mean() {
        let series = test_series(&[50.0, 60.0, 70.0]);
        let result = MovingAverage::new().forecast(&series, 4).unwrap();

        assert_eq!(result.method, ForecastMethod::MovingAverage);
        assert_eq!(result.trend, Trend::Stable);

        let expected_half = 1.5 * (200.0f64 / 3.0).sqrt();
        for point in &result.forecasts {
            assert!((point.predicted - 60.0).abs() < 1e-9);
            assert!((point.upper - point.predicted - expected_half).abs() < 1e-9);
        }
        // Band is constant across the horizon
        let first = result.forecasts[0].width();
        assert!(result.forecasts.iter().all(|p| (p.width() - first).abs() < 1e-12));
    }

    #[test]
    fn test_trend_adds_delta() {
        // Windows [20,30,40] -> 30 and [30,40,50] -> 40
        let series = test_series(&[20.0, 30.0, 40.0, 50.0]);
        let result = MovingAverage::new().forecast(&series, 2).unwrap();

        assert_eq!(result.trend, Trend::Increasing);
        assert!((result.forecasts[0].predicted - 50.0).abs() < 1e-9);
        assert!((result.forecasts[1].predicted - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_small_change_is_stable() {
        let series = test_series(&[1000.0, 1001.0, 1000.0, 1002.0]);
        let result = MovingAverage::new().forecast(&series, 2).unwrap();
        assert_eq!(result.trend, Trend::Stable);
        let avg = (1001.0 + 1000.0 + 1002.0) / 3.0;
        assert!(result.forecasts.iter().all(|p| (p.predicted - avg).abs() < 1e-9));
    }

    #[test]
    fn test_threshold_scales_with_series_mean() {
        // A quiet year then a new recurring bill: the 0.33 step is under 1% of
        // the recent average but over 1% of the series mean
        let mut values = vec![0.0; 9];
        values.extend([100.0, 100.0, 100.0, 101.0]);
        let series = test_series(&values);

        let result = MovingAverage::new().forecast(&series, 2).unwrap();
        assert_eq!(result.trend, Trend::Increasing);

        let recent = 301.0 / 3.0;
        let delta = recent - 100.0;
        assert!((result.forecasts[0].predicted - (recent + delta)).abs() < 1e-9);
        assert!((result.forecasts[1].predicted - (recent + 2.0 * delta)).abs() < 1e-9);
    }

    #[test]
    fn test_window_clamped_to_series() {
        let config = ForecastConfig {
            window: 12,
            ..Default::default()
        };
        let series = test_series(&[10.0, 30.0]);
        let result = MovingAverage::with_config(config).forecast(&series, 1).unwrap();
        assert!((result.forecasts[0].predicted - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_single_point() {
        let series = test_series(&[42.0]);
        let result = MovingAverage::new().forecast(&series, 2).unwrap();
        assert!(result.forecasts.iter().all(|p| p.predicted == 42.0 && p.width() == 0.0));
    }
}
