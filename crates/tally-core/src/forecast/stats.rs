//! Numeric helpers shared by the estimators

use chrono::NaiveDate;
use tracing::warn;

use crate::config::ForecastConfig;
use crate::error::{Error, Result};

use super::series::add_months;
use super::types::{ForecastMethod, ForecastPoint, ForecastResult, MonthlyPoint, Trend};

/// Smallest slope magnitude that can ever count as a trend
const MIN_TREND_SLOPE: f64 = 1e-9;

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation
pub fn std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Classify a per-month change relative to the series level
///
/// The change must exceed `threshold_ratio * |level|` in either direction to
/// count as increasing or decreasing.
pub fn classify_trend(slope: f64, level: f64, threshold_ratio: f64) -> Trend {
    let threshold = (threshold_ratio * level.abs()).max(MIN_TREND_SLOPE);
    if slope > threshold {
        Trend::Increasing
    } else if slope < -threshold {
        Trend::Decreasing
    } else {
        Trend::Stable
    }
}

/// Ordinary least squares fit of `value = intercept + slope * t`
#[derive(Debug, Clone, Copy)]
pub struct LinearFit {
    pub intercept: f64,
    pub slope: f64,
    pub n: usize,
    /// Mean of the index `t`
    pub t_mean: f64,
    /// Σ(t - t̄)²
    pub sxx: f64,
    /// Sum of squared residuals
    pub sse: f64,
}

impl LinearFit {
    /// Fit against the zero-based index; `None` with fewer than 2 values
    pub fn fit(values: &[f64]) -> Option<Self> {
        let n = values.len();
        if n < 2 {
            return None;
        }

        let t_mean = (n - 1) as f64 / 2.0;
        let y_mean = mean(values);

        let mut sxx = 0.0;
        let mut sxy = 0.0;
        for (i, y) in values.iter().enumerate() {
            let dt = i as f64 - t_mean;
            sxx += dt * dt;
            sxy += dt * (y - y_mean);
        }

        let slope = sxy / sxx;
        let intercept = y_mean - slope * t_mean;

        let sse = values
            .iter()
            .enumerate()
            .map(|(i, y)| (y - (intercept + slope * i as f64)).powi(2))
            .sum();

        Some(Self {
            intercept,
            slope,
            n,
            t_mean,
            sxx,
            sse,
        })
    }

    pub fn predict(&self, t: f64) -> f64 {
        self.intercept + self.slope * t
    }

    /// Residual standard error (0 when there are no spare degrees of freedom)
    pub fn residual_std_error(&self) -> f64 {
        if self.n <= 2 {
            return 0.0;
        }
        (self.sse / (self.n - 2) as f64).sqrt()
    }
}

/// Reject series that cannot be forecast at all
///
/// The series must have at least one point (its last month anchors the
/// forecast dates), values must be finite and dates must step by exactly
/// one month.
pub fn validate_series(series: &[MonthlyPoint]) -> Result<()> {
    if series.is_empty() {
        return Err(Error::invalid_input(
            "series",
            "must contain at least one month of history",
        ));
    }
    for (i, point) in series.iter().enumerate() {
        if !point.value.is_finite() {
            return Err(Error::invalid_input(
                format!("series[{}].value", i),
                format!("must be finite, got {}", point.value),
            ));
        }
        if i > 0 && add_months(series[i - 1].date, 1) != Some(point.date) {
            return Err(Error::invalid_input(
                format!("series[{}].date", i),
                format!(
                    "expected the month after {}, got {}",
                    series[i - 1].date,
                    point.date
                ),
            ));
        }
    }
    Ok(())
}

/// Dates of the `horizon` months following `last`
pub fn forecast_dates(last: NaiveDate, horizon: usize) -> Result<Vec<NaiveDate>> {
    let out_of_range = || {
        Error::invalid_input(
            "horizon",
            format!("{} months after {} is outside the supported date range", horizon, last),
        )
    };

    let steps = i32::try_from(horizon).map_err(|_| out_of_range())?;
    add_months(last, steps).ok_or_else(out_of_range)?;

    (1..=steps)
        .map(|h| add_months(last, h).ok_or_else(out_of_range))
        .collect()
}

/// Fail when finite history overflowed somewhere inside a fit
///
/// `state` holds the fitted quantities a projection is built from.
pub fn ensure_finite(stage: &str, state: &[f64]) -> Result<()> {
    if state.iter().all(|v| v.is_finite()) {
        return Ok(());
    }
    Err(Error::invalid_input(
        "series",
        format!("values too large to forecast: {} is not finite", stage),
    ))
}

/// Fail when any projected point overflowed
pub fn check_projection(forecasts: &[ForecastPoint]) -> Result<()> {
    let bad = forecasts
        .iter()
        .position(|p| !(p.predicted.is_finite() && p.lower.is_finite() && p.upper.is_finite()));

    match bad {
        Some(step) => Err(Error::invalid_input(
            "series",
            format!("values too large to forecast: step {} is not finite", step + 1),
        )),
        None => Ok(()),
    }
}

/// Flat projection at the last observed value, used when there is too
/// little history to fit a model
///
/// The band is `fallback_band_ratio * |value|`, never narrower than
/// `fallback_band_floor`.
pub fn fallback_forecast(
    last: MonthlyPoint,
    horizon: usize,
    method: ForecastMethod,
    config: &ForecastConfig,
) -> Result<ForecastResult> {
    let value = last.value;
    let half_width = (config.fallback_band_ratio * value.abs()).max(config.fallback_band_floor);

    warn!(
        method = method.as_str(),
        "Not enough history to fit model, using flat forecast"
    );

    let forecasts: Vec<ForecastPoint> = forecast_dates(last.date, horizon)?
        .into_iter()
        .map(|date| ForecastPoint::symmetric(date, value, half_width))
        .collect();
    check_projection(&forecasts)?;

    Ok(ForecastResult {
        method,
        trend: Trend::Stable,
        seasonality: false,
        forecasts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series_of(values: &[f64]) -> Vec<MonthlyPoint> {
        let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        values
            .iter()
            .enumerate()
            .map(|(i, v)| MonthlyPoint::new(add_months(start, i as i32).unwrap(), *v))
            .collect()
    }

    #[test]
    fn test_mean_and_std_dev() {
        assert_eq!(mean(&[]), 0.0);
        assert_eq!(mean(&[50.0, 60.0, 70.0]), 60.0);
        let sd = std_dev(&[50.0, 60.0, 70.0]);
        assert!((sd - (200.0f64 / 3.0).sqrt()).abs() < 1e-12);
        assert_eq!(std_dev(&[4.0, 4.0]), 0.0);
    }

    #[test]
    fn test_classify_trend() {
        assert_eq!(classify_trend(5.0, 100.0, 0.01), Trend::Increasing);
        assert_eq!(classify_trend(-5.0, 100.0, 0.01), Trend::Decreasing);
        assert_eq!(classify_trend(0.5, 100.0, 0.01), Trend::Stable);
        // Zero-level series: only the absolute floor applies
        assert_eq!(classify_trend(0.0, 0.0, 0.01), Trend::Stable);
        assert_eq!(classify_trend(1.0, 0.0, 0.01), Trend::Increasing);
    }

    #[test]
    fn test_linear_fit_exact() {
        let fit = LinearFit::fit(&[10.0, 20.0, 30.0, 40.0, 50.0]).unwrap();
        assert!((fit.slope - 10.0).abs() < 1e-9);
        assert!((fit.intercept - 10.0).abs() < 1e-9);
        assert!(fit.residual_std_error() < 1e-9);
        assert!((fit.predict(5.0) - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_linear_fit_needs_two_points() {
        assert!(LinearFit::fit(&[1.0]).is_none());
        assert!(LinearFit::fit(&[]).is_none());
    }

    #[test]
    fn test_validate_series_gap() {
        let mut series = series_of(&[1.0, 2.0, 3.0]);
        series[2].date = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let err = validate_series(&series).unwrap_err();
        assert!(matches!(err, Error::InvalidInput { ref field, .. } if field == "series[2].date"));
    }

    #[test]
    fn test_validate_series_empty() {
        let err = validate_series(&[]).unwrap_err();
        assert!(matches!(err, Error::InvalidInput { ref field, .. } if field == "series"));
    }

    #[test]
    fn test_validate_series_infinite_value() {
        let series = series_of(&[1.0, f64::INFINITY]);
        let err = validate_series(&series).unwrap_err();
        assert!(matches!(err, Error::InvalidInput { ref field, .. } if field == "series[1].value"));
    }

    #[test]
    fn test_fallback_forecast() {
        let series = series_of(&[80.0]);
        let result = fallback_forecast(
            series[0],
            3,
            ForecastMethod::Linear,
            &ForecastConfig::default(),
        )
        .unwrap();
        assert_eq!(result.forecasts.len(), 3);
        assert_eq!(result.trend, Trend::Stable);
        for point in &result.forecasts {
            assert_eq!(point.predicted, 80.0);
            assert_eq!(point.lower, 40.0);
            assert_eq!(point.upper, 120.0);
        }
        assert_eq!(
            result.forecasts[0].date,
            NaiveDate::from_ymd_opt(2025, 2, 1).unwrap()
        );
    }

    #[test]
    fn test_fallback_band_floor_at_zero() {
        let series = series_of(&[0.0]);
        let config = ForecastConfig::default();
        let result = fallback_forecast(series[0], 2, ForecastMethod::Linear, &config).unwrap();

        for point in &result.forecasts {
            assert_eq!(point.predicted, 0.0);
            assert_eq!(point.lower, -config.fallback_band_floor);
            assert_eq!(point.upper, config.fallback_band_floor);
            assert!(point.width() > 0.0);
        }
    }

    #[test]
    fn test_fallback_overflowing_band_rejected() {
        let series = series_of(&[f64::MAX]);
        let err = fallback_forecast(
            series[0],
            1,
            ForecastMethod::Linear,
            &ForecastConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidInput { ref field, .. } if field == "series"));
    }

    #[test]
    fn test_forecast_dates_horizon_limits() {
        let last = NaiveDate::from_ymd_opt(2025, 12, 1).unwrap();
        assert!(forecast_dates(last, 0).unwrap().is_empty());
        assert_eq!(forecast_dates(last, 14).unwrap().len(), 14);

        for horizon in [4_000_000, i32::MAX as usize + 3] {
            let err = forecast_dates(last, horizon).unwrap_err();
            assert!(matches!(err, Error::InvalidInput { ref field, .. } if field == "horizon"));
        }
    }

    #[test]
    fn test_ensure_finite_and_check_projection() {
        assert!(ensure_finite("fit", &[1.0, -2.0, 0.0]).is_ok());
        assert!(ensure_finite("fit", &[1.0, f64::NAN]).is_err());

        let date = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let good = [ForecastPoint::symmetric(date, 10.0, 1.0)];
        assert!(check_projection(&good).is_ok());

        let bad = [good[0], ForecastPoint::symmetric(date, f64::MAX, f64::MAX)];
        let err = check_projection(&bad).unwrap_err();
        assert!(matches!(err, Error::InvalidInput { ref field, .. } if field == "series"));
    }
}
