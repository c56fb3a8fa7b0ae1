//! Trend Estimator
//!
//! Ordinary least squares line over the month index, projected past the
//! last observation with the standard prediction interval for simple linear
//! regression:
//!
//! ```text
//! ŷ(t)  = a + b t
//! band  = z s sqrt(1 + 1/n + (t - t̄)² / Σ(t - t̄)²)
//! ```

use tracing::debug;

use crate::config::ForecastConfig;
use crate::error::Result;

use super::seasonality::detect_seasonality;
use super::stats::{
    check_projection, classify_trend, ensure_finite, fallback_forecast, forecast_dates, mean,
    validate_series, LinearFit,
};
use super::types::{ForecastMethod, ForecastPoint, ForecastResult, MonthlyPoint};
use super::Estimator;

/// Linear regression forecaster
#[derive(Debug, Clone, Default)]
pub struct LinearTrend {
    config: ForecastConfig,
}

impl LinearTrend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ForecastConfig) -> Self {
        Self { config }
    }
}

impl Estimator for LinearTrend {
    fn method(&self) -> ForecastMethod {
        ForecastMethod::Linear
    }

    fn forecast(&self, series: &[MonthlyPoint], horizon: usize) -> Result<ForecastResult> {
        validate_series(series)?;

        let values: Vec<f64> = series.iter().map(|p| p.value).collect();
        let last = series[series.len() - 1];

        let Some(fit) = LinearFit::fit(&values) else {
            return fallback_forecast(last, horizon, self.method(), &self.config);
        };

        let n = fit.n as f64;
        let s = fit.residual_std_error();
        ensure_finite("linear fit", &[fit.intercept, fit.slope, s])?;
        let trend = classify_trend(fit.slope, mean(&values), self.config.trend_threshold);

        debug!(
            slope = fit.slope,
            intercept = fit.intercept,
            residual_std_error = s,
            trend = trend.as_str(),
            "Fitted linear trend"
        );

        let forecasts: Vec<ForecastPoint> = forecast_dates(last.date, horizon)?
            .into_iter()
            .enumerate()
            .map(|(step, date)| {
                let t = (fit.n + step) as f64;
                let leverage = 1.0 + 1.0 / n + (t - fit.t_mean).powi(2) / fit.sxx;
                let half_width = self.config.z * s * leverage.sqrt();
                ForecastPoint::symmetric(date, fit.predict(t), half_width)
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
