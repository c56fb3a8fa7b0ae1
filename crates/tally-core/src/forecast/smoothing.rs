//! Smoothing Estimator
//!
//! Holt's linear (double exponential) smoothing:
//!
//! ```text
//! Level:    L_t = α y_t + (1 - α)(L_{t-1} + T_{t-1})
//! Trend:    T_t = β (L_t - L_{t-1}) + (1 - β) T_{t-1}
//! Forecast: F_{t+h} = L_t + h T_t (+ seasonal offset)
//! ```
//!
//! When the series is seasonal, smoothing runs on the deseasonalized values
//! and the offset for each projected month is added back.

use tracing::debug;

use crate::config::ForecastConfig;
use crate::error::Result;

use super::seasonality::{detect_seasonality, seasonal_offsets, SEASON_LENGTH};
use super::stats::{
    check_projection, classify_trend, ensure_finite, fallback_forecast, forecast_dates, mean,
    validate_series,
};
use super::types::{ForecastMethod, ForecastPoint, ForecastResult, MonthlyPoint};
use super::Estimator;

/// Final smoothing state plus in-sample one-step-ahead errors
#[derive(Debug, Clone)]
struct HoltState {
    level: f64,
    trend: f64,
    errors: Vec<f64>,
}

impl HoltState {
    /// Requires at least 2 values
    fn fit(values: &[f64], alpha: f64, beta: f64) -> Option<Self> {
        if values.len() < 2 {
            return None;
        }

        let mut level = values[0];
        let mut trend = values[1] - values[0];
        let mut errors = Vec::with_capacity(values.len().saturating_sub(2));

        for (i, &y) in values.iter().enumerate().skip(1) {
            let expected = level + trend;
            // The second point defines the initial trend, so its error is zero
            if i >= 2 {
                errors.push(y - expected);
            }

            let prev_level = level;
            level = alpha * y + (1.0 - alpha) * expected;
            trend = beta * (level - prev_level) + (1.0 - beta) * trend;
        }

        Some(Self {
            level,
            trend,
            errors,
        })
    }

    /// Root mean square of the one-step-ahead errors
    fn residual_std(&self) -> f64 {
        if self.errors.is_empty() {
            return 0.0;
        }
        let sum_sq: f64 = self.errors.iter().map(|e| e * e).sum();
        (sum_sq / self.errors.len() as f64).sqrt()
    }
}

/// Holt's double exponential smoothing forecaster
#[derive(Debug, Clone, Default)]
pub struct ExponentialSmoothing {
    config: ForecastConfig,
}

impl ExponentialSmoothing {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ForecastConfig) -> Self {
        Self { config }
    }
}

impl Estimator for ExponentialSmoothing {
    fn method(&self) -> ForecastMethod {
        ForecastMethod::Exponential
    }

    fn forecast(&self, series: &[MonthlyPoint], horizon: usize) -> Result<ForecastResult> {
        validate_series(series)?;

        let values: Vec<f64> = series.iter().map(|p| p.value).collect();
        let n = values.len();
        let last = series[n - 1];

        let seasonal = detect_seasonality(&values, &self.config);
        let offsets = if seasonal {
            seasonal_offsets(&values)
        } else {
            [0.0; SEASON_LENGTH]
        };

        let adjusted: Vec<f64> = values
            .iter()
            .enumerate()
            .map(|(i, v)| v - offsets[i % SEASON_LENGTH])
            .collect();

        let Some(state) = HoltState::fit(&adjusted, self.config.alpha, self.config.beta) else {
            return fallback_forecast(last, horizon, self.method(), &self.config);
        };

        let sigma = state.residual_std();
        ensure_finite("smoothing state", &[state.level, state.trend, sigma])?;
        let trend = classify_trend(state.trend, mean(&values), self.config.trend_threshold);

        debug!(
            level = state.level,
            trend_state = state.trend,
            residual_std = sigma,
            seasonal,
            trend = trend.as_str(),
            "Fitted exponential smoothing"
        );

        let forecasts: Vec<ForecastPoint> = forecast_dates(last.date, horizon)?
            .into_iter()
            .enumerate()
            .map(|(step, date)| {
                let h = (step + 1) as f64;
                let offset = offsets[(n - 1 + step + 1) % SEASON_LENGTH];
                let predicted = state.level + h * state.trend + offset;
                ForecastPoint::symmetric(date, predicted, self.config.z * sigma * h)
            })
            .collect();
        check_projection(&forecasts)?;

        Ok(ForecastResult {
            method: self.method(),
            trend,
            seasonality: seasonal,
            forecasts,
        })
    }
}
