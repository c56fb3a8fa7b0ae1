//! Forecasting Engine - monthly income/expense projections
//!
//! Turns a transaction history into a zero-filled monthly series and
//! projects it forward with one of several estimators. Every call is a pure
//! function of its inputs: the "current month" anchor is passed in by the
//! caller and there is no shared mutable state, so forecasts are safe to run
//! concurrently and are bit-for-bit reproducible.
//!
//! ## Estimators
//!
//! - **Linear Trend** - least squares line with a regression prediction interval
//! - **Exponential Smoothing** - Holt's level + trend, seasonally adjusted when detected
//! - **Moving Average** - trailing window mean with a constant band
//! - **Ensemble** - mean of the three with the union of their bands
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tally_core::forecast::{forecast, prepare_monthly_series, ForecastMethod};
//! use tally_core::models::TransactionKind;
//!
//! let series = prepare_monthly_series(&transactions, TransactionKind::Expense, 12, today)?;
//! let result = forecast(&series, 6, ForecastMethod::Ensemble)?;
//! ```

pub mod backtest;
pub mod ensemble;
pub mod linear;
pub mod moving_average;
pub mod seasonality;
pub mod series;
pub mod smoothing;
pub mod stats;
pub mod types;

pub use backtest::{backtest, BacktestReport};
pub use ensemble::Ensemble;
pub use linear::LinearTrend;
pub use moving_average::MovingAverage;
pub use seasonality::{detect_seasonality, seasonal_offsets, SEASON_LENGTH};
pub use series::{add_months, month_key, prepare_monthly_series};
pub use smoothing::ExponentialSmoothing;
pub use types::{ForecastMethod, ForecastPoint, ForecastResult, MonthlyPoint, Trend};

use crate::config::ForecastConfig;
use crate::error::Result;

/// Fewest months of history callers should forecast from
pub const MIN_SERIES_LEN: usize = 3;

/// A forecasting approach
pub trait Estimator: Send + Sync {
    /// Which method this estimator implements
    fn method(&self) -> ForecastMethod;

    /// Project `horizon` months past the end of `series`
    fn forecast(&self, series: &[MonthlyPoint], horizon: usize) -> Result<ForecastResult>;
}

impl ForecastMethod {
    /// Build the estimator for this method
    pub fn estimator(&self, config: &ForecastConfig) -> Box<dyn Estimator> {
        match self {
            Self::Linear => Box::new(LinearTrend::with_config(config.clone())),
            Self::Exponential => Box::new(ExponentialSmoothing::with_config(config.clone())),
            Self::MovingAverage => Box::new(MovingAverage::with_config(config.clone())),
            Self::Ensemble => Box::new(Ensemble::with_config(config.clone())),
        }
    }
}

/// Forecast with the default configuration
pub fn forecast(
    series: &[MonthlyPoint],
    horizon: usize,
    method: ForecastMethod,
) -> Result<ForecastResult> {
    forecast_with_config(series, horizon, method, &ForecastConfig::default())
}

/// Forecast with an explicit configuration
pub fn forecast_with_config(
    series: &[MonthlyPoint],
    horizon: usize,
    method: ForecastMethod,
    config: &ForecastConfig,
) -> Result<ForecastResult> {
    config.validate()?;
    method.estimator(config).forecast(series, horizon)
}

/// Monthly series starting January 2024 with the given values
#[cfg(test)]
pub(crate) fn test_series(values: &[f64]) -> Vec<MonthlyPoint> {
    let start = chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    values
        .iter()
        .enumerate()
        .map(|(i, v)| MonthlyPoint::new(add_months(start, i as i32).unwrap(), *v))
        .collect()
}
