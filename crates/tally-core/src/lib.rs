//! Tally Core Library
//!
//! Forecasting engine for the Tally personal finance tracker:
//! - Transaction import from CSV and JSON exports
//! - Monthly series builder with zero-filled gaps
//! - Linear trend, exponential smoothing and moving-average estimators
//! - Ensemble combiner and seasonality detection
//! - Holdout backtesting
//! - TOML configuration with embedded defaults

pub mod config;
pub mod error;
pub mod forecast;
pub mod import;
pub mod models;

pub use config::ForecastConfig;
pub use error::{Error, Result};
pub use forecast::{
    backtest, forecast, forecast_with_config, prepare_monthly_series, BacktestReport, Ensemble,
    Estimator, ExponentialSmoothing, ForecastMethod, ForecastPoint, ForecastResult, LinearTrend,
    MonthlyPoint, MovingAverage, Trend, MIN_SERIES_LEN,
};
pub use import::{load_transactions, parse_csv, parse_json};
pub use models::{Transaction, TransactionKind};
