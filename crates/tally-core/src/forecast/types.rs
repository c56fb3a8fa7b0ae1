//! Core types for the forecasting engine

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One month of aggregated history
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonthlyPoint {
    /// First day of the month
    pub date: NaiveDate,
    /// Sum of matching transaction amounts for the month (0 if none)
    pub value: f64,
}

impl MonthlyPoint {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self { date, value }
    }
}

/// One projected month with its confidence band
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    /// First day of the projected month
    pub date: NaiveDate,
    pub predicted: f64,
    pub lower: f64,
    pub upper: f64,
}

impl ForecastPoint {
    /// Build a point with a symmetric band of the given half-width
    pub fn symmetric(date: NaiveDate, predicted: f64, half_width: f64) -> Self {
        let half_width = half_width.abs();
        Self {
            date,
            predicted,
            lower: predicted - half_width,
            upper: predicted + half_width,
        }
    }

    /// Width of the confidence band
    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }

    /// Whether a value falls inside the band (inclusive)
    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower && value <= self.upper
    }
}

/// Direction of a fitted series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Increasing,
    Decreasing,
    Stable,
}

impl Trend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Trend::Increasing => "increasing",
            Trend::Decreasing => "decreasing",
            Trend::Stable => "stable",
        }
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Forecasting approach
///
/// Serialized with the human-readable label so callers can report which
/// approach produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ForecastMethod {
    #[serde(rename = "Linear Trend")]
    Linear,
    #[serde(rename = "Exponential Smoothing")]
    Exponential,
    #[serde(rename = "Moving Average")]
    MovingAverage,
    #[serde(rename = "Ensemble")]
    Ensemble,
}

impl ForecastMethod {
    /// Short name used on the command line
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::Exponential => "exponential",
            Self::MovingAverage => "moving_average",
            Self::Ensemble => "ensemble",
        }
    }

    /// Display label reported alongside results
    pub fn label(&self) -> &'static str {
        match self {
            Self::Linear => "Linear Trend",
            Self::Exponential => "Exponential Smoothing",
            Self::MovingAverage => "Moving Average",
            Self::Ensemble => "Ensemble",
        }
    }

    /// Get all methods
    pub fn all() -> &'static [ForecastMethod] {
        &[
            Self::Linear,
            Self::Exponential,
            Self::MovingAverage,
            Self::Ensemble,
        ]
    }
}

impl fmt::Display for ForecastMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for ForecastMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "linear" | "linear_trend" => Ok(Self::Linear),
            "exponential" | "exponential_smoothing" | "holt" => Ok(Self::Exponential),
            "moving_average" | "ma" => Ok(Self::MovingAverage),
            "ensemble" => Ok(Self::Ensemble),
            _ => Err(format!(
                "Unknown forecast method: {} (valid: linear, exponential, moving_average, ensemble)",
                s
            )),
        }
    }
}

/// Output of a single forecast call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    pub method: ForecastMethod,
    pub trend: Trend,
    pub seasonality: bool,
    pub forecasts: Vec<ForecastPoint>,
}

impl ForecastResult {
    /// Sum of the predicted values across the horizon
    pub fn total_predicted(&self) -> f64 {
        self.forecasts.iter().map(|p| p.predicted).sum()
    }
}
