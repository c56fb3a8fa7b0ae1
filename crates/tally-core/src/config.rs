//! Forecast engine configuration
//!
//! Holds the tuning constants shared by the estimators: interval width,
//! trend threshold, smoothing factors, moving-average window and the
//! seasonality thresholds.
//!
//! ## Configuration Resolution
//!
//! Config is loaded with a two-layer resolution:
//! 1. Check for override (explicit path, else ~/.local/share/tally/config/forecast.toml)
//! 2. Fall back to embedded defaults (compiled into binary)

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Error, Result};

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/forecast.toml");

/// Tuning constants for the forecasting engine
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastConfig {
    /// z-score used for confidence bands
    pub z: f64,
    /// Band half-width (fraction of the value) when no model can be fitted
    pub fallback_band_ratio: f64,
    /// Smallest fallback band half-width, so a zero value still gets a band
    pub fallback_band_floor: f64,
    /// Per-month slope, relative to the series mean, that counts as a trend
    pub trend_threshold: f64,
    /// Holt level smoothing factor
    pub alpha: f64,
    /// Holt trend smoothing factor
    pub beta: f64,
    /// Moving-average window in months
    pub window: usize,
    /// Moving-average band as a multiple of the window standard deviation
    pub band_multiplier: f64,
    /// Maximum average year-over-year relative difference for seasonality
    pub seasonality_threshold: f64,
    /// Minimum coefficient of variation before a series can be seasonal
    pub seasonality_min_variation: f64,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            z: 1.96,
            fallback_band_ratio: 0.5,
            fallback_band_floor: 1.0,
            trend_threshold: 0.01,
            alpha: 0.3,
            beta: 0.1,
            window: 3,
            band_multiplier: 1.5,
            seasonality_threshold: 0.15,
            seasonality_min_variation: 0.1,
        }
    }
}

impl ForecastConfig {
    /// Load configuration (override first, then embedded default)
    pub fn load(override_path: Option<&Path>) -> Result<Self> {
        let path = match override_path {
            Some(path) => Some(path.to_path_buf()),
            None => default_config_path(),
        };

        let content = match path {
            Some(ref path) if path.exists() => {
                info!(path = %path.display(), "Loading forecast config override");
                fs::read_to_string(path)
                    .map_err(|e| Error::InvalidData(format!("Failed to read config: {}", e)))?
            }
            _ => DEFAULT_CONFIG.to_string(),
        };

        parse_config(&content)
    }

    /// Check that every constant is usable by the estimators
    pub fn validate(&self) -> Result<()> {
        check_unit_open("smoothing.alpha", self.alpha)?;
        check_unit_open("smoothing.beta", self.beta)?;
        check_non_negative("interval.z", self.z)?;
        check_non_negative("interval.fallback_band_ratio", self.fallback_band_ratio)?;
        check_non_negative("interval.fallback_band_floor", self.fallback_band_floor)?;
        check_non_negative("trend.threshold", self.trend_threshold)?;
        check_non_negative("moving_average.band_multiplier", self.band_multiplier)?;
        check_non_negative("seasonality.threshold", self.seasonality_threshold)?;
        check_non_negative("seasonality.min_variation", self.seasonality_min_variation)?;

        if self.window == 0 {
            return Err(Error::invalid_input(
                "moving_average.window",
                "must be at least 1",
            ));
        }

        Ok(())
    }
}

fn check_unit_open(field: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value <= 0.0 || value >= 1.0 {
        return Err(Error::invalid_input(
            field,
            format!("must be between 0 and 1 (exclusive), got {}", value),
        ));
    }
    Ok(())
}

fn check_non_negative(field: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(Error::invalid_input(
            field,
            format!("must be a finite non-negative number, got {}", value),
        ));
    }
    Ok(())
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("tally").join("config").join("forecast.toml"))
}

/// Raw config structure for TOML parsing
#[derive(Debug, Deserialize)]
struct RawConfig {
    interval: Option<RawInterval>,
    trend: Option<RawTrend>,
    smoothing: Option<RawSmoothing>,
    moving_average: Option<RawMovingAverage>,
    seasonality: Option<RawSeasonality>,
}

#[derive(Debug, Deserialize)]
struct RawInterval {
    z: Option<f64>,
    fallback_band_ratio: Option<f64>,
    fallback_band_floor: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawTrend {
    threshold: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawSmoothing {
    alpha: Option<f64>,
    beta: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawMovingAverage {
    window: Option<usize>,
    band_multiplier: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawSeasonality {
    threshold: Option<f64>,
    min_variation: Option<f64>,
}

/// Parse config from TOML content
pub fn parse_config(content: &str) -> Result<ForecastConfig> {
    let raw: RawConfig = toml::from_str(content)
        .map_err(|e| Error::InvalidData(format!("Invalid config TOML: {}", e)))?;

    let mut config = ForecastConfig::default();

    if let Some(interval) = raw.interval {
        if let Some(z) = interval.z {
            config.z = z;
        }
        if let Some(ratio) = interval.fallback_band_ratio {
            config.fallback_band_ratio = ratio;
        }
        if let Some(floor) = interval.fallback_band_floor {
            config.fallback_band_floor = floor;
        }
    }

    if let Some(threshold) = raw.trend.and_then(|t| t.threshold) {
        config.trend_threshold = threshold;
    }

    if let Some(smoothing) = raw.smoothing {
        if let Some(alpha) = smoothing.alpha {
            config.alpha = alpha;
        }
        if let Some(beta) = smoothing.beta {
            config.beta = beta;
        }
    }

    if let Some(ma) = raw.moving_average {
        if let Some(window) = ma.window {
            config.window = window;
        }
        if let Some(multiplier) = ma.band_multiplier {
            config.band_multiplier = multiplier;
        }
    }

    if let Some(seasonality) = raw.seasonality {
        if let Some(threshold) = seasonality.threshold {
            config.seasonality_threshold = threshold;
        }
        if let Some(min_variation) = seasonality.min_variation {
            config.seasonality_min_variation = min_variation;
        }
    }

    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_default_config() {
        let config = parse_config(DEFAULT_CONFIG).unwrap();
        assert_eq!(config, ForecastConfig::default());
    }

    #[test]
    fn test_partial_override() {
        let config = parse_config(
            r#"
[smoothing]
alpha = 0.5

[moving_average]
window = 6
"#,
        )
        .unwrap();

        assert_eq!(config.alpha, 0.5);
        assert_eq!(config.window, 6);
        // Untouched keys keep their defaults
        assert_eq!(config.beta, 0.1);
        assert_eq!(config.z, 1.96);
    }

    #[test]
    fn test_invalid_alpha_names_field() {
        let err = parse_config("[smoothing]\nalpha = 1.5\n").unwrap_err();
        match err {
            Error::InvalidInput { field, .. } => assert_eq!(field, "smoothing.alpha"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_zero_window_rejected() {
        let err = parse_config("[moving_average]\nwindow = 0\n").unwrap_err();
        assert!(
            matches!(err, Error::InvalidInput { ref field, .. } if field == "moving_average.window")
        );
    }

    #[test]
    fn test_fallback_band_floor() {
        let config = parse_config("[interval]\nfallback_band_floor = 25.0\n").unwrap();
        assert_eq!(config.fallback_band_floor, 25.0);
        assert_eq!(config.fallback_band_ratio, 0.5);

        let err = parse_config("[interval]\nfallback_band_floor = -1.0\n").unwrap_err();
        match err {
            Error::InvalidInput { field, .. } => assert_eq!(field, "interval.fallback_band_floor"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_malformed_toml() {
        let err = parse_config("[smoothing\nalpha = ").unwrap_err();
        assert!(matches!(err, Error::InvalidData(_)));
    }

    #[test]
    fn test_load_from_override_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[trend]\nthreshold = 0.05").unwrap();

        let config = ForecastConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.trend_threshold, 0.05);
    }

    #[test]
    fn test_load_missing_override_uses_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = ForecastConfig::load(Some(&dir.path().join("missing.toml"))).unwrap();
        assert_eq!(config, ForecastConfig::default());
    }
}
