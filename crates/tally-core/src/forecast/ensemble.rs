//! Ensemble Combiner
//!
//! Averages the member predictions step by step and takes the union of
//! their bands: where the models disagree, the combined band is wide.

use std::collections::HashMap;

use tracing::debug;

use crate::config::ForecastConfig;
use crate::error::{Error, Result};

use super::seasonality::detect_seasonality;
use super::stats::{check_projection, validate_series};
use super::types::{ForecastMethod, ForecastPoint, ForecastResult, MonthlyPoint, Trend};
use super::{Estimator, ExponentialSmoothing, LinearTrend, MovingAverage};

/// Combines several estimators into a single forecast
pub struct Ensemble {
    config: ForecastConfig,
    members: Vec<Box<dyn Estimator>>,
}

impl Default for Ensemble {
    fn default() -> Self {
        Self::new()
    }
}

impl Ensemble {
    /// Create an ensemble of the built-in estimators with default config
    pub fn new() -> Self {
        Self::with_config(ForecastConfig::default())
    }

    /// Create an ensemble of the built-in estimators
    pub fn with_config(config: ForecastConfig) -> Self {
        let mut ensemble = Self {
            config: config.clone(),
            members: vec![],
        };

        ensemble.register(Box::new(LinearTrend::with_config(config.clone())));
        ensemble.register(Box::new(ExponentialSmoothing::with_config(config.clone())));
        ensemble.register(Box::new(MovingAverage::with_config(config)));

        ensemble
    }

    /// Add a member estimator
    pub fn register(&mut self, estimator: Box<dyn Estimator>) {
        self.members.push(estimator);
    }

    /// Run every member on the same series and horizon
    pub fn member_forecasts(
        &self,
        series: &[MonthlyPoint],
        horizon: usize,
    ) -> Result<Vec<ForecastResult>> {
        self.members
            .iter()
            .map(|m| m.forecast(series, horizon))
            .collect()
    }
}

/// Majority vote; anything short of a strict majority is `Stable`
fn vote_trend(trends: &[Trend]) -> Trend {
    let mut counts: HashMap<Trend, usize> = HashMap::new();
    for trend in trends {
        *counts.entry(*trend).or_insert(0) += 1;
    }

    counts
        .into_iter()
        .find(|(_, count)| *count * 2 > trends.len())
        .map(|(trend, _)| trend)
        .unwrap_or(Trend::Stable)
}

/// Step-wise mean of predictions with the widest lower/upper bounds
fn combine_step(points: &[ForecastPoint]) -> Option<ForecastPoint> {
    let first = points.first()?;
    let predicted = points.iter().map(|p| p.predicted).sum::<f64>() / points.len() as f64;
    let lower = points.iter().map(|p| p.lower).fold(f64::INFINITY, f64::min);
    let upper = points.iter().map(|p| p.upper).fold(f64::NEG_INFINITY, f64::max);

    Some(ForecastPoint {
        date: first.date,
        predicted,
        lower,
        upper,
    })
}

impl Estimator for Ensemble {
    fn method(&self) -> ForecastMethod {
        ForecastMethod::Ensemble
    }

    fn forecast(&self, series: &[MonthlyPoint], horizon: usize) -> Result<ForecastResult> {
        validate_series(series)?;

        if self.members.is_empty() {
            return Err(Error::invalid_input(
                "ensemble.members",
                "at least one estimator is required",
            ));
        }

        let results = self.member_forecasts(series, horizon)?;

        if let Some(short) = results.iter().find(|r| r.forecasts.len() != horizon) {
            return Err(Error::InvalidData(format!(
                "{} member returned {} points for a {} month horizon",
                short.method,
                short.forecasts.len(),
                horizon
            )));
        }

        let forecasts: Vec<ForecastPoint> = (0..horizon)
            .filter_map(|step| {
                let points: Vec<ForecastPoint> =
                    results.iter().map(|r| r.forecasts[step]).collect();
                combine_step(&points)
            })
            .collect();
        check_projection(&forecasts)?;

        let trends: Vec<Trend> = results.iter().map(|r| r.trend).collect();
        let trend = vote_trend(&trends);

        let values: Vec<f64> = series.iter().map(|p| p.value).collect();
        let seasonality = detect_seasonality(&values, &self.config);

        debug!(
            members = results.len(),
            trend = trend.as_str(),
            seasonality,
            "Combined ensemble forecast"
        );

        Ok(ForecastResult {
            method: self.method(),
            trend,
            seasonality,
            forecasts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forecast::test_series;

    #[test]
    fn test_default_members() {
        let ensemble = Ensemble::new();
        let methods: Vec<ForecastMethod> = ensemble.members.iter().map(|m| m.method()).collect();
        assert_eq!(
            methods,
            vec![
                ForecastMethod::Linear,
                ForecastMethod::Exponential,
                ForecastMethod::MovingAverage
            ]
        );
    }

    #[test]
    fn test_vote_trend() {
        use Trend::*;
        assert_eq!(vote_trend(&[Increasing, Increasing, Stable]), Increasing);
        assert_eq!(vote_trend(&[Decreasing, Stable, Decreasing]), Decreasing);
        assert_eq!(vote_trend(&[Increasing, Decreasing, Stable]), Stable);
        assert_eq!(vote_trend(&[Stable, Stable, Increasing]), Stable);
        assert_eq!(vote_trend(&[]), Stable);
    }

    #[test]
    fn test_union_band_encloses_members() {
        let series = test_series(&[820.0, 910.0, 870.0, 1010.0, 940.0, 1080.0, 990.0]);
        let ensemble = Ensemble::new();
        let combined = ensemble.forecast(&series, 5).unwrap();
        let members = ensemble.member_forecasts(&series, 5).unwrap();

        assert_eq!(combined.method, ForecastMethod::Ensemble);
        assert_eq!(combined.forecasts.len(), 5);

        for (step, point) in combined.forecasts.iter().enumerate() {
            let mean = members.iter().map(|m| m.forecasts[step].predicted).sum::<f64>() / 3.0;
            assert!((point.predicted - mean).abs() < 1e-9);
            for member in &members {
                assert!(point.lower <= member.forecasts[step].lower);
                assert!(point.upper >= member.forecasts[step].upper);
            }
            assert!(point.lower <= point.predicted && point.predicted <= point.upper);
        }
    }

    #[test]
    fn test_linear_series_votes_increasing() {
        let series = test_series(&[10.0, 20.0, 30.0, 40.0, 50.0]);
        let result = Ensemble::new().forecast(&series, 2).unwrap();
        assert_eq!(result.trend, Trend::Increasing);
        assert!(!result.seasonality);
    }

    #[test]
    fn test_empty_ensemble_rejected() {
        let ensemble = Ensemble {
            config: ForecastConfig::default(),
            members: vec![],
        };
        let series = test_series(&[1.0, 2.0, 3.0]);
        assert!(ensemble.forecast(&series, 1).is_err());
    }

    #[test]
    fn test_horizon_zero() {
        let series = test_series(&[1.0, 2.0, 3.0]);
        let result = Ensemble::new().forecast(&series, 0).unwrap();
        assert!(result.forecasts.is_empty());
    }

    /// Returns one point fewer than asked for
    struct ShortEstimator;

    impl Estimator for ShortEstimator {
        fn method(&self) -> ForecastMethod {
            ForecastMethod::MovingAverage
        }

        fn forecast(&self, series: &[MonthlyPoint], horizon: usize) -> Result<ForecastResult> {
            let mut result = MovingAverage::new().forecast(series, horizon)?;
            result.forecasts.pop();
            Ok(result)
        }
    }

    #[test]
    fn test_mismatched_member_rejected() {
        let mut ensemble = Ensemble::new();
        ensemble.register(Box::new(ShortEstimator));

        let series = test_series(&[1.0, 2.0, 3.0]);
        let err = ensemble.forecast(&series, 3).unwrap_err();
        assert!(matches!(err, Error::InvalidData(_)));
    }

    #[test]
    fn test_unrepresentable_horizon_rejected() {
        let series = test_series(&[1.0, 2.0, 3.0]);
        let err = Ensemble::new()
            .forecast(&series, i32::MAX as usize + 3)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput { ref field, .. } if field == "horizon"));
    }

    #[test]
    fn test_overflowing_member_mean_rejected() {
        // Each member stays finite; their mean does not
        struct Huge(f64);

        impl Estimator for Huge {
            fn method(&self) -> ForecastMethod {
                ForecastMethod::Linear
            }

            fn forecast(&self, series: &[MonthlyPoint], horizon: usize) -> Result<ForecastResult> {
                let mut result = LinearTrend::new().forecast(series, horizon)?;
                for point in &mut result.forecasts {
                    *point = ForecastPoint::symmetric(point.date, self.0, 0.0);
                }
                Ok(result)
            }
        }

        let mut ensemble = Ensemble {
            config: ForecastConfig::default(),
            members: vec![],
        };
        ensemble.register(Box::new(Huge(f64::MAX)));
        ensemble.register(Box::new(Huge(f64::MAX)));

        let series = test_series(&[1.0, 2.0, 3.0]);
        let err = ensemble.forecast(&series, 2).unwrap_err();
        assert!(matches!(err, Error::InvalidInput { ref field, .. } if field == "series"));
    }
}
