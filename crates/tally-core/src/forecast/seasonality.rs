//! Seasonality Detector
//!
//! Flags an annual cycle when each month's value recurs 12 months later
//! with less difference than neighbouring months show, and supplies the
//! additive seasonal offsets used to adjust smoothed projections.

use crate::config::ForecastConfig;

use super::stats::{mean, std_dev, LinearFit};

/// Months in one seasonal cycle
pub const SEASON_LENGTH: usize = 12;

/// Whether the values show an annual pattern
///
/// Always `false` with fewer than 12 values.
pub fn detect_seasonality(values: &[f64], config: &ForecastConfig) -> bool {
    let n = values.len();
    if n < SEASON_LENGTH {
        return false;
    }

    // A flat series is stable, not seasonal
    let sd = std_dev(values);
    if sd <= 0.0 || sd <= config.seasonality_min_variation * mean(values).abs() {
        return false;
    }

    let year_over_year: Vec<(f64, f64)> = (SEASON_LENGTH..n)
        .map(|i| {
            let current = values[i];
            let previous = values[i - SEASON_LENGTH];
            let scale = current.abs().max(previous.abs());
            let relative = if scale > 0.0 {
                (current - previous).abs() / scale
            } else {
                0.0
            };
            (relative, (current - previous).abs())
        })
        .collect();

    // Exactly one year of history has nothing to compare against
    if year_over_year.is_empty() {
        return false;
    }

    let avg_relative =
        year_over_year.iter().map(|(r, _)| r).sum::<f64>() / year_over_year.len() as f64;
    if avg_relative >= config.seasonality_threshold {
        return false;
    }

    // The annual lag has to explain the series better than the previous
    // month does; otherwise this is a slow trend, not a cycle.
    let avg_yoy_diff =
        year_over_year.iter().map(|(_, d)| d).sum::<f64>() / year_over_year.len() as f64;
    let avg_mom_diff =
        values.windows(2).map(|w| (w[1] - w[0]).abs()).sum::<f64>() / (n - 1) as f64;

    avg_yoy_diff < avg_mom_diff
}

/// Additive offset for each position in the annual cycle
///
/// Offsets are the mean residual from the linear trend for each index
/// modulo 12, re-centred so the cycle sums to zero. Positions are relative
/// to the first value of the series.
pub fn seasonal_offsets(values: &[f64]) -> [f64; SEASON_LENGTH] {
    let mut offsets = [0.0; SEASON_LENGTH];
    let Some(fit) = LinearFit::fit(values) else {
        return offsets;
    };

    let mut sums = [0.0; SEASON_LENGTH];
    let mut counts = [0usize; SEASON_LENGTH];
    for (i, value) in values.iter().enumerate() {
        let slot = i % SEASON_LENGTH;
        sums[slot] += value - fit.predict(i as f64);
        counts[slot] += 1;
    }

    for slot in 0..SEASON_LENGTH {
        if counts[slot] > 0 {
            offsets[slot] = sums[slot] / counts[slot] as f64;
        }
    }

    let center = mean(&offsets);
    for offset in offsets.iter_mut() {
        *offset -= center;
    }

    offsets
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Two years of spending with a December spike and a summer dip
    fn holiday_pattern(years: usize) -> Vec<f64> {
        let year = [
            1000.0, 950.0, 1000.0, 1020.0, 980.0, 700.0, 680.0, 720.0, 1000.0, 1050.0, 1400.0,
            2000.0,
        ];
        year.iter().cycle().take(12 * years).copied().collect()
    }

    #[test]
    fn test_short_series_never_seasonal() {
        let config = ForecastConfig::default();
        for len in 0..SEASON_LENGTH {
            let values = holiday_pattern(1)[..len].to_vec();
            assert!(!detect_seasonality(&values, &config));
        }
    }

    #[test]
    fn test_single_year_not_seasonal() {
        let config = ForecastConfig::default();
        assert!(!detect_seasonality(&holiday_pattern(1), &config));
    }

    #[test]
    fn test_repeating_pattern_is_seasonal() {
        let config = ForecastConfig::default();
        assert!(detect_seasonality(&holiday_pattern(2), &config));
    }

    #[test]
    fn test_flat_series_not_seasonal() {
        let config = ForecastConfig::default();
        assert!(!detect_seasonality(&[500.0; 24], &config));
        assert!(!detect_seasonality(&[0.0; 24], &config));
    }

    #[test]
    fn test_linear_growth_not_seasonal() {
        let config = ForecastConfig::default();
        let values: Vec<f64> = (0..24).map(|i| 1000.0 + 40.0 * i as f64).collect();
        assert!(!detect_seasonality(&values, &config));
    }

    #[test]
    fn test_noisy_year_over_year_not_seasonal() {
        let config = ForecastConfig::default();
        let mut values = holiday_pattern(1);
        // Second year looks nothing like the first
        values.extend([
            2000.0, 400.0, 1800.0, 300.0, 2200.0, 500.0, 1900.0, 350.0, 2100.0, 450.0, 600.0,
            900.0,
        ]);
        assert!(!detect_seasonality(&values, &config));
    }

    #[test]
    fn test_offsets_sum_to_zero_and_mark_spike() {
        let offsets = seasonal_offsets(&holiday_pattern(2));
        let total: f64 = offsets.iter().sum();
        assert!(total.abs() < 1e-6);

        // December is the largest positive offset
        let (max_slot, _) = offsets
            .iter()
            .enumerate()
            .fold((0, f64::MIN), |acc, (i, v)| if *v > acc.1 { (i, *v) } else { acc });
        assert_eq!(max_slot, 11);
    }
}
