//! Config command implementation

use std::path::Path;

use anyhow::Result;
use tally_core::config::default_config_path;

use super::load_config;

pub fn cmd_config(path: Option<&Path>) -> Result<()> {
    let config = load_config(path)?;

    let source = match path.map(Path::to_path_buf).or_else(default_config_path) {
        Some(p) if p.exists() => p.display().to_string(),
        Some(p) => format!("built-in defaults ({} not found)", p.display()),
        None => "built-in defaults".to_string(),
    };

    println!();
    println!("⚙️  Forecast Configuration");
    println!("   Source: {}", source);
    println!("   ─────────────────────────────────────");
    println!("   interval.z                      {}", config.z);
    println!("   interval.fallback_band_ratio    {}", config.fallback_band_ratio);
    println!("   interval.fallback_band_floor    {}", config.fallback_band_floor);
    println!("   trend.threshold                 {}", config.trend_threshold);
    println!("   smoothing.alpha                 {}", config.alpha);
    println!("   smoothing.beta                  {}", config.beta);
    println!("   moving_average.window           {}", config.window);
    println!("   moving_average.band_multiplier  {}", config.band_multiplier);
    println!("   seasonality.threshold           {}", config.seasonality_threshold);
    println!("   seasonality.min_variation       {}", config.seasonality_min_variation);

    Ok(())
}
