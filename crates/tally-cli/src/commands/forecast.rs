//! Series and forecast command implementations

use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde_json::json;
use tally_core::{
    forecast_with_config, ForecastConfig, ForecastMethod, ForecastResult, TransactionKind, Trend,
};
use tokio::task;

use super::{build_series, parse_kind, parse_kinds, read_transactions, require_history};

/// Parameters shared by every kind in a forecast run
#[derive(Debug, Clone, Copy)]
pub struct ForecastRequest {
    pub months: usize,
    pub horizon: usize,
    pub method: ForecastMethod,
    pub as_of: NaiveDate,
}

pub fn cmd_series(
    file: &Path,
    kind: &str,
    months: usize,
    as_of: NaiveDate,
    json: bool,
) -> Result<()> {
    let kind = parse_kind(kind)?;
    let transactions = read_transactions(file)?;
    let series = build_series(&transactions, kind, months, as_of)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&series)?);
        return Ok(());
    }

    println!();
    println!("🗓️  Monthly {} ({} months to {})", kind, months, as_of.format("%b %Y"));
    println!("   ─────────────────────────────");

    if series.is_empty() {
        println!("   No transactions found.");
        return Ok(());
    }

    for point in &series {
        println!("   {} │ {:>12.2}", point.date.format("%Y-%m"), point.value);
    }
    let total: f64 = series.iter().map(|p| p.value).sum();
    println!("   ────────┼─────────────");
    println!("   Total   │ {:>12.2}", total);

    Ok(())
}

/// Forecast each kind on the blocking pool and collect the results in order
pub async fn run_forecasts(
    file: &Path,
    kinds: &[TransactionKind],
    request: ForecastRequest,
    config: &ForecastConfig,
) -> Result<Vec<(TransactionKind, ForecastResult)>> {
    let transactions = read_transactions(file)?;

    let mut handles = Vec::with_capacity(kinds.len());
    for &kind in kinds {
        let series = build_series(&transactions, kind, request.months, request.as_of)?;
        require_history(&series, kind)?;

        let config = config.clone();
        handles.push(task::spawn_blocking(move || {
            forecast_with_config(&series, request.horizon, request.method, &config)
                .map(|result| (kind, result))
        }));
    }

    let mut results = Vec::with_capacity(handles.len());
    for handle in handles {
        let (kind, result) = handle.await.context("Forecast task panicked")??;
        tracing::debug!(
            kind = kind.as_str(),
            method = result.method.as_str(),
            points = result.forecasts.len(),
            "Forecast complete"
        );
        results.push((kind, result));
    }

    Ok(results)
}

pub async fn cmd_forecast(
    file: &Path,
    kind: &str,
    request: ForecastRequest,
    config: ForecastConfig,
    json: bool,
) -> Result<()> {
    let kinds = parse_kinds(kind)?;
    let results = run_forecasts(file, &kinds, request, &config).await?;

    if json {
        let output: Vec<_> = results
            .iter()
            .map(|(kind, result)| json!({ "kind": kind, "result": result }))
            .collect();
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    for (kind, result) in &results {
        print_forecast(*kind, result);
    }

    Ok(())
}

fn print_forecast(kind: TransactionKind, result: &ForecastResult) {
    let trend_icon = match result.trend {
        Trend::Increasing => "📈",
        Trend::Decreasing => "📉",
        Trend::Stable => "➡️ ",
    };

    println!();
    println!("🔮 {} Forecast ({})", capitalize(kind.as_str()), result.method);
    println!(
        "   Trend: {} {}   Seasonal: {}",
        trend_icon,
        result.trend,
        if result.seasonality { "yes" } else { "no" }
    );
    println!("   ─────────────────────────────────────────────");
    println!(
        "   {:8} │ {:>10} │ {:>10} │ {:>10}",
        "Month", "Predicted", "Low", "High"
    );
    println!("   ─────────┼────────────┼────────────┼───────────");
    for point in &result.forecasts {
        println!(
            "   {:8} │ {:>10.2} │ {:>10.2} │ {:>10.2}",
            point.date.format("%Y-%m").to_string(),
            point.predicted,
            point.lower,
            point.upper
        );
    }
    println!("   Total expected: {:.2}", result.total_predicted());
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
