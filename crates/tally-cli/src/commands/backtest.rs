//! Backtest command implementation

use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use tally_core::{backtest, BacktestReport, ForecastConfig, ForecastMethod};
use tokio::task::JoinSet;

use super::{build_series, parse_kind, read_transactions};

/// Score every method concurrently, returned in `ForecastMethod::all()` order
pub async fn run_backtests(
    file: &Path,
    kind: &str,
    months: usize,
    holdout: usize,
    as_of: NaiveDate,
    config: &ForecastConfig,
) -> Result<Vec<BacktestReport>> {
    let kind = parse_kind(kind)?;
    let transactions = read_transactions(file)?;
    let series = build_series(&transactions, kind, months, as_of)?;

    let mut jobs = JoinSet::new();
    for &method in ForecastMethod::all() {
        let series = series.clone();
        let config = config.clone();
        jobs.spawn_blocking(move || backtest(&series, method, holdout, &config));
    }

    let mut reports = Vec::with_capacity(ForecastMethod::all().len());
    while let Some(joined) = jobs.join_next().await {
        let report = joined
            .context("Backtest task panicked")?
            .with_context(|| format!("Backtest of {} history failed", kind))?;
        reports.push(report);
    }

    reports.sort_by_key(|r| {
        ForecastMethod::all()
            .iter()
            .position(|m| *m == r.method)
            .unwrap_or(usize::MAX)
    });

    Ok(reports)
}

pub async fn cmd_backtest(
    file: &Path,
    kind: &str,
    months: usize,
    holdout: usize,
    as_of: NaiveDate,
    config: ForecastConfig,
) -> Result<()> {
    let reports = run_backtests(file, kind, months, holdout, as_of, &config).await?;

    println!();
    println!("🧪 Backtest ({} months held back)", holdout);
    println!("   ─────────────────────────────────────────────────────────────────");
    println!(
        "   {:22} │ {:>9} │ {:>9} │ {:>7} │ {:>8}",
        "Method", "MAE", "RMSE", "MAPE", "Coverage"
    );
    println!("   ───────────────────────┼───────────┼───────────┼─────────┼─────────");

    for report in &reports {
        let mape = report
            .mape
            .map(|m| format!("{:.1}%", m))
            .unwrap_or_else(|| "n/a".to_string());
        println!(
            "   {:22} │ {:>9.2} │ {:>9.2} │ {:>7} │ {:>7.0}%",
            report.method.label(),
            report.mae,
            report.rmse,
            mape,
            report.coverage * 100.0
        );
    }

    if let Some(best) = reports
        .iter()
        .min_by(|a, b| a.mae.partial_cmp(&b.mae).unwrap_or(std::cmp::Ordering::Equal))
    {
        println!();
        println!("   Best fit: {}", best.method);
    }

    Ok(())
}
