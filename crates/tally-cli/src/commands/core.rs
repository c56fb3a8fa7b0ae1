//! Shared command utilities
//!
//! This module contains:
//! - `load_config` - Resolve the forecast configuration
//! - `resolve_as_of` - Pick the anchor date for the monthly window
//! - `parse_kinds` / `parse_method` - Argument parsing helpers
//! - `read_transactions` / `build_series` - Read a transaction file into a monthly series
//! - `require_history` - Minimum history guard before forecasting

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use tally_core::forecast::prepare_monthly_series;
use tally_core::{
    load_transactions, ForecastConfig, ForecastMethod, MonthlyPoint, Transaction,
    TransactionKind, MIN_SERIES_LEN,
};

/// Load forecast config from the override path or embedded defaults
pub fn load_config(path: Option<&Path>) -> Result<ForecastConfig> {
    ForecastConfig::load(path).context("Failed to load forecast config")
}

/// Parse `--as-of`, defaulting to today's local date
///
/// The engine never reads the clock itself; this is the only place "today"
/// is decided.
pub fn resolve_as_of(as_of: Option<&str>) -> Result<NaiveDate> {
    match as_of {
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .context("Invalid --as-of date format (use YYYY-MM-DD)"),
        None => Ok(Local::now().date_naive()),
    }
}

/// Parse a `--kind` argument; "both" expands to income and expense
pub fn parse_kinds(kind: &str) -> Result<Vec<TransactionKind>> {
    if kind.eq_ignore_ascii_case("both") || kind.eq_ignore_ascii_case("all") {
        return Ok(TransactionKind::all().to_vec());
    }
    let kind: TransactionKind = kind.parse().map_err(|e: String| anyhow::anyhow!(e))?;
    Ok(vec![kind])
}

/// Parse a single `--kind` argument
pub fn parse_kind(kind: &str) -> Result<TransactionKind> {
    kind.parse().map_err(|e: String| anyhow::anyhow!(e))
}

/// Parse a `--method` argument
pub fn parse_method(method: &str) -> Result<ForecastMethod> {
    method.parse().map_err(|e: String| anyhow::anyhow!(e))
}

/// Read transactions from a CSV or JSON file
pub fn read_transactions(file: &Path) -> Result<Vec<Transaction>> {
    load_transactions(file)
        .with_context(|| format!("Failed to load transactions from {}", file.display()))
}

/// Build the monthly series for one kind
pub fn build_series(
    transactions: &[Transaction],
    kind: TransactionKind,
    months: usize,
    as_of: NaiveDate,
) -> Result<Vec<MonthlyPoint>> {
    prepare_monthly_series(transactions, kind, months, as_of)
        .with_context(|| format!("Failed to build {} series", kind))
}

/// Reject series too short to forecast from
pub fn require_history(series: &[MonthlyPoint], kind: TransactionKind) -> Result<()> {
    if series.len() < MIN_SERIES_LEN {
        anyhow::bail!(
            "Not enough {} history to forecast: {} month(s), need at least {}",
            kind,
            series.len(),
            MIN_SERIES_LEN
        );
    }
    Ok(())
}
