//! Series Builder
//!
//! Aggregates raw transactions into a zero-filled, contiguous monthly series
//! ending at an explicitly supplied anchor month.

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{Transaction, TransactionKind};

use super::types::MonthlyPoint;

/// Bucket key for a calendar month (`year * 12 + month0`)
pub fn month_key(date: NaiveDate) -> i32 {
    date.year() * 12 + date.month0() as i32
}

/// First day of the month `months` after (or before, if negative) `date`'s month
///
/// `None` when the result falls outside the representable date range.
pub fn add_months(date: NaiveDate, months: i32) -> Option<NaiveDate> {
    from_month_key(month_key(date).checked_add(months)?)
}

fn from_month_key(key: i32) -> Option<NaiveDate> {
    let year = key.div_euclid(12);
    let month = key.rem_euclid(12) as u32 + 1;
    NaiveDate::from_ymd_opt(year, month, 1)
}

/// Build the trailing monthly series for one transaction kind
///
/// Returns exactly `months_back` points ending at `anchor`'s month, with
/// months that saw no matching activity filled with 0. An empty transaction
/// collection (no history at all) yields an empty series. A window reaching
/// past the representable date range fails with `InvalidInput` naming
/// `months_back`.
pub fn prepare_monthly_series(
    transactions: &[Transaction],
    kind: TransactionKind,
    months_back: usize,
    anchor: NaiveDate,
) -> Result<Vec<MonthlyPoint>> {
    if transactions.is_empty() || months_back == 0 {
        return Ok(vec![]);
    }

    let out_of_range = || {
        Error::invalid_input(
            "months_back",
            format!("{} months before {} is outside the supported date range", months_back, anchor),
        )
    };

    let span = i32::try_from(months_back - 1).map_err(|_| out_of_range())?;
    let end_key = month_key(anchor);
    let start_key = end_key
        .checked_sub(span)
        .filter(|&key| from_month_key(key).is_some())
        .ok_or_else(out_of_range)?;

    let mut buckets: HashMap<i32, f64> = HashMap::new();
    for (i, tx) in transactions.iter().enumerate() {
        if !tx.amount.is_finite() {
            return Err(Error::invalid_input(
                format!("transactions[{}].amount", i),
                format!("must be finite, got {}", tx.amount),
            ));
        }
        if tx.kind != kind {
            continue;
        }

        let key = month_key(tx.date);
        if key < start_key || key > end_key {
            continue;
        }
        *buckets.entry(key).or_insert(0.0) += tx.amount;
    }

    let series: Vec<MonthlyPoint> = (start_key..=end_key)
        .map(|key| {
            let total = buckets.get(&key).copied().unwrap_or(0.0);
            from_month_key(key).map(|date| MonthlyPoint::new(date, total))
        })
        .collect::<Option<_>>()
        .ok_or_else(out_of_range)?;

    debug!(
        kind = kind.as_str(),
        months = series.len(),
        active_months = buckets.len(),
        "Prepared monthly series"
    );

    Ok(series)
}
